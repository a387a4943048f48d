use std::path::Path;

use image::RgbImage;
use tracing::info;

use crate::error::RenderError;
use crate::layout::SubjectLayout;
use crate::model::{Space, Task, Threshold};
use crate::render::volume::Volume;
use crate::render::{ROI_ALPHA, blend, roi_color, sample, stat_color};

/// Edge length of one rendered axial slice tile.
const TILE: u32 = 120;
/// Slices per panel row, one per display cut coordinate.
const SLICES: u32 = 10;
/// Opacity of the statistical overlay over the anatomical background.
const STAT_ALPHA: f32 = 0.7;
/// Values below this are treated as background in unthresholded maps.
const DISPLAY_FLOOR: f32 = 0.01;

/// Renders the composite z-map image for one (space, threshold): per task a
/// row of unthresholded slices above a row of thresholded slices, both with
/// ROI fills, stacked for all three tasks into a single PNG.
pub fn render_zmap_mosaic(
    layout: &SubjectLayout,
    space: Space,
    threshold: Threshold,
    out_path: &Path,
) -> Result<(), RenderError> {
    let bg = Volume::load(layout.background(space))?;
    let bg_ceiling = bg.intensity_ceiling();

    let rows = Task::ALL.len() as u32 * 2;
    let mut canvas = RgbImage::new(SLICES * TILE, rows * TILE);

    for (ti, task) in Task::ALL.into_iter().enumerate() {
        let record = layout.record(task, space);
        let unthresh = Volume::load(&record.z_map)?;
        let thresh = Volume::load(record.thresh_map(threshold))?;
        let mut rois = Vec::with_capacity(record.roi_masks.len());
        for (label, mask_path) in &record.roi_masks {
            rois.push((roi_color(label), Volume::load(mask_path)?));
        }

        for (col, world_z) in record.cut_coords.iter().enumerate() {
            let x0 = col as u32 * TILE;
            draw_tile(
                &mut canvas,
                x0,
                (2 * ti as u32) * TILE,
                &bg,
                bg_ceiling,
                *world_z,
                &unthresh,
                None,
                &rois,
            );
            draw_tile(
                &mut canvas,
                x0,
                (2 * ti as u32 + 1) * TILE,
                &bg,
                bg_ceiling,
                *world_z,
                &thresh,
                Some(threshold.value()),
                &rois,
            );
        }
    }

    canvas.save(out_path).map_err(|source| RenderError::Image {
        path: out_path.to_path_buf(),
        source,
    })?;
    info!(path = %out_path.display(), "z-map mosaic saved");
    Ok(())
}

/// Draws one axial tile: grayscale anatomy, statistical overlay (masked at
/// `display_threshold` when given), then ROI fills. Volumes are sampled by
/// normalized in-plane coordinates so differing grids still line up, and
/// each volume maps the world coordinate through its own affine.
#[allow(clippy::too_many_arguments)]
fn draw_tile(
    canvas: &mut RgbImage,
    x0: u32,
    y0: u32,
    bg: &Volume,
    bg_ceiling: f32,
    world_z: f32,
    stat: &Volume,
    display_threshold: Option<f32>,
    rois: &[([u8; 3], Volume)],
) {
    let bg_slice = bg.axial_slice(bg.slice_index_for_world_z(world_z));
    let stat_slice = stat.axial_slice(stat.slice_index_for_world_z(world_z));
    let roi_slices: Vec<_> = rois
        .iter()
        .map(|(color, vol)| (*color, vol.axial_slice(vol.slice_index_for_world_z(world_z))))
        .collect();
    let floor = display_threshold.unwrap_or(DISPLAY_FLOOR);

    for py in 0..TILE {
        for px in 0..TILE {
            let u = (px as f32 + 0.5) / TILE as f32;
            let v = (py as f32 + 0.5) / TILE as f32;

            let anat = (sample(&bg_slice, u, v) / bg_ceiling).clamp(0.0, 1.0);
            let g = (anat * 255.0) as u8;
            let mut pixel = [g, g, g];

            let z = sample(&stat_slice, u, v);
            if z.is_finite() && z.abs() >= floor {
                pixel = blend(pixel, stat_color(z), STAT_ALPHA);
            }
            for (color, roi_slice) in &roi_slices {
                if sample(roi_slice, u, v) > 0.5 {
                    pixel = blend(pixel, *color, ROI_ALPHA);
                }
            }

            canvas.put_pixel(x0 + px, y0 + py, image::Rgb(pixel));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_draw_tile_paints_overlay_and_roi() {
        let mut canvas = RgbImage::new(TILE, TILE);
        let bg = Volume::from_parts(Array3::from_elem((8, 8, 4), 100.0), 1.0, 0.0);
        let stat = Volume::from_parts(Array3::from_elem((8, 8, 4), 5.0), 1.0, 0.0);
        let mut mask = Array3::zeros((8, 8, 4));
        mask.fill(1.0);
        let rois = vec![(crate::render::ROI_GREEN, Volume::from_parts(mask, 1.0, 0.0))];

        draw_tile(&mut canvas, 0, 0, &bg, 100.0, 1.0, &stat, Some(3.1), &rois);
        let center = canvas.get_pixel(TILE / 2, TILE / 2).0;
        // Warm stat overlay keeps red dominant over blue even under the
        // green ROI fill.
        assert!(center[0] > center[2]);
        assert_ne!(center, [255, 255, 255]);
    }

    #[test]
    fn test_draw_tile_respects_display_threshold() {
        let mut canvas = RgbImage::new(TILE, TILE);
        let bg = Volume::from_parts(Array3::from_elem((8, 8, 4), 100.0), 1.0, 0.0);
        let stat = Volume::from_parts(Array3::from_elem((8, 8, 4), 2.0), 1.0, 0.0);

        draw_tile(&mut canvas, 0, 0, &bg, 100.0, 1.0, &stat, Some(3.1), &[]);
        // Sub-threshold values leave the anatomical gray untouched.
        let p = canvas.get_pixel(TILE / 2, TILE / 2).0;
        assert_eq!(p[0], p[1]);
        assert_eq!(p[1], p[2]);
    }
}
