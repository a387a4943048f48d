use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::GenericImageView as _;
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfLayerReference,
};
use tracing::info;

use crate::error::{RenderError, ReportError};
use crate::model::{Space, Threshold};
use crate::render::table::{caption_lines, placeholder_text, table_cells, title_for};
use crate::report::{ArtifactPaths, mosaic_row_captions};
use crate::stats::RowSet;
use crate::stats::aggregate::{SpaceTables, TableSelector};

// A4 portrait geometry, in millimetres.
const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 12.0;
const IMG_W: f32 = 170.0;

/// Page order of the PDF. Both spaces at the stricter threshold first, then
/// both at the lenient one.
pub const PAGE_ORDER: [(Space, Threshold); 4] = [
    (Space::Native, Threshold::Z31),
    (Space::Mni, Threshold::Z31),
    (Space::Native, Threshold::Z235),
    (Space::Mni, Threshold::Z235),
];

// Column x offsets from the left margin, paired with abbreviated headers:
// the SVG tables spell the full labels out, paper width here does not allow it.
const COL_X: [f32; 6] = [0.0, 18.0, 58.0, 92.0, 124.0, 156.0];
const PDF_COLUMNS: [&str; 6] = [
    "Task",
    "ROI",
    "Activated WB (n, %)",
    "Activated ROI (n, %)",
    "Ratio*",
    "ROI across WB (%)*",
];

/// Writes the paginated PDF report: a cover page, then one page per
/// (space, threshold) with the captioned mosaic and both statistics tables.
pub fn render_pdf(
    subject: &str,
    paths: &ArtifactPaths,
    native: &SpaceTables,
    mni: &SpaceTables,
    out_path: &Path,
) -> Result<(), ReportError> {
    let title = format!("Task-Based fMRI Report for {subject}");
    let (doc, cover_page, cover_layer) = PdfDocument::new(title.clone(), Mm(PAGE_W), Mm(PAGE_H), "content");
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let cover = doc.get_page(cover_page).get_layer(cover_layer);
    cover.use_text(title.as_str(), 24.0, Mm(MARGIN + 15.0), Mm(PAGE_H / 2.0), &bold);

    for (space, threshold) in PAGE_ORDER {
        let tables = match space {
            Space::Native => native,
            Space::Mni => mni,
        };
        let (page, layer) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "content");
        let layer = doc.get_page(page).get_layer(layer);

        let mut y = PAGE_H - MARGIN - 6.0;
        layer.use_text(
            format!(
                "Z-Maps with ROI Outlines ({} Space, {})",
                space.label(),
                threshold.csv_label()
            ),
            13.0,
            Mm(MARGIN),
            Mm(y),
            &bold,
        );
        y -= 5.0;
        // One caption line per mosaic slice row, top to bottom.
        for caption in mosaic_row_captions(subject, threshold) {
            layer.use_text(caption, 8.0, Mm(MARGIN), Mm(y), &font);
            y -= 3.2;
        }

        let mosaic_path = paths.zmap_plot(space, threshold);
        let mosaic = image::open(&mosaic_path).map_err(|source| RenderError::Image {
            path: mosaic_path.clone(),
            source,
        })?;
        let (px_w, px_h) = (mosaic.width() as f32, mosaic.height() as f32);
        let dpi = px_w * 25.4 / IMG_W;
        let img_h = IMG_W * px_h / px_w;
        y -= img_h + 2.0;
        Image::from_dynamic_image(&mosaic).add_to_layer(
            layer.clone(),
            ImageTransform {
                translate_x: Some(Mm((PAGE_W - IMG_W) / 2.0)),
                translate_y: Some(Mm(y)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
        y -= 8.0;

        y = draw_table(
            &layer,
            &font,
            &bold,
            y,
            tables.zstat(threshold),
            space,
            TableSelector::Zstat(threshold),
        );
        draw_table(&layer, &font, &bold, y, &tables.tfce, space, TableSelector::Tfce);
    }

    let file = File::create(out_path).map_err(|source| ReportError::io(out_path, source))?;
    doc.save(&mut BufWriter::new(file))?;
    info!(path = %out_path.display(), "PDF report saved");
    Ok(())
}

/// Draws one statistics table (or its empty placeholder) downwards from `y`
/// and returns the y coordinate below it.
fn draw_table(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    bold: &IndirectFontRef,
    mut y: f32,
    rows: &RowSet,
    space: Space,
    selector: TableSelector,
) -> f32 {
    layer.use_text(title_for(space, selector), 11.0, Mm(MARGIN), Mm(y), bold);
    y -= 5.0;
    match rows {
        RowSet::Empty => {
            layer.use_text(placeholder_text(space, selector), 9.0, Mm(MARGIN), Mm(y), font);
            y - 8.0
        }
        RowSet::Rows(rows) => {
            for (label, x) in PDF_COLUMNS.iter().zip(COL_X) {
                layer.use_text(*label, 6.5, Mm(MARGIN + x), Mm(y), bold);
            }
            y -= 3.8;
            for cells in table_cells(rows) {
                for (cell, x) in cells.iter().zip(COL_X) {
                    if !cell.is_empty() {
                        layer.use_text(cell.as_str(), 6.5, Mm(MARGIN + x), Mm(y), font);
                    }
                }
                y -= 3.8;
            }
            y -= 1.0;
            for line in caption_lines(rows) {
                layer.use_text(line, 5.5, Mm(MARGIN), Mm(y), font);
                y -= 3.0;
            }
            y - 3.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Task;
    use crate::stats::RoiStatsRow;

    fn row(task: Task, roi: &str) -> RoiStatsRow {
        RoiStatsRow {
            task,
            roi: roi.to_string(),
            space: "Native".to_string(),
            threshold: "Z=3.1".to_string(),
            stat_type: "Z-stat".to_string(),
            wb_voxels: 50000,
            roi_voxels: 1200,
            activated_wb: 300,
            activated_wb_pct: 0.6,
            activated_roi: 80,
            activated_roi_pct: 6.7,
            activated_roi_wb_pct: 0.16,
            activated_ratio: 11.1,
        }
    }

    #[test]
    fn test_page_order_is_threshold_major() {
        assert_eq!(PAGE_ORDER[0], (Space::Native, Threshold::Z31));
        assert_eq!(PAGE_ORDER[1], (Space::Mni, Threshold::Z31));
        assert_eq!(PAGE_ORDER[3], (Space::Mni, Threshold::Z235));
    }

    #[test]
    fn test_tables_draw_into_a_valid_document() {
        let (doc, page, layer) = PdfDocument::new("table test", Mm(PAGE_W), Mm(PAGE_H), "content");
        let font = doc.add_builtin_font(BuiltinFont::Helvetica).unwrap();
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).unwrap();
        let layer = doc.get_page(page).get_layer(layer);

        let rows = RowSet::from_rows(vec![
            row(Task::Motor1, "Whole-brain SMA + PMC"),
            row(Task::Motor1, "Left SMA + PMC"),
        ]);
        let y = draw_table(
            &layer,
            &font,
            &bold,
            200.0,
            &rows,
            Space::Native,
            TableSelector::Zstat(Threshold::Z31),
        );
        assert!(y < 200.0 - 2.0 * 3.8);
        let y_after = draw_table(&layer, &font, &bold, y, &RowSet::Empty, Space::Mni, TableSelector::Tfce);
        assert!(y_after < y);

        let bytes = doc.save_to_bytes().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
