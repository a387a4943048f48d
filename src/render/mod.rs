pub mod mosaic;
pub mod table;
pub mod viewer;
pub mod volume;

/// Fill color for motor (SMA + PMC) and STG region overlays.
pub const ROI_GREEN: [u8; 3] = [0x38, 0xcb, 0x82];
/// Fill color for Heschl's gyrus overlays.
pub const ROI_VIOLET: [u8; 3] = [0xb4, 0x04, 0xf8];
/// Opacity of ROI fills over the anatomical background.
pub const ROI_ALPHA: f32 = 0.3;
/// Statistical overlay saturation point (|z|).
pub const STAT_VMAX: f32 = 13.0;

/// Heschl masks get their own color so they stay distinguishable from the
/// STG fill they overlap with.
pub fn roi_color(label: &str) -> [u8; 3] {
    if label.contains("Heschl") {
        ROI_VIOLET
    } else {
        ROI_GREEN
    }
}

/// Warm/cool diverging map for statistical values, saturating at `STAT_VMAX`.
pub fn stat_color(value: f32) -> [u8; 3] {
    let t = (value.abs() / STAT_VMAX).clamp(0.0, 1.0);
    if value >= 0.0 {
        // red -> yellow
        [255, (t * 255.0) as u8, 0]
    } else {
        // blue -> cyan
        [0, (t * 255.0) as u8, 255]
    }
}

/// Nearest-neighbor sample of a slice at normalized coordinates, with the
/// vertical axis flipped into image orientation.
pub(crate) fn sample(view: &ndarray::ArrayView2<'_, f32>, u: f32, v: f32) -> f32 {
    let (nx, ny) = (view.shape()[0], view.shape()[1]);
    let x = ((u * nx as f32) as usize).min(nx - 1);
    let y = ((v * ny as f32) as usize).min(ny - 1);
    view[[x, ny - 1 - y]]
}

pub(crate) fn blend(base: [u8; 3], color: [u8; 3], alpha: f32) -> [u8; 3] {
    let mut out = [0u8; 3];
    for i in 0..3 {
        out[i] = ((1.0 - alpha) * base[i] as f32 + alpha * color[i] as f32) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roi_color_split() {
        assert_eq!(roi_color("Whole-brain SMA + PMC"), ROI_GREEN);
        assert_eq!(roi_color("Whole-brain STG"), ROI_GREEN);
        assert_eq!(roi_color("Left Heschl"), ROI_VIOLET);
    }

    #[test]
    fn test_stat_color_saturates() {
        assert_eq!(stat_color(STAT_VMAX), [255, 255, 0]);
        assert_eq!(stat_color(100.0), [255, 255, 0]);
        assert_eq!(stat_color(-STAT_VMAX), [0, 255, 255]);
        assert_eq!(stat_color(0.0), [255, 0, 0]);
    }
}
