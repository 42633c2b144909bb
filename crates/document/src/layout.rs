//! Page geometry. All lengths in millimetres; PDF y grows upwards.

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 10.0;

const MM_PER_INCH: f32 = 25.4;

/// Where and how large one image is drawn on its page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Left edge
    pub x_mm: f32,
    /// Bottom edge
    pub y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
    /// Resolution that makes the pixel grid come out at `width_mm`
    pub dpi: f32,
}

pub fn content_width() -> f32 {
    PAGE_WIDTH_MM - 2.0 * MARGIN_MM
}

pub fn content_height() -> f32 {
    PAGE_HEIGHT_MM - 2.0 * MARGIN_MM
}

/// Fit a `width_px` × `height_px` image to the content width, shrinking to
/// the content height when the scaled image would run off the page.
pub fn fit(width_px: u32, height_px: u32) -> Placement {
    let w = width_px.max(1) as f32;
    let h = height_px.max(1) as f32;

    let mut width_mm = content_width();
    let mut height_mm = width_mm * h / w;
    if height_mm > content_height() {
        height_mm = content_height();
        width_mm = height_mm * w / h;
    }

    Placement {
        x_mm: MARGIN_MM,
        y_mm: PAGE_HEIGHT_MM - MARGIN_MM - height_mm,
        width_mm,
        height_mm,
        dpi: w * MM_PER_INCH / width_mm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn landscape_fills_content_width() {
        let p = fit(1600, 1200);
        assert!(close(p.width_mm, 190.0));
        assert!(close(p.height_mm, 142.5));
        assert!(close(p.x_mm, 10.0));
        assert!(close(p.y_mm, 297.0 - 10.0 - 142.5));
    }

    #[test]
    fn tall_image_is_capped_at_content_height() {
        let p = fit(1000, 4000);
        assert!(close(p.height_mm, 277.0));
        assert!(close(p.width_mm, 69.25));
        assert!(close(p.y_mm, 10.0));
    }

    #[test]
    fn dpi_maps_pixels_to_target_width() {
        let p = fit(1900, 100);
        // 1900 px over 190 mm = 10 px/mm = 254 dpi
        assert!(close(p.dpi, 254.0));
        assert!(close(1900.0 / p.dpi * 25.4, p.width_mm));
    }

    #[test]
    fn degenerate_dimensions_do_not_divide_by_zero() {
        let p = fit(0, 0);
        assert!(p.dpi.is_finite());
        assert!(p.width_mm > 0.0);
    }
}
