//! Page geometry for stamping a raster image onto pages.

/// Height of an image of `pixel_width` x `pixel_height` scaled to `target_width`.
///
/// Returns `None` for an image without pixels.
pub fn fit_to_width(pixel_width: u32, pixel_height: u32, target_width: f64) -> Option<f64> {
    if pixel_width == 0 || pixel_height == 0 {
        return None;
    }
    Some(f64::from(pixel_height) * target_width / f64::from(pixel_width))
}

/// Vertical offsets at which the full image is drawn, one per page.
///
/// The first page always shows the image at offset 0. An image taller than a
/// page gets extra pages, each stamped with the whole image at
/// `remaining - image_height`, where `remaining` starts at the image height
/// and shrinks by one page height per page until it is no longer positive.
/// The first extra page therefore repeats offset 0. This is plain top-aligned
/// re-stamping, not content-aware splitting.
pub fn paginate(image_height: f64, page_height: f64) -> Vec<f64> {
    let mut offsets = vec![0.0];
    if page_height <= 0.0 || image_height <= page_height {
        return offsets;
    }

    let mut remaining = image_height;
    while remaining > 0.0 {
        offsets.push(remaining - image_height);
        remaining -= page_height;
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fit_to_width() {
        assert_eq!(fit_to_width(1000, 2000, 210.0), Some(420.0));
        assert_eq!(fit_to_width(420, 297, 210.0), Some(148.5));
        assert_eq!(fit_to_width(0, 10, 210.0), None);
        assert_eq!(fit_to_width(10, 0, 210.0), None);
    }

    #[test]
    fn test_single_page() {
        assert_eq!(paginate(200.0, 297.0), vec![0.0]);
        assert_eq!(paginate(297.0, 297.0), vec![0.0]);
    }

    #[test]
    fn test_tall_image_restamps() {
        assert_eq!(paginate(400.0, 297.0), vec![0.0, 0.0, -297.0]);
        assert_eq!(paginate(594.0, 297.0), vec![0.0, 0.0, -297.0]);
        assert_eq!(paginate(600.0, 297.0), vec![0.0, 0.0, -297.0, -594.0]);
    }

    #[test]
    fn test_offsets_step_by_page_height() {
        let offsets = paginate(1000.0, 297.0);
        for pair in offsets[1..].windows(2) {
            assert_eq!(pair[0] - pair[1], 297.0);
        }
    }
}
