//! Path overlay and PNG encoding.

use image::ImageEncoder;
use maskpath_core::{GrayImage, Path};

use crate::ExportError;

/// Gray value painted onto path pixels by default.
pub const PATH_VALUE: u8 = 100;

/// Copy `base` and paint every coordinate of `path` with `value`.
///
/// Coordinates outside the image are skipped. An empty path returns an
/// unchanged copy.
#[must_use = "returns a new image with the path painted"]
pub fn overlay_path(base: &GrayImage, path: &Path, value: u8) -> GrayImage {
    let mut out = base.clone();
    for c in path.coords() {
        let (Ok(x), Ok(y)) = (u32::try_from(c.x), u32::try_from(c.y)) else {
            continue;
        };
        if x < out.width() && y < out.height() {
            out.put_pixel(x, y, image::Luma([value]));
        }
    }
    out
}

/// Encode a grayscale raster as PNG bytes.
///
/// # Errors
///
/// Returns [`ExportError::Empty`] for a zero-size image and
/// [`ExportError::Encode`] if the PNG encoder fails.
pub fn encode_png(image: &GrayImage) -> Result<Vec<u8>, ExportError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ExportError::Empty(image.width(), image.height()));
    }
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::L8,
    )?;
    Ok(buf)
}
