//! Image decoding and binarization.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP). The mask is built
//! from the decoded pixels at their native bit depth and channel
//! layout; the grayscale copy is only used as the base raster for
//! output.

use image::{DynamicImage, GrayImage};

use crate::mask::Mask;
use crate::types::PathError;

/// Decode raw image bytes.
///
/// # Errors
///
/// Returns [`PathError::EmptyInput`] if `bytes` is empty.
/// Returns [`PathError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, PathError> {
    if bytes.is_empty() {
        return Err(PathError::EmptyInput);
    }

    Ok(image::load_from_memory(bytes)?)
}

/// Decode raw image bytes and convert to 8-bit grayscale.
///
/// # Errors
///
/// Same as [`decode_image`].
pub fn decode_and_grayscale(bytes: &[u8]) -> Result<GrayImage, PathError> {
    Ok(decode_image(bytes)?.to_luma8())
}

/// Decode raw image bytes straight into a [`Mask`].
///
/// See [`Mask::from_image`] for how pixels are binarized.
///
/// # Errors
///
/// Same as [`decode_image`], plus [`PathError::InvalidMask`] for images
/// too large to address.
pub fn decode_mask(bytes: &[u8], threshold: u8) -> Result<Mask, PathError> {
    Mask::from_image(&decode_image(bytes)?, threshold)
}
