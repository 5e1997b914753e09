//! Grayscale rendering of a distance field.
//!
//! Unreached pixels are black. Reached pixels fade linearly from white
//! at the start point (distance 0) to value 1 at the farthest reached
//! pixel, so the flood front is visible at a glance.
//!
//! This is a pure function with no I/O -- it returns a `GrayImage`.

use maskpath_core::{DistanceField, GrayImage, UNREACHED};

/// Gray value for pixels the query never reached.
pub const UNREACHED_VALUE: u8 = 0;

/// Render `field` as an 8-bit grayscale image.
#[must_use = "returns the rendered distance image"]
pub fn distance_to_gray(field: &DistanceField) -> GrayImage {
    let dims = field.dimensions();
    let max = field.max_distance().unwrap_or(0);
    let raw = field
        .values()
        .iter()
        .map(|&d| shade(d, max))
        .collect::<Vec<u8>>();
    GrayImage::from_raw(dims.width, dims.height, raw)
        .unwrap_or_else(|| GrayImage::new(dims.width, dims.height))
}

/// Map a distance onto `1..=255`, with 0 reserved for unreached.
#[allow(clippy::cast_possible_truncation)]
fn shade(d: u32, max: u32) -> u8 {
    if d == UNREACHED {
        return UNREACHED_VALUE;
    }
    if max == 0 {
        return u8::MAX;
    }
    // 255 at d = 0, 1 at d = max.
    let scaled = u64::from(d) * 254 / u64::from(max);
    (255 - scaled) as u8
}
