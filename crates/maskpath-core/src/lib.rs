//! maskpath-core: shortest paths through binary images (sans-IO).
//!
//! Finds the shortest 8-connected path between two foreground pixels of
//! a binary image. Every move, diagonal or not, costs one step:
//!
//! 1. Build a [`Mask`] (from a grayscale image, flags, or text rows)
//! 2. Propagate breadth-first distances from the start point
//! 3. Walk greedily downhill from the end point back to the start
//!
//! This crate has **no filesystem dependencies**: it operates on
//! in-memory images and byte slices. Persisting distance fields or
//! result rasters is left to callers, via [`DistanceObserver`] and the
//! `maskpath-export` crate.

pub mod decode;
pub mod diagnostics;
pub mod engine;
pub mod field;
pub mod mask;
pub mod neighbors;
pub mod observer;
pub mod propagate;
pub mod trace;
pub mod types;

pub use engine::{PathFinder, shortest_path};
pub use field::{DistanceField, UNREACHED};
pub use mask::Mask;
pub use neighbors::NEIGHBOR_OFFSETS;
pub use observer::{DistanceObserver, NoopObserver, Query};
pub use types::{
    Coord, Dimensions, Endpoint, EndpointPolicy, GrayImage, Path, PathError, QueryConfig,
};

/// Result of decoding an image and running one query on it.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// The decoded image as 8-bit grayscale, the base for output rasters.
    pub image: GrayImage,
    /// The path from end to start; empty when unreachable.
    pub path: Path,
    /// Image dimensions in pixels.
    pub dimensions: Dimensions,
}

/// Decode image bytes, binarize them, and find the shortest path.
///
/// # Steps
///
/// 1. Decode the image
/// 2. Binarize its channels with `config.threshold`
/// 3. Validate endpoints per `config.endpoint_policy`
/// 4. Propagate distances and reconstruct the path
///
/// # Errors
///
/// Returns [`PathError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PathError::ImageDecode`] if the image format is unrecognized.
/// Returns [`PathError::OutOfBounds`] / [`PathError::Impassable`] for bad
/// endpoints and [`PathError::DeadEnd`] if reconstruction stalls.
pub fn process(
    image_bytes: &[u8],
    start: Coord,
    end: Coord,
    config: &QueryConfig,
) -> Result<ProcessResult, PathError> {
    let decoded = decode::decode_image(image_bytes)?;
    let mask = Mask::from_image(&decoded, config.threshold)?;
    let image = decoded.to_luma8();
    let dimensions = mask.dimensions();
    let path = PathFinder::new(mask, config.clone()).find(start, end)?;
    Ok(ProcessResult {
        image,
        path,
        dimensions,
    })
}
