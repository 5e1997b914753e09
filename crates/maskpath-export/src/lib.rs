//! maskpath-export: Pure raster serializers (sans-IO)
//!
//! Converts distance fields and paths into inspectable rasters:
//! an 8-bit grayscale rendering of a distance field, a MetaImage
//! (`.mhd` + raw) copy of the exact distances, and a path overlay.
//! Nothing here touches the filesystem; callers write the returned
//! bytes wherever they like.

pub mod distance;
pub mod metaimage;
pub mod overlay;

pub use distance::distance_to_gray;
pub use metaimage::{MetaImage, to_metaimage};
pub use overlay::{PATH_VALUE, encode_png, overlay_path};

/// Errors that can occur while exporting.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The image encoder rejected the raster.
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    /// The raster has no pixels.
    #[error("cannot export an empty {0}x{1} raster")]
    Empty(u32, u32),
}
