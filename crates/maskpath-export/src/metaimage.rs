//! MetaImage export serializer.
//!
//! Writes a distance field as a MetaImage pair: a small text header
//! (`.mhd`) and a raw little-endian `i32` pixel buffer. Viewers such as
//! ITK-SNAP, 3D Slicer, and Fiji read this format, and unlike the
//! grayscale rendering it keeps exact distances.
//!
//! Unreached cells are written as `i32::MAX`.
//!
//! This is a pure function with no I/O -- it returns the header text
//! and the raw bytes; the caller decides where they go.

use std::fmt::Write;

use maskpath_core::{DistanceField, UNREACHED};

use crate::ExportError;

/// Raw value written for unreached cells.
pub const UNREACHED_RAW: i32 = i32::MAX;

/// A serialized MetaImage: header text plus the raw data it points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaImage {
    /// Contents of the `.mhd` header file.
    pub header: String,
    /// Contents of the raw data file named in the header.
    pub data: Vec<u8>,
}

/// Serialize `field` as a MetaImage.
///
/// `data_file` is the file name recorded in the header's
/// `ElementDataFile` entry, relative to the header's own location.
///
/// # Errors
///
/// Returns [`ExportError::Empty`] if the field has no pixels.
pub fn to_metaimage(field: &DistanceField, data_file: &str) -> Result<MetaImage, ExportError> {
    let dims = field.dimensions();
    if dims.cell_count() == 0 {
        return Err(ExportError::Empty(dims.width, dims.height));
    }

    let mut header = String::new();
    // Writing to a String never fails.
    let _ = writeln!(header, "ObjectType = Image");
    let _ = writeln!(header, "NDims = 2");
    let _ = writeln!(header, "BinaryData = True");
    let _ = writeln!(header, "ElementByteOrderMSB = False");
    let _ = writeln!(header, "CompressedData = False");
    let _ = writeln!(header, "Offset = 0 0");
    let _ = writeln!(header, "ElementSpacing = 1 1");
    let _ = writeln!(header, "DimSize = {} {}", dims.width, dims.height);
    let _ = writeln!(header, "ElementType = MET_INT");
    let _ = writeln!(header, "ElementDataFile = {data_file}");

    let mut data = Vec::with_capacity(field.values().len() * 4);
    for &d in field.values() {
        let raw = if d == UNREACHED {
            UNREACHED_RAW
        } else {
            i32::try_from(d).unwrap_or(UNREACHED_RAW)
        };
        data.extend_from_slice(&raw.to_le_bytes());
    }

    Ok(MetaImage { header, data })
}
