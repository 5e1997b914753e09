//! Distance-field dump observer.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use maskpath_core::{DistanceField, DistanceObserver, Query};
use maskpath_export::{ExportError, distance_to_gray, encode_png, to_metaimage};

/// Errors writing a distance dump.
#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    /// Serializing the field failed.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Writing a dump file failed.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Output format, picked from the target file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    /// 8-bit grayscale PNG.
    Png,
    /// `.mhd` header plus `.raw` little-endian `i32` data.
    MetaImage,
}

impl Format {
    fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("mhd") => Self::MetaImage,
            _ => Self::Png,
        }
    }
}

/// Writes the distance field of each observed query to a file.
///
/// Failures are logged and remembered rather than propagated, since
/// the observer cannot fail the query. Check [`Self::take_error`]
/// afterwards.
#[derive(Debug)]
pub struct DumpObserver {
    target: PathBuf,
    writes: usize,
    error: Option<DumpError>,
}

impl DumpObserver {
    pub const fn new(target: PathBuf) -> Self {
        Self {
            target,
            writes: 0,
            error: None,
        }
    }

    /// Number of fields written successfully.
    pub const fn writes(&self) -> usize {
        self.writes
    }

    /// The first error hit while dumping, if any.
    pub const fn take_error(&mut self) -> Option<DumpError> {
        self.error.take()
    }

    fn write(&self, field: &DistanceField) -> Result<(), DumpError> {
        match Format::for_path(&self.target) {
            Format::Png => {
                let png = encode_png(&distance_to_gray(field))?;
                write_file(&self.target, &png)
            }
            Format::MetaImage => {
                let raw_path = self.target.with_extension("raw");
                let raw_name = raw_path
                    .file_name()
                    .map_or_else(|| "distance.raw".into(), |n| n.to_string_lossy());
                let mhd = to_metaimage(field, &raw_name)?;
                write_file(&self.target, mhd.header.as_bytes())?;
                write_file(&raw_path, &mhd.data)
            }
        }
    }
}

impl DistanceObserver for DumpObserver {
    fn observe(&mut self, query: &Query, field: &DistanceField) {
        match self.write(field) {
            Ok(()) => {
                self.writes += 1;
                debug!(
                    "dumped distance field for {} -> {} to {}",
                    query.start,
                    query.end,
                    self.target.display()
                );
            }
            Err(e) => {
                warn!("distance dump failed: {e}");
                if self.error.is_none() {
                    self.error = Some(e);
                }
            }
        }
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), DumpError> {
    std::fs::write(path, bytes).map_err(|source| DumpError::Io {
        path: path.to_path_buf(),
        source,
    })
}
