//! Per-query distance field.

use crate::mask::Mask;
use crate::types::{Coord, Dimensions};

/// Distance value of a cell the propagation never reached.
pub const UNREACHED: u32 = u32::MAX;

/// Minimal step counts from the query's start cell, one entry per pixel.
///
/// Every entry starts at [`UNREACHED`]; propagation only ever lowers
/// values. A field belongs to exactly one query and is dropped with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceField {
    dimensions: Dimensions,
    values: Vec<u32>,
}

impl DistanceField {
    /// A field covering `mask` with every cell unreached.
    #[must_use]
    pub fn unreached(mask: &Mask) -> Self {
        let dimensions = mask.dimensions();
        Self {
            dimensions,
            values: vec![UNREACHED; dimensions.cell_count()],
        }
    }

    /// Field dimensions (same as the mask's).
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Row-major distance values.
    #[must_use]
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// Distance at `c`, or [`UNREACHED`] if `c` is out of bounds or was
    /// not reached.
    #[must_use]
    pub fn at(&self, c: Coord) -> u32 {
        self.index_of(c).map_or(UNREACHED, |i| self.values[i])
    }

    /// Returns `true` if `c` has a finite distance.
    #[must_use]
    pub fn is_reached(&self, c: Coord) -> bool {
        self.at(c) != UNREACHED
    }

    /// Number of cells with a finite distance.
    #[must_use]
    pub fn reached_count(&self) -> usize {
        self.values.iter().filter(|&&d| d != UNREACHED).count()
    }

    /// Largest finite distance, or `None` if nothing was reached.
    #[must_use]
    pub fn max_distance(&self) -> Option<u32> {
        self.values.iter().copied().filter(|&d| d != UNREACHED).max()
    }

    /// Lower the distance at row-major `index` if `distance` improves it.
    ///
    /// Returns `true` when the stored value changed.
    pub(crate) fn relax(&mut self, index: usize, distance: u32) -> bool {
        if distance < self.values[index] {
            self.values[index] = distance;
            true
        } else {
            false
        }
    }

    pub(crate) fn get(&self, index: usize) -> u32 {
        self.values[index]
    }

    #[allow(clippy::cast_sign_loss)]
    fn index_of(&self, c: Coord) -> Option<usize> {
        let inside = u32::try_from(c.x).is_ok_and(|x| x < self.dimensions.width)
            && u32::try_from(c.y).is_ok_and(|y| y < self.dimensions.height);
        inside.then(|| c.y as usize * self.dimensions.width as usize + c.x as usize)
    }
}
