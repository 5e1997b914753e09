//! Binary passability mask: which pixels a path may cross.
//!
//! A [`Mask`] is the grid domain of the engine. It is built once from a
//! grayscale raster (or directly from flags) and is read-only afterwards,
//! so one mask can serve any number of queries.
//!
//! Out-of-range lookups never fail: [`Mask::contains`] and
//! [`Mask::is_passable`] simply return `false`, which lets the engine
//! clip neighbor offsets at the image border without special cases.

use image::{DynamicImage, GrayImage};

use crate::types::{Coord, Dimensions, PathError};

/// Character marking a foreground (passable) cell in [`Mask::from_rows`].
pub const FOREGROUND_CHAR: char = '#';

/// Character marking a background cell in [`Mask::from_rows`].
pub const BACKGROUND_CHAR: char = '.';

/// A fixed-size grid of passable / blocked flags, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    dimensions: Dimensions,
    cells: Vec<bool>,
}

impl Mask {
    /// Build a mask from row-major flags.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::InvalidMask`] if `cells.len()` is not
    /// `width * height`, or if either dimension exceeds `i32::MAX`.
    pub fn from_flags(width: u32, height: u32, cells: Vec<bool>) -> Result<Self, PathError> {
        let dimensions = checked_dimensions(width, height)?;
        if cells.len() != dimensions.cell_count() {
            return Err(PathError::InvalidMask(format!(
                "expected {} cells for a {dimensions} mask, got {}",
                dimensions.cell_count(),
                cells.len(),
            )));
        }
        Ok(Self { dimensions, cells })
    }

    /// Build a mask by evaluating `passable(x, y)` for every cell.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::InvalidMask`] if either dimension exceeds
    /// `i32::MAX`.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut passable: impl FnMut(u32, u32) -> bool,
    ) -> Result<Self, PathError> {
        let dimensions = checked_dimensions(width, height)?;
        let mut cells = Vec::with_capacity(dimensions.cell_count());
        for y in 0..height {
            for x in 0..width {
                cells.push(passable(x, y));
            }
        }
        Ok(Self { dimensions, cells })
    }

    /// Binarize a grayscale image: pixels strictly brighter than
    /// `threshold` are passable.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::InvalidMask`] if either image dimension
    /// exceeds `i32::MAX`.
    pub fn from_gray(image: &GrayImage, threshold: u8) -> Result<Self, PathError> {
        let dimensions = checked_dimensions(image.width(), image.height())?;
        let cells = image.pixels().map(|p| p.0[0] > threshold).collect();
        Ok(Self { dimensions, cells })
    }

    /// Binarize a decoded image on its own channels: a pixel is
    /// passable if any color channel is above `threshold`. Alpha is
    /// ignored.
    ///
    /// `threshold` is on the 8-bit scale. For 16-bit images it is
    /// scaled to `threshold * 257` and for float images to
    /// `threshold / 255`, so the default of 0 keeps every non-zero
    /// pixel at any bit depth.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::InvalidMask`] if either image dimension
    /// exceeds `i32::MAX`.
    pub fn from_image(image: &DynamicImage, threshold: u8) -> Result<Self, PathError> {
        let dimensions = checked_dimensions(image.width(), image.height())?;
        let cells = match image {
            DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA16(_)
            | DynamicImage::ImageRgb16(_)
            | DynamicImage::ImageRgba16(_) => {
                let limit = u16::from(threshold) * 257;
                image
                    .to_rgb16()
                    .pixels()
                    .map(|p| p.0.iter().any(|&c| c > limit))
                    .collect()
            }
            DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
                let limit = f32::from(threshold) / 255.0;
                image
                    .to_rgb32f()
                    .pixels()
                    .map(|p| p.0.iter().any(|&c| c > limit))
                    .collect()
            }
            _ => image
                .to_rgb8()
                .pixels()
                .map(|p| p.0.iter().any(|&c| c > threshold))
                .collect(),
        };
        Ok(Self { dimensions, cells })
    }

    /// Build a mask from text rows, mainly for tests and fixtures.
    ///
    /// [`FOREGROUND_CHAR`] (`#`) marks a passable cell and
    /// [`BACKGROUND_CHAR`] (`.`) a blocked one.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::InvalidMask`] if the rows have different
    /// lengths or contain any other character.
    pub fn from_rows(rows: &[&str]) -> Result<Self, PathError> {
        let width = rows.first().map_or(0, |r| r.chars().count());
        let mut cells = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(PathError::InvalidMask(format!(
                    "row {y} has {} cells, expected {width}",
                    row.chars().count(),
                )));
            }
            for (x, ch) in row.chars().enumerate() {
                match ch {
                    FOREGROUND_CHAR => cells.push(true),
                    BACKGROUND_CHAR => cells.push(false),
                    other => {
                        return Err(PathError::InvalidMask(format!(
                            "unexpected character {other:?} at ({x}, {y})",
                        )));
                    }
                }
            }
        }
        let width = u32::try_from(width)
            .map_err(|_| PathError::InvalidMask(format!("row width {width} is too large")))?;
        let height = u32::try_from(rows.len())
            .map_err(|_| PathError::InvalidMask(format!("{} rows is too many", rows.len())))?;
        Self::from_flags(width, height, cells)
    }

    /// Mask dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Mask width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.dimensions.width
    }

    /// Mask height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.dimensions.height
    }

    /// Returns `true` if `c` lies within `[0, width) x [0, height)`.
    #[must_use]
    pub fn contains(&self, c: Coord) -> bool {
        u32::try_from(c.x).is_ok_and(|x| x < self.dimensions.width)
            && u32::try_from(c.y).is_ok_and(|y| y < self.dimensions.height)
    }

    /// Returns `true` if `c` is in bounds and marked passable.
    #[must_use]
    pub fn is_passable(&self, c: Coord) -> bool {
        self.index_of(c).is_some_and(|i| self.cells[i])
    }

    /// Row-major index of `c`, or `None` if out of bounds.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn index_of(&self, c: Coord) -> Option<usize> {
        if !self.contains(c) {
            return None;
        }
        // Both components are non-negative after the bounds check.
        Some(c.y as usize * self.dimensions.width as usize + c.x as usize)
    }

    /// Coordinate of a row-major index. The index must be below
    /// `width * height`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn coord_of(&self, index: usize) -> Coord {
        // Dimensions are capped at i32::MAX on construction.
        let width = self.dimensions.width as usize;
        Coord::new((index % width) as i32, (index / width) as i32)
    }

    /// Number of passable cells.
    #[must_use]
    pub fn passable_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Render the mask as a grayscale image: foreground 255, background 0.
    #[must_use]
    pub fn to_gray(&self) -> GrayImage {
        let raw = self.cells.iter().map(|&c| if c { 255 } else { 0 }).collect();
        GrayImage::from_raw(self.dimensions.width, self.dimensions.height, raw)
            .unwrap_or_else(|| GrayImage::new(self.dimensions.width, self.dimensions.height))
    }
}

/// Reject dimensions whose coordinates would not fit in a [`Coord`].
fn checked_dimensions(width: u32, height: u32) -> Result<Dimensions, PathError> {
    let limit = i32::MAX.unsigned_abs();
    if width > limit || height > limit {
        return Err(PathError::InvalidMask(format!(
            "{width}x{height} exceeds the maximum coordinate range",
        )));
    }
    Ok(Dimensions { width, height })
}
