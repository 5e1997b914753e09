//! Shared types for the maskpath shortest-path engine.

use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can build masks and
/// rasters without depending on `image` directly.
pub use image::GrayImage;

/// An integer pixel coordinate.
///
/// Components are signed so that neighbor offsets can step past the
/// image border; such coordinates are rejected by bounds checks rather
/// than wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    /// Column (pixels from left edge).
    pub x: i32,
    /// Row (pixels from top edge).
    pub y: i32,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev (L∞) distance, i.e. the number of 8-connected steps
    /// between two cells on an unobstructed grid.
    #[must_use]
    pub const fn chebyshev(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy { dx } else { dy }
    }

    /// Returns `true` if `other` is one of the eight cells surrounding `self`.
    #[must_use]
    pub const fn is_adjacent(self, other: Self) -> bool {
        self.chebyshev(other) == 1
    }
}

impl Add for Coord {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Total number of cells (`width * height`).
    #[must_use]
    pub const fn cell_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A shortest path, stored from the end point back to the start point.
///
/// An empty path means the end point is not reachable from the start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path(Vec<Coord>);

impl Path {
    /// Create a path from coordinates in end-to-start order.
    #[must_use]
    pub const fn new(coords: Vec<Coord>) -> Self {
        Self(coords)
    }

    /// The "not reachable" result.
    #[must_use]
    pub const fn unreachable() -> Self {
        Self(Vec::new())
    }

    /// Returns `true` if no path was found.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of coordinates in the path (steps + 1).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Number of moves from start to end, or `None` for an empty path.
    #[must_use]
    pub const fn steps(&self) -> Option<usize> {
        self.0.len().checked_sub(1)
    }

    /// The end point of the query (first stored coordinate).
    #[must_use]
    pub fn end(&self) -> Option<Coord> {
        self.0.first().copied()
    }

    /// The start point of the query (last stored coordinate).
    #[must_use]
    pub fn start(&self) -> Option<Coord> {
        self.0.last().copied()
    }

    /// Coordinates in end-to-start order.
    #[must_use]
    pub fn coords(&self) -> &[Coord] {
        &self.0
    }

    /// Consumes the path, returning coordinates in end-to-start order.
    #[must_use]
    pub fn into_coords(self) -> Vec<Coord> {
        self.0
    }

    /// Consumes the path, returning coordinates in start-to-end
    /// (traversal) order.
    #[must_use]
    pub fn into_start_to_end(self) -> Vec<Coord> {
        let mut coords = self.0;
        coords.reverse();
        coords
    }
}

/// Which endpoint of a query an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endpoint {
    /// The start point.
    Start,
    /// The end point.
    End,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::End => f.write_str("end"),
        }
    }
}

/// How strictly query endpoints are checked before propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EndpointPolicy {
    /// Both endpoints must be in bounds and passable.
    #[default]
    Strict,
    /// Endpoints must be in bounds; passability is not checked.
    ///
    /// Reachability is flagged as soon as the end point is a neighbor of
    /// an expanded cell, even if the end point itself is background. The
    /// returned path then begins on a background pixel. A background
    /// start point makes reconstruction fail with
    /// [`PathError::DeadEnd`].
    Lenient,
}

/// Configuration for a shortest-path query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Pixels with a gray value strictly above this threshold are
    /// passable. The default of 0 treats every non-zero pixel as
    /// foreground.
    pub threshold: u8,

    /// Endpoint validation policy.
    pub endpoint_policy: EndpointPolicy,
}

impl QueryConfig {
    /// Default binarization threshold.
    pub const DEFAULT_THRESHOLD: u8 = 0;

    /// Default endpoint policy.
    pub const DEFAULT_ENDPOINT_POLICY: EndpointPolicy = EndpointPolicy::Strict;
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
            endpoint_policy: Self::DEFAULT_ENDPOINT_POLICY,
        }
    }
}

/// Errors that can occur while building a mask or running a query.
///
/// An unreachable end point is *not* an error; it is reported as an
/// empty [`Path`].
///
/// Uses custom `Serialize`/`Deserialize` because `image::ImageError`
/// does not implement serde traits. The `ImageDecode` variant is
/// serialized as its `Display` string.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// An endpoint lies outside the mask.
    #[error("{endpoint} point {coord} is outside the {dimensions} mask")]
    OutOfBounds {
        /// Which endpoint.
        endpoint: Endpoint,
        /// The offending coordinate.
        coord: Coord,
        /// Mask dimensions.
        dimensions: Dimensions,
    },

    /// An endpoint lies on a background pixel.
    #[error("{endpoint} point {coord} is not a foreground pixel")]
    Impassable {
        /// Which endpoint.
        endpoint: Endpoint,
        /// The offending coordinate.
        coord: Coord,
    },

    /// Path reconstruction found no neighbor closer to the start.
    ///
    /// Indicates an inconsistent distance field, which can only happen
    /// when endpoint validation was relaxed.
    #[error("path reconstruction stalled at {at}: no neighbor is closer to the start")]
    DeadEnd {
        /// The cell where the walk stalled.
        at: Coord,
    },

    /// Mask construction input was malformed.
    #[error("invalid mask: {0}")]
    InvalidMask(String),

    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Query configuration is invalid.
    #[error("invalid query configuration: {0}")]
    InvalidConfig(String),
}

/// Serde-compatible proxy for `PathError`.
#[derive(Serialize, Deserialize)]
enum PathErrorProxy {
    OutOfBounds {
        endpoint: Endpoint,
        coord: Coord,
        dimensions: Dimensions,
    },
    Impassable {
        endpoint: Endpoint,
        coord: Coord,
    },
    DeadEnd {
        at: Coord,
    },
    InvalidMask(String),
    ImageDecode(String),
    EmptyInput,
    InvalidConfig(String),
}

impl Serialize for PathError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let proxy = match self {
            Self::OutOfBounds {
                endpoint,
                coord,
                dimensions,
            } => PathErrorProxy::OutOfBounds {
                endpoint: *endpoint,
                coord: *coord,
                dimensions: *dimensions,
            },
            Self::Impassable { endpoint, coord } => PathErrorProxy::Impassable {
                endpoint: *endpoint,
                coord: *coord,
            },
            Self::DeadEnd { at } => PathErrorProxy::DeadEnd { at: *at },
            Self::InvalidMask(s) => PathErrorProxy::InvalidMask(s.clone()),
            Self::ImageDecode(e) => PathErrorProxy::ImageDecode(e.to_string()),
            Self::EmptyInput => PathErrorProxy::EmptyInput,
            Self::InvalidConfig(s) => PathErrorProxy::InvalidConfig(s.clone()),
        };
        proxy.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PathError {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let proxy = PathErrorProxy::deserialize(deserializer)?;
        Ok(match proxy {
            PathErrorProxy::OutOfBounds {
                endpoint,
                coord,
                dimensions,
            } => Self::OutOfBounds {
                endpoint,
                coord,
                dimensions,
            },
            PathErrorProxy::Impassable { endpoint, coord } => Self::Impassable { endpoint, coord },
            PathErrorProxy::DeadEnd { at } => Self::DeadEnd { at },
            PathErrorProxy::InvalidMask(s) => Self::InvalidMask(s),
            // The typed image error cannot be rebuilt; keep its message.
            PathErrorProxy::ImageDecode(msg) => {
                Self::InvalidConfig(format!("image decode error: {msg}"))
            }
            PathErrorProxy::EmptyInput => Self::EmptyInput,
            PathErrorProxy::InvalidConfig(s) => Self::InvalidConfig(s),
        })
    }
}
