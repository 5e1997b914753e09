//! 8-connected neighborhood.

use crate::types::Coord;

/// The eight offsets around a cell, excluding the cell itself.
///
/// Enumerated x-major (outer loop over dx, inner over dy). Path
/// reconstruction breaks distance ties by taking the first minimum in
/// this order, so the order is part of the engine's observable output.
pub const NEIGHBOR_OFFSETS: [Coord; 8] = [
    Coord::new(-1, -1),
    Coord::new(-1, 0),
    Coord::new(-1, 1),
    Coord::new(0, -1),
    Coord::new(0, 1),
    Coord::new(1, -1),
    Coord::new(1, 0),
    Coord::new(1, 1),
];

/// All eight neighbors of `c`, in [`NEIGHBOR_OFFSETS`] order.
///
/// Neighbors past the image border are included; callers filter them
/// with a bounds or passability check.
pub fn neighbors(c: Coord) -> impl Iterator<Item = Coord> {
    NEIGHBOR_OFFSETS.into_iter().map(move |d| c + d)
}
