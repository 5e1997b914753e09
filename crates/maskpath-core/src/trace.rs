//! Phase 2: greedy path reconstruction.
//!
//! Walks downhill through the distance field from the end point to the
//! start point, always stepping to the passable neighbor with the
//! smallest distance. Each step must strictly decrease the distance, so
//! the walk terminates after at most `field[end]` steps or fails with
//! [`PathError::DeadEnd`].

use log::warn;

use crate::field::{DistanceField, UNREACHED};
use crate::mask::Mask;
use crate::neighbors::neighbors;
use crate::types::{Coord, Path, PathError};

/// Reconstruct the path from `end` back to `start`.
///
/// The caller must only invoke this after propagation reported the end
/// point as reached.
///
/// # Errors
///
/// Returns [`PathError::DeadEnd`] if some cell on the walk has no
/// passable neighbor with a smaller finite distance.
pub fn trace_back(
    mask: &Mask,
    field: &DistanceField,
    start: Coord,
    end: Coord,
) -> Result<Path, PathError> {
    let mut coords = vec![end];
    let mut current = end;

    while current != start {
        let Some(next) = downhill_neighbor(mask, field, current) else {
            warn!("path reconstruction stalled at {current} while walking to {start}");
            return Err(PathError::DeadEnd { at: current });
        };
        current = next;
        coords.push(current);
    }

    Ok(Path::new(coords))
}

/// The first passable neighbor with the smallest distance, provided that
/// distance is finite and strictly below the distance at `c`.
fn downhill_neighbor(mask: &Mask, field: &DistanceField, c: Coord) -> Option<Coord> {
    let mut best: Option<(Coord, u32)> = None;
    for n in neighbors(c).filter(|&n| mask.is_passable(n)) {
        let d = field.at(n);
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((n, d));
        }
    }
    let limit = field.at(c);
    best.filter(|&(_, d)| d != UNREACHED && d < limit)
        .map(|(n, _)| n)
}
