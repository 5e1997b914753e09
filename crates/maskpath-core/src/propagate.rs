//! Phase 1: breadth-first distance propagation.
//!
//! All moves cost 1, so a FIFO queue expands cells in non-decreasing
//! distance order and the first relaxation of a cell is already final.
//! A cell is expanded at most once (the visited set), and a neighbor is
//! only enqueued when its distance actually improved.

use std::collections::VecDeque;

use log::trace;

use crate::field::DistanceField;
use crate::mask::Mask;
use crate::neighbors::neighbors;
use crate::types::Coord;

/// Counters collected while propagating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationStats {
    /// Cells pushed onto the queue (including the start cell).
    pub enqueued: usize,
    /// Cells popped and expanded.
    pub expanded: usize,
    /// Pops skipped because the cell was already expanded.
    pub stale_pops: usize,
}

/// State of one propagation run.
///
/// Owns the distance field and visited set for a single query; nothing
/// is shared with other queries on the same mask.
#[derive(Debug)]
pub struct Propagation {
    field: DistanceField,
    visited: Vec<bool>,
    reached: bool,
    stats: PropagationStats,
}

impl Propagation {
    /// Run BFS from `start` over the passable cells of `mask`.
    ///
    /// The end point is used only to decide reachability: it counts as
    /// reached as soon as it is a neighbor of an expanded cell, before
    /// any bounds or passability filtering, or immediately when
    /// `start == end`. `start` must be inside the mask; it is expanded
    /// even if it is not passable.
    #[must_use]
    pub fn run(mask: &Mask, start: Coord, end: Coord) -> Self {
        let mut state = Self {
            field: DistanceField::unreached(mask),
            visited: vec![false; mask.dimensions().cell_count()],
            reached: start == end,
            stats: PropagationStats::default(),
        };

        let Some(start_index) = mask.index_of(start) else {
            return state;
        };

        let mut queue: VecDeque<usize> = VecDeque::new();
        state.field.relax(start_index, 0);
        queue.push_back(start_index);
        state.stats.enqueued += 1;

        while let Some(ci) = queue.pop_front() {
            if state.visited[ci] {
                state.stats.stale_pops += 1;
                continue;
            }
            let current = state.field.get(ci);
            let cp = mask.coord_of(ci);

            for np in neighbors(cp) {
                if np == end {
                    state.reached = true;
                }
                if !mask.is_passable(np) {
                    continue;
                }
                let Some(ni) = mask.index_of(np) else {
                    continue;
                };
                if state.visited[ni] {
                    continue;
                }
                if state.field.relax(ni, current + 1) {
                    queue.push_back(ni);
                    state.stats.enqueued += 1;
                }
            }

            state.visited[ci] = true;
            state.stats.expanded += 1;
        }

        trace!(
            "propagation from {start}: expanded={} enqueued={} stale={} reached_end={}",
            state.stats.expanded, state.stats.enqueued, state.stats.stale_pops, state.reached,
        );
        state
    }

    /// Whether the end point was reached.
    #[must_use]
    pub const fn reached(&self) -> bool {
        self.reached
    }

    /// The computed distance field.
    #[must_use]
    pub const fn field(&self) -> &DistanceField {
        &self.field
    }

    /// Consumes the state, returning the distance field.
    #[must_use]
    pub fn into_field(self) -> DistanceField {
        self.field
    }

    /// Counters collected during the run.
    #[must_use]
    pub const fn stats(&self) -> PropagationStats {
        self.stats
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::field::UNREACHED;

    #[test]
    fn open_grid_distances_are_chebyshev() {
        let mask = Mask::from_fn(6, 4, |_, _| true).unwrap();
        let start = Coord::new(1, 2);
        let prop = Propagation::run(&mask, start, Coord::new(5, 0));
        assert!(prop.reached());
        for y in 0..4 {
            for x in 0..6 {
                let c = Coord::new(x, y);
                assert_eq!(prop.field().at(c), start.chebyshev(c), "at {c}");
            }
        }
    }

    #[test]
    fn every_passable_cell_expanded_once() {
        let mask = Mask::from_fn(7, 7, |_, _| true).unwrap();
        let prop = Propagation::run(&mask, Coord::new(3, 3), Coord::new(0, 0));
        let stats = prop.stats();
        assert_eq!(stats.expanded, 49);
        assert_eq!(stats.enqueued, 49);
        assert_eq!(stats.stale_pops, 0);
    }

    #[test]
    fn blocked_cells_stay_unreached() {
        let mask = Mask::from_rows(&["#.#", "#.#", "#.#"]).unwrap();
        let prop = Propagation::run(&mask, Coord::new(0, 0), Coord::new(2, 2));
        assert!(!prop.reached());
        assert_eq!(prop.field().at(Coord::new(0, 2)), 2);
        assert_eq!(prop.field().at(Coord::new(1, 1)), UNREACHED);
        assert_eq!(prop.field().at(Coord::new(2, 0)), UNREACHED);
    }

    #[test]
    fn diagonal_gap_is_crossable() {
        let mask = Mask::from_rows(&["#.", ".#"]).unwrap();
        let prop = Propagation::run(&mask, Coord::new(0, 0), Coord::new(1, 1));
        assert!(prop.reached());
        assert_eq!(prop.field().at(Coord::new(1, 1)), 1);
    }

    #[test]
    fn start_equal_to_end_is_reached_even_when_isolated() {
        let mask = Mask::from_rows(&["...", ".#.", "..."]).unwrap();
        let c = Coord::new(1, 1);
        let prop = Propagation::run(&mask, c, c);
        assert!(prop.reached());
        assert_eq!(prop.field().reached_count(), 1);
    }

    #[test]
    fn background_end_next_to_region_counts_as_reached() {
        let mask = Mask::from_rows(&["##."]).unwrap();
        let prop = Propagation::run(&mask, Coord::new(0, 0), Coord::new(2, 0));
        assert!(prop.reached());
        assert_eq!(prop.field().at(Coord::new(2, 0)), UNREACHED);
    }

    #[test]
    fn end_outside_mask_can_be_flagged() {
        // Reachability is checked before bounds filtering.
        let mask = Mask::from_rows(&["##"]).unwrap();
        let prop = Propagation::run(&mask, Coord::new(0, 0), Coord::new(2, 0));
        assert!(prop.reached());
    }

    #[test]
    fn repeated_runs_do_not_share_state() {
        let mask = Mask::from_fn(5, 1, |_, _| true).unwrap();
        let a = Propagation::run(&mask, Coord::new(0, 0), Coord::new(4, 0));
        let b = Propagation::run(&mask, Coord::new(4, 0), Coord::new(0, 0));
        assert_eq!(a.field().at(Coord::new(4, 0)), 4);
        assert_eq!(b.field().at(Coord::new(4, 0)), 0);
        assert_eq!(b.field().at(Coord::new(0, 0)), 4);
    }
}
