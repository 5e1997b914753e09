//! Shortest-path engine: endpoint checks, propagation, reconstruction.
//!
//! ```rust
//! # use maskpath_core::{Coord, Mask, PathError, shortest_path};
//! # fn run() -> Result<(), PathError> {
//! let mask = Mask::from_rows(&["#####", "#####", "#####", "#####", "#####"])?;
//! let path = shortest_path(&mask, Coord::new(0, 0), Coord::new(4, 4))?;
//! assert_eq!(path.len(), 5);
//! # Ok(())
//! # }
//! ```

use log::debug;

use crate::mask::Mask;
use crate::observer::{DistanceObserver, NoopObserver, Query};
use crate::propagate::{Propagation, PropagationStats};
use crate::trace::trace_back;
use crate::types::{Coord, Endpoint, EndpointPolicy, Path, PathError, QueryConfig};

/// Find the shortest 8-connected path from `start` to `end` through the
/// passable cells of `mask`, using the default (strict) configuration.
///
/// The returned path runs from `end` back to `start`. An empty path
/// means `end` is not reachable.
///
/// # Errors
///
/// Returns [`PathError::OutOfBounds`] or [`PathError::Impassable`] if an
/// endpoint is outside the mask or on a background pixel.
pub fn shortest_path(mask: &Mask, start: Coord, end: Coord) -> Result<Path, PathError> {
    run_query(mask, &QueryConfig::default(), start, end, &mut NoopObserver)
}

/// A mask plus query configuration, reusable across any number of
/// queries.
///
/// Queries take `&self` and allocate their own distance field, so a
/// `PathFinder` can be shared between threads.
#[derive(Debug, Clone)]
pub struct PathFinder {
    mask: Mask,
    config: QueryConfig,
}

/// Everything a single query produced, for callers that want more than
/// the path.
#[derive(Debug, Clone)]
pub(crate) struct QueryOutcome {
    pub path: Path,
    pub stats: PropagationStats,
    pub reached_cells: usize,
    pub max_distance: Option<u32>,
}

impl PathFinder {
    /// Create a path finder over `mask`.
    #[must_use]
    pub const fn new(mask: Mask, config: QueryConfig) -> Self {
        Self { mask, config }
    }

    /// The mask queries run on.
    #[must_use]
    pub const fn mask(&self) -> &Mask {
        &self.mask
    }

    /// The query configuration.
    #[must_use]
    pub const fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Find the shortest path from `start` to `end`.
    ///
    /// # Errors
    ///
    /// See [`find_observed`](Self::find_observed).
    pub fn find(&self, start: Coord, end: Coord) -> Result<Path, PathError> {
        self.find_observed(start, end, &mut NoopObserver)
    }

    /// Find the shortest path, handing the distance field to `observer`
    /// once propagation finishes.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::OutOfBounds`] if an endpoint is outside the
    /// mask. Under [`EndpointPolicy::Strict`], returns
    /// [`PathError::Impassable`] if an endpoint is on a background
    /// pixel. Under [`EndpointPolicy::Lenient`], returns
    /// [`PathError::DeadEnd`] if reconstruction cannot walk back to the
    /// start.
    pub fn find_observed(
        &self,
        start: Coord,
        end: Coord,
        observer: &mut dyn DistanceObserver,
    ) -> Result<Path, PathError> {
        run_query(&self.mask, &self.config, start, end, observer)
    }
}

/// One query over a borrowed mask: validate, propagate, notify, trace.
fn run_query(
    mask: &Mask,
    config: &QueryConfig,
    start: Coord,
    end: Coord,
    observer: &mut dyn DistanceObserver,
) -> Result<Path, PathError> {
    validate_endpoints(mask, config, start, end)?;
    let prop = Propagation::run(mask, start, end);
    notify(observer, &prop, start, end);
    Ok(reconstruct(mask, &prop, start, end)?.path)
}

/// Check both endpoints against the mask and the endpoint policy.
pub(crate) fn validate_endpoints(
    mask: &Mask,
    config: &QueryConfig,
    start: Coord,
    end: Coord,
) -> Result<(), PathError> {
    validate(mask, config, Endpoint::Start, start)?;
    validate(mask, config, Endpoint::End, end)?;
    debug!(
        "query {start} -> {end} on {} mask ({:?})",
        mask.dimensions(),
        config.endpoint_policy,
    );
    Ok(())
}

/// Run phase 2 on a finished propagation.
pub(crate) fn reconstruct(
    mask: &Mask,
    prop: &Propagation,
    start: Coord,
    end: Coord,
) -> Result<QueryOutcome, PathError> {
    let path = if prop.reached() {
        trace_back(mask, prop.field(), start, end)?
    } else {
        debug!("{end} is not reachable from {start}");
        Path::unreachable()
    };
    if let Some(steps) = path.steps() {
        debug!("found path {start} -> {end} with {steps} steps");
    }
    Ok(QueryOutcome {
        path,
        stats: prop.stats(),
        reached_cells: prop.field().reached_count(),
        max_distance: prop.field().max_distance(),
    })
}

fn validate(
    mask: &Mask,
    config: &QueryConfig,
    endpoint: Endpoint,
    coord: Coord,
) -> Result<(), PathError> {
    if !mask.contains(coord) {
        return Err(PathError::OutOfBounds {
            endpoint,
            coord,
            dimensions: mask.dimensions(),
        });
    }
    if config.endpoint_policy == EndpointPolicy::Strict && !mask.is_passable(coord) {
        return Err(PathError::Impassable { endpoint, coord });
    }
    Ok(())
}

/// Hand a finished propagation to the observer.
pub(crate) fn notify(
    observer: &mut dyn DistanceObserver,
    prop: &Propagation,
    start: Coord,
    end: Coord,
) {
    let query = Query {
        start,
        end,
        reached: prop.reached(),
    };
    observer.observe(&query, prop.field());
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::field::DistanceField;

    fn lenient(mask: Mask) -> PathFinder {
        PathFinder::new(
            mask,
            QueryConfig {
                endpoint_policy: EndpointPolicy::Lenient,
                ..QueryConfig::default()
            },
        )
    }

    #[test]
    fn strict_rejects_out_of_bounds_start() {
        let mask = Mask::from_rows(&["###"]).unwrap();
        let result = shortest_path(&mask, Coord::new(-1, 0), Coord::new(2, 0));
        assert!(matches!(
            result,
            Err(PathError::OutOfBounds {
                endpoint: Endpoint::Start,
                ..
            })
        ));
    }

    #[test]
    fn strict_rejects_background_end() {
        let mask = Mask::from_rows(&["##."]).unwrap();
        let result = shortest_path(&mask, Coord::new(0, 0), Coord::new(2, 0));
        assert!(matches!(
            result,
            Err(PathError::Impassable {
                endpoint: Endpoint::End,
                coord,
            }) if coord == Coord::new(2, 0)
        ));
    }

    #[test]
    fn lenient_still_rejects_out_of_bounds() {
        let finder = lenient(Mask::from_rows(&["##"]).unwrap());
        let result = finder.find(Coord::new(0, 0), Coord::new(2, 0));
        assert!(matches!(
            result,
            Err(PathError::OutOfBounds {
                endpoint: Endpoint::End,
                ..
            })
        ));
    }

    #[test]
    fn lenient_background_end_next_to_region_gives_path() {
        let finder = lenient(Mask::from_rows(&["##."]).unwrap());
        let path = finder.find(Coord::new(0, 0), Coord::new(2, 0)).unwrap();
        assert_eq!(
            path.coords(),
            &[Coord::new(2, 0), Coord::new(1, 0), Coord::new(0, 0)]
        );
    }

    #[test]
    fn lenient_background_start_is_dead_end() {
        let finder = lenient(Mask::from_rows(&[".##"]).unwrap());
        let result = finder.find(Coord::new(0, 0), Coord::new(2, 0));
        assert!(matches!(result, Err(PathError::DeadEnd { .. })));
    }

    #[test]
    fn unreachable_is_empty_not_error() {
        let mask = Mask::from_rows(&["#.#"]).unwrap();
        let path = shortest_path(&mask, Coord::new(0, 0), Coord::new(2, 0)).unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn observer_sees_each_query_once() {
        let mask = Mask::from_rows(&["####"]).unwrap();
        let finder = PathFinder::new(mask, QueryConfig::default());
        let mut seen: Vec<(Query, u32)> = Vec::new();
        let mut record = |q: &Query, f: &DistanceField| seen.push((*q, f.at(q.start)));

        finder
            .find_observed(Coord::new(0, 0), Coord::new(3, 0), &mut record)
            .unwrap();
        finder
            .find_observed(Coord::new(3, 0), Coord::new(1, 0), &mut record)
            .unwrap();

        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|(q, d)| q.reached && *d == 0));
        assert_eq!(seen[1].0.start, Coord::new(3, 0));
    }

    #[test]
    fn observer_called_once_when_end_unreachable() {
        let finder = PathFinder::new(Mask::from_rows(&["#.#"]).unwrap(), QueryConfig::default());
        let mut seen: Vec<Query> = Vec::new();
        let mut reached_cells = 0;
        let mut record = |q: &Query, f: &DistanceField| {
            seen.push(*q);
            reached_cells = f.reached_count();
        };

        let path = finder
            .find_observed(Coord::new(0, 0), Coord::new(2, 0), &mut record)
            .unwrap();

        assert!(path.is_empty());
        assert_eq!(seen.len(), 1);
        assert!(!seen[0].reached);
        assert_eq!(reached_cells, 1);
    }

    #[test]
    fn shortest_path_matches_path_finder() {
        let mask = Mask::from_rows(&["##.", ".##", "##."]).unwrap();
        let borrowed = shortest_path(&mask, Coord::new(0, 0), Coord::new(0, 2)).unwrap();
        let owned = PathFinder::new(mask, QueryConfig::default())
            .find(Coord::new(0, 0), Coord::new(0, 2))
            .unwrap();
        assert_eq!(borrowed, owned);
        assert_eq!(borrowed.steps(), Some(2));
    }

    #[test]
    fn observer_not_called_on_invalid_endpoint() {
        let mask = Mask::from_rows(&["#."]).unwrap();
        let finder = PathFinder::new(mask, QueryConfig::default());
        let mut calls = 0;
        let mut count = |_: &Query, _: &DistanceField| calls += 1;
        let result = finder.find_observed(Coord::new(0, 0), Coord::new(1, 0), &mut count);
        assert!(result.is_err());
        assert_eq!(calls, 0);
    }

    #[test]
    fn path_finder_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PathFinder>();
    }
}
