//! Observer seam for inspecting the distance field of a query.
//!
//! The engine never performs I/O. Callers that want to persist or
//! inspect the distance field (e.g. dump it to a raster for debugging)
//! pass a [`DistanceObserver`]; it is invoked once per query, after
//! propagation and before path reconstruction.

use serde::{Deserialize, Serialize};

use crate::field::DistanceField;
use crate::types::Coord;

/// What the observer is told about the query that produced a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Start point (distance 0).
    pub start: Coord,
    /// End point.
    pub end: Coord,
    /// Whether propagation reached the end point.
    pub reached: bool,
}

/// Receives the distance field computed by a query.
pub trait DistanceObserver {
    /// Called exactly once per query, after propagation.
    fn observe(&mut self, query: &Query, field: &DistanceField);
}

/// Observer that ignores every field.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DistanceObserver for NoopObserver {
    fn observe(&mut self, _query: &Query, _field: &DistanceField) {}
}

impl<F> DistanceObserver for F
where
    F: FnMut(&Query, &DistanceField),
{
    fn observe(&mut self, query: &Query, field: &DistanceField) {
        self(query, field);
    }
}
