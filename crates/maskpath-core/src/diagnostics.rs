//! Query diagnostics: timing and counts for each stage of a query.
//!
//! Intended for profiling and for understanding how a mask behaves
//! (how much of it a query floods, how far the end point is). Time is
//! read through the [`Clock`] trait so the core stays free of
//! platform timers; the CLI supplies a `std::time::Instant` clock.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::decode::decode_image;
use crate::engine::{PathFinder, notify, reconstruct, validate_endpoints};
use crate::mask::Mask;
use crate::observer::DistanceObserver;
use crate::propagate::Propagation;
use crate::types::{Coord, Path, PathError, QueryConfig};
use crate::ProcessResult;

/// Source of monotonic time for stage measurements.
pub trait Clock {
    /// Opaque timestamp.
    type Instant;

    /// Current timestamp.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryDiagnostics {
    /// Image decoding and binarization (only for byte-slice input).
    pub decode: Option<StageDiagnostics>,
    /// Phase 1: distance propagation.
    pub propagation: StageDiagnostics,
    /// Observer callback.
    pub observe: StageDiagnostics,
    /// Phase 2: path reconstruction.
    pub reconstruction: StageDiagnostics,
    /// Total wall-clock duration of the query (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary across all stages.
    pub summary: QuerySummary,
}

/// Diagnostics for a single stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Image decoding and binarization metrics.
    Decode {
        /// Size of the input image bytes.
        input_bytes: usize,
        /// Decoded image width in pixels.
        width: u32,
        /// Decoded image height in pixels.
        height: u32,
        /// Binarization threshold.
        threshold: u8,
        /// Number of passable pixels after binarization.
        passable_pixels: usize,
    },
    /// Distance propagation metrics.
    Propagation {
        /// Cells expanded (popped and relaxed).
        expanded: usize,
        /// Cells pushed onto the queue.
        enqueued: usize,
        /// Queue pops skipped because the cell was already expanded.
        stale_pops: usize,
        /// Cells with a finite distance.
        reached_cells: usize,
        /// Largest finite distance.
        max_distance: Option<u32>,
        /// Whether the end point was reached.
        reached_end: bool,
    },
    /// Observer callback metrics.
    Observe,
    /// Path reconstruction metrics.
    Reconstruction {
        /// Coordinates in the path (0 when unreachable).
        path_points: usize,
    },
}

/// High-level summary of a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySummary {
    /// Mask width in pixels.
    pub image_width: u32,
    /// Mask height in pixels.
    pub image_height: u32,
    /// Total pixel count.
    pub pixel_count: u64,
    /// Passable pixel count.
    pub passable_count: usize,
    /// Query start point.
    pub start: Coord,
    /// Query end point.
    pub end: Coord,
    /// Number of moves in the path, `None` when unreachable.
    pub steps: Option<usize>,
}

impl PathFinder {
    /// Like [`find_observed`](Self::find_observed), additionally
    /// measuring each stage.
    ///
    /// # Errors
    ///
    /// Same as [`find_observed`](Self::find_observed).
    pub fn find_with_diagnostics<C: Clock>(
        &self,
        start: Coord,
        end: Coord,
        observer: &mut dyn DistanceObserver,
        clock: &C,
    ) -> Result<(Path, QueryDiagnostics), PathError> {
        let total_start = clock.now();
        validate_endpoints(self.mask(), self.config(), start, end)?;

        let t = clock.now();
        let prop = Propagation::run(self.mask(), start, end);
        let propagation_duration = clock.elapsed(&t);

        let t = clock.now();
        notify(observer, &prop, start, end);
        let observe_duration = clock.elapsed(&t);

        let t = clock.now();
        let outcome = reconstruct(self.mask(), &prop, start, end)?;
        let reconstruction_duration = clock.elapsed(&t);

        let stats = outcome.stats;
        let dimensions = self.mask().dimensions();
        let diagnostics = QueryDiagnostics {
            decode: None,
            propagation: StageDiagnostics {
                duration: propagation_duration,
                metrics: StageMetrics::Propagation {
                    expanded: stats.expanded,
                    enqueued: stats.enqueued,
                    stale_pops: stats.stale_pops,
                    reached_cells: outcome.reached_cells,
                    max_distance: outcome.max_distance,
                    reached_end: prop.reached(),
                },
            },
            observe: StageDiagnostics {
                duration: observe_duration,
                metrics: StageMetrics::Observe,
            },
            reconstruction: StageDiagnostics {
                duration: reconstruction_duration,
                metrics: StageMetrics::Reconstruction {
                    path_points: outcome.path.len(),
                },
            },
            total_duration: clock.elapsed(&total_start),
            summary: QuerySummary {
                image_width: dimensions.width,
                image_height: dimensions.height,
                pixel_count: u64::from(dimensions.width) * u64::from(dimensions.height),
                passable_count: self.mask().passable_count(),
                start,
                end,
                steps: outcome.path.steps(),
            },
        };
        Ok((outcome.path, diagnostics))
    }
}

/// Decode image bytes, binarize, and run one query, collecting
/// diagnostics for every stage including decoding.
///
/// # Errors
///
/// Returns [`PathError::EmptyInput`] or [`PathError::ImageDecode`] for
/// unusable image bytes, otherwise the errors of
/// [`PathFinder::find_observed`].
pub fn process_with_diagnostics<C: Clock>(
    image_bytes: &[u8],
    start: Coord,
    end: Coord,
    config: &QueryConfig,
    observer: &mut dyn DistanceObserver,
    clock: &C,
) -> Result<(ProcessResult, QueryDiagnostics), PathError> {
    let t = clock.now();
    let decoded = decode_image(image_bytes)?;
    let mask = Mask::from_image(&decoded, config.threshold)?;
    let image = decoded.to_luma8();
    let decode = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Decode {
            input_bytes: image_bytes.len(),
            width: image.width(),
            height: image.height(),
            threshold: config.threshold,
            passable_pixels: mask.passable_count(),
        },
    };

    let finder = PathFinder::new(mask, config.clone());
    let (path, mut diagnostics) = finder.find_with_diagnostics(start, end, observer, clock)?;
    diagnostics.total_duration += decode.duration;
    diagnostics.decode = Some(decode);

    let dimensions = finder.mask().dimensions();
    Ok((
        ProcessResult {
            image,
            path,
            dimensions,
        },
        diagnostics,
    ))
}

impl QueryDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Query Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} pixels, {} passable)",
            self.summary.image_width,
            self.summary.image_height,
            self.summary.pixel_count,
            self.summary.passable_count,
        ));
        lines.push(format!(
            "Query: {} -> {}",
            self.summary.start, self.summary.end
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);

        let mut stages: Vec<(&str, &StageDiagnostics)> = Vec::new();
        if let Some(ref decode) = self.decode {
            stages.push(("Decode", decode));
        }
        stages.push(("Propagation", &self.propagation));
        stages.push(("Observe", &self.observe));
        stages.push(("Reconstruction", &self.reconstruction));

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(match self.summary.steps {
            Some(steps) => format!("Path: {} points, {steps} steps", steps + 1),
            None => "Path: end point not reachable".to_string(),
        });

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
            threshold,
            passable_pixels,
        } => {
            format!(
                "{input_bytes} bytes -> {width}x{height}, >{threshold}: {passable_pixels} passable"
            )
        }
        StageMetrics::Propagation {
            expanded,
            enqueued,
            stale_pops,
            reached_cells,
            max_distance,
            reached_end,
        } => {
            let max = max_distance.map_or_else(|| "-".to_string(), |d| d.to_string());
            let end = if *reached_end { "yes" } else { "no" };
            format!(
                "expanded={expanded} enqueued={enqueued} stale={stale_pops} \
                 reached={reached_cells} max_d={max} end={end}"
            )
        }
        StageMetrics::Observe => String::new(),
        StageMetrics::Reconstruction { path_points } => format!("{path_points} pts"),
    }
}
