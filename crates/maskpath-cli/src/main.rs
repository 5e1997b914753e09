//! maskpath: find the shortest 8-connected path through a binary image.
//!
//! Loads an image (or synthesises a ring test image), runs one query
//! per `--runs`, writes the input raster with the path painted on it,
//! and prints per-stage diagnostics. Optionally dumps the distance
//! field as PNG or MetaImage for inspection.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin maskpath -- [IMAGE] --start X,Y --end X,Y [OPTIONS]
//! ```
//!
//! Exit status is 0 when a path is found, 2 when the end point is not
//! reachable, and 1 on any error.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod dump;
mod synth;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use maskpath_core::diagnostics::{Clock, QueryDiagnostics, process_with_diagnostics};
use maskpath_core::{
    Coord, DistanceObserver, EndpointPolicy, NoopObserver, PathError, QueryConfig,
};

use crate::dump::DumpObserver;

/// Shortest paths through the foreground of binary images.
///
/// Pixels brighter than the threshold are passable. Every move to one
/// of the eight neighbors costs one step.
#[derive(Parser)]
#[command(name = "maskpath", version)]
struct Cli {
    /// Input image (PNG, JPEG, BMP, WebP). Without one, a synthetic
    /// ring image is used.
    image_path: Option<PathBuf>,

    /// Start point as "X,Y".
    #[arg(long, value_name = "X,Y", value_parser = parse_coord)]
    start: Option<Coord>,

    /// End point as "X,Y".
    #[arg(long, value_name = "X,Y", value_parser = parse_coord)]
    end: Option<Coord>,

    /// Where to write the input raster with the path painted on it.
    #[arg(long, short, default_value = "result.png")]
    output: PathBuf,

    /// Dump the distance field (`.png` for grayscale, `.mhd` for exact
    /// MetaImage values).
    #[arg(long)]
    distance_dump: Option<PathBuf>,

    /// Pixels with a gray value above this are passable.
    #[arg(long, default_value_t = QueryConfig::DEFAULT_THRESHOLD)]
    threshold: u8,

    /// Skip the foreground check on endpoints.
    #[arg(long)]
    lenient: bool,

    /// Output diagnostics as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,

    /// Full query config as a JSON string.
    ///
    /// When provided, `--threshold` and `--lenient` are ignored.
    #[arg(long)]
    config_json: Option<String>,

    /// Number of runs for averaging.
    #[arg(
        long,
        default_value_t = 1,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    runs: usize,

    /// Also save the synthetic ring image here (ignored with IMAGE).
    #[arg(long)]
    ring_image: Option<PathBuf>,
}

/// Parse `"X,Y"` into a coordinate.
fn parse_coord(s: &str) -> Result<Coord, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected 'X,Y', got '{s}'"))?;
    let x = x
        .trim()
        .parse()
        .map_err(|e| format!("invalid X '{x}': {e}"))?;
    let y = y
        .trim()
        .parse()
        .map_err(|e| format!("invalid Y '{y}': {e}"))?;
    Ok(Coord::new(x, y))
}

/// Build a [`QueryConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<QueryConfig, PathError> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json)
            .map_err(|e| PathError::InvalidConfig(format!("--config-json: {e}")));
    }

    Ok(QueryConfig {
        threshold: cli.threshold,
        endpoint_policy: if cli.lenient {
            EndpointPolicy::Lenient
        } else {
            EndpointPolicy::Strict
        },
    })
}

/// Image bytes and endpoints for the query.
struct Input {
    label: String,
    bytes: Vec<u8>,
    start: Coord,
    end: Coord,
}

/// Read the input image, or synthesise the ring image with its default
/// endpoints.
fn load_input(cli: &Cli) -> Result<Input, String> {
    if let Some(ref path) = cli.image_path {
        let (Some(start), Some(end)) = (cli.start, cli.end) else {
            return Err("--start and --end are required with an input image".to_string());
        };
        let bytes =
            std::fs::read(path).map_err(|e| format!("Error reading {}: {e}", path.display()))?;
        return Ok(Input {
            label: path.display().to_string(),
            bytes,
            start,
            end,
        });
    }

    let ring = synth::ring_image();
    let bytes = maskpath_export::encode_png(&ring)
        .map_err(|e| format!("Error encoding ring image: {e}"))?;
    if let Some(ref ring_path) = cli.ring_image {
        std::fs::write(ring_path, &bytes)
            .map_err(|e| format!("Error writing {}: {e}", ring_path.display()))?;
        eprintln!("Ring image written to {}", ring_path.display());
    }
    Ok(Input {
        label: "synthetic ring".to_string(),
        bytes,
        start: cli.start.unwrap_or(synth::RING_START),
        end: cli.end.unwrap_or(synth::RING_END),
    })
}

/// How an invocation ended; maps onto the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    /// A path was found.
    Found,
    /// The end point is not reachable from the start point.
    Unreachable,
    /// Bad arguments, unreadable input, a query error, or a failed write.
    Failed,
}

impl Status {
    const fn code(self) -> u8 {
        match self {
            Self::Found => 0,
            Self::Failed => 1,
            Self::Unreachable => 2,
        }
    }
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        Self::from(status.code())
    }
}

/// What an invocation produced.
#[derive(Debug)]
struct Summary {
    status: Status,
    /// Completed query runs.
    runs: usize,
    /// Path steps from the first run.
    steps: Option<usize>,
    /// Distance fields written by the dump observer.
    dumps: usize,
    /// Where the result raster was written, if it was.
    overlay: Option<PathBuf>,
}

impl Summary {
    const fn failed() -> Self {
        Self {
            status: Status::Failed,
            runs: 0,
            steps: None,
            dumps: 0,
            overlay: None,
        }
    }
}

/// Report a query error, also as JSON on stdout under `--json`.
fn report_error(cli: &Cli, error: &PathError) {
    if cli.json {
        println!("{}", serde_json::json!({ "error": error }));
    }
    eprintln!("Error: {error}");
}

/// Run every query the arguments ask for and write the outputs.
fn run<C: Clock>(cli: &Cli, clock: &C) -> Summary {
    let config = match config_from_cli(cli) {
        Ok(c) => c,
        Err(e) => {
            report_error(cli, &e);
            return Summary::failed();
        }
    };

    let input = match load_input(cli) {
        Ok(input) => input,
        Err(msg) => {
            eprintln!("{msg}");
            return Summary::failed();
        }
    };

    eprintln!("Image: {} ({} bytes)", input.label, input.bytes.len());
    eprintln!("Query: {} -> {}", input.start, input.end);
    eprintln!("Config: {config:?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let mut summary = Summary::failed();
    let mut dumper = cli.distance_dump.clone().map(DumpObserver::new);
    let mut all_diagnostics = Vec::with_capacity(cli.runs);
    let mut first_result = None;

    for i in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", i + 1, cli.runs);
        }

        // Dump the distance field on the first run only.
        let mut noop = NoopObserver;
        let observer: &mut dyn DistanceObserver = match dumper.as_mut() {
            Some(d) if i == 0 => d,
            _ => &mut noop,
        };

        let outcome = process_with_diagnostics(
            &input.bytes,
            input.start,
            input.end,
            &config,
            observer,
            clock,
        );
        summary.dumps = dumper.as_ref().map_or(0, DumpObserver::writes);

        match outcome {
            Ok((result, diagnostics)) => {
                if cli.json {
                    let doc = serde_json::json!({
                        "path": result.path,
                        "diagnostics": diagnostics,
                    });
                    match serde_json::to_string_pretty(&doc) {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            eprintln!("Error serializing diagnostics: {e}");
                            return summary;
                        }
                    }
                } else {
                    println!("{}", diagnostics.report());
                }

                if first_result.is_none() {
                    summary.steps = result.path.steps();
                    first_result = Some(result);
                }
                all_diagnostics.push(diagnostics);
                summary.runs += 1;
            }
            Err(e) => {
                report_error(cli, &e);
                return summary;
            }
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    if let Some(e) = dumper.as_mut().and_then(DumpObserver::take_error) {
        eprintln!("Error dumping distance field: {e}");
        return summary;
    }
    if let Some(ref dump_path) = cli.distance_dump {
        eprintln!("Distance field written to {}", dump_path.display());
    }

    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    let Some(result) = first_result else {
        return summary;
    };

    // The result raster is written even when the end is unreachable.
    let overlay =
        maskpath_export::overlay_path(&result.image, &result.path, maskpath_export::PATH_VALUE);
    let written = maskpath_export::encode_png(&overlay)
        .map_err(|e| e.to_string())
        .and_then(|png| {
            std::fs::write(&cli.output, &png)
                .map(|()| png.len())
                .map_err(|e| e.to_string())
        });
    match written {
        Ok(len) => {
            eprintln!("Result written to {} ({len} bytes)", cli.output.display());
            summary.overlay = Some(cli.output.clone());
        }
        Err(e) => {
            eprintln!("Error writing {}: {e}", cli.output.display());
            return summary;
        }
    }

    summary.status = if result.path.is_empty() {
        eprintln!("{} is not reachable from {}", input.end, input.start);
        Status::Unreachable
    } else {
        Status::Found
    };
    summary
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let summary = run(&cli, &StdClock);
    log::info!(
        "{:?} after {} runs: steps={:?} dumps={} overlay={:?}",
        summary.status,
        summary.runs,
        summary.steps,
        summary.dumps,
        summary.overlay,
    );
    summary.status.into()
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Function pointer type for extracting a stage duration from diagnostics.
type StageExtractor = fn(&QueryDiagnostics) -> Option<Duration>;

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[QueryDiagnostics]) {
    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    println!();
    println!("{:<24} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(40));

    let stage_extractors: &[(&str, StageExtractor)] = &[
        ("Decode", |d| d.decode.as_ref().map(|s| s.duration)),
        ("Propagation", |d| Some(d.propagation.duration)),
        ("Observe", |d| Some(d.observe.duration)),
        ("Reconstruction", |d| Some(d.reconstruction.duration)),
    ];

    for (name, extractor) in stage_extractors {
        let stage_durations: Vec<f64> = all_diagnostics
            .iter()
            .filter_map(extractor)
            .map(|dur| dur.as_secs_f64() * 1000.0)
            .collect();

        if stage_durations.is_empty() {
            continue;
        }

        let stage_mean = stage_durations.iter().sum::<f64>() / stage_durations.len() as f64;
        println!("{name:<24} {stage_mean:>10.3}ms");
    }
}
