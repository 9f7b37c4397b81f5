use std::fs;
use std::path::Path;
use std::time::Instant;

use error_stack::{Report, ResultExt};
use log::{debug, info};
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};

use crate::chunking::{choose_chunk_count, chunk_len};
use crate::douglas_peucker::{simplify_timed, SimplificationResult};
use crate::epsilon::{estimate_epsilon_with_interval, DEFAULT_TIME_INTERVAL};
use crate::error::{ConfigError, SimplifyError};
use crate::geometry::Point;
use crate::parallel::parallel_simplify_timed;
use crate::validation::{
    compare, serialize_f64_lossless, Axis, ComparisonReport, EquivalenceThresholds,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Scale factor of the epsilon estimate.
    pub time_interval: f64,
    /// Fixed tolerance; the estimate is skipped when set.
    pub epsilon: Option<f64>,
    /// Fixed chunk length; planned from the input size when unset.
    pub chunk_size: Option<usize>,
    pub max_workers: usize,
    pub axis: Axis,
    pub thresholds: EquivalenceThresholds,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            time_interval: DEFAULT_TIME_INTERVAL,
            epsilon: None,
            chunk_size: None,
            max_workers: 4,
            axis: Axis::default(),
            thresholds: EquivalenceThresholds::default(),
        }
    }
}

impl PipelineConfig {
    /// Reads a JSON config; absent fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, Report<ConfigError>> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .change_context(ConfigError)
            .attach_printable_lazy(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&contents)
            .change_context(ConfigError)
            .attach_printable_lazy(|| format!("parsing {}", path.display()))
    }
}

/// Everything one serial-versus-parallel run produces.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub input_len: usize,
    #[serde(serialize_with = "serialize_f64_lossless")]
    pub epsilon: f64,
    pub epsilon_elapsed_secs: f64,
    pub chunk_count: usize,
    pub chunk_size: usize,
    #[serde(skip)]
    pub serial: SimplificationResult,
    #[serde(skip)]
    pub parallel: SimplificationResult,
    pub report: ComparisonReport,
}

/// A [`RunSummary`] together with the sizes of the input file and the saved
/// simplified file, as printed by the command line tool.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    #[serde(flatten)]
    pub summary: &'a RunSummary,
    pub original_kb: f64,
    pub simplified_kb: f64,
}

/// Estimates epsilon, reduces `points` serially and chunk-wise on `pool`,
/// and compares the two results.
pub fn run(
    points: &[Point],
    config: &PipelineConfig,
    pool: &ThreadPool
) -> Result<RunSummary, Report<SimplifyError>> {
    let start = Instant::now();
    let epsilon = match config.epsilon {
        Some(epsilon) => epsilon,
        None => estimate_epsilon_with_interval(points, config.time_interval)?,
    };
    let epsilon_elapsed_secs = start.elapsed().as_secs_f64();
    info!("epsilon = {epsilon}");

    let chunk_count = choose_chunk_count(points.len());
    let chunk_size = config.chunk_size.unwrap_or_else(|| chunk_len(points.len(), chunk_count));
    debug!("{} points, {} planned chunks, chunk size {}", points.len(), chunk_count, chunk_size);

    let serial = simplify_timed(points, epsilon)?;
    info!("serial reduction kept {} of {} points in {:?}",
        serial.points.len(), points.len(), serial.elapsed);

    let parallel = parallel_simplify_timed(points, epsilon, chunk_size, pool)?;
    info!("parallel reduction kept {} of {} points in {:?}",
        parallel.points.len(), points.len(), parallel.elapsed);

    let report = compare(&serial, &parallel, config.axis, &config.thresholds)?;

    Ok(RunSummary {
        input_len: points.len(),
        epsilon,
        epsilon_elapsed_secs,
        chunk_count,
        chunk_size,
        serial,
        parallel,
        report,
    })
}
