extern crate clap;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, warn};

use rdplines::csv_io::{file_size_kb, read_series, simplified_path, write_points};
use rdplines::parallel::build_pool;
use rdplines::pipeline::{run, PipelineConfig, RunReport, RunSummary};
use rdplines::validation::Axis;

#[derive(Parser)]
struct Opts {
    /// Path to the CSV series (label column, value column)
    path: PathBuf,

    /// Number of worker threads
    #[clap(short, long)]
    ncpu: Option<usize>,

    /// Directory the simplified series is written to
    #[clap(short, long, default_value = "simplified")]
    output_dir: PathBuf,

    /// JSON pipeline configuration; flags override it
    #[clap(long)]
    config: Option<PathBuf>,

    /// Time interval the epsilon estimate is scaled by
    #[clap(long)]
    time_interval: Option<f64>,

    /// Use this epsilon instead of estimating one
    #[clap(short, long)]
    epsilon: Option<f64>,

    /// Chunk length for the parallel reduction
    #[clap(long)]
    chunk_size: Option<usize>,

    /// Bound on |t| for the lines to count as equivalent
    #[clap(long)]
    t_tolerance: Option<f64>,

    /// Significance level the p value must exceed
    #[clap(long)]
    alpha: Option<f64>,

    /// Coordinate compared between the serial and parallel results (x or y)
    #[clap(long, value_parser = parse_axis)]
    axis: Option<Axis>,

    /// Print the summary as JSON
    #[clap(long, default_value = "false")]
    json: bool,
}

fn parse_axis(s: &str) -> Result<Axis, String> {
    match s.to_ascii_lowercase().as_str() {
        "x" => Ok(Axis::X),
        "y" => Ok(Axis::Y),
        other => Err(format!("unknown axis {other:?}, expected x or y")),
    }
}

impl Opts {
    fn pipeline_config(&self) -> Result<PipelineConfig, String> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path).map_err(|e| format!("{e:?}"))?,
            None => PipelineConfig::default(),
        };

        if let Some(ncpu) = self.ncpu { config.max_workers = ncpu; }
        if let Some(time_interval) = self.time_interval { config.time_interval = time_interval; }
        if let Some(epsilon) = self.epsilon { config.epsilon = Some(epsilon); }
        if let Some(chunk_size) = self.chunk_size { config.chunk_size = Some(chunk_size); }
        if let Some(t_tolerance) = self.t_tolerance {
            config.thresholds.t_tolerance = t_tolerance;
        }
        if let Some(alpha) = self.alpha { config.thresholds.alpha = alpha; }
        if let Some(axis) = self.axis { config.axis = axis; }

        Ok(config)
    }
}

fn print_summary(summary: &RunSummary, original_kb: f64, simplified_kb: f64) {
    let report = &summary.report;

    println!("\nEpsilon value = {}", summary.epsilon);

    println!("\nNumber of points in original line : {}", summary.input_len);
    println!("Number of points in simplified line : {}", report.parallel.len);

    println!("\nFile size of original line : {original_kb} KB");
    println!("File size of simplified line : {simplified_kb} KB");

    println!("\nRunning time of classic RDP : {}", report.serial.elapsed_secs);
    println!("Running time of parallel RDP : {}", report.parallel.elapsed_secs);

    println!("\nMean of classic line : {}", report.serial.mean);
    println!("Mean of parallel line : {}", report.parallel.mean);

    println!("\nStandard deviation of classic line : {}", report.serial.std_dev);
    println!("Standard deviation of parallel line : {}", report.parallel.std_dev);

    println!("\nT statistic : {}", report.t_statistic);
    println!("P value : {}\n", report.p_value);

    if report.parallel_faster {
        println!("Parallel RDP is faster than classic RDP!");
    } else {
        println!("Classic RDP is faster than parallel RDP!");
    }

    if report.equivalent {
        println!("Result : There is no significant difference between the two lines\n");
    } else {
        println!("Result : There is a significant difference between the two lines\n");
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts: Opts = Opts::parse();

    let config = match opts.pipeline_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let series = match read_series(&opts.path) {
        Ok(series) => series,
        Err(e) => {
            error!("{e:?}");
            return ExitCode::FAILURE;
        }
    };

    let pool = match build_pool(config.max_workers) {
        Ok(pool) => pool,
        Err(e) => {
            error!("{e:?}");
            return ExitCode::FAILURE;
        }
    };

    let summary = match run(&series.points, &config, &pool) {
        Ok(summary) => summary,
        Err(e) => {
            error!("{e:?}");
            return ExitCode::FAILURE;
        }
    };

    // a failed save still reports the comparison
    let output = simplified_path(&opts.output_dir, &opts.path);
    let saved = write_points(&output, &series.columns, &summary.parallel.points);
    let (original_kb, simplified_kb) = match saved {
        Ok(()) => (
            file_size_kb(&opts.path).unwrap_or(0.0),
            file_size_kb(&output).unwrap_or(0.0),
        ),
        Err(e) => {
            warn!("An error occurred during file saving: {e:?}");
            (0.0, 0.0)
        }
    };

    if opts.json {
        let report = RunReport { summary: &summary, original_kb, simplified_kb };
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_summary(&summary, original_kb, simplified_kb);
    }

    ExitCode::SUCCESS
}
