use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use error_stack::{Report, ResultExt};
use log::debug;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::chunking::partition;
use crate::douglas_peucker::{check_epsilon, check_points, simplify, SimplificationResult};
use crate::error::SimplifyError;
use crate::geometry::Point;

/// Builds the worker pool chunk tasks are dispatched to. The caller owns it
/// and can reuse it across runs.
pub fn build_pool(max_workers: usize) -> Result<ThreadPool, Report<SimplifyError>> {
    if max_workers == 0 {
        return Err(Report::new(SimplifyError::WorkerFailure)
            .attach_printable("worker pool needs at least one worker"));
    }

    ThreadPoolBuilder::new()
        .num_threads(max_workers)
        .thread_name(|i| format!("rdp-worker-{i}"))
        .build()
        .map_err(|e| Report::new(SimplifyError::WorkerFailure).attach_printable(e.to_string()))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::from("unknown panic payload")
    }
}

fn reduce_chunk<F>(
    index: usize,
    chunk: &[Point],
    epsilon: f64,
    reducer: &F
) -> Result<Vec<Point>, Report<SimplifyError>>
where
    F: Fn(&[Point], f64) -> Result<Vec<Point>, Report<SimplifyError>>,
{
    // a trailing single point has no chord to measure against
    if chunk.len() == 1 {
        return Ok(chunk.to_vec());
    }

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| reducer(chunk, epsilon)));

    match outcome {
        Ok(result) => result
            .change_context(SimplifyError::WorkerFailure)
            .attach_printable_lazy(|| format!("chunk {index} ({} points)", chunk.len())),
        Err(payload) => Err(Report::new(SimplifyError::WorkerFailure)
            .attach_printable(format!(
                "chunk {index} panicked: {}",
                panic_message(payload.as_ref())
            ))),
    }
}

/// Runs `reducer` over every chunk on `pool` and joins the results in chunk
/// order. The first failing chunk fails the whole call.
fn reduce_chunks<F>(
    points: &[Point],
    epsilon: f64,
    chunk_size: usize,
    pool: &ThreadPool,
    reducer: F
) -> Result<Vec<Point>, Report<SimplifyError>>
where
    F: Fn(&[Point], f64) -> Result<Vec<Point>, Report<SimplifyError>> + Sync,
{
    check_epsilon(epsilon)?;
    check_points(points)?;

    let chunks = partition(points, chunk_size)?;
    debug!("dispatching {} chunks of up to {} points to {} workers",
        chunks.len(), chunk_size, pool.current_num_threads());

    let reduced: Vec<Vec<Point>> = pool.install(|| {
        chunks.par_iter()
            .enumerate()
            .map(|(index, chunk)| reduce_chunk(index, chunk, epsilon, &reducer))
            .collect::<Result<Vec<_>, _>>()
    })?;

    Ok(reduced.into_iter().flatten().collect())
}

/// Reduces `points` chunk by chunk on `pool` and concatenates the per-chunk
/// results in chunk order.
///
/// Chunks are `chunk_size` points long (the last may be shorter). Boundary
/// points of neighbouring chunks are all kept, so the output is generally
/// longer than a single serial pass. Any failing chunk fails the whole call.
pub fn parallel_simplify(
    points: &[Point],
    epsilon: f64,
    chunk_size: usize,
    pool: &ThreadPool,
) -> Result<Vec<Point>, Report<SimplifyError>> {
    reduce_chunks(points, epsilon, chunk_size, pool, simplify)
}

/// Same as [`parallel_simplify`] on a pool of `max_workers` threads built for
/// this call only.
pub fn parallel_simplify_with_workers(
    points: &[Point],
    epsilon: f64,
    chunk_size: usize,
    max_workers: usize,
) -> Result<Vec<Point>, Report<SimplifyError>> {
    let pool = build_pool(max_workers)?;
    parallel_simplify(points, epsilon, chunk_size, &pool)
}

pub fn parallel_simplify_timed(
    points: &[Point],
    epsilon: f64,
    chunk_size: usize,
    pool: &ThreadPool,
) -> Result<SimplificationResult, Report<SimplifyError>> {
    let start = Instant::now();
    let simplified = parallel_simplify(points, epsilon, chunk_size, pool)?;
    Ok(SimplificationResult { points: simplified, elapsed: start.elapsed() })
}
