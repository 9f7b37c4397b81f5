use error_stack::Report;

use crate::error::SimplifyError;

/// Number of chunks a series of `point_count` points is split into for
/// parallel reduction. The thresholds are a fixed policy.
pub fn choose_chunk_count(point_count: usize) -> usize {
    if point_count <= 100 {
        1
    } else if point_count <= 1_000 {
        4
    } else if point_count <= 5_000 {
        8
    } else if point_count <= 30_000 {
        16
    } else {
        20
    }
}

/// Fixed chunk length giving at most `chunk_count` chunks: `ceil(n / count)`,
/// never less than 1.
pub fn chunk_len(point_count: usize, chunk_count: usize) -> usize {
    let chunk_count = chunk_count.max(1);
    ((point_count + chunk_count - 1) / chunk_count).max(1)
}

/// Splits `items` into contiguous chunks of `chunk_size` (the last one may be
/// shorter). The chunks cover `items` exactly, in order.
pub fn partition<T>(items: &[T], chunk_size: usize) -> Result<Vec<&[T]>, Report<SimplifyError>> {
    if chunk_size == 0 {
        return Err(Report::new(SimplifyError::DegenerateInput)
            .attach_printable("chunk size must be at least 1"));
    }
    Ok(items.chunks(chunk_size).collect())
}
