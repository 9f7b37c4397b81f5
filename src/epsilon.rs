use error_stack::Report;

use crate::error::SimplifyError;
use crate::geometry::{line_distance_numerator, Point};

/// Sampling interval the aggregate deviation is scaled by.
pub const DEFAULT_TIME_INTERVAL: f64 = 0.001;

/// Estimates a simplification tolerance from the line's own deviation from
/// its chord, using [`DEFAULT_TIME_INTERVAL`].
pub fn estimate_epsilon(points: &[Point]) -> Result<f64, Report<SimplifyError>> {
    estimate_epsilon_with_interval(points, DEFAULT_TIME_INTERVAL)
}

/// Sums every point's deviation from the first-to-last chord, scales it by
/// `time_interval` and divides by the chord's x extent.
///
/// The deviation is normalised by `sqrt(2*dy + 2*dx)` rather than the chord
/// length. That scaling is kept as is; it behaves as a heuristic factor, not
/// a true distance.
pub fn estimate_epsilon_with_interval(
    points: &[Point],
    time_interval: f64
) -> Result<f64, Report<SimplifyError>> {
    if points.len() < 2 {
        return Err(Report::new(SimplifyError::DegenerateInput)
            .attach_printable(format!("epsilon needs at least 2 points, got {}", points.len())));
    }

    let first = points[0];
    let last = points[points.len() - 1];
    let width = last.x - first.x;
    if width == 0.0 {
        return Err(Report::new(SimplifyError::DegenerateInput)
            .attach_printable(format!("first and last point share x = {}", first.x)));
    }

    let denominator = ((last.y - first.y) * 2.0 + width * 2.0).sqrt();

    let total: f64 = points.iter()
        .map(|p| line_distance_numerator(p, &first, &last) / denominator)
        .sum();

    let epsilon = (total * time_interval) / width;

    if !epsilon.is_finite() || epsilon < 0.0 {
        return Err(Report::new(SimplifyError::DegenerateInput)
            .attach_printable(format!("estimated epsilon is {epsilon}")));
    }

    Ok(epsilon)
}
