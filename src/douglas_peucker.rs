use std::time::{Duration, Instant};

use error_stack::{Report, ResultExt};
use serde::Serialize;

use crate::error::SimplifyError;
use crate::geometry::{perpendicular_distance, Point};

/// Output of one reduction run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimplificationResult {
    pub points: Vec<Point>,
    pub elapsed: Duration,
}

pub(crate) fn check_epsilon(epsilon: f64) -> Result<(), Report<SimplifyError>> {
    if epsilon.is_nan() || epsilon < 0.0 {
        return Err(Report::new(SimplifyError::DegenerateInput)
            .attach_printable(format!("epsilon must be >= 0, got {epsilon}")));
    }
    Ok(())
}

/// At least two points, all with finite coordinates.
pub(crate) fn check_points(points: &[Point]) -> Result<(), Report<SimplifyError>> {
    if points.len() < 2 {
        return Err(Report::new(SimplifyError::DegenerateInput)
            .attach_printable(format!(
                "simplification needs at least 2 points, got {}",
                points.len()
            )));
    }
    if let Some(i) = points.iter().position(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(Report::new(SimplifyError::DegenerateInput)
            .attach_printable(format!(
                "point {} is not finite: ({}, {})",
                i, points[i].x, points[i].y
            )));
    }
    Ok(())
}

/// Farthest interior point from the chord `start`-`end`. Ties keep the first
/// occurrence.
fn farthest_point(
    points: &[Point],
    start: usize,
    end: usize
) -> Result<(usize, f64), Report<SimplifyError>> {
    let mut max_distance = 0.0;
    let mut max_index = start;

    for i in start + 1..end {
        let distance = perpendicular_distance(&points[i], &points[start], &points[end])
            .attach_printable_lazy(|| format!("chord between indices {start} and {end}"))?;
        if distance > max_distance {
            max_distance = distance;
            max_index = i;
        }
    }

    Ok((max_index, max_distance))
}

/// Indices of the points Ramer-Douglas-Peucker keeps at tolerance `epsilon`,
/// in ascending order.
///
/// The split ranges are walked with an explicit stack so that long monotone
/// series cannot exhaust a worker thread's stack.
pub fn simplify_indices(
    points: &[Point],
    epsilon: f64
) -> Result<Vec<usize>, Report<SimplifyError>> {
    check_epsilon(epsilon)?;
    check_points(points)?;

    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut ranges = vec![(0, last)];
    while let Some((start, end)) = ranges.pop() {
        if end <= start + 1 {
            continue;
        }

        let (max_index, max_distance) = farthest_point(points, start, end)?;

        if max_distance > epsilon {
            keep[max_index] = true;
            ranges.push((max_index, end));
            ranges.push((start, max_index));
        }
    }

    Ok(keep.iter()
        .enumerate()
        .filter_map(|(i, &k)| if k { Some(i) } else { None })
        .collect())
}

/// Ramer-Douglas-Peucker reduction of a single contiguous polyline. The
/// result is a subsequence of `points` that always keeps both endpoints.
pub fn simplify(points: &[Point], epsilon: f64) -> Result<Vec<Point>, Report<SimplifyError>> {
    let indices = simplify_indices(points, epsilon)?;
    Ok(indices.into_iter().map(|i| points[i]).collect())
}

pub fn simplify_timed(
    points: &[Point],
    epsilon: f64
) -> Result<SimplificationResult, Report<SimplifyError>> {
    let start = Instant::now();
    let simplified = simplify(points, epsilon)?;
    Ok(SimplificationResult { points: simplified, elapsed: start.elapsed() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f64, f64)]) -> Vec<Point> {
        raw.iter().map(|&p| Point::from(p)).collect()
    }

    fn zigzag(n: usize) -> Vec<Point> {
        (0..n).map(|i| Point::new(i as f64, ((i * 7919) % 13) as f64 - 6.0)).collect()
    }

    fn is_subsequence(sub: &[Point], full: &[Point]) -> bool {
        let mut it = full.iter();
        sub.iter().all(|p| it.any(|q| q == p))
    }

    #[test]
    fn test_two_points_unchanged() {
        let line = pts(&[(0.0, 0.0), (1.0, 5.0)]);
        assert_eq!(simplify(&line, 10.0).unwrap(), line);
    }

    #[test]
    fn test_zero_epsilon_keeps_non_collinear() {
        let line = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (3.0, 2.0), (4.0, -1.0)]);
        assert_eq!(simplify(&line, 0.0).unwrap(), line);
    }

    #[test]
    fn test_zero_epsilon_drops_collinear() {
        let line = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 0.0)]);
        assert_eq!(simplify(&line, 0.0).unwrap(), pts(&[(0.0, 0.0), (2.0, 2.0), (3.0, 0.0)]));
    }

    #[test]
    fn test_huge_epsilon_keeps_endpoints() {
        let line = zigzag(200);
        let result = simplify(&line, f64::INFINITY).unwrap();
        assert_eq!(result, vec![line[0], line[199]]);
        assert_eq!(simplify(&line, 1e12).unwrap(), vec![line[0], line[199]]);
    }

    #[test]
    fn test_straight_line_collapses() {
        let line: Vec<Point> = (0..100).map(|i| Point::new(i as f64, 3.0)).collect();
        assert_eq!(simplify(&line, 0.0).unwrap(), vec![line[0], line[99]]);
    }

    #[test]
    fn test_classic_example() {
        let line = pts(&[
            (0.0, 0.0), (1.0, 0.1), (2.0, -0.1), (3.0, 5.0), (4.0, 6.0),
            (5.0, 7.0), (6.0, 8.0), (7.0, 9.0), (8.0, 9.0), (9.0, 9.0),
        ]);
        let result = simplify(&line, 1.0).unwrap();
        assert_eq!(result, pts(&[(0.0, 0.0), (2.0, -0.1), (3.0, 5.0), (7.0, 9.0), (9.0, 9.0)]));
    }

    #[test]
    fn test_result_is_subsequence() {
        let line = zigzag(500);
        for eps in [0.0, 0.5, 2.0, 5.0, 20.0] {
            let result = simplify(&line, eps).unwrap();
            assert!(result.len() <= line.len());
            assert_eq!(result.first(), line.first());
            assert_eq!(result.last(), line.last());
            assert!(is_subsequence(&result, &line));
        }
    }

    #[test]
    fn test_ties_pick_first_occurrence() {
        // (1,1) and (3,1) are equally far from the chord
        let line = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (3.0, 1.0), (4.0, 0.0)]);
        let indices = simplify_indices(&line, 0.9).unwrap();
        assert_eq!(indices, vec![0, 1, 4]);
        let fine = simplify_indices(&line, 0.5).unwrap();
        assert_eq!(fine, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_long_monotone_series() {
        let line: Vec<Point> = (0..5_000)
            .map(|i| Point::new(i as f64, (i as f64 * i as f64) / 1000.0))
            .collect();
        let result = simplify(&line, 0.0).unwrap();
        assert_eq!(result.len(), line.len());
    }

    #[test]
    fn test_rejects_bad_input() {
        let err = simplify(&pts(&[(0.0, 0.0)]), 1.0).unwrap_err();
        assert_eq!(*err.current_context(), SimplifyError::DegenerateInput);
        let err = simplify(&zigzag(5), -1.0).unwrap_err();
        assert_eq!(*err.current_context(), SimplifyError::DegenerateInput);
        assert!(simplify(&zigzag(5), f64::NAN).is_err());
    }

    #[test]
    fn test_non_finite_points_are_rejected() {
        // a NaN would never win the `>` comparison and vanish silently
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let line = pts(&[(0.0, 1.0), (1.0, bad), (2.0, 3.0), (3.0, 2.0)]);
            let err = simplify(&line, 0.0).unwrap_err();
            assert_eq!(*err.current_context(), SimplifyError::DegenerateInput);
        }
        let line = pts(&[(0.0, 1.0), (f64::NAN, 2.0), (2.0, 3.0)]);
        assert!(simplify(&line, 0.0).is_err());
    }

    #[test]
    fn test_coincident_chord_is_segment_error() {
        let line = pts(&[(1.0, 1.0), (1.0, 2.0), (1.0, 1.0)]);
        let err = simplify(&line, 0.1).unwrap_err();
        assert!(err.current_context().is_logic_error());
    }

    #[test]
    fn test_timed_result_matches() {
        let line = zigzag(300);
        let timed = simplify_timed(&line, 1.0).unwrap();
        assert_eq!(timed.points, simplify(&line, 1.0).unwrap());
    }
}
