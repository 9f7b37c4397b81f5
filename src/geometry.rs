use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::error::SimplifyError;

/// A sample of the polyline. `x` is the index or time axis, `y` the
/// measured value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point { x, y }
    }
}

/// Absolute 2D cross product of (end - start) and (point - start), written
/// in the expanded line-equation form.
pub fn line_distance_numerator(point: &Point, start: &Point, end: &Point) -> f64 {
    ((end.y - start.y) * point.x
        - (end.x - start.x) * point.y
        + end.x * start.y
        - end.y * start.x)
        .abs()
}

/// Distance from `point` to the infinite line through `start` and `end`.
pub fn perpendicular_distance(
    point: &Point,
    start: &Point,
    end: &Point
) -> Result<f64, Report<SimplifyError>> {
    let denominator = ((end.y - start.y).powi(2) + (end.x - start.x).powi(2)).sqrt();
    if denominator == 0.0 {
        return Err(Report::new(SimplifyError::DegenerateSegment)
            .attach_printable(format!(
                "segment start and end coincide at ({}, {})",
                start.x, start.y
            )));
    }
    Ok(line_distance_numerator(point, start, end) / denominator)
}
