use error_stack::Report;
use serde::{Deserialize, Serialize, Serializer};

use crate::douglas_peucker::SimplificationResult;
use crate::error::SimplifyError;
use crate::geometry::Point;
use crate::stats::{mean, std_dev, ttest_ind};

/// Coordinate the equivalence statistics are computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    #[default]
    Y,
}

impl Axis {
    pub fn values(&self, points: &[Point]) -> Vec<f64> {
        match self {
            Axis::X => points.iter().map(|p| p.x).collect(),
            Axis::Y => points.iter().map(|p| p.y).collect(),
        }
    }
}

/// Both must hold for two results to count as equivalent:
/// `|t| < t_tolerance` and `p > alpha`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquivalenceThresholds {
    pub t_tolerance: f64,
    pub alpha: f64,
}

impl Default for EquivalenceThresholds {
    fn default() -> Self {
        EquivalenceThresholds { t_tolerance: 0.01, alpha: 0.05 }
    }
}

/// JSON has no infinities; non-finite values are written as `"inf"`,
/// `"-inf"` or `"NaN"` instead of `null`.
pub(crate) fn serialize_f64_lossless<S: Serializer>(
    value: &f64,
    serializer: S
) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.collect_str(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub len: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub elapsed_secs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub axis: Axis,
    pub serial: SeriesSummary,
    pub parallel: SeriesSummary,
    #[serde(serialize_with = "serialize_f64_lossless")]
    pub t_statistic: f64,
    pub p_value: f64,
    pub parallel_faster: bool,
    pub equivalent: bool,
}

fn summarize(
    result: &SimplificationResult,
    values: &[f64],
    which: &str
) -> Result<SeriesSummary, Report<SimplifyError>> {
    let degenerate = || {
        Report::new(SimplifyError::DegenerateInput)
            .attach_printable(format!(
                "{which} result has {} points, need at least 2",
                values.len()
            ))
    };

    Ok(SeriesSummary {
        len: values.len(),
        mean: mean(values).ok_or_else(degenerate)?,
        std_dev: std_dev(values).ok_or_else(degenerate)?,
        elapsed_secs: result.elapsed.as_secs_f64(),
    })
}

/// Compares a serial and a parallel simplification of the same line on one
/// coordinate with a pooled two-sample t-test.
pub fn compare(
    serial: &SimplificationResult,
    parallel: &SimplificationResult,
    axis: Axis,
    thresholds: &EquivalenceThresholds,
) -> Result<ComparisonReport, Report<SimplifyError>> {
    let serial_values = axis.values(&serial.points);
    let parallel_values = axis.values(&parallel.points);

    let serial_summary = summarize(serial, &serial_values, "serial")?;
    let parallel_summary = summarize(parallel, &parallel_values, "parallel")?;

    let test = ttest_ind(&serial_values, &parallel_values).ok_or_else(|| {
        Report::new(SimplifyError::DegenerateInput)
            .attach_printable("not enough values for a t-test")
    })?;

    Ok(ComparisonReport {
        axis,
        serial: serial_summary,
        parallel: parallel_summary,
        t_statistic: test.statistic,
        p_value: test.p_value,
        parallel_faster: parallel.elapsed < serial.elapsed,
        equivalent: test.statistic.abs() < thresholds.t_tolerance
            && test.p_value > thresholds.alpha,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn result(raw: &[(f64, f64)], millis: u64) -> SimplificationResult {
        SimplificationResult {
            points: raw.iter().map(|&p| Point::from(p)).collect(),
            elapsed: Duration::from_millis(millis),
        }
    }

    #[test]
    fn test_identical_results_are_equivalent() {
        let a = result(&[(0.0, 1.0), (1.0, 4.0), (2.0, 2.0), (3.0, 7.0)], 10);
        let report = compare(&a, &a, Axis::Y, &EquivalenceThresholds::default()).unwrap();
        assert_eq!(report.t_statistic, 0.0);
        assert!((report.p_value - 1.0).abs() < 1e-12);
        assert!(report.equivalent);
        assert!(!report.parallel_faster);
        assert!((report.serial.mean - 3.5).abs() < 1e-12);
        assert_eq!(report.serial, report.parallel);
    }

    #[test]
    fn test_shifted_results_differ() {
        let serial = result(&[(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)], 20);
        let parallel = result(&[(0.0, 4.0), (1.0, 5.0), (2.0, 6.0)], 5);
        let thresholds = EquivalenceThresholds::default();
        let report = compare(&serial, &parallel, Axis::Y, &thresholds).unwrap();
        assert!(!report.equivalent);
        assert!(report.parallel_faster);
        assert!((report.p_value - 0.021311641128756727).abs() < 1e-6);
    }

    #[test]
    fn test_both_thresholds_required() {
        // small but nonzero t: p is high, |t| is not below the tight tolerance
        let serial = result(&[(0.0, 1.0), (1.0, 5.0), (2.0, 2.0), (3.0, 8.0)], 1);
        let parallel = result(&[(0.0, 1.2), (1.0, 5.0), (2.0, 2.0), (3.0, 8.0)], 1);
        let thresholds = EquivalenceThresholds::default();
        let strict = compare(&serial, &parallel, Axis::Y, &thresholds).unwrap();
        assert!(strict.p_value > 0.05);
        assert!(!strict.equivalent);

        let loose = EquivalenceThresholds { t_tolerance: 1.0, alpha: 0.05 };
        assert!(compare(&serial, &parallel, Axis::Y, &loose).unwrap().equivalent);

        let demanding = EquivalenceThresholds { t_tolerance: 1.0, alpha: 0.999 };
        assert!(!compare(&serial, &parallel, Axis::Y, &demanding).unwrap().equivalent);
    }

    #[test]
    fn test_axis_selection() {
        let a = result(&[(0.0, 10.0), (4.0, 10.0)], 1);
        let report = compare(&a, &a, Axis::X, &EquivalenceThresholds::default()).unwrap();
        assert_eq!(report.axis, Axis::X);
        assert!((report.serial.mean - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_thresholds_fill_missing_fields() {
        let thresholds: EquivalenceThresholds = serde_json::from_str(r#"{"alpha": 0.1}"#).unwrap();
        assert_eq!(thresholds, EquivalenceThresholds { t_tolerance: 0.01, alpha: 0.1 });
    }

    #[test]
    fn test_infinite_statistic_serializes_as_string() {
        let serial = result(&[(0.0, 1.0), (1.0, 1.0)], 1);
        let parallel = result(&[(0.0, 2.0), (1.0, 2.0)], 1);
        let thresholds = EquivalenceThresholds::default();
        let report = compare(&serial, &parallel, Axis::Y, &thresholds).unwrap();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["t_statistic"], "-inf");
        assert_eq!(value["p_value"], 0.0);
        assert_eq!(value["axis"], "y");
    }

    #[test]
    fn test_short_result_is_rejected() {
        let a = result(&[(0.0, 1.0)], 1);
        let b = result(&[(0.0, 1.0), (1.0, 2.0)], 1);
        let err = compare(&a, &b, Axis::Y, &EquivalenceThresholds::default()).unwrap_err();
        assert_eq!(*err.current_context(), SimplifyError::DegenerateInput);
    }
}
