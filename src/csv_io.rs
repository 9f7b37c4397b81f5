use std::fs;
use std::path::{Path, PathBuf};

use error_stack::{Report, ResultExt};

use crate::error::CsvIoError;
use crate::geometry::Point;

/// A two-column series as read from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub columns: Vec<String>,
    pub points: Vec<Point>,
}

/// Reads a delimited file whose first column is a label (a date, say) and
/// whose second column holds the measured value. Points are
/// `(row index, value)`.
pub fn read_series<P: AsRef<Path>>(path: P) -> Result<Series, Report<CsvIoError>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .change_context(CsvIoError::Read)
        .attach_printable_lazy(|| format!("opening {}", path.display()))?;

    let columns: Vec<String> = reader.headers()
        .change_context(CsvIoError::Parse)?
        .iter()
        .map(String::from)
        .collect();

    if columns.len() < 2 {
        return Err(Report::new(CsvIoError::Parse)
            .attach_printable(format!(
                "{} has {} columns, expected at least 2",
                path.display(),
                columns.len()
            )));
    }

    let mut points = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record
            .change_context(CsvIoError::Parse)
            .attach_printable_lazy(|| format!("row {}", row + 1))?;

        let field = record.get(1).unwrap_or("").trim();
        let value = field.parse::<f64>()
            .change_context(CsvIoError::Parse)
            .attach_printable_lazy(|| {
                format!("row {}: {:?} in column {:?} is not a number", row + 1, field, columns[1])
            })?;

        if !value.is_finite() {
            return Err(Report::new(CsvIoError::Parse)
                .attach_printable(format!(
                    "row {}: {:?} in column {:?} is not finite",
                    row + 1, field, columns[1]
                )));
        }

        points.push(Point::new(row as f64, value));
    }

    Ok(Series { columns, points })
}

/// Writes `points` under the two column labels, creating parent directories
/// as needed.
pub fn write_points<P: AsRef<Path>>(
    path: P,
    columns: &[String],
    points: &[Point]
) -> Result<(), Report<CsvIoError>> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .change_context(CsvIoError::Write)
            .attach_printable_lazy(|| format!("creating {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(path)
        .change_context(CsvIoError::Write)
        .attach_printable_lazy(|| format!("creating {}", path.display()))?;

    let headers: Vec<&str> = columns.iter().take(2).map(String::as_str).collect();
    writer.write_record(&headers).change_context(CsvIoError::Write)?;

    for p in points {
        writer.write_record(&[p.x.to_string(), p.y.to_string()])
            .change_context(CsvIoError::Write)?;
    }

    writer.flush().change_context(CsvIoError::Write)?;
    Ok(())
}

/// `<output_dir>/<input stem>(simplified).csv`
pub fn simplified_path<P: AsRef<Path>, Q: AsRef<Path>>(output_dir: P, input: Q) -> PathBuf {
    let stem = input.as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("series"));
    output_dir.as_ref().join(format!("{stem}(simplified).csv"))
}

/// Size on disk in KB (bytes / 1024).
pub fn file_size_kb<P: AsRef<Path>>(path: P) -> Result<f64, Report<CsvIoError>> {
    let path = path.as_ref();
    let metadata = fs::metadata(path)
        .change_context(CsvIoError::Metadata)
        .attach_printable_lazy(|| format!("stat {}", path.display()))?;
    Ok(metadata.len() as f64 / 1024.0)
}
