use std::fmt;

/// Failure classes of the simplification core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimplifyError {
    /// Fewer than two points, coincident endpoints, or a tolerance that is
    /// negative or non-finite.
    DegenerateInput,
    /// A zero-length segment reached the distance kernel. This is a caller
    /// bug, not bad data.
    DegenerateSegment,
    /// A chunk task failed or the worker pool could not be built.
    WorkerFailure,
}

impl SimplifyError {
    pub fn is_logic_error(&self) -> bool {
        matches!(self, SimplifyError::DegenerateSegment)
    }
}

impl fmt::Display for SimplifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimplifyError::DegenerateInput => f.write_str("degenerate input polyline"),
            SimplifyError::DegenerateSegment => {
                f.write_str("zero-length segment in distance computation")
            }
            SimplifyError::WorkerFailure => f.write_str("parallel simplification task failed"),
        }
    }
}

impl std::error::Error for SimplifyError {}

/// Failures of the CSV ingestion and persistence layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvIoError {
    Read,
    Parse,
    Write,
    Metadata,
}

impl fmt::Display for CsvIoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvIoError::Read => f.write_str("could not read series file"),
            CsvIoError::Parse => f.write_str("could not parse series file"),
            CsvIoError::Write => f.write_str("could not write simplified series"),
            CsvIoError::Metadata => f.write_str("could not read file metadata"),
        }
    }
}

impl std::error::Error for CsvIoError {}

/// A pipeline configuration file could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError;

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid pipeline configuration")
    }
}

impl std::error::Error for ConfigError {}
