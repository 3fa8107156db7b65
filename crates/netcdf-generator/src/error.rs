//! Error types for NetCDF generation.

use thiserror::Error;

/// Errors that can occur while building or writing NetCDF hypercubes.
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// `generate` was called without somewhere to write to.
    #[error("No output file provided")]
    NoOutput,

    /// `generate` was called without any dataset.
    #[error("No dataset provided")]
    NoDataset,

    /// A dataset has no data point, so its lat/lon axes would be empty.
    #[error("Dataset {index} contains no data points")]
    EmptyDataset { index: usize },

    /// A depth variable was declared in a dataset with no height values.
    #[error("Variable '{variable}' varies with depth but dataset {index} has no height axis")]
    MissingHeightAxis { index: usize, variable: String },

    /// A timestamp can not be expressed as an hour offset of the dataset epoch.
    #[error("Time {time} can not be encoded with time unit '{unit}'")]
    TimeOutOfRange { time: String, unit: String },

    /// Declaration or write issued in the wrong phase, or a duplicated name.
    #[error("Invalid schema operation: {0}")]
    Schema(String),

    /// Reference to a dimension that was never declared.
    #[error("Unknown dimension: {0}")]
    UnknownDimension(String),

    /// Reference to a variable that was never declared.
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    /// Buffer element type does not match the declared variable type.
    #[error("Variable '{variable}' is declared as {declared}, got {actual} values")]
    TypeMismatch {
        variable: String,
        declared: &'static str,
        actual: &'static str,
    },

    /// Buffer length does not match the requested hyperslab.
    #[error("Buffer for '{variable}' holds {actual} values, expected {expected}")]
    ShapeMismatch {
        variable: String,
        expected: usize,
        actual: usize,
    },

    /// Hyperslab falls outside a fixed dimension.
    #[error("Invalid write range for '{variable}': {message}")]
    InvalidRange { variable: String, message: String },

    /// Failure reported by the underlying array storage.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// NetCDF library error.
    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),
}

impl GeneratorError {
    /// Create a Schema error.
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Create an InvalidRange error.
    pub fn invalid_range(variable: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::InvalidRange {
            variable: variable.into(),
            message: msg.into(),
        }
    }

    /// Create a Storage error.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for errors raised before anything was written.
    pub fn is_invalid_invocation(&self) -> bool {
        matches!(
            self,
            Self::NoOutput
                | Self::NoDataset
                | Self::EmptyDataset { .. }
                | Self::MissingHeightAxis { .. }
                | Self::TimeOutOfRange { .. }
                | Self::Config(_)
        )
    }
}

/// Result type for generator operations.
pub type Result<T> = std::result::Result<T, GeneratorError>;
