//! Configuration for the generator.

use serde::{Deserialize, Serialize};

/// Configuration for the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// On-disk file format.
    pub format: FileFormat,

    /// Replace an existing output file instead of failing.
    pub overwrite: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            format: FileFormat::Netcdf4,
            overwrite: true,
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("NETCDF_FORMAT") {
            config.format = FileFormat::from_str(&val);
        }

        if let Ok(val) = std::env::var("NETCDF_OVERWRITE") {
            config.overwrite = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    pub fn with_format(mut self, format: FileFormat) -> Self {
        self.format = format;
        self
    }

    /// Validate the configuration against the number of datasets to write.
    pub fn validate(&self, dataset_count: usize) -> Result<(), String> {
        // Each dataset gets its own unlimited time dimension.
        if self.format == FileFormat::Classic && dataset_count > 1 {
            return Err(format!(
                "classic format supports a single unlimited dimension, got {} datasets",
                dataset_count
            ));
        }

        Ok(())
    }
}

/// NetCDF file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    /// HDF5-backed NetCDF-4.
    #[default]
    Netcdf4,
    /// NetCDF-3 classic. Fallback when the HDF5 layer is unavailable.
    Classic,
}

impl FileFormat {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "classic" | "netcdf3" | "nc3" => Self::Classic,
            "netcdf4" | "nc4" => Self::Netcdf4,
            _ => Self::Netcdf4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Netcdf4 => "netcdf4",
            Self::Classic => "classic",
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.format, FileFormat::Netcdf4);
        assert!(config.overwrite);
        assert!(config.validate(3).is_ok());
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!(FileFormat::from_str("CLASSIC"), FileFormat::Classic);
        assert_eq!(FileFormat::from_str("netcdf3"), FileFormat::Classic);
        assert_eq!(FileFormat::from_str("nc4"), FileFormat::Netcdf4);
        assert_eq!(FileFormat::from_str("unknown"), FileFormat::Netcdf4);
    }

    #[test]
    fn test_classic_rejects_multiple_datasets() {
        let config = GeneratorConfig::default().with_format(FileFormat::Classic);
        assert!(config.validate(1).is_ok());
        assert!(config.validate(2).is_err());
    }
}
