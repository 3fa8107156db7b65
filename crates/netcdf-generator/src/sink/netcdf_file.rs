//! NetCDF file sink backed by libnetcdf.

use std::path::{Path, PathBuf};

use netcdf::{Extent, FileMut, Options};
use tracing::debug;

use super::{ArraySink, ElementType, Hyperslab, Values};
use crate::config::{FileFormat, GeneratorConfig};
use crate::error::{GeneratorError, Result};

/// Writes the container to a NetCDF file on disk.
pub struct NetcdfSink {
    path: PathBuf,
    file: Option<FileMut>,
}

impl NetcdfSink {
    /// Create (or replace, when the config allows it) a NetCDF file.
    pub fn create(path: impl AsRef<Path>, config: &GeneratorConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let mut options = match config.format {
            FileFormat::Netcdf4 => Options::NETCDF4,
            FileFormat::Classic => Options::CLASSIC,
        };
        if !config.overwrite {
            options |= Options::NOCLOBBER;
        }

        let file = netcdf::create_with(&path, options)?;
        debug!(path = %path.display(), format = %config.format, "Created NetCDF file");

        Ok(Self {
            path,
            file: Some(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file_mut(&mut self) -> Result<&mut FileMut> {
        self.file
            .as_mut()
            .ok_or_else(|| GeneratorError::schema("NetCDF file is closed"))
    }
}

impl ArraySink for NetcdfSink {
    fn add_dimension(&mut self, name: &str, len: usize) -> Result<()> {
        self.file_mut()?.add_dimension(name, len)?;
        Ok(())
    }

    fn add_unlimited_dimension(&mut self, name: &str) -> Result<()> {
        self.file_mut()?.add_unlimited_dimension(name)?;
        Ok(())
    }

    fn add_variable(
        &mut self,
        name: &str,
        element_type: ElementType,
        dimensions: &[&str],
    ) -> Result<()> {
        let file = self.file_mut()?;
        match element_type {
            ElementType::Float32 => {
                file.add_variable::<f32>(name, dimensions)?;
            }
            ElementType::Float64 => {
                file.add_variable::<f64>(name, dimensions)?;
            }
            ElementType::Int32 => {
                file.add_variable::<i32>(name, dimensions)?;
            }
        }
        Ok(())
    }

    fn put_variable_attribute(&mut self, variable: &str, key: &str, value: &str) -> Result<()> {
        let file = self.file_mut()?;
        let mut var = file
            .variable_mut(variable)
            .ok_or_else(|| GeneratorError::UnknownVariable(variable.to_string()))?;
        var.put_attribute(key, value)?;
        Ok(())
    }

    fn put_global_attribute(&mut self, key: &str, value: &str) -> Result<()> {
        self.file_mut()?.add_attribute(key, value)?;
        Ok(())
    }

    fn end_definitions(&mut self) -> Result<()> {
        // libnetcdf leaves define mode on the first data access.
        self.file_mut()?;
        Ok(())
    }

    fn write(&mut self, variable: &str, slab: &Hyperslab, values: Values<'_>) -> Result<()> {
        let file = self.file_mut()?;
        let mut var = file
            .variable_mut(variable)
            .ok_or_else(|| GeneratorError::UnknownVariable(variable.to_string()))?;

        if values.len() != slab.len() {
            return Err(GeneratorError::ShapeMismatch {
                variable: variable.to_string(),
                expected: slab.len(),
                actual: values.len(),
            });
        }

        let extents: Vec<Extent> = slab.ranges().into_iter().map(Extent::from).collect();
        match values {
            Values::Float32(v) => var.put_values(v, extents)?,
            Values::Float64(v) => var.put_values(v, extents)?,
            Values::Int32(v) => var.put_values(v, extents)?,
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        // Buffered data reaches the disk when the file is closed.
        self.file_mut()?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let file = self
            .file
            .take()
            .ok_or_else(|| GeneratorError::schema("NetCDF file is already closed"))?;
        file.close()?;
        debug!(path = %self.path.display(), "Closed NetCDF file");
        Ok(())
    }
}
