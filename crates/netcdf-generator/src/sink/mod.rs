//! Array storage backends.
//!
//! The writer talks to storage through [`ArraySink`], a narrow mirror of the
//! NetCDF define/data API. [`MemorySink`] keeps everything in memory and is
//! what the tests inspect; [`NetcdfSink`] writes real files.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::Result;

mod memory;
#[cfg(feature = "netcdf")]
mod netcdf_file;

pub use memory::{MemoryData, MemoryDimension, MemorySink, MemoryVariable};
#[cfg(feature = "netcdf")]
pub use netcdf_file::NetcdfSink;

/// Element type of a stored variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Float32,
    Float64,
    Int32,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Int32 => "int32",
        }
    }
}

/// A borrowed buffer of values to write.
#[derive(Debug, Clone, Copy)]
pub enum Values<'a> {
    Float32(&'a [f32]),
    Float64(&'a [f64]),
    Int32(&'a [i32]),
}

impl Values<'_> {
    pub fn element_type(&self) -> ElementType {
        match self {
            Values::Float32(_) => ElementType::Float32,
            Values::Float64(_) => ElementType::Float64,
            Values::Int32(_) => ElementType::Int32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Values::Float32(v) => v.len(),
            Values::Float64(v) => v.len(),
            Values::Int32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Region of a variable covered by one write: a start index and a count per
/// dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperslab {
    pub start: Vec<usize>,
    pub count: Vec<usize>,
}

impl Hyperslab {
    pub fn new(start: Vec<usize>, count: Vec<usize>) -> Self {
        Self { start, count }
    }

    /// Region starting at the origin.
    pub fn from_origin(count: Vec<usize>) -> Self {
        Self {
            start: vec![0; count.len()],
            count,
        }
    }

    pub fn rank(&self) -> usize {
        self.count.len()
    }

    /// Number of elements in the region.
    pub fn len(&self) -> usize {
        self.count.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ranges(&self) -> Vec<Range<usize>> {
        self.start
            .iter()
            .zip(&self.count)
            .map(|(&start, &count)| start..start + count)
            .collect()
    }
}

/// Storage consumed by the writer.
///
/// Declarations (`add_*`, `put_*`) are only valid before
/// [`ArraySink::end_definitions`]; writes only after it.
pub trait ArraySink {
    fn add_dimension(&mut self, name: &str, len: usize) -> Result<()>;

    fn add_unlimited_dimension(&mut self, name: &str) -> Result<()>;

    fn add_variable(
        &mut self,
        name: &str,
        element_type: ElementType,
        dimensions: &[&str],
    ) -> Result<()>;

    fn put_variable_attribute(&mut self, variable: &str, key: &str, value: &str) -> Result<()>;

    fn put_global_attribute(&mut self, key: &str, value: &str) -> Result<()>;

    /// Leave define mode.
    fn end_definitions(&mut self) -> Result<()>;

    /// Write a dense row-major buffer covering `slab`.
    fn write(&mut self, variable: &str, slab: &Hyperslab, values: Values<'_>) -> Result<()>;

    fn flush(&mut self) -> Result<()>;

    /// Release the underlying resource. Must be called at most once.
    fn close(&mut self) -> Result<()>;
}
