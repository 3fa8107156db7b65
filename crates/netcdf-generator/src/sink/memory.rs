//! In-memory array sink.
//!
//! Holds every declared variable as a dense row-major buffer and applies the
//! same rules as a NetCDF file: declarations before `end_definitions`, writes
//! after, buffers must match their hyperslab, and an unlimited dimension
//! grows to the highest record written. Cells never written keep the NetCDF
//! default fill value of their type.

use std::collections::BTreeMap;

use super::{ArraySink, ElementType, Hyperslab, Values};
use crate::error::{GeneratorError, Result};

/// NetCDF default fill value for float32 variables.
pub const FILL_FLOAT32: f32 = 9.969_21e36;
/// NetCDF default fill value for float64 variables.
pub const FILL_FLOAT64: f64 = 9.969_209_968_386_869e36;
/// NetCDF default fill value for int32 variables.
pub const FILL_INT32: i32 = -2_147_483_647;

/// A declared dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryDimension {
    pub name: String,
    /// Current length. For an unlimited dimension, the number of records.
    pub len: usize,
    pub unlimited: bool,
}

/// Dense storage of one variable.
#[derive(Debug, Clone, PartialEq)]
pub enum MemoryData {
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Int32(Vec<i32>),
}

impl MemoryData {
    fn filled(element_type: ElementType, len: usize) -> Self {
        match element_type {
            ElementType::Float32 => MemoryData::Float32(vec![FILL_FLOAT32; len]),
            ElementType::Float64 => MemoryData::Float64(vec![FILL_FLOAT64; len]),
            ElementType::Int32 => MemoryData::Int32(vec![FILL_INT32; len]),
        }
    }

    fn resize(&mut self, len: usize) {
        match self {
            MemoryData::Float32(v) => v.resize(len, FILL_FLOAT32),
            MemoryData::Float64(v) => v.resize(len, FILL_FLOAT64),
            MemoryData::Int32(v) => v.resize(len, FILL_INT32),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            MemoryData::Float32(v) => v.len(),
            MemoryData::Float64(v) => v.len(),
            MemoryData::Int32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A declared variable and everything written to it.
#[derive(Debug, Clone)]
pub struct MemoryVariable {
    pub name: String,
    pub element_type: ElementType,
    pub dimensions: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    data: MemoryData,
}

impl MemoryVariable {
    pub fn data(&self) -> &MemoryData {
        &self.data
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn as_f32(&self) -> Option<&[f32]> {
        match &self.data {
            MemoryData::Float32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<&[f64]> {
        match &self.data {
            MemoryData::Float64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<&[i32]> {
        match &self.data {
            MemoryData::Int32(v) => Some(v),
            _ => None,
        }
    }
}

/// Array sink keeping the whole container in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    dimensions: Vec<MemoryDimension>,
    variables: Vec<MemoryVariable>,
    global_attributes: BTreeMap<String, String>,
    defined: bool,
    closed: bool,
    flush_count: usize,
    write_count: usize,
    write_failure: Option<String>,
    close_failure: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write to `variable` fail with a storage error.
    pub fn with_write_failure(mut self, variable: impl Into<String>) -> Self {
        self.write_failure = Some(variable.into());
        self
    }

    /// Make `close` fail with a storage error.
    pub fn with_close_failure(mut self) -> Self {
        self.close_failure = true;
        self
    }

    pub fn dimensions(&self) -> &[MemoryDimension] {
        &self.dimensions
    }

    pub fn dimension(&self, name: &str) -> Option<&MemoryDimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    pub fn variables(&self) -> &[MemoryVariable] {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&MemoryVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn global_attributes(&self) -> &BTreeMap<String, String> {
        &self.global_attributes
    }

    pub fn global_attribute(&self, key: &str) -> Option<&str> {
        self.global_attributes.get(key).map(String::as_str)
    }

    /// Current shape of a variable.
    pub fn shape(&self, variable: &str) -> Option<Vec<usize>> {
        let variable = self.variable(variable)?;
        variable
            .dimensions
            .iter()
            .map(|name| self.dimension(name).map(|d| d.len))
            .collect()
    }

    pub fn is_defined(&self) -> bool {
        self.defined
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn flush_count(&self) -> usize {
        self.flush_count
    }

    pub fn write_count(&self) -> usize {
        self.write_count
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(GeneratorError::schema("container is closed"));
        }
        Ok(())
    }

    fn ensure_defining(&self) -> Result<()> {
        self.ensure_open()?;
        if self.defined {
            return Err(GeneratorError::schema("declaration after end of definitions"));
        }
        Ok(())
    }

    fn ensure_dimension_free(&self, name: &str) -> Result<()> {
        if self.dimension(name).is_some() {
            return Err(GeneratorError::schema(format!("dimension '{}' already exists", name)));
        }
        Ok(())
    }

    fn dimension_index(&self, name: &str) -> Result<usize> {
        self.dimensions
            .iter()
            .position(|d| d.name == name)
            .ok_or_else(|| GeneratorError::UnknownDimension(name.to_string()))
    }

    fn variable_index(&self, name: &str) -> Result<usize> {
        self.variables
            .iter()
            .position(|v| v.name == name)
            .ok_or_else(|| GeneratorError::UnknownVariable(name.to_string()))
    }

    fn element_count(&self, variable: &MemoryVariable) -> usize {
        variable
            .dimensions
            .iter()
            .filter_map(|name| self.dimension(name))
            .map(|d| d.len)
            .product()
    }

    /// Grow an unlimited dimension and every variable indexed by it.
    fn grow_dimension(&mut self, index: usize, len: usize) {
        self.dimensions[index].len = len;
        let name = self.dimensions[index].name.clone();
        for i in 0..self.variables.len() {
            if self.variables[i].dimensions.contains(&name) {
                let count = self.element_count(&self.variables[i]);
                self.variables[i].data.resize(count);
            }
        }
    }
}

impl ArraySink for MemorySink {
    fn add_dimension(&mut self, name: &str, len: usize) -> Result<()> {
        self.ensure_defining()?;
        self.ensure_dimension_free(name)?;
        self.dimensions.push(MemoryDimension {
            name: name.to_string(),
            len,
            unlimited: false,
        });
        Ok(())
    }

    fn add_unlimited_dimension(&mut self, name: &str) -> Result<()> {
        self.ensure_defining()?;
        self.ensure_dimension_free(name)?;
        self.dimensions.push(MemoryDimension {
            name: name.to_string(),
            len: 0,
            unlimited: true,
        });
        Ok(())
    }

    fn add_variable(
        &mut self,
        name: &str,
        element_type: ElementType,
        dimensions: &[&str],
    ) -> Result<()> {
        self.ensure_defining()?;
        if self.variable(name).is_some() {
            return Err(GeneratorError::schema(format!("variable '{}' already exists", name)));
        }

        let mut len = 1;
        for (position, dim_name) in dimensions.iter().enumerate() {
            let dimension = &self.dimensions[self.dimension_index(dim_name)?];
            if dimension.unlimited && position != 0 {
                return Err(GeneratorError::schema(format!(
                    "unlimited dimension '{}' must come first in variable '{}'",
                    dim_name, name
                )));
            }
            len *= dimension.len;
        }

        self.variables.push(MemoryVariable {
            name: name.to_string(),
            element_type,
            dimensions: dimensions.iter().map(|d| d.to_string()).collect(),
            attributes: BTreeMap::new(),
            data: MemoryData::filled(element_type, len),
        });
        Ok(())
    }

    fn put_variable_attribute(&mut self, variable: &str, key: &str, value: &str) -> Result<()> {
        self.ensure_defining()?;
        let index = self.variable_index(variable)?;
        self.variables[index]
            .attributes
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn put_global_attribute(&mut self, key: &str, value: &str) -> Result<()> {
        self.ensure_defining()?;
        self.global_attributes
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn end_definitions(&mut self) -> Result<()> {
        self.ensure_defining()?;
        self.defined = true;
        Ok(())
    }

    fn write(&mut self, variable: &str, slab: &Hyperslab, values: Values<'_>) -> Result<()> {
        self.ensure_open()?;
        if !self.defined {
            return Err(GeneratorError::schema(format!(
                "write to '{}' before end of definitions",
                variable
            )));
        }
        if self.write_failure.as_deref() == Some(variable) {
            return Err(GeneratorError::storage(format!("write to '{}' failed", variable)));
        }

        let var_index = self.variable_index(variable)?;
        let declared = self.variables[var_index].element_type;
        if values.element_type() != declared {
            return Err(GeneratorError::TypeMismatch {
                variable: variable.to_string(),
                declared: declared.as_str(),
                actual: values.element_type().as_str(),
            });
        }

        let dim_names = self.variables[var_index].dimensions.clone();
        if slab.start.len() != dim_names.len() || slab.count.len() != dim_names.len() {
            return Err(GeneratorError::invalid_range(
                variable,
                format!("expected rank {}, got {}", dim_names.len(), slab.rank()),
            ));
        }
        if values.len() != slab.len() {
            return Err(GeneratorError::ShapeMismatch {
                variable: variable.to_string(),
                expected: slab.len(),
                actual: values.len(),
            });
        }

        let mut shape = Vec::with_capacity(dim_names.len());
        for (d, dim_name) in dim_names.iter().enumerate() {
            let dim_index = self.dimension_index(dim_name)?;
            let end = slab.start[d] + slab.count[d];
            let dimension = &self.dimensions[dim_index];
            if end > dimension.len {
                if !dimension.unlimited {
                    return Err(GeneratorError::invalid_range(
                        variable,
                        format!(
                            "{}..{} exceeds dimension '{}' of length {}",
                            slab.start[d], end, dim_name, dimension.len
                        ),
                    ));
                }
                self.grow_dimension(dim_index, end);
            }
            shape.push(self.dimensions[dim_index].len);
        }

        let data = &mut self.variables[var_index].data;
        match (data, values) {
            (MemoryData::Float32(dst), Values::Float32(src)) => copy_slab(dst, &shape, slab, src),
            (MemoryData::Float64(dst), Values::Float64(src)) => copy_slab(dst, &shape, slab, src),
            (MemoryData::Int32(dst), Values::Int32(src)) => copy_slab(dst, &shape, slab, src),
            _ => {
                return Err(GeneratorError::storage(format!(
                    "storage of '{}' does not hold {} values",
                    variable,
                    declared.as_str()
                )))
            }
        }

        self.write_count += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.flush_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.closed = true;
        if self.close_failure {
            return Err(GeneratorError::storage("close failed"));
        }
        Ok(())
    }
}

/// Copy a dense buffer covering `slab` into a row-major array of `shape`.
fn copy_slab<T: Copy>(dst: &mut [T], shape: &[usize], slab: &Hyperslab, src: &[T]) {
    let rank = shape.len();
    if rank == 0 {
        if let (Some(d), Some(s)) = (dst.first_mut(), src.first()) {
            *d = *s;
        }
        return;
    }

    let mut strides = vec![1usize; rank];
    for d in (0..rank - 1).rev() {
        strides[d] = strides[d + 1] * shape[d + 1];
    }

    let row_len = slab.count[rank - 1];
    if row_len == 0 {
        return;
    }

    for (row, chunk) in src.chunks_exact(row_len).enumerate() {
        // Decompose the row number over the outer counts, innermost first.
        let mut rest = row;
        let mut offset = slab.start[rank - 1];
        for d in (0..rank - 1).rev() {
            let index = rest % slab.count[d];
            rest /= slab.count[d];
            offset += (slab.start[d] + index) * strides[d];
        }
        dst[offset..offset + row_len].copy_from_slice(chunk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defined_sink() -> MemorySink {
        let mut sink = MemorySink::new();
        sink.add_unlimited_dimension("time").unwrap();
        sink.add_dimension("lat", 2).unwrap();
        sink.add_dimension("lon", 3).unwrap();
        sink.add_variable("lat", ElementType::Float32, &["lat"]).unwrap();
        sink.add_variable("temp", ElementType::Float64, &["time", "lat", "lon"])
            .unwrap();
        sink.end_definitions().unwrap();
        sink
    }

    #[test]
    fn test_declaration_after_end_rejected() {
        let mut sink = defined_sink();
        let err = sink.add_dimension("zc", 3).unwrap_err();
        assert!(matches!(err, GeneratorError::Schema(_)));
        assert!(sink.put_global_attribute("title", "x").is_err());
        assert!(sink.end_definitions().is_err());
    }

    #[test]
    fn test_write_before_end_rejected() {
        let mut sink = MemorySink::new();
        sink.add_dimension("lat", 1).unwrap();
        sink.add_variable("lat", ElementType::Float32, &["lat"]).unwrap();
        let err = sink
            .write("lat", &Hyperslab::from_origin(vec![1]), Values::Float32(&[1.0]))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Schema(_)));
    }

    #[test]
    fn test_unknown_dimension() {
        let mut sink = MemorySink::new();
        let err = sink
            .add_variable("botz", ElementType::Float64, &["lat", "lon"])
            .unwrap_err();
        assert!(matches!(err, GeneratorError::UnknownDimension(name) if name == "lat"));
    }

    #[test]
    fn test_unlimited_must_be_first() {
        let mut sink = MemorySink::new();
        sink.add_dimension("lat", 2).unwrap();
        sink.add_unlimited_dimension("time").unwrap();
        assert!(sink
            .add_variable("temp", ElementType::Float64, &["lat", "time"])
            .is_err());
    }

    #[test]
    fn test_unlimited_dimension_grows() {
        let mut sink = defined_sink();
        assert_eq!(sink.shape("temp"), Some(vec![0, 2, 3]));

        let layer = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        sink.write("temp", &Hyperslab::new(vec![2, 0, 0], vec![1, 2, 3]), Values::Float64(&layer))
            .unwrap();

        assert_eq!(sink.dimension("time").map(|d| d.len), Some(3));
        let data = sink.variable("temp").and_then(|v| v.as_f64()).unwrap();
        assert_eq!(data.len(), 18);
        assert_eq!(&data[12..], &layer);
        assert!(data[..12].iter().all(|v| *v == FILL_FLOAT64));
    }

    #[test]
    fn test_partial_write_lands_at_offset() {
        let mut sink = MemorySink::new();
        sink.add_dimension("lat", 3).unwrap();
        sink.add_dimension("lon", 4).unwrap();
        sink.add_variable("botz", ElementType::Float64, &["lat", "lon"])
            .unwrap();
        sink.end_definitions().unwrap();

        sink.write("botz", &Hyperslab::new(vec![1, 2], vec![2, 2]), Values::Float64(&[1.0, 2.0, 3.0, 4.0]))
            .unwrap();

        let data = sink.variable("botz").and_then(|v| v.as_f64()).unwrap();
        assert_eq!(data[6], 1.0);
        assert_eq!(data[7], 2.0);
        assert_eq!(data[10], 3.0);
        assert_eq!(data[11], 4.0);
        assert_eq!(data[0], FILL_FLOAT64);
    }

    #[test]
    fn test_buffer_size_mismatch() {
        let mut sink = defined_sink();
        let err = sink
            .write("temp", &Hyperslab::new(vec![0, 0, 0], vec![1, 2, 3]), Values::Float64(&[1.0]))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::ShapeMismatch { expected: 6, actual: 1, .. }));
    }

    #[test]
    fn test_type_mismatch() {
        let mut sink = defined_sink();
        let err = sink
            .write("lat", &Hyperslab::from_origin(vec![2]), Values::Float64(&[1.0, 2.0]))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::TypeMismatch { .. }));
    }

    #[test]
    fn test_fixed_dimension_overflow() {
        let mut sink = defined_sink();
        let err = sink
            .write("lat", &Hyperslab::new(vec![1], vec![2]), Values::Float32(&[1.0, 2.0]))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::InvalidRange { .. }));
    }

    #[test]
    fn test_close_once() {
        let mut sink = defined_sink();
        sink.flush().unwrap();
        sink.close().unwrap();
        assert!(sink.is_closed());
        assert_eq!(sink.flush_count(), 1);
        assert!(sink.close().is_err());
    }

    #[test]
    fn test_injected_failures() {
        let mut sink = MemorySink::new().with_write_failure("lat").with_close_failure();
        sink.add_dimension("lat", 1).unwrap();
        sink.add_variable("lat", ElementType::Float32, &["lat"]).unwrap();
        sink.end_definitions().unwrap();

        let err = sink
            .write("lat", &Hyperslab::from_origin(vec![1]), Values::Float32(&[1.0]))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Storage(_)));
        assert!(matches!(sink.close(), Err(GeneratorError::Storage(_))));
        assert!(sink.is_closed());
    }
}
