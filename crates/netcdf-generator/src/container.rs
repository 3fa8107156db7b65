//! Two-phase access to an [`ArraySink`].
//!
//! A [`SchemaBuilder`] declares dimensions, variables and attributes.
//! [`SchemaBuilder::commit`] consumes it and returns a [`DataWriter`], the
//! only handle able to write buffers. Declaring after commit, or writing
//! before it, does not type-check.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{GeneratorError, Result};
use crate::sink::{ArraySink, ElementType, Hyperslab, Values};

#[derive(Debug, Clone)]
struct DeclaredVariable {
    element_type: ElementType,
    rank: usize,
}

/// Define phase of a container.
pub struct SchemaBuilder<'s, S: ArraySink> {
    sink: &'s mut S,
    dimensions: HashSet<String>,
    variables: HashMap<String, DeclaredVariable>,
}

impl<'s, S: ArraySink> SchemaBuilder<'s, S> {
    pub fn new(sink: &'s mut S) -> Self {
        Self {
            sink,
            dimensions: HashSet::new(),
            variables: HashMap::new(),
        }
    }

    /// Declare a fixed-length dimension.
    pub fn add_dimension(&mut self, name: &str, len: usize) -> Result<()> {
        self.reserve_dimension(name)?;
        self.sink.add_dimension(name, len)?;
        self.dimensions.insert(name.to_string());
        Ok(())
    }

    /// Declare a dimension growing with each written record.
    pub fn add_unlimited_dimension(&mut self, name: &str) -> Result<()> {
        self.reserve_dimension(name)?;
        self.sink.add_unlimited_dimension(name)?;
        self.dimensions.insert(name.to_string());
        Ok(())
    }

    pub fn add_variable(
        &mut self,
        name: &str,
        element_type: ElementType,
        dimensions: &[&str],
    ) -> Result<()> {
        if self.variables.contains_key(name) {
            return Err(GeneratorError::schema(format!(
                "variable '{}' declared twice",
                name
            )));
        }
        if let Some(missing) = dimensions.iter().find(|d| !self.dimensions.contains(**d)) {
            return Err(GeneratorError::UnknownDimension(missing.to_string()));
        }

        self.sink.add_variable(name, element_type, dimensions)?;
        self.variables.insert(
            name.to_string(),
            DeclaredVariable {
                element_type,
                rank: dimensions.len(),
            },
        );
        debug!(variable = name, dims = ?dimensions, element_type = element_type.as_str(), "Declared variable");
        Ok(())
    }

    pub fn put_variable_attribute(&mut self, variable: &str, key: &str, value: &str) -> Result<()> {
        if !self.variables.contains_key(variable) {
            return Err(GeneratorError::UnknownVariable(variable.to_string()));
        }
        self.sink.put_variable_attribute(variable, key, value)
    }

    pub fn put_global_attribute(&mut self, key: &str, value: &str) -> Result<()> {
        self.sink.put_global_attribute(key, value)
    }

    pub fn has_dimension(&self, name: &str) -> bool {
        self.dimensions.contains(name)
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// End the define phase.
    pub fn commit(self) -> Result<DataWriter<'s, S>> {
        let SchemaBuilder {
            sink, variables, ..
        } = self;
        sink.end_definitions()?;
        Ok(DataWriter { sink, variables })
    }

    fn reserve_dimension(&self, name: &str) -> Result<()> {
        if self.dimensions.contains(name) {
            return Err(GeneratorError::schema(format!(
                "dimension '{}' declared twice",
                name
            )));
        }
        Ok(())
    }
}

/// Data phase of a container.
pub struct DataWriter<'s, S: ArraySink> {
    sink: &'s mut S,
    variables: HashMap<String, DeclaredVariable>,
}

impl<S: ArraySink> DataWriter<'_, S> {
    /// Write a dense row-major buffer at `slab`.
    pub fn write(&mut self, variable: &str, slab: &Hyperslab, values: Values<'_>) -> Result<()> {
        let declared = self
            .variables
            .get(variable)
            .ok_or_else(|| GeneratorError::UnknownVariable(variable.to_string()))?;

        if declared.element_type != values.element_type() {
            return Err(GeneratorError::TypeMismatch {
                variable: variable.to_string(),
                declared: declared.element_type.as_str(),
                actual: values.element_type().as_str(),
            });
        }
        if declared.rank != slab.rank() || slab.start.len() != slab.count.len() {
            return Err(GeneratorError::invalid_range(
                variable,
                format!("expected rank {}, got {}", declared.rank, slab.rank()),
            ));
        }
        if slab.len() != values.len() {
            return Err(GeneratorError::ShapeMismatch {
                variable: variable.to_string(),
                expected: slab.len(),
                actual: values.len(),
            });
        }

        self.sink.write(variable, slab, values)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush()
    }
}
