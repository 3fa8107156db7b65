//! A dataset: one hypercube worth of variables sharing lat/lon/time/height axes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::dimensions::{self, Dimensions};
use crate::time::{default_epoch, DEFAULT_TIME_UNIT};
use crate::variable::{DataVariable, Plain, ShapeKind, TimeDepthVarying, TimeVarying, Variable};
use crate::vector::VectorVariable;

// ============================================================================
// Shape-erased containers
// ============================================================================

/// A variable of any shape, owned by a [`Dataset`].
#[derive(Debug, Clone)]
pub enum AnyVariable {
    Plain(Variable<Plain>),
    TimeVarying(Variable<TimeVarying>),
    TimeDepthVarying(Variable<TimeDepthVarying>),
}

impl AnyVariable {
    pub fn as_data(&self) -> &dyn DataVariable {
        match self {
            AnyVariable::Plain(v) => v,
            AnyVariable::TimeVarying(v) => v,
            AnyVariable::TimeDepthVarying(v) => v,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.as_data().kind()
    }
}

impl From<Variable<Plain>> for AnyVariable {
    fn from(variable: Variable<Plain>) -> Self {
        AnyVariable::Plain(variable)
    }
}

impl From<Variable<TimeVarying>> for AnyVariable {
    fn from(variable: Variable<TimeVarying>) -> Self {
        AnyVariable::TimeVarying(variable)
    }
}

impl From<Variable<TimeDepthVarying>> for AnyVariable {
    fn from(variable: Variable<TimeDepthVarying>) -> Self {
        AnyVariable::TimeDepthVarying(variable)
    }
}

/// A vector pair of any shape, owned by a [`Dataset`].
#[derive(Debug, Clone)]
pub enum AnyVectorVariable {
    Plain(VectorVariable<Plain>),
    TimeVarying(VectorVariable<TimeVarying>),
    TimeDepthVarying(VectorVariable<TimeDepthVarying>),
}

impl AnyVectorVariable {
    pub fn group_name(&self) -> &str {
        match self {
            AnyVectorVariable::Plain(p) => p.group_name(),
            AnyVectorVariable::TimeVarying(p) => p.group_name(),
            AnyVectorVariable::TimeDepthVarying(p) => p.group_name(),
        }
    }

    /// `u` then `v`.
    pub fn components(&self) -> [&dyn DataVariable; 2] {
        match self {
            AnyVectorVariable::Plain(p) => [p.u(), p.v()],
            AnyVectorVariable::TimeVarying(p) => [p.u(), p.v()],
            AnyVectorVariable::TimeDepthVarying(p) => [p.u(), p.v()],
        }
    }
}

impl From<VectorVariable<Plain>> for AnyVectorVariable {
    fn from(pair: VectorVariable<Plain>) -> Self {
        AnyVectorVariable::Plain(pair)
    }
}

impl From<VectorVariable<TimeVarying>> for AnyVectorVariable {
    fn from(pair: VectorVariable<TimeVarying>) -> Self {
        AnyVectorVariable::TimeVarying(pair)
    }
}

impl From<VectorVariable<TimeDepthVarying>> for AnyVectorVariable {
    fn from(pair: VectorVariable<TimeDepthVarying>) -> Self {
        AnyVectorVariable::TimeDepthVarying(pair)
    }
}

// ============================================================================
// Dataset
// ============================================================================

/// Variables and vector pairs written together as one hypercube.
#[derive(Debug, Clone)]
pub struct Dataset {
    variables: Vec<AnyVariable>,
    vector_variables: Vec<AnyVectorVariable>,
    global_attributes: BTreeMap<String, String>,
    time_unit: String,
    time_epoch: DateTime<Utc>,
}

impl Default for Dataset {
    fn default() -> Self {
        Self {
            variables: Vec::new(),
            vector_variables: Vec::new(),
            global_attributes: BTreeMap::new(),
            time_unit: DEFAULT_TIME_UNIT.to_string(),
            time_epoch: default_epoch(),
        }
    }
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_variable(&mut self, variable: impl Into<AnyVariable>) {
        self.variables.push(variable.into());
    }

    pub fn add_vector_variable(&mut self, pair: impl Into<AnyVectorVariable>) {
        self.vector_variables.push(pair.into());
    }

    pub fn set_global_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.global_attributes.insert(key.into(), value.into());
    }

    pub fn global_attributes(&self) -> &BTreeMap<String, String> {
        &self.global_attributes
    }

    /// Set the time unit label and the epoch it refers to.
    ///
    /// The label is written verbatim as the `units` attribute of the time
    /// axis; offsets are always whole hours since `epoch`.
    pub fn set_time_unit(&mut self, label: impl Into<String>, epoch: DateTime<Utc>) {
        self.time_unit = label.into();
        self.time_epoch = epoch;
    }

    pub fn time_unit(&self) -> &str {
        &self.time_unit
    }

    pub fn time_epoch(&self) -> DateTime<Utc> {
        self.time_epoch
    }

    pub fn variables(&self) -> &[AnyVariable] {
        &self.variables
    }

    pub fn vector_variables(&self) -> &[AnyVectorVariable] {
        &self.vector_variables
    }

    /// Variables in insertion order, then each pair's `u` and `v`.
    pub fn iter(&self) -> impl Iterator<Item = &dyn DataVariable> + '_ {
        self.variables.iter().map(AnyVariable::as_data).chain(
            self.vector_variables
                .iter()
                .flat_map(|pair| pair.components()),
        )
    }

    /// Look a variable up by name across plain variables and pair components.
    pub fn variable(&self, name: &str) -> Option<&dyn DataVariable> {
        self.iter().find(|variable| variable.name() == name)
    }

    /// Axes of this dataset, recomputed from the current samples.
    pub fn dimensions(&self) -> Dimensions {
        dimensions::derive_dimensions(self)
    }

    /// Sorted distinct timestamps across all variables.
    pub fn used_times(&self) -> Vec<DateTime<Utc>> {
        dimensions::used_times(self)
    }

    /// True when no variable holds a sample.
    pub fn is_empty(&self) -> bool {
        self.iter().all(|variable| variable.keys().next().is_none())
    }
}
