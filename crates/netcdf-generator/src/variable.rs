//! Sparse variables keyed by coordinate.
//!
//! A variable's shape is part of its type: `Variable<Plain>` takes lat/lon
//! samples, `Variable<TimeVarying>` adds a time, and
//! `Variable<TimeDepthVarying>` adds a time and a height. `add_data_point`
//! only accepts the coordinates its shape requires.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coordinate::CoordinateKey;

/// Attribute holding the variable unit, set at construction.
pub const UNITS_ATTRIBUTE: &str = "units";

/// Runtime tag of a variable shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// (lat, lon)
    Plain,
    /// (time, lat, lon)
    TimeVarying,
    /// (time, lat, lon, height)
    TimeDepthVarying,
}

impl ShapeKind {
    pub fn has_time(self) -> bool {
        !matches!(self, ShapeKind::Plain)
    }

    pub fn has_height(self) -> bool {
        matches!(self, ShapeKind::TimeDepthVarying)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Plain => "plain",
            ShapeKind::TimeVarying => "time_varying",
            ShapeKind::TimeDepthVarying => "time_depth_varying",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Plain {}
    impl Sealed for super::TimeVarying {}
    impl Sealed for super::TimeDepthVarying {}
}

/// Type-level shape of a [`Variable`].
pub trait Shape: sealed::Sealed + fmt::Debug + Clone + 'static {
    const KIND: ShapeKind;

    /// Coordinates addressing one sample of this shape.
    type Point: Copy;

    fn key(point: Self::Point) -> CoordinateKey;
}

#[derive(Debug, Clone, Copy)]
pub struct Plain;

#[derive(Debug, Clone, Copy)]
pub struct TimeVarying;

#[derive(Debug, Clone, Copy)]
pub struct TimeDepthVarying;

impl Shape for Plain {
    const KIND: ShapeKind = ShapeKind::Plain;
    type Point = (f32, f32);

    fn key((lat, lon): Self::Point) -> CoordinateKey {
        CoordinateKey::new(lat, lon)
    }
}

impl Shape for TimeVarying {
    const KIND: ShapeKind = ShapeKind::TimeVarying;
    type Point = (f32, f32, DateTime<Utc>);

    fn key((lat, lon, time): Self::Point) -> CoordinateKey {
        CoordinateKey::with_time(lat, lon, time)
    }
}

impl Shape for TimeDepthVarying {
    const KIND: ShapeKind = ShapeKind::TimeDepthVarying;
    type Point = (f32, f32, DateTime<Utc>, f64);

    fn key((lat, lon, time, height): Self::Point) -> CoordinateKey {
        CoordinateKey::with_time_and_height(lat, lon, time, height)
    }
}

/// A named, sparse set of samples with string attributes.
#[derive(Debug, Clone)]
pub struct Variable<S: Shape> {
    name: String,
    attributes: BTreeMap<String, String>,
    samples: HashMap<CoordinateKey, f64>,
    shape: PhantomData<S>,
}

impl<S: Shape> Variable<S> {
    pub fn new(name: impl Into<String>, units: impl Into<String>) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert(UNITS_ATTRIBUTE.to_string(), units.into());
        Self {
            name: name.into(),
            attributes,
            samples: HashMap::new(),
            shape: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ShapeKind {
        S::KIND
    }

    /// Set an attribute, replacing any previous value for `key`.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Insert a sample. A later sample at the same coordinates wins.
    pub fn insert(&mut self, point: S::Point, value: f64) {
        self.samples.insert(S::key(point), value);
    }

    pub fn get(&self, point: S::Point) -> Option<f64> {
        self.samples.get(&S::key(point)).copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> impl Iterator<Item = (&CoordinateKey, f64)> {
        self.samples.iter().map(|(key, value)| (key, *value))
    }

    /// Sorted distinct timestamps of the samples. Empty for plain variables.
    pub fn dates(&self) -> BTreeSet<DateTime<Utc>> {
        self.samples.keys().filter_map(CoordinateKey::time).collect()
    }
}

impl Variable<Plain> {
    pub fn add_data_point(&mut self, lat: f32, lon: f32, value: f64) {
        self.insert((lat, lon), value);
    }

    pub fn value(&self, lat: f32, lon: f32) -> Option<f64> {
        self.get((lat, lon))
    }
}

impl Variable<TimeVarying> {
    pub fn add_data_point(&mut self, lat: f32, lon: f32, time: DateTime<Utc>, value: f64) {
        self.insert((lat, lon, time), value);
    }

    pub fn value(&self, lat: f32, lon: f32, time: DateTime<Utc>) -> Option<f64> {
        self.get((lat, lon, time))
    }
}

impl Variable<TimeDepthVarying> {
    pub fn add_data_point(
        &mut self,
        lat: f32,
        lon: f32,
        time: DateTime<Utc>,
        height: f64,
        value: f64,
    ) {
        self.insert((lat, lon, time, height), value);
    }

    pub fn value(&self, lat: f32, lon: f32, time: DateTime<Utc>, height: f64) -> Option<f64> {
        self.get((lat, lon, time, height))
    }
}

/// Shape-erased read access used by the axis deriver and the writer.
pub trait DataVariable {
    fn name(&self) -> &str;

    fn kind(&self) -> ShapeKind;

    fn attributes(&self) -> &BTreeMap<String, String>;

    /// Raw-equal lookup.
    fn sample(&self, key: &CoordinateKey) -> Option<f64>;

    fn keys(&self) -> Box<dyn Iterator<Item = &CoordinateKey> + '_>;

    fn dates(&self) -> BTreeSet<DateTime<Utc>>;
}

impl<S: Shape> DataVariable for Variable<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ShapeKind {
        S::KIND
    }

    fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    fn sample(&self, key: &CoordinateKey) -> Option<f64> {
        self.samples.get(key).copied()
    }

    fn keys(&self) -> Box<dyn Iterator<Item = &CoordinateKey> + '_> {
        Box::new(self.samples.keys())
    }

    fn dates(&self) -> BTreeSet<DateTime<Utc>> {
        Variable::dates(self)
    }
}
