//! Sparse-to-dense NetCDF generation.
//!
//! This crate collects data points addressed by latitude, longitude and an
//! optional time and depth, and writes them as dense hypercubes into a
//! self-describing NetCDF file.
//!
//! - **Variables** are sparse maps from [`CoordinateKey`] to value. Their
//!   shape is a type parameter: [`Plain`], [`TimeVarying`] or
//!   [`TimeDepthVarying`].
//! - **Vector pairs** group an eastward and a northward component.
//! - **Datasets** own variables and pairs, and derive their own axes from
//!   the samples they hold.
//! - The **generator** packs one or more datasets into one file, each with
//!   its own set of axes, filling every missing cell with NaN.
//!
//! # Architecture
//!
//! ```text
//! Dataset(s)
//!      │
//!      ▼
//! Generator::generate(path, datasets)
//!      │
//!      ├─► Plan: derive axes and used times per dataset (no I/O)
//!      │
//!      ├─► SchemaBuilder: dimensions, coordinate + data variables, attributes
//!      │
//!      ├─► commit() ─► DataWriter
//!      │
//!      ├─► Axes, time records, dense variable records
//!      │
//!      └─► flush + close (always)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use netcdf_generator::{Dataset, Generator, TimeVarying, Variable, VectorVariable};
//!
//! let mut u = Variable::<TimeVarying>::new("wspeed_u", "ms-1");
//! let mut v = Variable::<TimeVarying>::new("wspeed_v", "ms-1");
//! u.add_data_point(-19.5, 147.5, time, 3.2);
//! v.add_data_point(-19.5, 147.5, time, -1.1);
//!
//! let mut dataset = Dataset::new();
//! dataset.add_vector_variable(VectorVariable::new("wind", u, v));
//!
//! Generator::default().generate("wind.nc", &[dataset])?;
//! ```

pub mod config;
pub mod container;
pub mod coordinate;
pub mod dataset;
pub mod dimensions;
pub mod error;
pub mod generator;
pub mod materialize;
pub mod sink;
pub mod time;
pub mod variable;
pub mod vector;

// Re-export commonly used types at crate root
pub use config::{FileFormat, GeneratorConfig};
pub use container::{DataWriter, SchemaBuilder};
pub use coordinate::{CoordinateKey, COORDINATE_EPSILON, HEIGHT_EPSILON};
pub use dataset::{AnyVariable, AnyVectorVariable, Dataset};
pub use dimensions::{derive_dimensions, used_times, Dimensions};
pub use error::{GeneratorError, Result};
pub use generator::{AxisNames, GenerationSummary, Generator, HypercubeSummary};
pub use materialize::MISSING_VALUE;
pub use sink::{ArraySink, ElementType, Hyperslab, MemorySink, Values};
#[cfg(feature = "netcdf")]
pub use sink::NetcdfSink;
pub use time::{default_epoch, hours_after, hours_between, DEFAULT_TIME_UNIT};
pub use variable::{DataVariable, Plain, Shape, ShapeKind, TimeDepthVarying, TimeVarying, Variable};
pub use vector::VectorVariable;
