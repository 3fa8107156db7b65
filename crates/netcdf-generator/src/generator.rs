//! Writes one or more datasets into a single container.
//!
//! Each dataset becomes a hypercube with its own lat/lon/time (and, when
//! used, height) axes. The first dataset uses the plain axis names; dataset
//! `i > 0` appends `i` to each of them (`lat1`, `lon1`, `time1`, `zc1`).
//!
//! Writing happens in two phases. The schema of every hypercube is declared
//! first, then the schema is committed and the data is written hypercube by
//! hypercube: coordinate axes, one time value per record, then each variable
//! record by record.

#[cfg(feature = "netcdf")]
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::GeneratorConfig;
use crate::container::{DataWriter, SchemaBuilder};
use crate::dataset::Dataset;
use crate::dimensions::Dimensions;
use crate::error::{GeneratorError, Result};
use crate::materialize::{fill_record, record_len};
use crate::sink::{ArraySink, ElementType, Hyperslab, Values};
use crate::time::encode_offset;
use crate::variable::ShapeKind;

#[cfg(feature = "netcdf")]
use crate::sink::NetcdfSink;

/// Attribute naming the role of a coordinate variable.
pub const AXIS_TYPE_ATTRIBUTE: &str = "_CoordinateAxisType";

/// Attribute giving the direction of the height axis.
pub const Z_IS_POSITIVE_ATTRIBUTE: &str = "_CoordinateZisPositive";

// ============================================================================
// Axis naming
// ============================================================================

/// Dimension and coordinate variable names of one hypercube.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisNames {
    pub latitude: String,
    pub longitude: String,
    pub time: String,
    pub height: String,
}

impl AxisNames {
    /// Names for the dataset at `index` in the input order.
    pub fn for_index(index: usize) -> Self {
        let suffix = if index == 0 {
            String::new()
        } else {
            index.to_string()
        };
        Self {
            latitude: format!("lat{}", suffix),
            longitude: format!("lon{}", suffix),
            time: format!("time{}", suffix),
            height: format!("zc{}", suffix),
        }
    }

    /// Dimensions of a data variable of `kind`, outermost first.
    pub fn dimensions_for(&self, kind: ShapeKind) -> Vec<&str> {
        let (lat, lon) = (self.latitude.as_str(), self.longitude.as_str());
        match kind {
            ShapeKind::Plain => vec![lat, lon],
            ShapeKind::TimeVarying => vec![self.time.as_str(), lat, lon],
            ShapeKind::TimeDepthVarying => vec![self.time.as_str(), lat, lon, self.height.as_str()],
        }
    }
}

// ============================================================================
// Summaries
// ============================================================================

/// What was written for one dataset.
#[derive(Debug, Clone, Serialize)]
pub struct HypercubeSummary {
    pub index: usize,
    pub axis_names: AxisNames,
    pub latitudes: usize,
    pub longitudes: usize,
    pub heights: usize,
    pub records: usize,
    pub variables: Vec<String>,
}

/// What was written to one container.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationSummary {
    pub hypercubes: Vec<HypercubeSummary>,
}

impl GenerationSummary {
    /// Total number of time records across hypercubes.
    pub fn records(&self) -> usize {
        self.hypercubes.iter().map(|h| h.records).sum()
    }

    /// Total number of data variables across hypercubes.
    pub fn variable_count(&self) -> usize {
        self.hypercubes.iter().map(|h| h.variables.len()).sum()
    }
}

// ============================================================================
// Hypercube plan
// ============================================================================

/// Resolved layout of one dataset, computed before any I/O.
struct Hypercube<'d> {
    index: usize,
    dataset: &'d Dataset,
    names: AxisNames,
    dimensions: Dimensions,
    times: Vec<DateTime<Utc>>,
    offsets: Vec<i32>,
}

impl<'d> Hypercube<'d> {
    fn plan(index: usize, dataset: &'d Dataset) -> Result<Self> {
        let dimensions = dataset.dimensions();
        if dimensions.is_empty() {
            return Err(GeneratorError::EmptyDataset { index });
        }
        if !dimensions.has_heights() {
            if let Some(variable) = dataset.iter().find(|v| v.kind().has_height()) {
                return Err(GeneratorError::MissingHeightAxis {
                    index,
                    variable: variable.name().to_string(),
                });
            }
        }

        let times = dataset.used_times();
        let offsets = times
            .iter()
            .map(|time| encode_offset(dataset.time_epoch(), *time, dataset.time_unit()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            index,
            dataset,
            names: AxisNames::for_index(index),
            dimensions,
            times,
            offsets,
        })
    }

    fn declare<S: ArraySink>(&self, schema: &mut SchemaBuilder<'_, S>) -> Result<()> {
        let names = &self.names;
        let dims = &self.dimensions;

        schema.add_dimension(&names.latitude, dims.latitudes().len())?;
        schema.add_dimension(&names.longitude, dims.longitudes().len())?;
        schema.add_unlimited_dimension(&names.time)?;
        if dims.has_heights() {
            schema.add_dimension(&names.height, dims.heights().len())?;
        }

        declare_axis(
            schema,
            &names.latitude,
            ElementType::Float32,
            &[("units", "degrees_north"), (AXIS_TYPE_ATTRIBUTE, "Lat")],
        )?;
        declare_axis(
            schema,
            &names.longitude,
            ElementType::Float32,
            &[("units", "degrees_east"), (AXIS_TYPE_ATTRIBUTE, "Lon")],
        )?;
        declare_axis(
            schema,
            &names.time,
            ElementType::Int32,
            &[("units", self.dataset.time_unit()), (AXIS_TYPE_ATTRIBUTE, "Time")],
        )?;
        if dims.has_heights() {
            declare_axis(
                schema,
                &names.height,
                ElementType::Float64,
                &[
                    ("units", "m"),
                    (AXIS_TYPE_ATTRIBUTE, "Height"),
                    (Z_IS_POSITIVE_ATTRIBUTE, "up"),
                ],
            )?;
        }

        for variable in self.dataset.iter() {
            let var_dims = names.dimensions_for(variable.kind());
            schema.add_variable(variable.name(), ElementType::Float64, &var_dims)?;
            for (key, value) in variable.attributes() {
                schema.put_variable_attribute(variable.name(), key, value)?;
            }
        }

        for (key, value) in self.dataset.global_attributes() {
            schema.put_global_attribute(key, value)?;
        }

        info!(
            dataset = self.index,
            lat = dims.latitudes().len(),
            lon = dims.longitudes().len(),
            heights = dims.heights().len(),
            records = self.times.len(),
            "Declared hypercube"
        );
        Ok(())
    }

    fn write<S: ArraySink>(&self, writer: &mut DataWriter<'_, S>) -> Result<()> {
        let names = &self.names;
        let dims = &self.dimensions;
        let n_lat = dims.latitudes().len();
        let n_lon = dims.longitudes().len();
        let n_height = dims.heights().len();

        writer.write(
            &names.latitude,
            &Hyperslab::from_origin(vec![n_lat]),
            Values::Float32(dims.latitudes()),
        )?;
        writer.write(
            &names.longitude,
            &Hyperslab::from_origin(vec![n_lon]),
            Values::Float32(dims.longitudes()),
        )?;
        if dims.has_heights() {
            writer.write(
                &names.height,
                &Hyperslab::from_origin(vec![n_height]),
                Values::Float64(dims.heights()),
            )?;
        }

        for (record, offset) in self.offsets.iter().enumerate() {
            writer.write(
                &names.time,
                &Hyperslab::new(vec![record], vec![1]),
                Values::Int32(std::slice::from_ref(offset)),
            )?;
        }

        let mut buffer = Vec::new();
        for variable in self.dataset.iter() {
            let name = variable.name();
            match variable.kind() {
                ShapeKind::Plain => {
                    fill_record(variable, dims, None, &mut buffer);
                    writer.write(
                        name,
                        &Hyperslab::from_origin(vec![n_lat, n_lon]),
                        Values::Float64(&buffer),
                    )?;
                }
                ShapeKind::TimeVarying => {
                    for (record, time) in self.times.iter().enumerate() {
                        fill_record(variable, dims, Some(*time), &mut buffer);
                        writer.write(
                            name,
                            &Hyperslab::new(vec![record, 0, 0], vec![1, n_lat, n_lon]),
                            Values::Float64(&buffer),
                        )?;
                    }
                }
                ShapeKind::TimeDepthVarying => {
                    for (record, time) in self.times.iter().enumerate() {
                        fill_record(variable, dims, Some(*time), &mut buffer);
                        writer.write(
                            name,
                            &Hyperslab::new(
                                vec![record, 0, 0, 0],
                                vec![1, n_lat, n_lon, n_height],
                            ),
                            Values::Float64(&buffer),
                        )?;
                    }
                }
            }
            debug!(
                dataset = self.index,
                variable = name,
                shape = %variable.kind(),
                record_len = record_len(variable.kind(), dims),
                "Wrote variable"
            );
        }

        Ok(())
    }

    fn summary(&self) -> HypercubeSummary {
        HypercubeSummary {
            index: self.index,
            axis_names: self.names.clone(),
            latitudes: self.dimensions.latitudes().len(),
            longitudes: self.dimensions.longitudes().len(),
            heights: self.dimensions.heights().len(),
            records: self.times.len(),
            variables: self.dataset.iter().map(|v| v.name().to_string()).collect(),
        }
    }
}

fn declare_axis<S: ArraySink>(
    schema: &mut SchemaBuilder<'_, S>,
    name: &str,
    element_type: ElementType,
    attributes: &[(&str, &str)],
) -> Result<()> {
    schema.add_variable(name, element_type, &[name])?;
    for (key, value) in attributes {
        schema.put_variable_attribute(name, key, value)?;
    }
    Ok(())
}

// ============================================================================
// Generator
// ============================================================================

/// Writes datasets into NetCDF containers.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Write `datasets` into a NetCDF file at `output`.
    ///
    /// The output path and the datasets are validated before the file is
    /// created. The file is flushed and closed whether writing succeeds or
    /// not.
    #[cfg(feature = "netcdf")]
    pub fn generate(
        &self,
        output: impl AsRef<Path>,
        datasets: &[Dataset],
    ) -> Result<GenerationSummary> {
        let output = output.as_ref();
        if output.as_os_str().is_empty() {
            return Err(GeneratorError::NoOutput);
        }
        let plan = self.plan(datasets)?;

        info!(
            path = %output.display(),
            datasets = datasets.len(),
            format = %self.config.format,
            "Generating NetCDF file"
        );

        let mut sink = NetcdfSink::create(output, &self.config)?;
        let summary = self.execute(&mut sink, &plan)?;

        info!(
            path = %output.display(),
            records = summary.records(),
            variables = summary.variable_count(),
            "NetCDF file generated"
        );
        Ok(summary)
    }

    /// Write `datasets` into an already opened sink, then flush and close it.
    pub fn write_to<S: ArraySink>(
        &self,
        sink: &mut S,
        datasets: &[Dataset],
    ) -> Result<GenerationSummary> {
        let plan = self.plan(datasets)?;
        self.execute(sink, &plan)
    }

    fn plan<'d>(&self, datasets: &'d [Dataset]) -> Result<Vec<Hypercube<'d>>> {
        if datasets.is_empty() {
            return Err(GeneratorError::NoDataset);
        }
        self.config
            .validate(datasets.len())
            .map_err(GeneratorError::Config)?;

        datasets
            .iter()
            .enumerate()
            .map(|(index, dataset)| Hypercube::plan(index, dataset))
            .collect()
    }

    fn execute<S: ArraySink>(&self, sink: &mut S, plan: &[Hypercube<'_>]) -> Result<GenerationSummary> {
        let written = write_hypercubes(sink, plan);
        let flushed = sink.flush();
        let closed = sink.close();

        // First failure wins.
        let summary = written?;
        flushed?;
        closed?;
        Ok(summary)
    }
}

fn write_hypercubes<S: ArraySink>(
    sink: &mut S,
    plan: &[Hypercube<'_>],
) -> Result<GenerationSummary> {
    let mut schema = SchemaBuilder::new(sink);
    for hypercube in plan {
        hypercube.declare(&mut schema)?;
    }

    let mut writer = schema.commit()?;
    for hypercube in plan {
        hypercube.write(&mut writer)?;
    }

    Ok(GenerationSummary {
        hypercubes: plan.iter().map(Hypercube::summary).collect(),
    })
}
