//! Dense record buffers from sparse variables.

use chrono::{DateTime, Utc};

use crate::coordinate::CoordinateKey;
use crate::dimensions::Dimensions;
use crate::variable::{DataVariable, ShapeKind};

/// Value stored where a variable has no sample.
pub const MISSING_VALUE: f64 = f64::NAN;

/// Number of values in one record of a variable of `kind`.
pub fn record_len(kind: ShapeKind, dimensions: &Dimensions) -> usize {
    if kind.has_height() {
        dimensions.grid_len() * dimensions.heights().len()
    } else {
        dimensions.grid_len()
    }
}

/// Fill `buffer` with one record of `variable`, row-major over
/// (lat, lon[, height]).
///
/// `time` selects the record of time-varying variables and is ignored for
/// plain ones. Cells without a sample get [`MISSING_VALUE`].
pub fn fill_record(
    variable: &dyn DataVariable,
    dimensions: &Dimensions,
    time: Option<DateTime<Utc>>,
    buffer: &mut Vec<f64>,
) {
    let kind = variable.kind();
    let time = if kind.has_time() { time } else { None };

    buffer.clear();
    buffer.reserve(record_len(kind, dimensions));

    for &lat in dimensions.latitudes() {
        for &lon in dimensions.longitudes() {
            if kind.has_height() {
                for &height in dimensions.heights() {
                    let key = CoordinateKey::from_parts(lat, lon, time, Some(height));
                    buffer.push(variable.sample(&key).unwrap_or(MISSING_VALUE));
                }
            } else {
                let key = CoordinateKey::from_parts(lat, lon, time, None);
                buffer.push(variable.sample(&key).unwrap_or(MISSING_VALUE));
            }
        }
    }
}

/// One record of `variable` as a new buffer.
pub fn dense_record(
    variable: &dyn DataVariable,
    dimensions: &Dimensions,
    time: Option<DateTime<Utc>>,
) -> Vec<f64> {
    let mut buffer = Vec::new();
    fill_record(variable, dimensions, time, &mut buffer);
    buffer
}
