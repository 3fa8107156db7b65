//! Point coordinates used to address data samples.
//!
//! A [`CoordinateKey`] has two notions of identity:
//!
//! - **Raw identity** (`Eq` / `Hash`): field-by-field equality of the stored
//!   values. This is what sample maps and axis deduplication use, so two
//!   latitudes that differ in the last bit are two distinct keys.
//! - **Tolerant comparison** ([`CoordinateKey::tolerant_cmp`]): lat/lon are
//!   equal within [`COORDINATE_EPSILON`], heights within [`HEIGHT_EPSILON`],
//!   and a missing time or height sorts after a present one.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};

/// Lat/lon tolerance, in degrees (about 1 metre on the equator).
pub const COORDINATE_EPSILON: f32 = 0.00001;

/// Height tolerance, in metres.
pub const HEIGHT_EPSILON: f64 = 0.0000001;

/// Location of one data sample: lat/lon plus optional time and height.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateKey {
    lat: f32,
    lon: f32,
    time: Option<DateTime<Utc>>,
    height: Option<f64>,
}

impl CoordinateKey {
    /// Key without time nor height.
    pub fn new(lat: f32, lon: f32) -> Self {
        Self::from_parts(lat, lon, None, None)
    }

    /// Key with a time, no height.
    pub fn with_time(lat: f32, lon: f32, time: DateTime<Utc>) -> Self {
        Self::from_parts(lat, lon, Some(time), None)
    }

    /// Key with both a time and a height.
    pub fn with_time_and_height(lat: f32, lon: f32, time: DateTime<Utc>, height: f64) -> Self {
        Self::from_parts(lat, lon, Some(time), Some(height))
    }

    pub fn from_parts(
        lat: f32,
        lon: f32,
        time: Option<DateTime<Utc>>,
        height: Option<f64>,
    ) -> Self {
        Self {
            lat,
            lon,
            time,
            height,
        }
    }

    pub fn lat(&self) -> f32 {
        self.lat
    }

    pub fn lon(&self) -> f32 {
        self.lon
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.time
    }

    pub fn height(&self) -> Option<f64> {
        self.height
    }

    /// Tolerant ordering: lat, then lon, then time, then height.
    pub fn tolerant_cmp(&self, other: &Self) -> Ordering {
        cmp_f32(self.lat, other.lat)
            .then_with(|| cmp_f32(self.lon, other.lon))
            .then_with(|| cmp_nulls_last(self.time.as_ref(), other.time.as_ref(), Ord::cmp))
            .then_with(|| {
                cmp_nulls_last(self.height.as_ref(), other.height.as_ref(), |a, b| {
                    cmp_f64(*a, *b)
                })
            })
    }

    /// Tolerant equality, consistent with [`CoordinateKey::tolerant_cmp`].
    pub fn tolerant_eq(&self, other: &Self) -> bool {
        self.tolerant_cmp(other) == Ordering::Equal
    }
}

impl PartialEq for CoordinateKey {
    fn eq(&self, other: &Self) -> bool {
        self.lat.to_bits() == other.lat.to_bits()
            && self.lon.to_bits() == other.lon.to_bits()
            && self.time == other.time
            && self.height.map(f64::to_bits) == other.height.map(f64::to_bits)
    }
}

impl Eq for CoordinateKey {}

impl Hash for CoordinateKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lat.to_bits().hash(state);
        self.lon.to_bits().hash(state);
        self.time.hash(state);
        self.height.map(f64::to_bits).hash(state);
    }
}

fn cmp_f32(a: f32, b: f32) -> Ordering {
    let diff = a - b;
    if diff > COORDINATE_EPSILON {
        Ordering::Greater
    } else if diff < -COORDINATE_EPSILON {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    let diff = a - b;
    if diff > HEIGHT_EPSILON {
        Ordering::Greater
    } else if diff < -HEIGHT_EPSILON {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}

fn cmp_nulls_last<T>(a: Option<&T>, b: Option<&T>, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
