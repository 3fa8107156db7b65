//! Axis derivation.
//!
//! Axes are built from the raw coordinate values present in a dataset's
//! samples: distinct by exact value, sorted ascending. Two latitudes that
//! only differ within [`crate::COORDINATE_EPSILON`] still produce two axis
//! entries.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};

use crate::dataset::Dataset;

/// Sorted distinct lat/lon/height values of one dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dimensions {
    latitudes: Vec<f32>,
    longitudes: Vec<f32>,
    heights: Vec<f64>,
}

impl Dimensions {
    /// Build axes from arbitrary values: sorts and removes exact duplicates.
    pub fn new(mut latitudes: Vec<f32>, mut longitudes: Vec<f32>, mut heights: Vec<f64>) -> Self {
        latitudes.sort_by(f32::total_cmp);
        latitudes.dedup_by(|a, b| a.to_bits() == b.to_bits());
        longitudes.sort_by(f32::total_cmp);
        longitudes.dedup_by(|a, b| a.to_bits() == b.to_bits());
        heights.sort_by(f64::total_cmp);
        heights.dedup_by(|a, b| a.to_bits() == b.to_bits());
        Self {
            latitudes,
            longitudes,
            heights,
        }
    }

    pub fn latitudes(&self) -> &[f32] {
        &self.latitudes
    }

    pub fn longitudes(&self) -> &[f32] {
        &self.longitudes
    }

    /// Empty when no sample carries a height.
    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    pub fn has_heights(&self) -> bool {
        !self.heights.is_empty()
    }

    /// Number of cells in one lat x lon layer.
    pub fn grid_len(&self) -> usize {
        self.latitudes.len() * self.longitudes.len()
    }

    /// True when the lat or lon axis is empty.
    pub fn is_empty(&self) -> bool {
        self.latitudes.is_empty() || self.longitudes.is_empty()
    }
}

/// Collect the axes of a dataset from every sample of every variable.
pub fn derive_dimensions(dataset: &Dataset) -> Dimensions {
    let mut lat_bits = HashSet::new();
    let mut lon_bits = HashSet::new();
    let mut height_bits = HashSet::new();

    for variable in dataset.iter() {
        for key in variable.keys() {
            lat_bits.insert(key.lat().to_bits());
            lon_bits.insert(key.lon().to_bits());
            if let Some(height) = key.height() {
                height_bits.insert(height.to_bits());
            }
        }
    }

    Dimensions::new(
        lat_bits.into_iter().map(f32::from_bits).collect(),
        lon_bits.into_iter().map(f32::from_bits).collect(),
        height_bits.into_iter().map(f64::from_bits).collect(),
    )
}

/// Sorted distinct timestamps used by at least one sample of the dataset.
pub fn used_times(dataset: &Dataset) -> Vec<DateTime<Utc>> {
    let mut times = BTreeSet::new();
    for variable in dataset.iter() {
        times.extend(variable.dates());
    }
    times.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::{Plain, TimeDepthVarying, TimeVarying, Variable};
    use chrono::TimeZone;

    fn t(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 1, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_axes_sorted_regardless_of_insertion_order() {
        let mut botz = Variable::<Plain>::new("botz", "m");
        botz.add_data_point(-10.0, 150.0, 1.0);
        botz.add_data_point(-30.0, 145.0, 1.0);
        botz.add_data_point(-20.0, 155.0, 1.0);
        botz.add_data_point(-30.0, 150.0, 1.0);

        let mut dataset = Dataset::new();
        dataset.add_variable(botz);
        let dims = dataset.dimensions();

        assert_eq!(dims.latitudes(), &[-30.0, -20.0, -10.0]);
        assert_eq!(dims.longitudes(), &[145.0, 150.0, 155.0]);
        assert!(dims.heights().is_empty());
        assert!(!dims.has_heights());
        assert_eq!(dims.grid_len(), 9);
    }

    #[test]
    fn test_heights_merged_across_variables() {
        let mut temp = Variable::<TimeDepthVarying>::new("temp", "C");
        temp.add_data_point(0.0, 0.0, t(0), -49.0, 1.0);
        temp.add_data_point(0.0, 0.0, t(0), -1.5, 1.0);
        let mut salt = Variable::<TimeDepthVarying>::new("salt", "PSU");
        salt.add_data_point(0.0, 0.0, t(0), -17.75, 1.0);
        salt.add_data_point(0.0, 0.0, t(0), -1.5, 1.0);

        let mut dataset = Dataset::new();
        dataset.add_variable(temp);
        dataset.add_variable(salt);

        assert_eq!(dataset.dimensions().heights(), &[-49.0, -17.75, -1.5]);
    }

    #[test]
    fn test_near_values_stay_distinct() {
        let mut botz = Variable::<Plain>::new("botz", "m");
        botz.add_data_point(-19.5, 147.0, 1.0);
        botz.add_data_point(-19.500_002, 147.0, 1.0);

        let mut dataset = Dataset::new();
        dataset.add_variable(botz);
        assert_eq!(dataset.dimensions().latitudes().len(), 2);
    }

    #[test]
    fn test_dimensions_recomputed_after_change() {
        let mut dataset = Dataset::new();
        assert!(dataset.dimensions().is_empty());

        let mut botz = Variable::<Plain>::new("botz", "m");
        botz.add_data_point(1.0, 2.0, 3.0);
        dataset.add_variable(botz);
        assert_eq!(dataset.dimensions().latitudes(), &[1.0]);
    }

    #[test]
    fn test_used_times_keep_gaps() {
        let mut wind = Variable::<TimeVarying>::new("wspeed_u", "ms-1");
        wind.add_data_point(0.0, 0.0, t(4), 1.0);
        wind.add_data_point(0.0, 0.0, t(0), 1.0);
        let mut temp = Variable::<TimeDepthVarying>::new("temp", "C");
        temp.add_data_point(0.0, 0.0, t(2), -1.5, 1.0);
        temp.add_data_point(0.0, 0.0, t(4), -1.5, 1.0);

        let mut dataset = Dataset::new();
        dataset.add_variable(Variable::<Plain>::new("botz", "m"));
        dataset.add_variable(wind);
        dataset.add_variable(temp);

        assert_eq!(used_times(&dataset), vec![t(0), t(2), t(4)]);
    }

    #[test]
    fn test_new_sorts_and_dedups() {
        let dims = Dimensions::new(vec![2.0, 1.0, 2.0], vec![5.0], vec![-1.0, -3.0, -1.0]);
        assert_eq!(dims.latitudes(), &[1.0, 2.0]);
        assert_eq!(dims.heights(), &[-3.0, -1.0]);
    }
}
