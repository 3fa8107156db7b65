//! Predictable axes and cell values.
//!
//! Values are chosen so a misplaced cell is obvious when a dense buffer is
//! read back.

/// Evenly spaced axis values from `min` to `max` inclusive.
///
/// # Example
///
/// ```
/// use test_utils::grid_axis;
///
/// assert_eq!(grid_axis(-2.0, 2.0, 5), vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
/// assert_eq!(grid_axis(3.0, 7.0, 1), vec![3.0]);
/// ```
pub fn grid_axis(min: f32, max: f32, steps: usize) -> Vec<f32> {
    if steps <= 1 {
        return vec![min; steps];
    }
    let step = (max - min) / (steps - 1) as f32;
    (0..steps).map(|i| min + step * i as f32).collect()
}

/// Value of the cell at (`lat_index`, `lon_index`): `lon_index * 1000 + lat_index`.
///
/// # Example
///
/// ```
/// use test_utils::predictable_value;
///
/// assert_eq!(predictable_value(0, 0), 0.0);
/// assert_eq!(predictable_value(3, 2), 2003.0);
/// ```
pub fn predictable_value(lat_index: usize, lon_index: usize) -> f64 {
    (lon_index * 1000 + lat_index) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_axis_spacing() {
        let axis = grid_axis(-28.0, -7.6, 15);
        assert_eq!(axis.len(), 15);
        assert_eq!(axis[0], -28.0);
        assert!((axis[14] - -7.6).abs() < 1e-5);
        assert!(axis.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_grid_axis_empty() {
        assert!(grid_axis(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_predictable_value_is_unique_per_cell() {
        let mut seen = std::collections::HashSet::new();
        for i in 0..15 {
            for j in 0..10 {
                assert!(seen.insert(predictable_value(i, j).to_bits()));
            }
        }
    }
}
