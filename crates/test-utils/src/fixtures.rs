//! Common test fixtures: grids, depth sets and dates.
//!
//! GBR4 follows the eReefs hydrodynamic sample grid at reduced resolution.

/// Common grid specifications for testing.
pub mod grid {
    use crate::generators::grid_axis;

    /// GBR4 hydro grid.
    pub const GBR4: GridSpec = GridSpec {
        min_lat: -28.0,
        max_lat: -7.6,
        lat_steps: 15,
        min_lon: 142.0,
        max_lon: 156.0,
        lon_steps: 10,
    };

    /// Simple 2x2 test grid
    pub const SIMPLE_2X2: GridSpec = GridSpec {
        min_lat: -20.0,
        max_lat: -10.0,
        lat_steps: 2,
        min_lon: 145.0,
        max_lon: 150.0,
        lon_steps: 2,
    };

    /// Grid specification for testing.
    #[derive(Debug, Clone, Copy)]
    pub struct GridSpec {
        pub min_lat: f32,
        pub max_lat: f32,
        pub lat_steps: usize,
        pub min_lon: f32,
        pub max_lon: f32,
        pub lon_steps: usize,
    }

    impl GridSpec {
        /// Returns the total number of grid cells.
        pub fn size(&self) -> usize {
            self.lat_steps * self.lon_steps
        }

        pub fn latitudes(&self) -> Vec<f32> {
            grid_axis(self.min_lat, self.max_lat, self.lat_steps)
        }

        pub fn longitudes(&self) -> Vec<f32> {
            grid_axis(self.min_lon, self.max_lon, self.lon_steps)
        }
    }
}

/// Depth sets, in metres (negative below the surface).
pub mod depths {
    pub const GBR4: [f64; 6] = [-1.5, -17.75, -49.0, -103.0, -200.0, -315.0];
    pub const SHALLOW: [f64; 3] = [-1.5, -17.75, -49.0];
}

/// Common time values for testing.
pub mod time {
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};

    /// Offset of the Australia/Brisbane time zone (no daylight saving).
    pub fn brisbane() -> FixedOffset {
        FixedOffset::east_opt(10 * 3600).unwrap()
    }

    /// A Brisbane wall-clock time as UTC.
    pub fn brisbane_time(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        brisbane()
            .with_ymd_and_hms(year, month, day, hour, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    /// A fixed reference time for tests (2019-01-01T00:00:00+10:00)
    pub fn reference_time() -> DateTime<Utc> {
        brisbane_time(2019, 1, 1, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_grid_spec_axes() {
        assert_eq!(grid::GBR4.size(), 150);
        assert_eq!(grid::GBR4.latitudes().len(), 15);
        assert_eq!(grid::GBR4.longitudes().len(), 10);
        assert_eq!(grid::SIMPLE_2X2.latitudes(), vec![-20.0, -10.0]);
    }

    #[test]
    fn test_depths_sorted_shallow_first() {
        assert!(depths::GBR4.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_brisbane_time_is_utc_plus_10() {
        let t = time::brisbane_time(2019, 1, 1, 0);
        assert_eq!(t.hour(), 14);
        assert_eq!(t.to_rfc3339(), "2018-12-31T14:00:00+00:00");
        assert_eq!(time::reference_time(), t);
    }
}
