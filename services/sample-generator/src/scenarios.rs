//! Datasets of the sample scenarios.
//!
//! Values are smooth synthetic fields (see [`crate::signals`]) drawn from a
//! generator seeded per job, so a job always produces the same file.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Duration, FixedOffset, SecondsFormat, Utc};
use netcdf_generator::{
    default_epoch, hours_after, hours_between, Dataset, Plain, TimeDepthVarying, TimeVarying,
    Variable, VectorVariable,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{resolve_output, JobConfig, Scenario};
use crate::signals::{coordinates, linear_gradient, radial_gradient};

/// Depths used by the GBR4 configurations.
const GBR4_DEPTHS: [f64; 6] = [-1.5, -17.75, -49.0, -103.0, -200.0, -315.0];

/// Depths used by the GBR1 configurations.
const GBR1_DEPTHS: [f64; 3] = [-2.35, -5.35, -18.0];

const GBR4_METADATA_LINK: &str =
    "http://marlin.csiro.au/geonetwork/srv/eng/search?&uuid=72020224-f086-434a-bbe9-a222c8e5cf0d";
const GBR1_METADATA_LINK: &str =
    "http://marlin.csiro.au/geonetwork/srv/eng/search?&uuid=0ce4f380-ac99-46d5-a327-571bd20a0478";

/// Datasets to write into one file.
pub struct SampleFile {
    pub path: PathBuf,
    pub datasets: Vec<Dataset>,
}

/// Build the files of `job`, in the order of its outputs.
pub fn build(job: &JobConfig, output_dir: &Path) -> Result<Vec<SampleFile>> {
    job.validate()?;

    let mut rng = StdRng::seed_from_u64(job.seed());
    let start = job.start.with_timezone(&Utc);
    let end = job.end.with_timezone(&Utc);

    let files = match job.scenario {
        Scenario::Gbr4V2 => vec![vec![gbr4_v2(&mut rng, start, end, job.missing_data)]],
        Scenario::Gbr1V2 => vec![vec![gbr1_v2(&mut rng, start, end)]],
        Scenario::Gbr4V2MultiHypercubes => vec![gbr4_v2_multi_hypercubes(&mut rng, start, end)],
        Scenario::Gbr4Bgc => vec![vec![gbr4_bgc(&mut rng, start, end)]],
        Scenario::Noaa => {
            let (direction, height) = noaa(&mut rng, job.start, end);
            vec![vec![direction], vec![height]]
        }
        Scenario::Test => vec![vec![test(&mut rng, start, end)]],
    };

    job.outputs
        .iter()
        .zip(files)
        .map(|(output, datasets)| {
            Ok(SampleFile {
                path: resolve_output(output_dir, output)?,
                datasets,
            })
        })
        .collect()
}

// ============================================================================
// Fields
// ============================================================================

fn bathymetry(lat: f32, lon: f32) -> f64 {
    (lat % 10.0 + lon % 10.0) as f64
}

/// Noise grows with depth.
fn depth_noise(depth: f64) -> f64 {
    (-depth + 2.0) / 5000.0
}

fn wind<R: Rng>(rng: &mut R, lat: f32, lon: f32, hour: i64) -> (f64, f64) {
    let (lat, lon, hour) = (lat as f64, lon as f64, hour as f64);
    let u = linear_gradient(rng, lat, lon - hour, -10.0, -8.0, 100.0, 70.0, 0.0);
    let v = linear_gradient(rng, lat - hour, lon, 2.0, 17.0, 50.0, -20.0, 0.0);
    (u, v)
}

fn temperature<R: Rng>(rng: &mut R, lat: f32, lon: f32, hour: i64, depth: f64) -> f64 {
    let (lat, lon) = (lat as f64, lon as f64);
    let noise = depth_noise(depth);
    // Hot at the equator, cold at the poles
    let world = linear_gradient(rng, lat + 45.0, lon, 0.0, 30.0, 180.0, 0.0, noise);
    // Hotter closer to the coastline
    let coast = linear_gradient(rng, lat, lon + 31.0, -4.0, 4.0, 20.0, 60.0, noise);
    // +/- 1 degree between day and night
    let day_night = (((hour + 12).rem_euclid(24) - 12).abs() - 6) as f64 / 4.0;
    world + coast + day_night + depth / 10.0
}

fn salinity<R: Rng>(rng: &mut R, lat: f32, lon: f32, hour: i64, depth: f64) -> f64 {
    let drift = hour as f64 / 4.0;
    radial_gradient(
        rng,
        lat as f64 + drift,
        lon as f64 - drift,
        32.0,
        36.0,
        10.0,
        depth_noise(depth),
    )
}

fn current<R: Rng>(rng: &mut R, lat: f32, lon: f32, hour: i64, depth: f64) -> (f64, f64) {
    let (lat, lon) = (lat as f64, lon as f64);
    let drift = hour as f64 / 4.0;
    let noise = depth_noise(depth);
    let u = radial_gradient(rng, lat - drift, lon + drift, -0.6, 0.6, 15.0, noise);
    let v = radial_gradient(rng, lat + drift, lon + drift, -0.6, 0.6, 15.0, noise);
    (u, v)
}

// ============================================================================
// Hydrodynamic models
// ============================================================================

fn temp_variable() -> Variable<TimeDepthVarying> {
    Variable::new("temp", "degrees C").with_attribute("long_name", "Temperature")
}

fn salt_variable() -> Variable<TimeDepthVarying> {
    Variable::new("salt", "PSU").with_attribute("long_name", "Salinity")
}

fn wind_variables() -> (Variable<TimeVarying>, Variable<TimeVarying>) {
    (
        Variable::new("wspeed_u", "ms-1").with_attribute("long_name", "eastward_wind"),
        Variable::new("wspeed_v", "ms-1").with_attribute("long_name", "northward_wind"),
    )
}

fn current_variables() -> (Variable<TimeDepthVarying>, Variable<TimeDepthVarying>) {
    (
        Variable::new("u", "ms-1").with_attribute("long_name", "Eastward current"),
        Variable::new("v", "ms-1").with_attribute("long_name", "Northward current"),
    )
}

/// Variables dropped from one frame of a file with missing data.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Gaps {
    frame: bool,
    temp: bool,
    wind: bool,
    salt: bool,
    current: bool,
}

impl Gaps {
    /// Gaps of the frame `offset` hours after the first frame.
    fn at(offset: i64) -> Self {
        Self {
            frame: offset == 2 || offset == 3,
            temp: offset == 5,
            wind: offset == 1,
            salt: offset == 7 || offset == 8,
            current: offset == 8 || offset == 9,
        }
    }
}

/// Every variable of the GBR hydrodynamic models.
struct Hydro {
    botz: Variable<Plain>,
    temp: Variable<TimeDepthVarying>,
    salt: Variable<TimeDepthVarying>,
    wind: (Variable<TimeVarying>, Variable<TimeVarying>),
    current: (Variable<TimeDepthVarying>, Variable<TimeDepthVarying>),
}

impl Hydro {
    fn new() -> Self {
        Self {
            botz: Variable::new("botz", "metre").with_attribute("long_name", "Depth of sea-bed"),
            temp: temp_variable(),
            salt: salt_variable(),
            wind: wind_variables(),
            current: current_variables(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn add_frame<R: Rng>(
        &mut self,
        rng: &mut R,
        lat: f32,
        lon: f32,
        hour: i64,
        time: DateTime<Utc>,
        depths: &[f64],
        gaps: Gaps,
    ) {
        if !gaps.wind {
            let (u, v) = wind(rng, lat, lon, hour);
            self.wind.0.add_data_point(lat, lon, time, u);
            self.wind.1.add_data_point(lat, lon, time, v);
        }

        for &depth in depths {
            if !gaps.temp {
                let value = temperature(rng, lat, lon, hour, depth);
                self.temp.add_data_point(lat, lon, time, depth, value);
            }
            if !gaps.salt {
                let value = salinity(rng, lat, lon, hour, depth);
                self.salt.add_data_point(lat, lon, time, depth, value);
            }
            if !gaps.current {
                let (u, v) = current(rng, lat, lon, hour, depth);
                self.current.0.add_data_point(lat, lon, time, depth, u);
                self.current.1.add_data_point(lat, lon, time, depth, v);
            }
        }
    }

    fn into_dataset(self, attributes: &[(&str, &str)]) -> Dataset {
        let mut dataset = Dataset::new();
        for (key, value) in attributes {
            dataset.set_global_attribute(*key, *value);
        }
        dataset.add_variable(self.temp);
        dataset.add_variable(self.salt);
        dataset.add_vector_variable(VectorVariable::new("wind", self.wind.0, self.wind.1));
        dataset.add_vector_variable(VectorVariable::new(
            "sea_water_velocity",
            self.current.0,
            self.current.1,
        ));
        dataset.add_variable(self.botz);
        dataset
    }
}

fn hydro_grid<R: Rng>(
    rng: &mut R,
    lats: &[f32],
    lons: &[f32],
    depths: &[f64],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    missing_data: bool,
) -> Hydro {
    let epoch = default_epoch();
    let first = hours_between(epoch, start);
    let last = hours_between(epoch, end);

    let mut hydro = Hydro::new();
    for &lat in lats {
        for &lon in lons {
            hydro.botz.add_data_point(lat, lon, bathymetry(lat, lon));

            for hour in first..last {
                let gaps = if missing_data {
                    Gaps::at(hour - first)
                } else {
                    Gaps::default()
                };
                if gaps.frame {
                    continue;
                }
                hydro.add_frame(rng, lat, lon, hour, hours_after(epoch, hour), depths, gaps);
            }
        }
    }
    hydro
}

/// GBR 4km hydrodynamic model, hourly.
pub fn gbr4_v2<R: Rng>(
    rng: &mut R,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    missing_data: bool,
) -> Dataset {
    let lats = coordinates(-28.0, -7.6, 15);
    let lons = coordinates(142.0, 156.0, 10);

    hydro_grid(rng, &lats, &lons, &GBR4_DEPTHS, start, end, missing_data).into_dataset(&[
        ("metadata_link", GBR4_METADATA_LINK),
        ("title", "GBR4 Hydro"),
        ("paramhead", "GBR 4km resolution grid"),
    ])
}

/// GBR 1km hydrodynamic model, hourly.
pub fn gbr1_v2<R: Rng>(rng: &mut R, start: DateTime<Utc>, end: DateTime<Utc>) -> Dataset {
    let lats = coordinates(-28.0, -7.6, 30);
    let lons = coordinates(142.0, 152.0, 14);

    hydro_grid(rng, &lats, &lons, &GBR1_DEPTHS, start, end, false).into_dataset(&[
        ("metadata_link", GBR1_METADATA_LINK),
        ("title", "GBR1 Hydro Transport"),
        ("paramhead", "GBR 1km resolution grid"),
    ])
}

/// Two hypercubes with their own grid, depths and time steps.
pub fn gbr4_v2_multi_hypercubes<R: Rng>(
    rng: &mut R,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<Dataset> {
    let epoch = default_epoch();
    let first = hours_between(epoch, start);
    let last = hours_between(epoch, end);

    // Hourly temperature and wind
    let lats = coordinates(-26.0, -7.6, 15);
    let lons = coordinates(142.0, 154.0, 10);
    let depths = [-1.5, -17.75, -49.0];

    let mut temp = temp_variable();
    let (mut wind_u, mut wind_v) = wind_variables();
    for &lat in &lats {
        for &lon in &lons {
            for hour in first..last {
                let time = hours_after(epoch, hour);
                let (u, v) = wind(rng, lat, lon, hour);
                wind_u.add_data_point(lat, lon, time, u);
                wind_v.add_data_point(lat, lon, time, v);
                for &depth in &depths {
                    let value = temperature(rng, lat, lon, hour, depth);
                    temp.add_data_point(lat, lon, time, depth, value);
                }
            }
        }
    }

    let mut first_dataset = Dataset::new();
    first_dataset.set_global_attribute("metadata_link", GBR4_METADATA_LINK);
    first_dataset.set_global_attribute("title", "Multi Hypercube");
    first_dataset.set_global_attribute("paramhead", "GBR 4km and 1km resolution grid");
    first_dataset.add_variable(temp);
    first_dataset.add_vector_variable(VectorVariable::new("wind", wind_u, wind_v));

    // Salinity and current every 3 hours, from the third hour
    let lats = coordinates(-28.0, -9.6, 30);
    let lons = coordinates(144.0, 156.0, 20);
    let depths = [-2.35, -18.0, -50.0];

    let mut salt = salt_variable();
    let (mut current_u, mut current_v) = current_variables();
    for &lat in &lats {
        for &lon in &lons {
            for hour in (first + 2..last).step_by(3) {
                let time = hours_after(epoch, hour);
                for &depth in &depths {
                    let value = salinity(rng, lat, lon, hour, depth);
                    salt.add_data_point(lat, lon, time, depth, value);
                    let (u, v) = current(rng, lat, lon, hour, depth);
                    current_u.add_data_point(lat, lon, time, depth, u);
                    current_v.add_data_point(lat, lon, time, depth, v);
                }
            }
        }
    }

    let mut second_dataset = Dataset::new();
    second_dataset.add_variable(salt);
    second_dataset.add_vector_variable(VectorVariable::new(
        "sea_water_velocity",
        current_u,
        current_v,
    ));

    vec![first_dataset, second_dataset]
}

// ============================================================================
// Other models
// ============================================================================

/// GBR 4km biogeochemical model, one frame a day.
pub fn gbr4_bgc<R: Rng>(rng: &mut R, start: DateTime<Utc>, end: DateTime<Utc>) -> Dataset {
    let lats = coordinates(-28.0, -7.6, 15);
    let lons = coordinates(142.0, 156.0, 10);
    let epoch = default_epoch();

    // Blue goes deep, green about half as deep, red is mostly absorbed.
    let mut bands = [
        (Variable::<TimeVarying>::new("R_470", "sr-1").with_attribute("long_name", "Rrs_470 nm"), 1.0),
        (Variable::<TimeVarying>::new("R_555", "sr-1").with_attribute("long_name", "Rrs_555 nm"), 0.5),
        (Variable::<TimeVarying>::new("R_645", "sr-1").with_attribute("long_name", "Rrs_645 nm"), 0.1),
    ];

    for &lat in &lats {
        for &lon in &lons {
            for hour in (hours_between(epoch, start)..hours_between(epoch, end)).step_by(24) {
                let time = hours_after(epoch, hour);
                for (variable, max) in bands.iter_mut() {
                    let value = linear_gradient(
                        rng,
                        lat as f64,
                        lon as f64 + 102.0,
                        0.0,
                        *max,
                        360.0,
                        90.0,
                        0.05,
                    );
                    variable.add_data_point(lat, lon, time, value);
                }
            }
        }
    }

    let mut dataset = Dataset::new();
    dataset.set_global_attribute("title", "GBR4 BGC (Spectral) Transport");
    dataset.set_global_attribute("paramhead", "GBR 4km resolution grid");
    for (variable, _) in bands {
        dataset.add_variable(variable);
    }
    dataset
}

/// NOAA wave model, every 3 hours: a wave direction dataset and a wave
/// height dataset, both counting hours from `start`.
pub fn noaa<R: Rng>(rng: &mut R, start: DateTime<FixedOffset>, end: DateTime<Utc>) -> (Dataset, Dataset) {
    let lats = coordinates(-90.0, 0.0, 45);
    let lons = coordinates(0.0, 180.0, 90);

    let epoch = start.with_timezone(&Utc);
    let time_unit = format!(
        "Hour since {}",
        start.to_rfc3339_opts(SecondsFormat::Millis, false)
    );
    let hours = hours_between(epoch, end);
    let hour_offset = hours_between(default_epoch(), epoch);

    let mut direction =
        Variable::<TimeVarying>::new("Primary_wave_direction_surface", "degree.true");
    let mut height = Variable::<TimeVarying>::new(
        "Significant_height_of_combined_wind_waves_and_swell_surface",
        "m",
    );

    for &lat in &lats {
        for &lon in &lons {
            for hour in (0..hours).step_by(3) {
                let time = epoch + Duration::hours(hour);

                // Towards the Queensland coast, 0 degree pointing South
                direction.add_data_point(lat, lon, time, 50.0 + (rng.gen::<f64>() * 40.0 - 5.0));

                // Moves up and down like the tides
                let drift = (hour_offset + hour) as f64 / 3.0;
                let value =
                    linear_gradient(rng, lat as f64, lon as f64 + drift, 0.0, 4.0, 60.0, 70.0, 0.05);
                height.add_data_point(lat, lon, time, value);
            }
        }
    }

    let mut direction_dataset = Dataset::new();
    direction_dataset.set_time_unit(time_unit.clone(), epoch);
    direction_dataset.add_variable(direction);

    let mut height_dataset = Dataset::new();
    height_dataset.set_time_unit(time_unit, epoch);
    height_dataset.add_variable(height);

    (direction_dataset, height_dataset)
}

/// 100x100 grid with every variable shape, hourly.
pub fn test<R: Rng>(rng: &mut R, start: DateTime<Utc>, end: DateTime<Utc>) -> Dataset {
    let lats = coordinates(-50.0, 50.0, 100);
    let lons = coordinates(-50.0, 50.0, 100);
    let hours = hours_between(start, end);
    let half = hours as f64 / 2.0;

    let mut botz = Variable::<Plain>::new("botz", "metre");
    let mut botz2 = Variable::<Plain>::new("botz2", "metre");
    let mut linear = Variable::<TimeVarying>::new("testLinearGradient", "Index");
    let mut radial = Variable::<TimeVarying>::new("testRadialGradient", "Index");
    let mut wave_u = Variable::<TimeVarying>::new("testWaveU", "m");
    let mut wave_v = Variable::<TimeVarying>::new("testWaveV", "m");

    for &lat in &lats {
        for &lon in &lons {
            let depth = bathymetry(lat, lon);
            botz.add_data_point(lat, lon, depth);
            botz2.add_data_point(lat, lon, -depth);

            let (lat_f, lon_f) = (lat as f64, lon as f64);
            for hour in 0..hours {
                let time = start + Duration::hours(hour);
                let h = hour as f64;

                // One full turn over the period
                let angle = h * (360.0 / hours as f64);
                let value = linear_gradient(rng, lat_f, lon_f, 0.0, 10.0, 50.0, angle, 0.0);
                linear.add_data_point(lat, lon, time, value);

                // Noisiest in the middle of the period
                let noise = ((h - half).abs() - half).abs() * 0.01;
                let value = radial_gradient(rng, lat_f, lon_f, -10.0, 2.0, 50.0, noise);
                radial.add_data_point(lat, lon, time, value);

                let u = linear_gradient(rng, lat_f, lon_f - h, -4.0, 0.0, 100.0, 70.0, 0.0);
                let v = linear_gradient(rng, lat_f - h, lon_f, 2.0, 10.0, 50.0, -20.0, 0.0);
                wave_u.add_data_point(lat, lon, time, u);
                wave_v.add_data_point(lat, lon, time, v);
            }
        }
    }

    let mut dataset = Dataset::new();
    dataset.add_variable(botz);
    dataset.add_variable(botz2);
    dataset.add_variable(linear);
    dataset.add_variable(radial);
    dataset.add_vector_variable(VectorVariable::new("testWave", wave_u, wave_v));
    dataset
}
