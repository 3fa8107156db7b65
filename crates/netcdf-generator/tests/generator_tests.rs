//! Write-plan tests against the in-memory sink.

use chrono::{DateTime, Duration, Utc};
use netcdf_generator::{
    hours_between, ArraySink, Dataset, GeneratorError, Generator, MemorySink, Plain,
    TimeDepthVarying, TimeVarying, Variable, VectorVariable,
};
use test_utils::{
    assert_approx_eq, assert_axis_approx_eq, depths, grid, nan_positions, predictable_value,
    time::reference_time,
};

fn t(hours: i64) -> DateTime<Utc> {
    reference_time() + Duration::hours(hours)
}

fn plain_2x2(skip: Option<(usize, usize)>) -> Variable<Plain> {
    let layout = grid::SIMPLE_2X2;
    let mut botz = Variable::<Plain>::new("botz", "metre");
    for (i, lat) in layout.latitudes().into_iter().enumerate() {
        for (j, lon) in layout.longitudes().into_iter().enumerate() {
            if skip != Some((i, j)) {
                botz.add_data_point(lat, lon, predictable_value(i, j));
            }
        }
    }
    botz
}

fn generate(datasets: &[Dataset]) -> MemorySink {
    let mut sink = MemorySink::new();
    Generator::default()
        .write_to(&mut sink, datasets)
        .expect("generation should succeed");
    sink
}

fn f64_values<'a>(sink: &'a MemorySink, name: &str) -> &'a [f64] {
    sink.variable(name)
        .and_then(|v| v.as_f64())
        .unwrap_or_else(|| panic!("missing float64 variable {}", name))
}

// ============================================================================
// Plain variables
// ============================================================================

#[test]
fn test_fully_populated_plain_variable_has_no_nan() {
    let mut dataset = Dataset::new();
    dataset.add_variable(plain_2x2(None));
    let sink = generate(&[dataset]);

    let botz = f64_values(&sink, "botz");
    assert_eq!(botz, &[0.0, 1000.0, 1.0, 1001.0]);
    assert!(nan_positions(botz).is_empty());
    assert_eq!(sink.shape("botz"), Some(vec![2, 2]));
}

#[test]
fn test_missing_plain_cell_is_nan() {
    let mut dataset = Dataset::new();
    dataset.add_variable(plain_2x2(Some((1, 0))));
    let sink = generate(&[dataset]);

    let botz = f64_values(&sink, "botz");
    assert_eq!(nan_positions(botz), vec![2]);
    assert_eq!(botz[3], 1001.0);
}

#[test]
fn test_plain_only_dataset_has_empty_time_axis() {
    let mut dataset = Dataset::new();
    dataset.add_variable(plain_2x2(None));
    let sink = generate(&[dataset]);

    let time = sink.dimension("time").expect("time dimension");
    assert!(time.unlimited);
    assert_eq!(time.len, 0);
    assert!(sink.dimension("zc").is_none());
    assert!(sink.variable("zc").is_none());
}

// ============================================================================
// Coordinate variables
// ============================================================================

#[test]
fn test_coordinate_variables_and_attributes() {
    let mut temp = Variable::<TimeDepthVarying>::new("temp", "degrees C");
    temp.add_data_point(-20.0, 150.0, t(0), -49.0, 25.0);
    temp.add_data_point(-10.0, 145.0, t(0), -1.5, 27.0);
    let mut dataset = Dataset::new();
    dataset.add_variable(temp);
    let sink = generate(&[dataset]);

    let lat = sink.variable("lat").unwrap();
    assert_eq!(lat.as_f32(), Some(&[-20.0f32, -10.0][..]));
    assert_eq!(lat.attribute("units"), Some("degrees_north"));
    assert_eq!(lat.attribute("_CoordinateAxisType"), Some("Lat"));

    let lon = sink.variable("lon").unwrap();
    assert_eq!(lon.as_f32(), Some(&[145.0f32, 150.0][..]));
    assert_eq!(lon.attribute("units"), Some("degrees_east"));
    assert_eq!(lon.attribute("_CoordinateAxisType"), Some("Lon"));

    let time = sink.variable("time").unwrap();
    assert_eq!(time.attribute("units"), Some("hours since 1990-01-01"));
    assert_eq!(time.attribute("_CoordinateAxisType"), Some("Time"));

    let zc = sink.variable("zc").unwrap();
    assert_eq!(zc.as_f64(), Some(&[-49.0, -1.5][..]));
    assert_eq!(zc.attribute("units"), Some("m"));
    assert_eq!(zc.attribute("_CoordinateAxisType"), Some("Height"));
    assert_eq!(zc.attribute("_CoordinateZisPositive"), Some("up"));

    let temp = sink.variable("temp").unwrap();
    assert_eq!(temp.dimensions, vec!["time", "lat", "lon", "zc"]);
    assert_eq!(temp.attribute("units"), Some("degrees C"));
}

#[test]
fn test_axes_are_sorted_whatever_the_insertion_order() {
    let layout = grid::GBR4;
    let mut lats = layout.latitudes();
    lats.reverse();
    let mut botz = Variable::<Plain>::new("botz", "metre");
    for lat in &lats {
        for lon in layout.longitudes().iter().rev() {
            botz.add_data_point(*lat, *lon, 1.0);
        }
    }
    let mut dataset = Dataset::new();
    dataset.add_variable(botz);
    let sink = generate(&[dataset]);

    let expected = layout.latitudes();
    let lat = sink.variable("lat").and_then(|v| v.as_f32()).unwrap();
    assert_axis_approx_eq!(lat, &expected[..], 1e-6);
    assert!(lat.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(sink.dimension("lon").map(|d| d.len), Some(10));
}

// ============================================================================
// Time records
// ============================================================================

#[test]
fn test_only_used_times_become_records() {
    let layout = grid::SIMPLE_2X2;
    let mut wind = Variable::<TimeVarying>::new("wspeed_u", "ms-1");
    for lat in layout.latitudes() {
        for lon in layout.longitudes() {
            wind.add_data_point(lat, lon, t(0), 1.0);
            wind.add_data_point(lat, lon, t(2), 3.0);
        }
    }
    let mut dataset = Dataset::new();
    dataset.add_variable(wind);
    let sink = generate(&[dataset]);

    assert_eq!(sink.dimension("time").map(|d| d.len), Some(2));
    let epoch = netcdf_generator::default_epoch();
    let time = sink.variable("time").and_then(|v| v.as_i32()).unwrap();
    assert_eq!(
        time,
        &[hours_between(epoch, t(0)) as i32, hours_between(epoch, t(2)) as i32]
    );
    assert_eq!(time[1] - time[0], 2);

    let wind = f64_values(&sink, "wspeed_u");
    assert_eq!(wind, &[1.0, 1.0, 1.0, 1.0, 3.0, 3.0, 3.0, 3.0]);
}

#[test]
fn test_record_missing_for_one_variable_is_nan() {
    let mut temp = Variable::<TimeVarying>::new("temp", "C");
    let mut salt = Variable::<TimeVarying>::new("salt", "PSU");
    for hour in 0..3 {
        if hour != 1 {
            temp.add_data_point(0.0, 0.0, t(hour), 20.0 + hour as f64);
        }
        salt.add_data_point(0.0, 0.0, t(hour), 35.0);
    }
    let mut dataset = Dataset::new();
    dataset.add_variable(temp);
    dataset.add_variable(salt);
    let sink = generate(&[dataset]);

    let temp = f64_values(&sink, "temp");
    assert_eq!(temp.len(), 3);
    assert_eq!(temp[0], 20.0);
    assert!(temp[1].is_nan());
    assert_eq!(temp[2], 22.0);
    assert!(nan_positions(f64_values(&sink, "salt")).is_empty());
}

#[test]
fn test_custom_time_unit() {
    let start = t(0);
    let mut wave = Variable::<TimeVarying>::new("Significant_height", "m");
    wave.add_data_point(-45.0, 90.0, start + Duration::hours(3), 1.5);
    wave.add_data_point(-45.0, 90.0, start + Duration::hours(6), 2.5);

    let mut dataset = Dataset::new();
    dataset.set_time_unit("Hour since 2019-01-01T00:00:00+10:00", start);
    dataset.add_variable(wave);
    let sink = generate(&[dataset]);

    let time = sink.variable("time").unwrap();
    assert_eq!(time.attribute("units"), Some("Hour since 2019-01-01T00:00:00+10:00"));
    assert_eq!(time.as_i32(), Some(&[3, 6][..]));
}

#[test]
fn test_time_before_epoch_is_floored() {
    let epoch = netcdf_generator::default_epoch();
    let mut wind = Variable::<TimeVarying>::new("wspeed_u", "ms-1");
    wind.add_data_point(0.0, 0.0, epoch - Duration::minutes(30), 1.0);
    let mut dataset = Dataset::new();
    dataset.add_variable(wind);
    let sink = generate(&[dataset]);

    assert_eq!(sink.variable("time").and_then(|v| v.as_i32()), Some(&[-1][..]));
}

// ============================================================================
// Depth
// ============================================================================

#[test]
fn test_one_missing_depth_sample_gives_one_nan() {
    let layout = grid::SIMPLE_2X2;
    let mut temp = Variable::<TimeDepthVarying>::new("temp", "C");
    for lat in layout.latitudes() {
        for lon in layout.longitudes() {
            for (k, depth) in depths::SHALLOW.iter().enumerate() {
                if (lat, lon, k) == (-10.0, 145.0, 2) {
                    continue;
                }
                temp.add_data_point(lat, lon, t(0), *depth, 20.0 + k as f64);
            }
        }
    }
    let mut dataset = Dataset::new();
    dataset.add_variable(temp);
    let sink = generate(&[dataset]);

    assert_eq!(sink.shape("temp"), Some(vec![1, 2, 2, 3]));
    let temp = f64_values(&sink, "temp");
    // Heights sort ascending: -49 (k = 2) comes first.
    assert_eq!(nan_positions(temp), vec![6]);
    assert_eq!(temp[0], 22.0);
    assert_eq!(temp[2], 20.0);
}

#[test]
fn test_depth_axis_spans_all_variables() {
    let mut temp = Variable::<TimeDepthVarying>::new("temp", "C");
    temp.add_data_point(0.0, 0.0, t(0), -1.5, 25.0);
    let mut salt = Variable::<TimeDepthVarying>::new("salt", "PSU");
    salt.add_data_point(0.0, 0.0, t(0), -17.75, 35.0);
    let mut dataset = Dataset::new();
    dataset.add_variable(temp);
    dataset.add_variable(salt);
    let sink = generate(&[dataset]);

    let temp = f64_values(&sink, "temp");
    assert!(temp[0].is_nan());
    assert_eq!(temp[1], 25.0);
    let salt = f64_values(&sink, "salt");
    assert_eq!(salt[0], 35.0);
    assert!(salt[1].is_nan());
}

// ============================================================================
// Vector pairs
// ============================================================================

#[test]
fn test_vector_components_written_after_variables() {
    let mut u = Variable::<TimeVarying>::new("wspeed_u", "ms-1");
    let mut v = Variable::<TimeVarying>::new("wspeed_v", "ms-1");
    u.add_data_point(0.0, 0.0, t(0), 3.0);
    v.add_data_point(0.0, 0.0, t(0), -4.0);
    let mut dataset = Dataset::new();
    dataset.add_vector_variable(VectorVariable::new("wind", u, v));
    dataset.add_variable(plain_2x2(None));
    let sink = generate(&[dataset]);

    let names: Vec<_> = sink.variables().iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["lat", "lon", "time", "botz", "wspeed_u", "wspeed_v"]);

    let u = sink.variable("wspeed_u").unwrap();
    assert_eq!(u.attribute("standard_name"), Some("eastward_wind"));
    let v = sink.variable("wspeed_v").unwrap();
    assert_eq!(v.attribute("standard_name"), Some("northward_wind"));

    // The 1x1 pair grid is padded to the dataset's 3x3 lat/lon axes.
    let u_values = f64_values(&sink, "wspeed_u");
    assert_eq!(u_values.len(), 9);
    assert_eq!(nan_positions(u_values).len(), 8);
}

// ============================================================================
// Multiple hypercubes
// ============================================================================

#[test]
fn test_two_datasets_get_distinct_names() {
    let mut first = Dataset::new();
    first.set_global_attribute("title", "Multi Hypercube");
    first.set_global_attribute("source", "first");
    let mut temp = Variable::<TimeDepthVarying>::new("temp", "C");
    temp.add_data_point(-20.0, 145.0, t(0), -1.5, 25.0);
    first.add_variable(temp);

    let mut second = Dataset::new();
    second.set_global_attribute("source", "second");
    let mut salt = Variable::<TimeVarying>::new("salt", "PSU");
    salt.add_data_point(-25.0, 150.0, t(2), 35.0);
    salt.add_data_point(-24.0, 151.0, t(5), 35.5);
    second.add_variable(salt);

    let sink = generate(&[first, second]);

    for name in ["lat", "lon", "time", "zc", "lat1", "lon1", "time1"] {
        assert!(sink.dimension(name).is_some(), "missing dimension {}", name);
        assert!(sink.variable(name).is_some(), "missing variable {}", name);
    }
    assert!(sink.dimension("zc1").is_none());

    assert_eq!(sink.dimension("time").map(|d| d.len), Some(1));
    assert_eq!(sink.dimension("time1").map(|d| d.len), Some(2));
    assert_eq!(sink.variable("salt").unwrap().dimensions, vec!["time1", "lat1", "lon1"]);
    assert_eq!(sink.variable("lat1").and_then(|v| v.as_f32()), Some(&[-25.0f32, -24.0][..]));

    assert_eq!(sink.global_attribute("title"), Some("Multi Hypercube"));
    assert_eq!(sink.global_attribute("source"), Some("second"));
}

#[test]
fn test_summary_reports_layout() {
    let mut dataset = Dataset::new();
    dataset.add_variable(plain_2x2(None));
    let mut wind = Variable::<TimeVarying>::new("wspeed_u", "ms-1");
    wind.add_data_point(-20.0, 145.0, t(0), 1.0);
    wind.add_data_point(-20.0, 145.0, t(1), 1.0);
    dataset.add_variable(wind);

    let mut sink = MemorySink::new();
    let summary = Generator::default().write_to(&mut sink, &[dataset]).unwrap();

    assert_eq!(summary.hypercubes.len(), 1);
    let cube = &summary.hypercubes[0];
    assert_eq!(cube.axis_names.time, "time");
    assert_eq!((cube.latitudes, cube.longitudes, cube.heights), (2, 2, 0));
    assert_eq!(cube.records, 2);
    assert_eq!(summary.variable_count(), 2);
    assert_eq!(summary.records(), 2);
}

// ============================================================================
// Errors and resource release
// ============================================================================

#[test]
fn test_empty_dataset_rejected_before_io() {
    let mut sink = MemorySink::new();
    let err = Generator::default()
        .write_to(&mut sink, &[Dataset::new()])
        .unwrap_err();

    assert!(matches!(err, GeneratorError::EmptyDataset { index: 0 }));
    assert!(err.is_invalid_invocation());
    assert!(sink.dimensions().is_empty());
    assert!(!sink.is_closed());
}

#[test]
fn test_depth_variable_without_depths_rejected() {
    let mut dataset = Dataset::new();
    dataset.add_variable(plain_2x2(None));
    dataset.add_variable(Variable::<TimeDepthVarying>::new("temp", "C"));

    let mut sink = MemorySink::new();
    let err = Generator::default().write_to(&mut sink, &[dataset]).unwrap_err();
    assert!(matches!(err, GeneratorError::MissingHeightAxis { ref variable, .. } if variable == "temp"));
    assert_eq!(sink.write_count(), 0);
}

#[test]
fn test_duplicate_variable_names_across_datasets() {
    let mut first = Dataset::new();
    first.add_variable(plain_2x2(None));
    let mut second = Dataset::new();
    second.add_variable(plain_2x2(None));

    let mut sink = MemorySink::new();
    let err = Generator::default().write_to(&mut sink, &[first, second]).unwrap_err();
    assert!(matches!(err, GeneratorError::Schema(_)));
    assert!(sink.is_closed());
}

#[test]
fn test_storage_failure_aborts_and_closes() {
    let mut dataset = Dataset::new();
    dataset.add_variable(plain_2x2(None));
    let mut sink = MemorySink::new().with_write_failure("lon");

    let err = Generator::default().write_to(&mut sink, &[dataset]).unwrap_err();
    assert!(matches!(err, GeneratorError::Storage(_)));
    assert!(sink.is_closed());
    assert_eq!(sink.flush_count(), 1);
    // Only the latitude axis made it.
    assert_eq!(sink.write_count(), 1);
    assert!(sink.variable("botz").and_then(|v| v.as_f64()).is_some());
}

#[test]
fn test_close_failure_surfaces() {
    let mut dataset = Dataset::new();
    dataset.add_variable(plain_2x2(None));
    let mut sink = MemorySink::new().with_close_failure();

    let err = Generator::default().write_to(&mut sink, &[dataset]).unwrap_err();
    assert!(matches!(err, GeneratorError::Storage(ref msg) if msg.contains("close")));
    assert_approx_eq!(f64_values(&sink, "botz")[3], 1001.0, 1e-9);
}

#[test]
fn test_write_failure_wins_over_close_failure() {
    let mut dataset = Dataset::new();
    dataset.add_variable(plain_2x2(None));
    let mut sink = MemorySink::new()
        .with_write_failure("botz")
        .with_close_failure();

    let err = Generator::default().write_to(&mut sink, &[dataset]).unwrap_err();
    assert!(matches!(err, GeneratorError::Storage(ref msg) if msg.contains("botz")));
    assert!(sink.is_closed());
}

#[test]
fn test_sink_cannot_be_reused_after_generation() {
    let mut dataset = Dataset::new();
    dataset.add_variable(plain_2x2(None));
    let mut sink = generate(&[dataset]);
    assert!(sink.is_closed());
    assert!(sink.flush().is_err());
}
