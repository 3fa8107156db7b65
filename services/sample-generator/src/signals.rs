//! Synthetic value fields for sample files.
//!
//! Every gradient draws two values from the generator, even when `noise` is
//! zero, so the sequence of draws only depends on the number of calls.

use std::f64::consts::PI;

use rand::Rng;

/// `steps` evenly spaced values from `min` to `max`, both inclusive.
pub fn coordinates(min: f32, max: f32, steps: usize) -> Vec<f32> {
    match steps {
        0 => Vec::new(),
        1 => vec![min],
        _ => (0..steps)
            .map(|i| min + (max - min) * i as f32 / (steps - 1) as f32)
            .collect(),
    }
}

fn jitter<R: Rng + ?Sized>(rng: &mut R, lat: f64, lon: f64, noise: f64) -> (f64, f64) {
    let noisy_lat = lat + (rng.gen::<f64>() - 0.5) * 90.0 * noise;
    let noisy_lon = lon + (rng.gen::<f64>() - 0.5) * 90.0 * noise;
    (noisy_lat, noisy_lon)
}

/// Sine bands of wavelength `frequency` degrees, rotated by `angle` degrees,
/// scaled to `[min, max]`.
#[allow(clippy::too_many_arguments)]
pub fn linear_gradient<R: Rng + ?Sized>(
    rng: &mut R,
    lat: f64,
    lon: f64,
    min: f64,
    max: f64,
    frequency: f64,
    angle: f64,
    noise: f64,
) -> f64 {
    let (lat, lon) = jitter(rng, lat, lon, noise);
    let angle = angle.to_radians();

    let wave = (2.0 * PI * (lat * angle.cos() + lon * angle.sin()) / frequency).sin();
    min + (wave + 1.0) / 2.0 * (max - min)
}

/// Egg-box pattern of period `diameter` degrees, scaled to `[min, max]`.
pub fn radial_gradient<R: Rng + ?Sized>(
    rng: &mut R,
    lat: f64,
    lon: f64,
    min: f64,
    max: f64,
    diameter: f64,
    noise: f64,
) -> f64 {
    let (lat, lon) = jitter(rng, lat, lon, noise);

    let wave = (2.0 * PI * lat / diameter).cos() + (2.0 * PI * lon / diameter).sin();
    min + (wave + 2.0) / 4.0 * (max - min)
}
