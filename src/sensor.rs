use std::ops::RangeInclusive;

use rand::Rng;

use crate::models::reading::Measurement;

pub const TEMPERATURE_RANGE: RangeInclusive<f64> = 15.0..=30.0; // Celsius
pub const HUMIDITY_RANGE: RangeInclusive<f64> = 40.0..=80.0; // Percent
pub const PRESSURE_RANGE: RangeInclusive<f64> = 1000.0..=1025.0; // hPa

/// Simulate one sample from the weather sensor.
pub fn generate_reading() -> Measurement {
    generate_reading_with(&mut rand::rng())
}

/// Simulate one sample using the supplied random number generator.
///
/// Every value is drawn independently and rounded to two decimals, so
/// they always stay inside their range.
pub fn generate_reading_with<R: Rng + ?Sized>(rng: &mut R) -> Measurement {
    Measurement {
        temperature: draw(rng, TEMPERATURE_RANGE),
        humidity: draw(rng, HUMIDITY_RANGE),
        pressure: draw(rng, PRESSURE_RANGE),
    }
}

fn draw<R: Rng + ?Sized>(rng: &mut R, range: RangeInclusive<f64>) -> f64 {
    round_to_hundredths(rng.random_range(range))
}

/// Rounds half away from zero.
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
