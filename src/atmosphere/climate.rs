//! Diurnal and annual temperature model used by block ticks

use std::f64::consts::PI;

use super::time::{DAYS_PER_YEAR, MINUTES_PER_DAY};

/// Base climate sampled from the terrain generator at a position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Climate {
    /// Mean temperature, degrees Celsius.
    pub temperature: f32,
    /// Yearly rainfall, millimetres.
    pub rainfall: f32,
}

/// Smooth 0→1→0 bump over one period `bound`.
#[inline]
pub fn softrange(f: f64, bound: f64) -> f64 {
    (1.0 - (f * 2.0 * PI / bound).cos()) / 2.0
}

/// Sunlight factor in `[0.02, 1.0]` for a minute of the day, shifted by `delay` minutes.
pub fn sunlight(minute: f64, delay: f64) -> f32 {
    let day = MINUTES_PER_DAY as f64;
    let mut t = minute + delay;
    while t < 0.0 {
        t += day;
    }
    while t > day {
        t -= day;
    }
    (softrange(t, day) * 0.98 + 0.02) as f32
}

/// Local temperature at a minute of `year_day`, swinging around `base_temp`.
///
/// The daily swing is wider in dry climates; the yearly swing peaks three
/// days after mid-year.
pub fn local_temperature(minute: f64, year_day: i32, base_temp: f32, base_rain: f32) -> f32 {
    let daylight = sunlight(minute, -110.0) as f64;
    let dryness = (4000.0 - base_rain as f64) * 0.0025;

    let mut shifted_day = year_day + 3;
    if shifted_day < 0 {
        shifted_day += DAYS_PER_YEAR;
    }
    let year_phase = minute / MINUTES_PER_DAY as f64 + shifted_day as f64;
    let seasonal = softrange(year_phase, DAYS_PER_YEAR as f64);

    (base_temp as f64
        + (daylight * 2.0 - 1.0) * dryness
        + (seasonal - 0.5) * 22.0 * (0.5 + dryness / 8.0)) as f32
}
