//! Site description, sun position and atmospheric quantities.
//!
//! References:
//! - NOAA Global Monitoring Division, "General Solar Position Calculations"
//! - Kasten, F. and Young, A. (1989). "Revised optical air mass tables and
//!   approximation formula"
//! - Spencer, J. W. (1971). "Fourier series representation of the position
//!   of the sun"

use std::f64::consts::PI;

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::Deserialize;

/// Solar constant used for extraterrestrial irradiance (W/m²).
pub const SOLAR_CONSTANT: f64 = 1366.1;

/// Standard sea-level pressure (Pa).
pub const SEA_LEVEL_PRESSURE: f64 = 101_325.0;

/// Geographic site of the system.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Location {
    /// Latitude in decimal degrees, north positive.
    pub latitude: f64,
    /// Longitude in decimal degrees, east positive.
    pub longitude: f64,
    /// Altitude above sea level (m).
    #[serde(default)]
    pub altitude: f64,
}

impl Location {
    /// Creates a site.
    ///
    /// # Arguments
    ///
    /// * `latitude` - Decimal degrees, north positive
    /// * `longitude` - Decimal degrees, east positive
    /// * `altitude` - Meters above sea level
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    /// Site pressure from altitude using the ISA barometric formula (Pa).
    pub fn pressure(&self) -> f64 {
        100.0 * ((44_331.514 - self.altitude) / 11_880.516).powf(1.0 / 0.190_263_2)
    }

    /// Pressure-corrected airmass for a given solar zenith.
    ///
    /// Returns `None` when the sun is at or below the horizon.
    pub fn absolute_airmass(&self, zenith_deg: f64) -> Option<f64> {
        relative_airmass(zenith_deg).map(|am| am * self.pressure() / SEA_LEVEL_PRESSURE)
    }
}

/// Sun position in the horizontal frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarPosition {
    /// Zenith angle (degrees, 0 = overhead).
    pub zenith: f64,
    /// Azimuth (degrees clockwise from north, 180 = south).
    pub azimuth: f64,
}

impl SolarPosition {
    /// Sun position from zenith and azimuth in degrees.
    pub fn new(zenith: f64, azimuth: f64) -> Self {
        Self { zenith, azimuth }
    }

    /// Elevation above the horizon (degrees).
    pub fn elevation(&self) -> f64 {
        90.0 - self.zenith
    }

    /// Whether the sun is above the horizon.
    pub fn is_up(&self) -> bool {
        self.zenith < 90.0
    }
}

/// Computes the sun position at `at` for `location`.
///
/// Uses the NOAA Fourier-series approximations for declination and the
/// equation of time; accurate to a fraction of a degree, which is enough for
/// hourly energy studies.
pub fn solar_position(location: &Location, at: DateTime<Utc>) -> SolarPosition {
    let day_of_year = f64::from(at.ordinal());
    let hour = f64::from(at.hour())
        + f64::from(at.minute()) / 60.0
        + f64::from(at.second()) / 3600.0;

    let g = 2.0 * PI / 365.0 * (day_of_year - 1.0 + (hour - 12.0) / 24.0);

    let eq_time_min = 229.18
        * (0.000_075 + 0.001_868 * g.cos()
            - 0.032_077 * g.sin()
            - 0.014_615 * (2.0 * g).cos()
            - 0.040_849 * (2.0 * g).sin());

    let declination = 0.006_918 - 0.399_912 * g.cos() + 0.070_257 * g.sin()
        - 0.006_758 * (2.0 * g).cos()
        + 0.000_907 * (2.0 * g).sin()
        - 0.002_697 * (3.0 * g).cos()
        + 0.001_48 * (3.0 * g).sin();

    let true_solar_time_min = hour * 60.0 + eq_time_min + 4.0 * location.longitude;
    let hour_angle = (true_solar_time_min / 4.0 - 180.0).to_radians();
    let lat = location.latitude.to_radians();

    let cos_zenith =
        lat.sin() * declination.sin() + lat.cos() * declination.cos() * hour_angle.cos();
    let zenith = cos_zenith.clamp(-1.0, 1.0).acos().to_degrees();

    // Azimuth measured from south, positive westward, then shifted to north.
    let from_south = hour_angle
        .sin()
        .atan2(hour_angle.cos() * lat.sin() - declination.tan() * lat.cos());
    let azimuth = (from_south.to_degrees() + 180.0).rem_euclid(360.0);

    SolarPosition { zenith, azimuth }
}

/// Kasten-Young (1989) relative optical airmass.
///
/// Returns `None` when the sun is at or below the horizon.
pub fn relative_airmass(zenith_deg: f64) -> Option<f64> {
    if !(0.0..90.0).contains(&zenith_deg) {
        return None;
    }
    let z = zenith_deg.to_radians();
    Some(1.0 / (z.cos() + 0.505_72 * (6.079_95 + (90.0 - zenith_deg)).powf(-1.6364)))
}

/// Extraterrestrial normal irradiance for a day of year (Spencer, W/m²).
pub fn extra_radiation(day_of_year: u32) -> f64 {
    let b = 2.0 * PI * (f64::from(day_of_year) - 1.0) / 365.0;
    let distance_factor = 1.000_11
        + 0.034_221 * b.cos()
        + 0.001_28 * b.sin()
        + 0.000_719 * (2.0 * b).cos()
        + 0.000_077 * (2.0 * b).sin();
    SOLAR_CONSTANT * distance_factor
}
