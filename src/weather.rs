//! Time-aligned meteorological input and a synthetic day generator.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::error::{ModelError, ModelResult};
use crate::physics::engine::PhysicsEngine;
use crate::physics::solar::{Location, SolarPosition, relative_airmass};

/// Weather for one timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherSample {
    pub timestamp: DateTime<Utc>,
    pub ghi: f64,
    pub dhi: f64,
    pub dni: f64,
    /// Ambient temperature (°C).
    pub temp_air: f64,
    /// Wind speed (m/s).
    pub wind_speed: f64,
}

/// Aligned weather series. Irradiance in W/m².
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeatherSeries {
    timestamps: Vec<DateTime<Utc>>,
    ghi: Vec<f64>,
    dhi: Vec<f64>,
    dni: Vec<f64>,
    temp_air: Vec<f64>,
    wind_speed: Vec<f64>,
}

impl WeatherSeries {
    /// Builds a series from columns.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::LengthMismatch` if any column differs in length
    /// from `timestamps`.
    pub fn new(
        timestamps: Vec<DateTime<Utc>>,
        ghi: Vec<f64>,
        dhi: Vec<f64>,
        dni: Vec<f64>,
        temp_air: Vec<f64>,
        wind_speed: Vec<f64>,
    ) -> ModelResult<Self> {
        let n = timestamps.len();
        ModelError::check_len("ghi", n, ghi.len())?;
        ModelError::check_len("dhi", n, dhi.len())?;
        ModelError::check_len("dni", n, dni.len())?;
        ModelError::check_len("temp_air", n, temp_air.len())?;
        ModelError::check_len("wind_speed", n, wind_speed.len())?;
        Ok(Self {
            timestamps,
            ghi,
            dhi,
            dni,
            temp_air,
            wind_speed,
        })
    }

    /// Builds a series from row samples.
    pub fn from_samples(samples: &[WeatherSample]) -> Self {
        Self {
            timestamps: samples.iter().map(|s| s.timestamp).collect(),
            ghi: samples.iter().map(|s| s.ghi).collect(),
            dhi: samples.iter().map(|s| s.dhi).collect(),
            dni: samples.iter().map(|s| s.dni).collect(),
            temp_air: samples.iter().map(|s| s.temp_air).collect(),
            wind_speed: samples.iter().map(|s| s.wind_speed).collect(),
        }
    }

    /// Number of timestamps.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether the series holds no timestamps.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// UTC timestamps.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Global horizontal irradiance (W/m²).
    pub fn ghi(&self) -> &[f64] {
        &self.ghi
    }

    /// Diffuse horizontal irradiance (W/m²).
    pub fn dhi(&self) -> &[f64] {
        &self.dhi
    }

    /// Direct normal irradiance (W/m²).
    pub fn dni(&self) -> &[f64] {
        &self.dni
    }

    /// Ambient temperature (°C).
    pub fn temp_air(&self) -> &[f64] {
        &self.temp_air
    }

    /// Wind speed (m/s).
    pub fn wind_speed(&self) -> &[f64] {
        &self.wind_speed
    }

    /// Row at index `i`, `None` past the end.
    pub fn sample(&self, i: usize) -> Option<WeatherSample> {
        Some(WeatherSample {
            timestamp: *self.timestamps.get(i)?,
            ghi: self.ghi[i],
            dhi: self.dhi[i],
            dni: self.dni[i],
            temp_air: self.temp_air[i],
            wind_speed: self.wind_speed[i],
        })
    }

    /// Every row in timestamp order.
    pub fn samples(&self) -> impl Iterator<Item = WeatherSample> + '_ {
        (0..self.len()).filter_map(|i| self.sample(i))
    }

    /// Copy of this series with the absolute airmass of every timestamp.
    ///
    /// The concentrator orchestrators read their per-step airmass from this
    /// copy; `self` is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::LengthMismatch` if `solar` is not aligned.
    pub fn with_airmass<E: PhysicsEngine>(
        &self,
        engine: &E,
        location: &Location,
        solar: &SolarPositionSeries,
    ) -> ModelResult<AirmassWeather> {
        ModelError::check_len("solar_position", self.len(), solar.len())?;
        let airmass = solar
            .iter()
            .map(|sun| engine.compute_airmass(location, &sun))
            .collect();
        Ok(AirmassWeather {
            weather: self.clone(),
            airmass,
        })
    }
}

/// Weather series augmented with absolute airmass.
#[derive(Debug, Clone, PartialEq)]
pub struct AirmassWeather {
    /// Unmodified input series.
    pub weather: WeatherSeries,
    /// `None` where the sun is below the horizon.
    pub airmass: Vec<Option<f64>>,
}

/// Aligned solar zenith and azimuth (degrees).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SolarPositionSeries {
    zenith: Vec<f64>,
    azimuth: Vec<f64>,
}

impl SolarPositionSeries {
    /// Builds a series from zenith and azimuth columns (degrees).
    ///
    /// # Errors
    ///
    /// Returns `ModelError::LengthMismatch` if the columns differ in length.
    pub fn new(zenith: Vec<f64>, azimuth: Vec<f64>) -> ModelResult<Self> {
        ModelError::check_len("azimuth", zenith.len(), azimuth.len())?;
        Ok(Self { zenith, azimuth })
    }

    /// Sun position at every timestamp of `weather`.
    pub fn compute<E: PhysicsEngine>(
        engine: &E,
        location: &Location,
        weather: &WeatherSeries,
    ) -> Self {
        weather
            .timestamps()
            .iter()
            .map(|&t| engine.compute_solar_position(location, t))
            .collect()
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.zenith.len()
    }

    /// Whether the series holds no positions.
    pub fn is_empty(&self) -> bool {
        self.zenith.is_empty()
    }

    /// Zenith angles (degrees).
    pub fn zenith(&self) -> &[f64] {
        &self.zenith
    }

    /// Azimuths (degrees clockwise from north).
    pub fn azimuth(&self) -> &[f64] {
        &self.azimuth
    }

    /// Position at index `i`, `None` past the end.
    pub fn get(&self, i: usize) -> Option<SolarPosition> {
        Some(SolarPosition::new(*self.zenith.get(i)?, self.azimuth[i]))
    }

    /// Positions in timestamp order.
    pub fn iter(&self) -> impl Iterator<Item = SolarPosition> + '_ {
        self.zenith
            .iter()
            .zip(&self.azimuth)
            .map(|(&z, &a)| SolarPosition::new(z, a))
    }
}

impl FromIterator<SolarPosition> for SolarPositionSeries {
    fn from_iter<I: IntoIterator<Item = SolarPosition>>(iter: I) -> Self {
        let (zenith, azimuth) = iter.into_iter().map(|p| (p.zenith, p.azimuth)).unzip();
        Self { zenith, azimuth }
    }
}

/// Minimum clear-sky index (heavy overcast).
const CLEARNESS_MIN: f64 = 0.2;
/// Maximum clear-sky index (cloud-edge enhancement).
const CLEARNESS_MAX: f64 = 1.1;

/// Generator for one synthetic day of weather.
///
/// Irradiance follows the Meinel clear-sky beam model scaled by a clear-sky
/// index that evolves as an AR(1) process:
/// ```text
/// k(t) = alpha * k(t-1) + (1 - alpha) * (1 + epsilon(t))
/// ```
/// clamped to \[0.2, 1.1\]. Lost beam irradiance partly reappears as diffuse.
/// Ambient temperature is a sinusoid peaking mid-afternoon (UTC hour 15).
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticDay {
    /// Calendar day to generate.
    pub date: NaiveDate,
    /// Minutes between samples.
    pub step_minutes: u32,
    /// AR(1) correlation coefficient (0.0 = uncorrelated, 1.0 = clear all day).
    pub alpha: f64,
    /// Standard deviation of the AR(1) innovation noise.
    pub cloud_noise_std: f64,
    /// Daily mean ambient temperature (°C).
    pub temp_mean: f64,
    /// Half the daily temperature swing (K).
    pub temp_amplitude: f64,
    /// Mean wind speed (m/s).
    pub wind_mean: f64,
    /// Seed of the deterministic RNG.
    pub seed: u64,
}

impl SyntheticDay {
    /// Partly cloudy day with default climate values.
    ///
    /// # Arguments
    ///
    /// * `date` - Calendar day, timestamps are UTC
    /// * `step_minutes` - Minutes between samples
    /// * `seed` - Seed making the cloud and wind noise reproducible
    pub fn new(date: NaiveDate, step_minutes: u32, seed: u64) -> Self {
        Self {
            date,
            step_minutes,
            alpha: 0.9,
            cloud_noise_std: 0.2,
            temp_mean: 20.0,
            temp_amplitude: 7.0,
            wind_mean: 2.0,
            seed,
        }
    }

    /// Clear day with no cloud noise.
    pub fn clear(date: NaiveDate, step_minutes: u32) -> Self {
        Self {
            cloud_noise_std: 0.0,
            ..Self::new(date, step_minutes, 0)
        }
    }

    /// Generates the series for `location`.
    ///
    /// # Panics
    ///
    /// Panics if `step_minutes` is zero.
    pub fn generate<E: PhysicsEngine>(&self, engine: &E, location: &Location) -> WeatherSeries {
        assert!(self.step_minutes > 0, "step_minutes must be positive");
        let mut rng = StdRng::seed_from_u64(self.seed);
        let alpha = self.alpha.clamp(0.0, 1.0);
        let start = self.date.and_time(chrono::NaiveTime::MIN).and_utc();
        let steps = (24 * 60 / self.step_minutes) as usize;

        let mut clearness = 1.0;
        let mut samples = Vec::with_capacity(steps);
        for i in 0..steps {
            let timestamp = start + Duration::minutes(i64::from(self.step_minutes) * i as i64);
            let epsilon = gaussian_noise(&mut rng, self.cloud_noise_std);
            clearness = (alpha * clearness + (1.0 - alpha) * (1.0 + epsilon))
                .clamp(CLEARNESS_MIN, CLEARNESS_MAX);

            let sun = engine.compute_solar_position(location, timestamp);
            let (ghi, dhi, dni) = match relative_airmass(sun.zenith) {
                Some(am) => {
                    let cos_z = sun.zenith.to_radians().cos();
                    let dni_clear = 1353.0 * 0.7_f64.powf(am.powf(0.678));
                    let dni = dni_clear * clearness.min(1.0);
                    let dhi = 0.1 * dni_clear + 0.3 * (dni_clear - dni);
                    (dni * cos_z + dhi, dhi, dni)
                }
                None => (0.0, 0.0, 0.0),
            };

            let hours = i as f64 * f64::from(self.step_minutes) / 60.0;
            let phase = 2.0 * std::f64::consts::PI * (hours - 9.0) / 24.0;
            let temp_air = self.temp_mean + self.temp_amplitude * phase.sin();
            let wind_speed =
                (self.wind_mean + gaussian_noise(&mut rng, 0.5 * self.cloud_noise_std)).max(0.0);

            samples.push(WeatherSample {
                timestamp,
                ghi,
                dhi,
                dni,
                temp_air,
                wind_speed,
            });
        }
        WeatherSeries::from_samples(&samples)
    }
}

/// Gaussian noise by the Box-Muller transform.
///
/// Returns 0.0 for a non-positive `std_dev`.
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos() * std_dev
}
