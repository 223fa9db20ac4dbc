//! Two-axis tracked concentrator.

use tracing::debug;

use super::SystemResult;
use super::simulator::{ResultBuilder, Simulator, aligned_inputs};
use crate::error::ModelResult;
use crate::physics::engine::PhysicsEngine;
use crate::weather::{SolarPositionSeries, WeatherSeries};

impl<E: PhysicsEngine> Simulator<E> {
    /// Simulates the concentrator on a two-axis tracker.
    ///
    /// The module faces the sun, so it converts the full DNI without angular
    /// losses. Both power series are de-rated by the utilization factor.
    ///
    /// # Arguments
    ///
    /// * `weather` - Input weather series
    /// * `solar` - Sun positions aligned with `weather`
    /// * `optical_efficiency` - Multiplier on the reference photocurrent
    ///
    /// # Errors
    ///
    /// Returns `ModelError::LengthMismatch` for misaligned inputs and
    /// `ModelError::InvalidModule` for a non-positive optical efficiency.
    pub fn cpv(
        &self,
        weather: &WeatherSeries,
        solar: &SolarPositionSeries,
        optical_efficiency: f64,
    ) -> ModelResult<SystemResult> {
        let module = self.cpv.with_optical_efficiency(optical_efficiency)?;
        let augmented = self.airmass_weather(weather, solar)?;
        let mut out = ResultBuilder::with_capacity(weather.len());

        for ((sample, _), &airmass) in
            aligned_inputs(&augmented.weather, solar)?.zip(&augmented.airmass)
        {
            let irradiance = sample.dni;
            let temp_cell = self.engine.estimate_cell_temperature(
                &self.cpv_temperature,
                irradiance,
                sample.temp_air,
                sample.wind_speed,
            );
            let (mpp, mpp_25) = self.operating_points(&module, irradiance, temp_cell);
            let uf = self.utilization_factor(&module, airmass, sample.temp_air);
            out.push(
                sample.timestamp,
                irradiance,
                irradiance,
                temp_cell,
                mpp.p_mp * uf,
                mpp_25.p_mp * uf,
            );
        }

        let stc_power = self.stc_power(&module);
        debug!(
            system = "cpv",
            samples = weather.len(),
            optical_efficiency,
            stc_power,
            "simulated tracked concentrator"
        );
        Ok(out.finish(stc_power, module.area()))
    }
}
