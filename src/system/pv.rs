//! Flat-plate PV on a fixed rack or a single-axis tracker.

use tracing::debug;

use super::SystemResult;
use super::simulator::{ResultBuilder, Simulator, aligned_inputs};
use crate::error::ModelResult;
use crate::physics::engine::PhysicsEngine;
use crate::physics::irradiance::DiffuseModel;
use crate::physics::tracking::Mounting;
use crate::weather::{SolarPositionSeries, WeatherSeries};

impl<E: PhysicsEngine> Simulator<E> {
    /// Simulates the flat-plate module.
    ///
    /// The reported irradiance is the POA global irradiance; the effective
    /// irradiance applies the flat-plate angular losses.
    ///
    /// # Arguments
    ///
    /// * `weather` - Input weather series
    /// * `solar` - Sun positions aligned with `weather`
    /// * `mounting` - Fixed rack or single-axis tracker
    /// * `diffuse_model` - Sky diffuse transposition model
    ///
    /// # Errors
    ///
    /// Returns `ModelError::LengthMismatch` if `solar` is not aligned with
    /// `weather`.
    pub fn pv(
        &self,
        weather: &WeatherSeries,
        solar: &SolarPositionSeries,
        mounting: Mounting,
        diffuse_model: DiffuseModel,
    ) -> ModelResult<SystemResult> {
        let module = &self.flat_plate;
        let mut out = ResultBuilder::with_capacity(weather.len());

        for (sample, sun) in aligned_inputs(weather, solar)? {
            let orientation = self
                .engine
                .compute_tracking_geometry(&sun, &mounting, &self.tracker);
            let sky = self.sky(&sample, &sun);
            let poa = self
                .engine
                .decompose_irradiance(diffuse_model, &orientation.surface, &sun, &sky);

            let irradiance = poa.global;
            let effective = irradiance * self.flat_plate_iam.modifier(orientation.aoi);
            let temp_cell = self.engine.estimate_cell_temperature(
                &self.flat_plate_temperature,
                effective,
                sample.temp_air,
                sample.wind_speed,
            );
            let (mpp, mpp_25) = self.operating_points(module, effective, temp_cell);
            out.push(
                sample.timestamp,
                irradiance,
                effective,
                temp_cell,
                mpp.p_mp,
                mpp_25.p_mp,
            );
        }

        let stc_power = self.stc_power(module);
        debug!(
            system = "pv",
            samples = weather.len(),
            %diffuse_model,
            stc_power,
            "simulated flat-plate system"
        );
        Ok(out.finish(stc_power, module.area()))
    }
}
