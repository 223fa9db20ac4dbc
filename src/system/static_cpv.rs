//! Static (non-sun-pointing) concentrator on a fixed rack or a single-axis
//! tracker.

use tracing::debug;

use super::SystemResult;
use super::simulator::{ResultBuilder, Simulator, aligned_inputs};
use crate::error::ModelResult;
use crate::module::params::ModuleParameters;
use crate::physics::diode::MaxPowerPoint;
use crate::physics::engine::PhysicsEngine;
use crate::physics::irradiance::beam_component;
use crate::physics::solar::SolarPosition;
use crate::physics::tracking::Mounting;
use crate::weather::{SolarPositionSeries, WeatherSample, WeatherSeries};

/// Per-timestamp state of a static concentrator.
pub(super) struct StaticCpvStep {
    /// Beam irradiance on the module plane.
    pub beam: f64,
    pub effective: f64,
    pub aoi: f64,
    pub temp_cell: f64,
    pub mpp: MaxPowerPoint,
    pub mpp_25: MaxPowerPoint,
    pub utilization: f64,
}

impl<E: PhysicsEngine> Simulator<E> {
    pub(super) fn static_cpv_step(
        &self,
        module: &ModuleParameters,
        sample: &WeatherSample,
        sun: &SolarPosition,
        airmass: Option<f64>,
        mounting: &Mounting,
    ) -> StaticCpvStep {
        let orientation = self
            .engine
            .compute_tracking_geometry(sun, mounting, &self.tracker);
        let beam = beam_component(&orientation.surface, sun, sample.dni);
        let effective = beam * self.cpv_iam.modifier(orientation.aoi);
        let temp_cell = self.engine.estimate_cell_temperature(
            &self.cpv_temperature,
            effective,
            sample.temp_air,
            sample.wind_speed,
        );
        let (mpp, mpp_25) = self.operating_points(module, effective, temp_cell);
        StaticCpvStep {
            beam,
            effective,
            aoi: orientation.aoi,
            temp_cell,
            mpp,
            mpp_25,
            utilization: self.utilization_factor(module, airmass, sample.temp_air),
        }
    }

    /// Simulates the static concentrator.
    ///
    /// The reported irradiance is the beam component on the module plane;
    /// the effective irradiance applies the concentrator IAM.
    ///
    /// # Arguments
    ///
    /// * `weather` - Input weather series
    /// * `solar` - Sun positions aligned with `weather`
    /// * `mounting` - Fixed rack or single-axis tracker
    /// * `optical_efficiency` - Multiplier on the reference photocurrent
    ///
    /// # Errors
    ///
    /// Returns `ModelError::LengthMismatch` for misaligned inputs and
    /// `ModelError::InvalidModule` for a non-positive optical efficiency.
    pub fn static_cpv(
        &self,
        weather: &WeatherSeries,
        solar: &SolarPositionSeries,
        mounting: Mounting,
        optical_efficiency: f64,
    ) -> ModelResult<SystemResult> {
        let module = self.cpv.with_optical_efficiency(optical_efficiency)?;
        let augmented = self.airmass_weather(weather, solar)?;
        let mut out = ResultBuilder::with_capacity(weather.len());

        for ((sample, sun), &airmass) in
            aligned_inputs(&augmented.weather, solar)?.zip(&augmented.airmass)
        {
            let step = self.static_cpv_step(&module, &sample, &sun, airmass, &mounting);
            out.push(
                sample.timestamp,
                step.beam,
                step.effective,
                step.temp_cell,
                step.mpp.p_mp * step.utilization,
                step.mpp_25.p_mp * step.utilization,
            );
        }

        let stc_power = self.stc_power(&module);
        debug!(
            system = "static_cpv",
            samples = weather.len(),
            ?mounting,
            stc_power,
            "simulated static concentrator"
        );
        Ok(out.finish(stc_power, module.area()))
    }
}
