//! Flat plate sharing the aperture of a static concentrator.
//!
//! Inside the concentrator's acceptance angle the beam is focused on the CPV
//! cells, so the flat plate only converts diffuse light plus whatever beam
//! spills off the CPV receivers.

use tracing::debug;

use super::SystemResult;
use super::simulator::{ResultBuilder, Simulator, aligned_inputs};
use super::types::{FlatPlateOptions, IrradianceInput};
use crate::error::{ModelError, ModelResult};
use crate::module::params::ModuleParameters;
use crate::physics::diode::MaxPowerPoint;
use crate::physics::engine::PhysicsEngine;
use crate::physics::irradiance::hybrid_flat_plate_irradiance;
use crate::physics::solar::SolarPosition;
use crate::weather::{SolarPositionSeries, WeatherSample, WeatherSeries};

/// Per-timestamp state of a static flat plate.
pub(super) struct StaticFlatPlateStep {
    pub poa_diffuse: f64,
    pub effective: f64,
    pub aoi: f64,
    pub temp_cell: f64,
    pub mpp: MaxPowerPoint,
    pub mpp_25: MaxPowerPoint,
}

impl<E: PhysicsEngine> Simulator<E> {
    pub(super) fn static_flat_plate_step(
        &self,
        module: &ModuleParameters,
        sample: &WeatherSample,
        sun: &SolarPosition,
        options: &FlatPlateOptions,
        spillage: f64,
    ) -> StaticFlatPlateStep {
        let orientation =
            self.engine
                .compute_tracking_geometry(sun, &options.mounting, &self.tracker);
        let sky = self.sky(sample, sun);
        let poa = self.engine.decompose_irradiance(
            options.diffuse_model,
            &orientation.surface,
            sun,
            &sky,
        );

        let usable = match options.input {
            IrradianceInput::Diffuse => {
                hybrid_flat_plate_irradiance(&poa, orientation.aoi, options.aoi_limit)
            }
            IrradianceInput::Dni => poa.direct,
        };
        let effective = usable * self.flat_plate_iam.modifier(orientation.aoi) + spillage;
        let temp_cell = self.engine.estimate_cell_temperature(
            &self.flat_plate_temperature,
            effective,
            sample.temp_air,
            sample.wind_speed,
        );
        let (mpp, mpp_25) = self.operating_points(module, effective, temp_cell);
        StaticFlatPlateStep {
            poa_diffuse: poa.diffuse,
            effective,
            aoi: orientation.aoi,
            temp_cell,
            mpp,
            mpp_25,
        }
    }

    /// Simulates the flat plate of a static CPV hybrid.
    ///
    /// The reported irradiance is the POA diffuse irradiance. The effective
    /// irradiance is the input selected by `options.input` after angular
    /// losses, plus `spillage`.
    ///
    /// # Arguments
    ///
    /// * `weather` - Input weather series
    /// * `solar` - Sun positions aligned with `weather`
    /// * `options` - Mounting, transposition and acceptance settings
    /// * `spillage` - Beam irradiance spilled by the CPV receivers (W/m²),
    ///   aligned with `weather`
    ///
    /// # Errors
    ///
    /// Returns `ModelError::LengthMismatch` for misaligned inputs and
    /// `ModelError::InvalidModule` for a non-positive optical efficiency.
    pub fn static_flat_plate(
        &self,
        weather: &WeatherSeries,
        solar: &SolarPositionSeries,
        options: &FlatPlateOptions,
        spillage: &[f64],
    ) -> ModelResult<SystemResult> {
        ModelError::check_len("spillage", weather.len(), spillage.len())?;
        let module = self
            .flat_plate
            .with_optical_efficiency(options.optical_efficiency)?;
        let mut out = ResultBuilder::with_capacity(weather.len());

        for ((sample, sun), &spill) in aligned_inputs(weather, solar)?.zip(spillage) {
            let step = self.static_flat_plate_step(&module, &sample, &sun, options, spill);
            out.push(
                sample.timestamp,
                step.poa_diffuse,
                step.effective,
                step.temp_cell,
                step.mpp.p_mp,
                step.mpp_25.p_mp,
            );
        }

        let stc_power = self.stc_power(&module);
        debug!(
            system = "static_flat_plate",
            samples = weather.len(),
            input = %options.input,
            diffuse_model = %options.diffuse_model,
            stc_power,
            "simulated static flat plate"
        );
        Ok(out.finish(stc_power, module.area()))
    }
}
