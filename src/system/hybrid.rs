//! DNI-centric hybrid pair: static CPV feeding spillage to a flat plate.

use tracing::debug;

use super::simulator::{Simulator, aligned_inputs};
use super::types::{FlatPlateOptions, HybridCpvOutput, HybridFlatPlateOutput, IrradianceInput};
use crate::error::{ModelError, ModelResult};
use crate::physics::engine::PhysicsEngine;
use crate::physics::tracking::Mounting;
use crate::weather::{SolarPositionSeries, WeatherSeries};

impl<E: PhysicsEngine> Simulator<E> {
    /// Simulates the concentrator half of a hybrid module.
    ///
    /// `spillage_factor` is the fraction of the beam irradiance on the module
    /// plane that misses the CPV receivers; the resulting spillage series is
    /// the input of [`Simulator::hybrid_flat_plate`].
    ///
    /// # Errors
    ///
    /// Returns `ModelError::LengthMismatch` for misaligned inputs and
    /// `ModelError::InvalidModule` for a non-positive optical efficiency.
    pub fn hybrid_cpv(
        &self,
        weather: &WeatherSeries,
        solar: &SolarPositionSeries,
        mounting: Mounting,
        optical_efficiency: f64,
        spillage_factor: f64,
    ) -> ModelResult<HybridCpvOutput> {
        let module = self.cpv.with_optical_efficiency(optical_efficiency)?;
        let augmented = self.airmass_weather(weather, solar)?;
        let n = weather.len();
        let mut out = HybridCpvOutput {
            power: Vec::with_capacity(n),
            aoi: Vec::with_capacity(n),
            spillage: Vec::with_capacity(n),
        };

        for ((sample, sun), &airmass) in
            aligned_inputs(&augmented.weather, solar)?.zip(&augmented.airmass)
        {
            let step = self.static_cpv_step(&module, &sample, &sun, airmass, &mounting);
            out.power.push(step.mpp.p_mp * step.utilization);
            out.aoi.push(step.aoi);
            out.spillage.push(step.beam * spillage_factor);
        }

        debug!(
            system = "hybrid_cpv",
            samples = n,
            spillage_factor,
            "simulated hybrid concentrator"
        );
        Ok(out)
    }

    /// Simulates the flat-plate half of a hybrid module.
    ///
    /// Always converts the diffuse-side input (`options.input` is ignored)
    /// and returns the full operating point of every timestamp.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::LengthMismatch` for misaligned inputs and
    /// `ModelError::InvalidModule` for a non-positive optical efficiency.
    pub fn hybrid_flat_plate(
        &self,
        weather: &WeatherSeries,
        solar: &SolarPositionSeries,
        options: &FlatPlateOptions,
        spillage: &[f64],
    ) -> ModelResult<HybridFlatPlateOutput> {
        ModelError::check_len("spillage", weather.len(), spillage.len())?;
        let module = self
            .flat_plate
            .with_optical_efficiency(options.optical_efficiency)?;
        let options = FlatPlateOptions {
            input: IrradianceInput::Diffuse,
            ..*options
        };
        let n = weather.len();
        let mut out = HybridFlatPlateOutput {
            mpp: Vec::with_capacity(n),
            aoi: Vec::with_capacity(n),
        };

        for ((sample, sun), &spill) in aligned_inputs(weather, solar)?.zip(spillage) {
            let step = self.static_flat_plate_step(&module, &sample, &sun, &options, spill);
            out.mpp.push(step.mpp);
            out.aoi.push(step.aoi);
        }

        debug!(
            system = "hybrid_flat_plate",
            samples = n,
            diffuse_model = %options.diffuse_model,
            "simulated hybrid flat plate"
        );
        Ok(out)
    }
}
