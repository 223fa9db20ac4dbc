//! Capability set consumed by the system orchestrators.

use chrono::{DateTime, Utc};

use super::diode::{DiodeSolver, MaxPowerPoint, SingleDiodeCoefficients};
use super::irradiance::{DiffuseModel, PoaIrradiance, SkyIrradiance, total_irradiance};
use super::solar::{Location, SolarPosition, solar_position};
use super::temperature::PvsystTemperature;
use super::tracking::{Mounting, SurfaceOrientation, TrackerOrientation, TrackerParameters};

/// Physical sub-models behind the simulation pipeline.
///
/// The orchestrators only sequence these calls, so an alternative numerical
/// backend can be swapped in by implementing this trait.
pub trait PhysicsEngine {
    /// Sun position for a site and instant.
    fn compute_solar_position(&self, location: &Location, at: DateTime<Utc>) -> SolarPosition;

    /// Pressure-corrected airmass, `None` with the sun down.
    fn compute_airmass(&self, location: &Location, sun: &SolarPosition) -> Option<f64> {
        location.absolute_airmass(sun.zenith)
    }

    /// Surface orientation and angle of incidence for a mounting.
    fn compute_tracking_geometry(
        &self,
        sun: &SolarPosition,
        mounting: &Mounting,
        tracker: &TrackerParameters,
    ) -> TrackerOrientation;

    /// Plane-of-array irradiance split into beam and diffuse parts.
    fn decompose_irradiance(
        &self,
        model: DiffuseModel,
        surface: &SurfaceOrientation,
        sun: &SolarPosition,
        sky: &SkyIrradiance,
    ) -> PoaIrradiance;

    /// Cell temperature (°C).
    fn estimate_cell_temperature(
        &self,
        model: &PvsystTemperature,
        poa: f64,
        temp_air: f64,
        wind_speed: f64,
    ) -> f64;

    /// Maximum power point of a module at one operating condition.
    fn solve_single_diode(
        &self,
        coefficients: &SingleDiodeCoefficients,
        effective_irradiance: f64,
        temp_cell: f64,
    ) -> MaxPowerPoint;
}

/// In-crate implementation of every sub-model.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeEngine {
    /// Single-diode solver settings.
    pub solver: DiodeSolver,
}

impl NativeEngine {
    /// Creates an engine with custom solver tolerances.
    ///
    /// # Arguments
    ///
    /// * `solver` - Newton and golden-section settings for the MPP search
    pub fn new(solver: DiodeSolver) -> Self {
        Self { solver }
    }
}

impl PhysicsEngine for NativeEngine {
    fn compute_solar_position(&self, location: &Location, at: DateTime<Utc>) -> SolarPosition {
        solar_position(location, at)
    }

    fn compute_tracking_geometry(
        &self,
        sun: &SolarPosition,
        mounting: &Mounting,
        tracker: &TrackerParameters,
    ) -> TrackerOrientation {
        mounting.orient(sun, tracker)
    }

    fn decompose_irradiance(
        &self,
        model: DiffuseModel,
        surface: &SurfaceOrientation,
        sun: &SolarPosition,
        sky: &SkyIrradiance,
    ) -> PoaIrradiance {
        total_irradiance(model, surface, sun, sky)
    }

    fn estimate_cell_temperature(
        &self,
        model: &PvsystTemperature,
        poa: f64,
        temp_air: f64,
        wind_speed: f64,
    ) -> f64 {
        model.cell_temperature(poa, temp_air, wind_speed)
    }

    fn solve_single_diode(
        &self,
        coefficients: &SingleDiodeCoefficients,
        effective_irradiance: f64,
        temp_cell: f64,
    ) -> MaxPowerPoint {
        let params = coefficients.diode_parameters(effective_irradiance, temp_cell);
        self.solver.max_power_point(&params)
    }
}
