//! Module electrical parameters and concentrator utilization factor.

pub mod params;
pub mod utilization;

pub use params::{
    ConcentratorModule, FlatPlateModule, ModuleArchetype, ModuleParameters, ModuleSpec,
    REFERENCE_AREA,
};
pub use utilization::{TemperatureUtilization, UtilizationFactorParameters};
