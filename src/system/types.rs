//! Result and option types shared by the system orchestrators.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::ModelError;
use crate::physics::diode::MaxPowerPoint;
use crate::physics::irradiance::DiffuseModel;
use crate::physics::tracking::Mounting;

/// Output of one system simulation.
///
/// Series are aligned with the input weather. Power in W, irradiance in W/m².
#[derive(Debug, Clone, PartialEq)]
pub struct SystemResult {
    pub timestamps: Vec<DateTime<Utc>>,
    /// Irradiance reported for the system (POA global, DNI, beam or POA
    /// diffuse depending on the system type).
    pub irradiance: Vec<f64>,
    /// Irradiance converted to photocurrent after optical losses.
    pub effective_irradiance: Vec<f64>,
    /// Cell temperature (°C).
    pub temp_cell: Vec<f64>,
    /// Maximum power at the operating cell temperature.
    pub power: Vec<f64>,
    /// Maximum power with cells pinned at 25 °C.
    pub power_25: Vec<f64>,
    /// Maximum power at standard test conditions.
    pub stc_power: f64,
    /// Normalized module aperture area (m²).
    pub area: f64,
    /// `stc_power / (1000 W/m² × area)`.
    pub aperture_efficiency: f64,
}

impl SystemResult {
    /// Number of timesteps.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Irradiance a static flat plate converts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IrradianceInput {
    /// POA diffuse inside the CPV acceptance angle, POA global outside it.
    #[default]
    Diffuse,
    /// Beam component on the flat-plate surface only.
    Dni,
}

impl IrradianceInput {
    /// Lowercase name, as parsed by `FromStr`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Diffuse => "diffuse",
            Self::Dni => "dni",
        }
    }
}

impl fmt::Display for IrradianceInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IrradianceInput {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "diffuse" => Ok(Self::Diffuse),
            "dni" => Ok(Self::Dni),
            other => Err(ModelError::UnknownIrradianceInput(other.to_string())),
        }
    }
}

/// Options of the static flat-plate runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatPlateOptions {
    pub mounting: Mounting,
    pub diffuse_model: DiffuseModel,
    /// CPV acceptance half-angle (degrees).
    pub aoi_limit: f64,
    pub optical_efficiency: f64,
    pub input: IrradianceInput,
}

impl Default for FlatPlateOptions {
    fn default() -> Self {
        Self {
            mounting: Mounting::fixed_south(30.0),
            diffuse_model: DiffuseModel::HayDavies,
            aoi_limit: 55.0,
            optical_efficiency: 1.0,
            input: IrradianceInput::Diffuse,
        }
    }
}

/// Static CPV half of a hybrid module.
#[derive(Debug, Clone, PartialEq)]
pub struct HybridCpvOutput {
    /// Maximum power after utilization factor (W).
    pub power: Vec<f64>,
    /// Angle of incidence on the module (degrees).
    pub aoi: Vec<f64>,
    /// Beam irradiance spilled onto the flat plate (W/m²).
    pub spillage: Vec<f64>,
}

/// Flat-plate half of a hybrid module.
#[derive(Debug, Clone, PartialEq)]
pub struct HybridFlatPlateOutput {
    pub mpp: Vec<MaxPowerPoint>,
    /// Angle of incidence on the module (degrees).
    pub aoi: Vec<f64>,
}

impl HybridFlatPlateOutput {
    /// Maximum power series (W).
    pub fn power(&self) -> Vec<f64> {
        self.mpp.iter().map(|m| m.p_mp).collect()
    }
}
