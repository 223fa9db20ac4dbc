//! TOML-based scenario configuration and preset definitions.

use std::fmt;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::module::params::{ModuleArchetype, ModuleSpec, REFERENCE_AREA};
use crate::module::utilization::UtilizationFactorParameters;
use crate::physics::engine::NativeEngine;
use crate::physics::iam::{IamModel, IamTable, MARTIN_RUIZ_DEFAULT_AR};
use crate::physics::irradiance::DEFAULT_ALBEDO;
use crate::physics::solar::Location;
use crate::physics::temperature::PvsystTemperature;
use crate::physics::tracking::TrackerParameters;
use crate::system::Simulator;
use crate::weather::SyntheticDay;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_str`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Site location and ground albedo.
    #[serde(default)]
    pub site: SiteConfig,
    /// Single-axis tracker geometry shared by all systems.
    #[serde(default)]
    pub tracker: TrackerParameters,
    /// Flat-plate module sizing.
    #[serde(default)]
    pub flat_plate: FlatPlateConfig,
    /// Concentrator module sizing and utilization factor.
    #[serde(default)]
    pub cpv: CpvConfig,
    /// Cell temperature models.
    #[serde(default)]
    pub temperature: TemperatureConfig,
    /// Angular loss models.
    #[serde(default)]
    pub optics: OpticsConfig,
    /// Synthetic weather day.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Site location and ground albedo.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Latitude (degrees, north positive).
    pub latitude: f64,
    /// Longitude (degrees, east positive).
    pub longitude: f64,
    /// Altitude above sea level (m).
    pub altitude: f64,
    /// Ground reflectance (0.0–1.0).
    pub albedo: f64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            latitude: 40.4,
            longitude: -3.7,
            altitude: 650.0,
            albedo: DEFAULT_ALBEDO,
        }
    }
}

impl SiteConfig {
    /// Site as used by the solar position algorithm.
    pub fn location(&self) -> Location {
        Location::new(self.latitude, self.longitude, self.altitude)
    }
}

/// Flat-plate module sizing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlatPlateConfig {
    /// Datasheet area (m²).
    pub datasheet_area: f64,
    /// Datasheet efficiency (%).
    pub datasheet_efficiency: f64,
    /// Efficiency the area is adjusted to (%).
    pub nameplate_efficiency: f64,
    /// Area the module is normalized to (m²).
    pub reference_area: f64,
}

impl Default for FlatPlateConfig {
    fn default() -> Self {
        let archetype = ModuleArchetype::FlatPlate;
        Self {
            datasheet_area: archetype.datasheet_area(),
            datasheet_efficiency: archetype.datasheet_efficiency(),
            nameplate_efficiency: 20.0,
            reference_area: REFERENCE_AREA,
        }
    }
}

impl FlatPlateConfig {
    /// Module builder for the configured flat plate.
    pub fn spec(&self) -> ModuleSpec {
        ModuleSpec {
            datasheet_area: self.datasheet_area,
            datasheet_efficiency: self.datasheet_efficiency,
            ..ModuleSpec::new(ModuleArchetype::FlatPlate)
        }
        .nameplate_efficiency(self.nameplate_efficiency)
        .reference_area(self.reference_area)
    }
}

/// Concentrator module sizing and utilization factor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CpvConfig {
    /// Datasheet area (m²).
    pub datasheet_area: f64,
    /// Datasheet efficiency (%).
    pub datasheet_efficiency: f64,
    /// Efficiency the area is adjusted to (%).
    pub nameplate_efficiency: f64,
    /// Area the module is normalized to (m²).
    pub reference_area: f64,
    /// Airmass and temperature de-rating.
    pub utilization: UtilizationFactorParameters,
}

impl Default for CpvConfig {
    fn default() -> Self {
        let archetype = ModuleArchetype::Concentrator;
        Self {
            datasheet_area: archetype.datasheet_area(),
            datasheet_efficiency: archetype.datasheet_efficiency(),
            nameplate_efficiency: 30.0,
            reference_area: REFERENCE_AREA,
            utilization: UtilizationFactorParameters::disabled(),
        }
    }
}

impl CpvConfig {
    /// Module builder for the configured concentrator.
    pub fn spec(&self) -> ModuleSpec {
        ModuleSpec {
            datasheet_area: self.datasheet_area,
            datasheet_efficiency: self.datasheet_efficiency,
            ..ModuleSpec::new(ModuleArchetype::Concentrator)
        }
        .nameplate_efficiency(self.nameplate_efficiency)
        .reference_area(self.reference_area)
        .utilization(self.utilization)
    }
}

/// Cell temperature models.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemperatureConfig {
    pub flat_plate: PvsystTemperature,
    pub cpv: PvsystTemperature,
}

impl Default for TemperatureConfig {
    fn default() -> Self {
        Self {
            flat_plate: PvsystTemperature::freestanding(),
            cpv: PvsystTemperature::concentrator(),
        }
    }
}

/// Angular loss models.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpticsConfig {
    /// Martin-Ruiz coefficient of the flat plate.
    pub flat_plate_a_r: f64,
    /// Concentrator IAM table.
    pub cpv_iam: IamTable,
}

impl Default for OpticsConfig {
    fn default() -> Self {
        Self {
            flat_plate_a_r: MARTIN_RUIZ_DEFAULT_AR,
            cpv_iam: IamTable::concentrator_coarse(),
        }
    }
}

/// Synthetic weather day.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Calendar day, `YYYY-MM-DD`.
    pub date: String,
    /// Minutes between samples (must divide a day).
    pub step_minutes: u32,
    /// Random seed of the cloud process.
    pub seed: u64,
    /// AR(1) correlation coefficient (0.0-1.0).
    pub alpha: f64,
    /// AR(1) innovation noise standard deviation.
    pub cloud_noise_std: f64,
    /// Daily mean ambient temperature (°C).
    pub temp_mean: f64,
    /// Half the daily temperature swing (K).
    pub temp_amplitude: f64,
    /// Mean wind speed (m/s).
    pub wind_mean: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            date: "2021-06-21".to_string(),
            step_minutes: 60,
            seed: 42,
            alpha: 0.9,
            cloud_noise_std: 0.2,
            temp_mean: 20.0,
            temp_amplitude: 7.0,
            wind_mean: 2.0,
        }
    }
}

impl SimulationConfig {
    /// Sample duration in hours.
    pub fn dt_hours(&self) -> f64 {
        f64::from(self.step_minutes) / 60.0
    }

    /// Builds the synthetic day generator.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `date` is not a valid `YYYY-MM-DD` date.
    pub fn synthetic_day(&self) -> Result<SyntheticDay, ConfigError> {
        let date = self
            .date
            .parse::<NaiveDate>()
            .map_err(|e| ConfigError {
                field: "simulation.date".into(),
                message: format!("invalid date \"{}\": {e}", self.date),
            })?;
        Ok(SyntheticDay {
            date,
            step_minutes: self.step_minutes,
            alpha: self.alpha,
            cloud_noise_std: self.cloud_noise_std,
            temp_mean: self.temp_mean,
            temp_amplitude: self.temp_amplitude,
            wind_mean: self.wind_mean,
            seed: self.seed,
        })
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"cpv.nameplate_efficiency"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl ScenarioConfig {
    /// Nameplate-adjusted module areas with the utilization factor disabled
    /// and the coarse concentrator IAM curve.
    pub fn baseline() -> Self {
        Self {
            site: SiteConfig::default(),
            tracker: TrackerParameters::default(),
            flat_plate: FlatPlateConfig::default(),
            cpv: CpvConfig::default(),
            temperature: TemperatureConfig::default(),
            optics: OpticsConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }

    /// Datasheet module areas, airmass and temperature utilization factor and
    /// the measured concentrator IAM curve.
    pub fn dni_spillage() -> Self {
        let base = Self::baseline();
        Self {
            flat_plate: FlatPlateConfig {
                nameplate_efficiency: base.flat_plate.datasheet_efficiency,
                ..base.flat_plate
            },
            cpv: CpvConfig {
                nameplate_efficiency: base.cpv.datasheet_efficiency,
                utilization: UtilizationFactorParameters::airmass_and_temperature(),
                ..base.cpv
            },
            optics: OpticsConfig {
                cpv_iam: IamTable::concentrator_measured(),
                ..base.optics
            },
            ..base
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "dni_spillage"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "dni_spillage" => Ok(Self::dni_spillage()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let site = &self.site;
        if !(-90.0..=90.0).contains(&site.latitude) {
            errors.push(ConfigError {
                field: "site.latitude".into(),
                message: "must be in [-90, 90]".into(),
            });
        }
        if !(-180.0..=180.0).contains(&site.longitude) {
            errors.push(ConfigError {
                field: "site.longitude".into(),
                message: "must be in [-180, 180]".into(),
            });
        }
        if !(0.0..=1.0).contains(&site.albedo) {
            errors.push(ConfigError {
                field: "site.albedo".into(),
                message: "must be in [0.0, 1.0]".into(),
            });
        }

        let tr = &self.tracker;
        if !(tr.gcr > 0.0 && tr.gcr <= 1.0) {
            errors.push(ConfigError {
                field: "tracker.gcr".into(),
                message: "must be in (0.0, 1.0]".into(),
            });
        }
        if !(0.0..=90.0).contains(&tr.max_angle) {
            errors.push(ConfigError {
                field: "tracker.max_angle".into(),
                message: "must be in [0, 90]".into(),
            });
        }

        if let Err(e) = self.flat_plate.spec().validate() {
            errors.push(ConfigError {
                field: "flat_plate".into(),
                message: e.to_string(),
            });
        }
        if let Err(e) = self.cpv.spec().validate() {
            errors.push(ConfigError {
                field: "cpv".into(),
                message: e.to_string(),
            });
        }

        for (field, model) in [
            ("temperature.flat_plate", &self.temperature.flat_plate),
            ("temperature.cpv", &self.temperature.cpv),
        ] {
            if model.u_c <= 0.0 || model.u_v < 0.0 {
                errors.push(ConfigError {
                    field: field.into(),
                    message: "u_c must be > 0 and u_v >= 0".into(),
                });
            }
        }

        if self.optics.flat_plate_a_r <= 0.0 {
            errors.push(ConfigError {
                field: "optics.flat_plate_a_r".into(),
                message: "must be > 0".into(),
            });
        }

        let sim = &self.simulation;
        if sim.step_minutes == 0 || 1440 % sim.step_minutes != 0 {
            errors.push(ConfigError {
                field: "simulation.step_minutes".into(),
                message: "must be > 0 and divide 1440".into(),
            });
        }
        if !(0.0..=1.0).contains(&sim.alpha) {
            errors.push(ConfigError {
                field: "simulation.alpha".into(),
                message: "must be in [0.0, 1.0]".into(),
            });
        }
        if let Err(e) = sim.synthetic_day() {
            errors.push(e);
        }

        errors
    }

    /// Builds a simulator backed by the in-crate sub-models.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the module section whose parameters
    /// are invalid.
    pub fn build_simulator(&self) -> Result<Simulator, ConfigError> {
        let flat_plate = self.flat_plate.spec().build().map_err(|e| ConfigError {
            field: "flat_plate".into(),
            message: e.to_string(),
        })?;
        let cpv = self.cpv.spec().build().map_err(|e| ConfigError {
            field: "cpv".into(),
            message: e.to_string(),
        })?;
        let sim = Simulator::new(NativeEngine::default(), self.site.location(), flat_plate, cpv)
            .map_err(|e| ConfigError {
                field: "scenario".into(),
                message: e.to_string(),
            })?;
        Ok(sim
            .with_tracker(self.tracker)
            .with_temperature_models(self.temperature.flat_plate, self.temperature.cpv)
            .with_flat_plate_iam(IamModel::MartinRuiz {
                a_r: self.optics.flat_plate_a_r,
            })
            .with_cpv_iam(IamModel::Table(self.optics.cpv_iam.clone()))
            .with_albedo(self.site.albedo))
    }
}
