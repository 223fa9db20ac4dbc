//! Module parameter sets normalized to a common aperture area.
//!
//! Modules of different technologies are compared per unit area: the
//! datasheet area is first adjusted so that the module reaches a chosen
//! nameplate efficiency, then the electrical coefficients are rescaled to a
//! reference area. Photocurrent and series cell count both scale with the
//! square root of the area factor, which keeps the product `V × I` (and so
//! the power) proportional to the area.

use serde::Deserialize;

use super::utilization::UtilizationFactorParameters;
use crate::error::{ModelError, ModelResult};
use crate::physics::diode::SingleDiodeCoefficients;

/// Aperture area every module is normalized to (m²).
pub const REFERENCE_AREA: f64 = 10.0;

/// Module technology with its built-in datasheet values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleArchetype {
    /// Canadian Solar CS1U-410MS (PVsyst coefficients).
    FlatPlate,
    /// Soitec CX-M500.
    Concentrator,
}

impl ModuleArchetype {
    /// Datasheet module area (m²).
    pub fn datasheet_area(&self) -> f64 {
        match self {
            Self::FlatPlate => 2.061,
            Self::Concentrator => 7.386,
        }
    }

    /// Datasheet efficiency (%).
    pub fn datasheet_efficiency(&self) -> f64 {
        match self {
            Self::FlatPlate => 20.5,
            Self::Concentrator => 34.87,
        }
    }

    /// Single-diode coefficients of the unscaled module.
    pub fn coefficients(&self) -> SingleDiodeCoefficients {
        match self {
            Self::FlatPlate => SingleDiodeCoefficients {
                alpha_sc: 4.8e-3,
                gamma_ref: 0.967,
                mu_gamma: -0.00042,
                i_l_ref: 9.7,
                i_o_ref: 0.03e-9,
                r_sh_ref: 600.0,
                r_sh_0: 2500.0,
                r_sh_exp: 5.5,
                r_s: 0.291,
                eg_ref: 1.121,
                cells_in_series: 81.0,
                irrad_ref: 1000.0,
                temp_ref: 25.0,
            },
            Self::Concentrator => SingleDiodeCoefficients {
                alpha_sc: 0.0,
                gamma_ref: 3.664,
                mu_gamma: 0.003,
                i_l_ref: 3.861 * 1.274,
                i_o_ref: 0.005e-9,
                r_sh_ref: 3461.0,
                r_sh_0: 25000.0,
                r_sh_exp: 5.5,
                r_s: 0.61,
                eg_ref: 3.91,
                cells_in_series: 240.0,
                irrad_ref: 943.0,
                temp_ref: 64.0,
            },
        }
    }
}

/// Inputs of the parameter builder.
///
/// Starts from the archetype's datasheet with the nameplate efficiency equal
/// to the datasheet one, the [`REFERENCE_AREA`] and unit optical efficiency.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSpec {
    /// Technology of the module.
    pub archetype: ModuleArchetype,
    /// Datasheet single-diode coefficients.
    pub coefficients: SingleDiodeCoefficients,
    /// Datasheet area (m²).
    pub datasheet_area: f64,
    /// Datasheet efficiency (%).
    pub datasheet_efficiency: f64,
    /// Efficiency the module is rated at after area adjustment (%).
    pub nameplate_efficiency: f64,
    /// Area the module is normalized to (m²).
    pub reference_area: f64,
    /// Multiplier on the reference photocurrent.
    pub optical_efficiency: f64,
    /// Only meaningful for concentrator modules.
    pub utilization: Option<UtilizationFactorParameters>,
}

impl ModuleSpec {
    /// Starts a builder from the archetype's datasheet values.
    ///
    /// # Arguments
    ///
    /// * `archetype` - Technology whose built-in coefficients are used
    pub fn new(archetype: ModuleArchetype) -> Self {
        Self {
            archetype,
            coefficients: archetype.coefficients(),
            datasheet_area: archetype.datasheet_area(),
            datasheet_efficiency: archetype.datasheet_efficiency(),
            nameplate_efficiency: archetype.datasheet_efficiency(),
            reference_area: REFERENCE_AREA,
            optical_efficiency: 1.0,
            utilization: None,
        }
    }

    /// Sets the rated efficiency the area is adjusted to (%).
    pub fn nameplate_efficiency(mut self, efficiency: f64) -> Self {
        self.nameplate_efficiency = efficiency;
        self
    }

    /// Sets the area the module is normalized to (m²).
    pub fn reference_area(mut self, area: f64) -> Self {
        self.reference_area = area;
        self
    }

    /// Sets the multiplier on the reference photocurrent.
    pub fn optical_efficiency(mut self, efficiency: f64) -> Self {
        self.optical_efficiency = efficiency;
        self
    }

    /// Attaches utilization factor coefficients. Concentrators only.
    pub fn utilization(mut self, utilization: UtilizationFactorParameters) -> Self {
        self.utilization = Some(utilization);
        self
    }

    /// Replaces the archetype's single-diode coefficients.
    pub fn coefficients(mut self, coefficients: SingleDiodeCoefficients) -> Self {
        self.coefficients = coefficients;
        self
    }

    /// Datasheet area rescaled to the nameplate efficiency (m²).
    pub fn adjusted_area(&self) -> f64 {
        self.datasheet_area * self.datasheet_efficiency / self.nameplate_efficiency
    }

    /// Ratio of reference area to adjusted area.
    pub fn area_factor(&self) -> f64 {
        self.reference_area / self.adjusted_area()
    }

    /// Checks the builder inputs.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::InvalidModule` naming the first non-positive or
    /// non-finite input, or a utilization factor given to a flat-plate module.
    pub fn validate(&self) -> ModelResult<()> {
        let positive = [
            ("datasheet_area", self.datasheet_area),
            ("datasheet_efficiency", self.datasheet_efficiency),
            ("nameplate_efficiency", self.nameplate_efficiency),
            ("reference_area", self.reference_area),
            ("optical_efficiency", self.optical_efficiency),
            ("cells_in_series", self.coefficients.cells_in_series),
            ("irrad_ref", self.coefficients.irrad_ref),
        ];
        for (field, value) in positive {
            require_positive(field, value)?;
        }
        match (self.archetype, &self.utilization) {
            (ModuleArchetype::FlatPlate, Some(_)) => Err(ModelError::InvalidModule {
                field: "utilization",
                reason: "flat-plate modules have no utilization factor".into(),
            }),
            (_, Some(uf)) => uf.validate(),
            (_, None) => Ok(()),
        }
    }

    /// Builds the normalized parameter set.
    ///
    /// # Errors
    ///
    /// See [`ModuleSpec::validate`].
    pub fn build(&self) -> ModelResult<ModuleParameters> {
        self.validate()?;
        let sqrt_f = self.area_factor().sqrt();
        let coefficients = self
            .coefficients
            .scaled(sqrt_f * self.optical_efficiency, sqrt_f);
        let area = self.reference_area;
        Ok(match self.archetype {
            ModuleArchetype::FlatPlate => {
                ModuleParameters::FlatPlate(FlatPlateModule { coefficients, area })
            }
            ModuleArchetype::Concentrator => ModuleParameters::Concentrator(ConcentratorModule {
                coefficients,
                area,
                utilization: self.utilization.unwrap_or_default(),
            }),
        })
    }
}

fn require_positive(field: &'static str, value: f64) -> ModelResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ModelError::InvalidModule {
            field,
            reason: format!("must be positive and finite, got {value}"),
        })
    }
}

/// Normalized flat-plate module.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatPlateModule {
    /// Coefficients after area scaling and optical efficiency.
    pub coefficients: SingleDiodeCoefficients,
    /// Normalized aperture area (m²).
    pub area: f64,
}

/// Normalized concentrator module with its utilization factor.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcentratorModule {
    /// Coefficients after area scaling and optical efficiency.
    pub coefficients: SingleDiodeCoefficients,
    /// Normalized aperture area (m²).
    pub area: f64,
    /// De-rating applied to the computed power.
    pub utilization: UtilizationFactorParameters,
}

/// Electrical parameter set of a normalized module.
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleParameters {
    FlatPlate(FlatPlateModule),
    Concentrator(ConcentratorModule),
}

impl ModuleParameters {
    /// Single-diode coefficients of either technology.
    pub fn coefficients(&self) -> &SingleDiodeCoefficients {
        match self {
            Self::FlatPlate(m) => &m.coefficients,
            Self::Concentrator(m) => &m.coefficients,
        }
    }

    /// Normalized aperture area (m²).
    pub fn area(&self) -> f64 {
        match self {
            Self::FlatPlate(m) => m.area,
            Self::Concentrator(m) => m.area,
        }
    }

    /// Utilization factor coefficients, concentrator modules only.
    pub fn utilization(&self) -> Option<&UtilizationFactorParameters> {
        match self {
            Self::FlatPlate(_) => None,
            Self::Concentrator(m) => Some(&m.utilization),
        }
    }

    /// Copy with the reference photocurrent multiplied by `efficiency`.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::InvalidModule` if `efficiency` is not positive.
    pub fn with_optical_efficiency(&self, efficiency: f64) -> ModelResult<Self> {
        require_positive("optical_efficiency", efficiency)?;
        let mut out = self.clone();
        let coefficients = match &mut out {
            Self::FlatPlate(m) => &mut m.coefficients,
            Self::Concentrator(m) => &mut m.coefficients,
        };
        *coefficients = coefficients.scaled(efficiency, 1.0);
        Ok(out)
    }
}
