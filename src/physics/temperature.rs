//! PVsyst cell temperature model.

use serde::Deserialize;

/// Parameters of the PVsyst heat-loss model.
///
/// `T_cell = T_air + alpha * E * (1 - eta_m) / (u_c + u_v * wind)`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PvsystTemperature {
    /// Constant heat transfer component (W/m²K).
    pub u_c: f64,
    /// Convective heat transfer component (W/m³sK).
    pub u_v: f64,
    /// Module electrical efficiency removed from the heat balance.
    #[serde(default = "default_eta_m")]
    pub eta_m: f64,
    /// Fraction of irradiance absorbed.
    #[serde(default = "default_alpha_absorption")]
    pub alpha_absorption: f64,
}

fn default_eta_m() -> f64 {
    0.1
}

fn default_alpha_absorption() -> f64 {
    0.9
}

impl Default for PvsystTemperature {
    fn default() -> Self {
        Self::freestanding()
    }
}

impl PvsystTemperature {
    /// Free-standing flat-plate racks.
    pub fn freestanding() -> Self {
        Self {
            u_c: 29.0,
            u_v: 0.0,
            eta_m: default_eta_m(),
            alpha_absorption: default_alpha_absorption(),
        }
    }

    /// Roof-integrated flat-plate modules.
    pub fn insulated() -> Self {
        Self {
            u_c: 15.0,
            ..Self::freestanding()
        }
    }

    /// Concentrator modules (Gerstmaier et al., "Validation of the PVSyst
    /// Performance Model for the Concentrix CPV Technology").
    pub fn concentrator() -> Self {
        Self {
            u_c: 29.0,
            u_v: 0.6,
            eta_m: 0.32,
            alpha_absorption: 0.9,
        }
    }

    /// Cell temperature (°C) for plane-of-array irradiance `poa` (W/m²).
    pub fn cell_temperature(&self, poa: f64, temp_air: f64, wind_speed: f64) -> f64 {
        let heat_input = poa * self.alpha_absorption * (1.0 - self.eta_m);
        let loss_factor = self.u_c + self.u_v * wind_speed;
        temp_air + heat_input / loss_factor
    }
}
