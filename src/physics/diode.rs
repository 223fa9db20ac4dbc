//! Single-diode equivalent circuit: PVsyst parameter translation and
//! maximum power point solver.
//!
//! The implicit equation
//! `I = I_L - I_0 (exp((V + I R_s) / nNsVth) - 1) - (V + I R_s) / R_sh`
//! is solved with Newton's method for the current at a given voltage and for
//! the open-circuit voltage, then the power curve is maximized by golden
//! section search on `[0, V_oc]`.

use serde::Deserialize;
use tracing::warn;

/// Boltzmann constant (J/K).
const BOLTZMANN: f64 = 1.380_649e-23;
/// Elementary charge (C).
const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;
const C_TO_K: f64 = 273.15;

/// Irradiance at standard test conditions (W/m²).
pub const STC_IRRADIANCE: f64 = 1000.0;
/// Cell temperature at standard test conditions (°C).
pub const STC_TEMPERATURE: f64 = 25.0;

/// PVsyst module coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SingleDiodeCoefficients {
    /// Short-circuit current temperature coefficient (A/K).
    pub alpha_sc: f64,
    /// Diode ideality factor at reference conditions.
    pub gamma_ref: f64,
    /// Temperature coefficient of the ideality factor (1/K).
    pub mu_gamma: f64,
    /// Photocurrent at reference conditions (A).
    pub i_l_ref: f64,
    /// Saturation current at reference conditions (A).
    pub i_o_ref: f64,
    /// Shunt resistance at reference irradiance (Ω).
    pub r_sh_ref: f64,
    /// Shunt resistance at zero irradiance (Ω).
    pub r_sh_0: f64,
    /// Exponent of the shunt resistance irradiance dependence.
    #[serde(default = "default_r_sh_exp")]
    pub r_sh_exp: f64,
    /// Series resistance (Ω).
    pub r_s: f64,
    /// Bandgap at reference temperature (eV).
    #[serde(default = "default_eg_ref")]
    pub eg_ref: f64,
    /// Number of cells in series (may be fractional after area scaling).
    pub cells_in_series: f64,
    /// Reference irradiance of the coefficient set (W/m²).
    #[serde(default = "default_irrad_ref")]
    pub irrad_ref: f64,
    /// Reference cell temperature of the coefficient set (°C).
    #[serde(default = "default_temp_ref")]
    pub temp_ref: f64,
}

fn default_r_sh_exp() -> f64 {
    5.5
}

fn default_eg_ref() -> f64 {
    1.121
}

fn default_irrad_ref() -> f64 {
    STC_IRRADIANCE
}

fn default_temp_ref() -> f64 {
    STC_TEMPERATURE
}

/// Equivalent-circuit parameters at one operating condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiodeParameters {
    pub photocurrent: f64,
    pub saturation_current: f64,
    pub series_resistance: f64,
    pub shunt_resistance: f64,
    /// Product of ideality factor, cells in series and thermal voltage (V).
    pub n_ns_vth: f64,
}

impl SingleDiodeCoefficients {
    /// Translates the coefficients to an operating condition (PVsyst model).
    ///
    /// # Arguments
    ///
    /// * `effective_irradiance` - Irradiance converted to photocurrent (W/m²)
    /// * `temp_cell` - Cell temperature (°C)
    pub fn diode_parameters(&self, effective_irradiance: f64, temp_cell: f64) -> DiodeParameters {
        let gamma = self.gamma_ref + self.mu_gamma * (temp_cell - self.temp_ref);
        let t_k = temp_cell + C_TO_K;
        let t_ref_k = self.temp_ref + C_TO_K;

        let n_ns_vth = gamma * BOLTZMANN / ELEMENTARY_CHARGE * self.cells_in_series * t_k;

        let photocurrent = effective_irradiance / self.irrad_ref
            * (self.i_l_ref + self.alpha_sc * (t_k - t_ref_k));

        let saturation_current = self.i_o_ref
            * (t_k / t_ref_k).powi(3)
            * (ELEMENTARY_CHARGE * self.eg_ref / (BOLTZMANN * gamma) * (1.0 / t_ref_k - 1.0 / t_k))
                .exp();

        let decay = (-self.r_sh_exp).exp();
        let r_sh_base = ((self.r_sh_ref - self.r_sh_0 * decay) / (1.0 - decay)).max(0.0);
        let shunt_resistance = r_sh_base
            + (self.r_sh_0 - r_sh_base)
                * (-self.r_sh_exp * effective_irradiance / self.irrad_ref).exp();

        DiodeParameters {
            photocurrent,
            saturation_current,
            series_resistance: self.r_s,
            shunt_resistance,
            n_ns_vth,
        }
    }

    /// Coefficients with the reference photocurrent and the cell count
    /// multiplied by the given factors.
    pub fn scaled(&self, current_factor: f64, cells_factor: f64) -> Self {
        Self {
            i_l_ref: self.i_l_ref * current_factor,
            cells_in_series: self.cells_in_series * cells_factor,
            ..*self
        }
    }
}

/// Key points of the I-V curve.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MaxPowerPoint {
    pub i_sc: f64,
    pub v_oc: f64,
    pub i_mp: f64,
    pub v_mp: f64,
    pub p_mp: f64,
}

/// Numerical settings for the single-diode solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiodeSolver {
    pub max_iter: usize,
    /// Current tolerance (A).
    pub tol_i: f64,
    /// Voltage tolerance (V).
    pub tol_v: f64,
}

impl Default for DiodeSolver {
    fn default() -> Self {
        Self {
            max_iter: 100,
            tol_i: 1e-10,
            tol_v: 1e-9,
        }
    }
}

const GOLDEN: f64 = 0.618_033_988_749_894_9;

impl DiodeSolver {
    /// Solves for the maximum power point.
    ///
    /// A non-positive photocurrent yields an all-zero operating point.
    pub fn max_power_point(&self, p: &DiodeParameters) -> MaxPowerPoint {
        if p.photocurrent <= 0.0 || !p.photocurrent.is_finite() {
            return MaxPowerPoint::default();
        }

        let v_oc = self.open_circuit_voltage(p);
        let i_sc = self.current_at(p, 0.0);

        let (mut lo, mut hi) = (0.0, v_oc);
        let mut c = hi - GOLDEN * (hi - lo);
        let mut d = lo + GOLDEN * (hi - lo);
        let mut pc = c * self.current_at(p, c);
        let mut pd = d * self.current_at(p, d);
        for _ in 0..self.max_iter {
            if hi - lo < self.tol_v {
                break;
            }
            if pc > pd {
                hi = d;
                d = c;
                pd = pc;
                c = hi - GOLDEN * (hi - lo);
                pc = c * self.current_at(p, c);
            } else {
                lo = c;
                c = d;
                pc = pd;
                d = lo + GOLDEN * (hi - lo);
                pd = d * self.current_at(p, d);
            }
        }

        let v_mp = 0.5 * (lo + hi);
        let i_mp = self.current_at(p, v_mp);
        MaxPowerPoint {
            i_sc,
            v_oc,
            i_mp,
            v_mp,
            p_mp: v_mp * i_mp,
        }
    }

    /// Terminal current at voltage `v` (Newton's method from `I = I_L`).
    pub fn current_at(&self, p: &DiodeParameters, v: f64) -> f64 {
        let mut i = p.photocurrent;
        for _ in 0..self.max_iter {
            let vd = v + i * p.series_resistance;
            let e = (vd / p.n_ns_vth).exp();
            let f = p.photocurrent
                - p.saturation_current * (e - 1.0)
                - vd / p.shunt_resistance
                - i;
            let df = -p.saturation_current * e * p.series_resistance / p.n_ns_vth
                - p.series_resistance / p.shunt_resistance
                - 1.0;
            let step = f / df;
            i -= step;
            if step.abs() < self.tol_i {
                return i;
            }
        }
        warn!(
            v,
            i,
            max_iter = self.max_iter,
            "single-diode current did not converge"
        );
        i
    }

    /// Open-circuit voltage (Newton's method from the ideal-diode estimate).
    pub fn open_circuit_voltage(&self, p: &DiodeParameters) -> f64 {
        let mut v = p.n_ns_vth * (p.photocurrent / p.saturation_current + 1.0).ln();
        for _ in 0..self.max_iter {
            let e = (v / p.n_ns_vth).exp();
            let f = p.photocurrent - p.saturation_current * (e - 1.0) - v / p.shunt_resistance;
            let df = -p.saturation_current * e / p.n_ns_vth - 1.0 / p.shunt_resistance;
            let step = f / df;
            v -= step;
            if step.abs() < self.tol_v {
                return v.max(0.0);
            }
        }
        warn!(v, max_iter = self.max_iter, "open-circuit voltage did not converge");
        v.max(0.0)
    }
}
