//! Utilization factor de-rating of concentrator output.
//!
//! Spectral mismatch between the junctions of a multi-junction cell is
//! approximated by piecewise-linear functions of airmass and, optionally,
//! ambient temperature. The factor multiplies the computed power.

use serde::Deserialize;

use crate::error::{ModelError, ModelResult};

/// Piecewise-linear utilization factor around a threshold.
///
/// `1 + m_low (x - thld)` below the threshold, `1 + m_high (x - thld)` at or
/// above it. Not clamped.
pub fn simple_util_factor(x: f64, thld: f64, m_low: f64, m_high: f64) -> f64 {
    if x < thld {
        1.0 + m_low * (x - thld)
    } else {
        1.0 + m_high * (x - thld)
    }
}

/// Ambient temperature contribution and its weighting against airmass.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemperatureUtilization {
    /// Ambient temperature threshold (°C).
    pub ta_thld: f64,
    pub ta_uf_m_low: f64,
    pub ta_uf_m_high: f64,
    pub weight_am: f64,
    pub weight_temp: f64,
}

/// Utilization factor coefficients of a concentrator module.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UtilizationFactorParameters {
    /// Normalizer applied to every slope.
    pub isc_dni_top: f64,
    /// Airmass threshold.
    pub am_thld: f64,
    pub am_uf_m_low: f64,
    pub am_uf_m_high: f64,
    /// Present when ambient temperature also de-rates output.
    pub temperature: Option<TemperatureUtilization>,
}

impl Default for UtilizationFactorParameters {
    fn default() -> Self {
        Self::disabled()
    }
}

impl UtilizationFactorParameters {
    /// Identically one for every input.
    pub fn disabled() -> Self {
        Self {
            isc_dni_top: 1.0,
            am_thld: 1.0,
            am_uf_m_low: 0.0,
            am_uf_m_high: 0.0,
            temperature: None,
        }
    }

    /// Airmass and ambient temperature de-rating for the Soitec CX-M500.
    pub fn airmass_and_temperature() -> Self {
        Self {
            isc_dni_top: 1.0,
            am_thld: 1.7,
            am_uf_m_low: 0.1,
            am_uf_m_high: -0.1,
            temperature: Some(TemperatureUtilization {
                ta_thld: 25.0,
                ta_uf_m_low: 0.005,
                ta_uf_m_high: 0.0,
                weight_am: 0.55,
                weight_temp: 0.45,
            }),
        }
    }

    /// Checks the slope normalizer and the weights.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::InvalidModule` if `isc_dni_top` is not positive or
    /// the weights are negative or do not sum to one.
    pub fn validate(&self) -> ModelResult<()> {
        if !(self.isc_dni_top > 0.0 && self.isc_dni_top.is_finite()) {
            return Err(ModelError::InvalidModule {
                field: "isc_dni_top",
                reason: format!("must be positive, got {}", self.isc_dni_top),
            });
        }
        if let Some(t) = &self.temperature {
            if t.weight_am < 0.0 || t.weight_temp < 0.0 {
                return Err(ModelError::InvalidModule {
                    field: "weight_am",
                    reason: "weights must be non-negative".into(),
                });
            }
            let sum = t.weight_am + t.weight_temp;
            if (sum - 1.0).abs() > 1e-9 {
                return Err(ModelError::InvalidModule {
                    field: "weight_temp",
                    reason: format!("weights must sum to 1, got {sum}"),
                });
            }
        }
        Ok(())
    }

    /// Airmass contribution, unclamped.
    pub fn airmass_factor(&self, airmass: f64) -> f64 {
        simple_util_factor(
            airmass,
            self.am_thld,
            self.am_uf_m_low / self.isc_dni_top,
            self.am_uf_m_high / self.isc_dni_top,
        )
    }

    /// Temperature contribution, unclamped. `None` when not configured.
    pub fn temperature_factor(&self, temp_air: f64) -> Option<f64> {
        self.temperature.map(|t| {
            simple_util_factor(
                temp_air,
                t.ta_thld,
                t.ta_uf_m_low / self.isc_dni_top,
                t.ta_uf_m_high / self.isc_dni_top,
            )
        })
    }

    /// Combined factor in `[0, 1]`.
    ///
    /// A missing airmass (sun below the horizon) yields zero.
    pub fn factor(&self, airmass: Option<f64>, temp_air: f64) -> f64 {
        let Some(am) = airmass else {
            return 0.0;
        };
        let uf_am = self.airmass_factor(am);
        let uf = match (self.temperature, self.temperature_factor(temp_air)) {
            (Some(t), Some(uf_t)) => t.weight_am * uf_am + t.weight_temp * uf_t,
            _ => uf_am,
        };
        uf.clamp(0.0, 1.0)
    }

    /// Airmass factor sampled over `airmass`, as `(airmass, factor)` pairs.
    pub fn airmass_curve(&self, airmass: impl IntoIterator<Item = f64>) -> Vec<(f64, f64)> {
        airmass
            .into_iter()
            .map(|am| (am, self.airmass_factor(am).clamp(0.0, 1.0)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_factor_is_identically_one() {
        let uf = UtilizationFactorParameters::disabled();
        for am in [1.0, 1.5, 3.0, 10.0, 38.0] {
            for t in [-10.0, 25.0, 45.0] {
                assert_eq!(uf.factor(Some(am), t), 1.0);
            }
        }
    }

    #[test]
    fn zero_slopes_with_temperature_are_one() {
        let uf = UtilizationFactorParameters {
            am_thld: 1.7,
            temperature: Some(TemperatureUtilization {
                ta_thld: 25.0,
                ta_uf_m_low: 0.0,
                ta_uf_m_high: 0.0,
                weight_am: 0.55,
                weight_temp: 0.45,
            }),
            ..UtilizationFactorParameters::disabled()
        };
        for am in [1.0, 2.0, 6.0] {
            assert!((uf.factor(Some(am), 10.0) - 1.0).abs() < 1e-15);
        }
    }

    #[test]
    fn continuous_at_threshold() {
        let uf = UtilizationFactorParameters::airmass_and_temperature();
        let eps = 1e-9;
        let below = uf.airmass_factor(1.7 - eps);
        let above = uf.airmass_factor(1.7 + eps);
        assert!((below - above).abs() < 1e-8);
        assert_eq!(uf.airmass_factor(1.7), 1.0);
    }

    #[test]
    fn slopes_are_normalized_by_isc_dni_top() {
        let uf = UtilizationFactorParameters {
            isc_dni_top: 2.0,
            am_thld: 1.0,
            am_uf_m_low: 0.0,
            am_uf_m_high: -0.2,
            temperature: None,
        };
        // 1 - 0.1 * (3 - 1)
        assert!((uf.factor(Some(3.0), 25.0) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn weighted_combination() {
        let uf = UtilizationFactorParameters::airmass_and_temperature();
        // am 2.7: 1 - 0.1 = 0.9; ta 15: 1 + 0.005 * (-10) = 0.95
        let expected = 0.55 * 0.9 + 0.45 * 0.95;
        assert!((uf.factor(Some(2.7), 15.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn factor_is_clamped() {
        let uf = UtilizationFactorParameters {
            am_uf_m_high: 0.5,
            ..UtilizationFactorParameters::disabled()
        };
        assert_eq!(uf.factor(Some(4.0), 25.0), 1.0);
        let steep = UtilizationFactorParameters {
            am_uf_m_high: -0.5,
            ..UtilizationFactorParameters::disabled()
        };
        assert_eq!(steep.factor(Some(10.0), 25.0), 0.0);
    }

    #[test]
    fn sun_down_gives_zero() {
        assert_eq!(UtilizationFactorParameters::disabled().factor(None, 20.0), 0.0);
    }

    #[test]
    fn validate_rejects_bad_weights() {
        let mut uf = UtilizationFactorParameters::airmass_and_temperature();
        assert!(uf.validate().is_ok());
        if let Some(t) = uf.temperature.as_mut() {
            t.weight_temp = 0.6;
        }
        assert!(uf.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_normalizer() {
        let uf = UtilizationFactorParameters {
            isc_dni_top: 0.0,
            ..UtilizationFactorParameters::disabled()
        };
        assert!(matches!(
            uf.validate(),
            Err(ModelError::InvalidModule {
                field: "isc_dni_top",
                ..
            })
        ));
    }

    #[test]
    fn curve_matches_plotting_range() {
        let uf = UtilizationFactorParameters::airmass_and_temperature();
        let curve = uf.airmass_curve((1..10).map(f64::from));
        assert_eq!(curve.len(), 9);
        assert!((curve[0].1 - 0.93).abs() < 1e-12);
        assert!(curve.windows(2).skip(1).all(|w| w[1].1 < w[0].1));
    }

    #[test]
    fn simple_factor_is_unclamped() {
        assert!((simple_util_factor(9.0, 1.7, 0.1, -0.1) - 0.27).abs() < 1e-12);
    }
}
