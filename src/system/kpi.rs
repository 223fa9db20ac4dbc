//! Post-hoc energy figures from a system result.

use std::fmt;

use super::types::SystemResult;

/// Energy totals and ratios of one simulated system.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyReport {
    /// DC energy at operating temperature (kWh).
    pub energy_kwh: f64,
    /// DC energy with cells at 25 °C (kWh).
    pub energy_25_kwh: f64,
    /// Share of the 25 °C energy lost to cell heating.
    pub thermal_loss_fraction: f64,
    /// Peak DC power (W).
    pub peak_power_w: f64,
    /// Reported irradiance integrated over time (kWh/m²).
    pub incident_kwh_m2: f64,
    /// Energy over incident energy on the aperture.
    pub mean_efficiency: f64,
    /// Final yield over reference yield.
    pub performance_ratio: f64,
}

impl EnergyReport {
    /// Integrates a result with a fixed step.
    ///
    /// # Arguments
    ///
    /// * `result` - Output of a system orchestrator
    /// * `dt_hours` - Duration of each sample in hours
    pub fn from_result(result: &SystemResult, dt_hours: f64) -> Self {
        let energy_kwh = result.power.iter().sum::<f64>() * dt_hours / 1000.0;
        let energy_25_kwh = result.power_25.iter().sum::<f64>() * dt_hours / 1000.0;
        let incident_kwh_m2 = result.irradiance.iter().sum::<f64>() * dt_hours / 1000.0;
        let peak_power_w = result.power.iter().cloned().fold(0.0, f64::max);

        let thermal_loss_fraction = if energy_25_kwh > 0.0 {
            1.0 - energy_kwh / energy_25_kwh
        } else {
            0.0
        };
        let incident_on_aperture = incident_kwh_m2 * result.area;
        let mean_efficiency = if incident_on_aperture > 0.0 {
            energy_kwh / incident_on_aperture
        } else {
            0.0
        };
        // Reference yield in hours at 1 kW/m²; final yield per kW of STC power.
        let performance_ratio = if incident_kwh_m2 > 0.0 && result.stc_power > 0.0 {
            (energy_kwh / (result.stc_power / 1000.0)) / incident_kwh_m2
        } else {
            0.0
        };

        Self {
            energy_kwh,
            energy_25_kwh,
            thermal_loss_fraction,
            peak_power_w,
            incident_kwh_m2,
            mean_efficiency,
            performance_ratio,
        }
    }
}

impl fmt::Display for EnergyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Energy Report ---")?;
        writeln!(f, "DC energy:             {:.3} kWh", self.energy_kwh)?;
        writeln!(f, "DC energy at 25 °C:    {:.3} kWh", self.energy_25_kwh)?;
        writeln!(
            f,
            "Thermal losses:        {:.1}%",
            100.0 * self.thermal_loss_fraction
        )?;
        writeln!(f, "Peak power:            {:.1} W", self.peak_power_w)?;
        writeln!(f, "Incident irradiation:  {:.3} kWh/m²", self.incident_kwh_m2)?;
        writeln!(f, "Mean efficiency:       {:.1}%", 100.0 * self.mean_efficiency)?;
        write!(f, "Performance ratio:     {:.3}", self.performance_ratio)
    }
}
