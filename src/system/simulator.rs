//! Simulator holding the site, modules and sub-model settings.

use chrono::{DateTime, Datelike, Utc};

use crate::error::{ModelError, ModelResult};
use crate::module::params::ModuleParameters;
use crate::physics::diode::{MaxPowerPoint, STC_IRRADIANCE, STC_TEMPERATURE};
use crate::physics::engine::{NativeEngine, PhysicsEngine};
use crate::physics::iam::IamModel;
use crate::physics::irradiance::{DEFAULT_ALBEDO, SkyIrradiance};
use crate::physics::solar::{Location, SolarPosition, extra_radiation, relative_airmass};
use crate::physics::temperature::PvsystTemperature;
use crate::physics::tracking::TrackerParameters;
use crate::weather::{AirmassWeather, SolarPositionSeries, WeatherSample, WeatherSeries};

/// Runs the system orchestrators against one site.
///
/// Generic over `E: PhysicsEngine` for static dispatch; the sub-models are
/// only reached through the engine.
#[derive(Debug, Clone)]
pub struct Simulator<E: PhysicsEngine = NativeEngine> {
    pub(super) engine: E,
    pub(super) location: Location,
    pub(super) tracker: TrackerParameters,
    pub(super) flat_plate: ModuleParameters,
    pub(super) cpv: ModuleParameters,
    pub(super) flat_plate_temperature: PvsystTemperature,
    pub(super) cpv_temperature: PvsystTemperature,
    pub(super) flat_plate_iam: IamModel,
    pub(super) cpv_iam: IamModel,
    pub(super) albedo: f64,
}

impl Simulator<NativeEngine> {
    /// Simulator backed by the in-crate sub-models.
    ///
    /// # Errors
    ///
    /// See [`Simulator::new`].
    pub fn native(
        location: Location,
        flat_plate: ModuleParameters,
        cpv: ModuleParameters,
    ) -> ModelResult<Self> {
        Self::new(NativeEngine::default(), location, flat_plate, cpv)
    }
}

impl<E: PhysicsEngine> Simulator<E> {
    /// Creates a simulator with the default tracker, temperature models,
    /// angular loss models and albedo.
    ///
    /// # Arguments
    ///
    /// * `engine` - Physical sub-model implementation
    /// * `location` - Site of the systems
    /// * `flat_plate` - Normalized flat-plate module
    /// * `cpv` - Normalized concentrator module
    ///
    /// # Errors
    ///
    /// Returns `ModelError::InvalidModule` if either module has the wrong
    /// technology.
    pub fn new(
        engine: E,
        location: Location,
        flat_plate: ModuleParameters,
        cpv: ModuleParameters,
    ) -> ModelResult<Self> {
        if !matches!(flat_plate, ModuleParameters::FlatPlate(_)) {
            return Err(ModelError::InvalidModule {
                field: "flat_plate",
                reason: "expected a flat-plate module".into(),
            });
        }
        if !matches!(cpv, ModuleParameters::Concentrator(_)) {
            return Err(ModelError::InvalidModule {
                field: "cpv",
                reason: "expected a concentrator module".into(),
            });
        }
        Ok(Self {
            engine,
            location,
            tracker: TrackerParameters::default(),
            flat_plate,
            cpv,
            flat_plate_temperature: PvsystTemperature::freestanding(),
            cpv_temperature: PvsystTemperature::concentrator(),
            flat_plate_iam: IamModel::martin_ruiz_default(),
            cpv_iam: IamModel::martin_ruiz_default(),
            albedo: DEFAULT_ALBEDO,
        })
    }

    /// Replaces the tracker limits and backtracking geometry.
    pub fn with_tracker(mut self, tracker: TrackerParameters) -> Self {
        self.tracker = tracker;
        self
    }

    /// Replaces both cell temperature models.
    pub fn with_temperature_models(
        mut self,
        flat_plate: PvsystTemperature,
        cpv: PvsystTemperature,
    ) -> Self {
        self.flat_plate_temperature = flat_plate;
        self.cpv_temperature = cpv;
        self
    }

    /// Replaces the flat-plate incidence angle modifier.
    pub fn with_flat_plate_iam(mut self, iam: IamModel) -> Self {
        self.flat_plate_iam = iam;
        self
    }

    /// Replaces the concentrator incidence angle modifier.
    pub fn with_cpv_iam(mut self, iam: IamModel) -> Self {
        self.cpv_iam = iam;
        self
    }

    /// Sets the ground reflectance used for transposition.
    pub fn with_albedo(mut self, albedo: f64) -> Self {
        self.albedo = albedo;
        self
    }

    /// Physics backend.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Site the sun positions are computed for.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Single-axis tracker settings.
    pub fn tracker(&self) -> &TrackerParameters {
        &self.tracker
    }

    /// Normalized flat-plate module used by the PV orchestrators.
    pub fn flat_plate_module(&self) -> &ModuleParameters {
        &self.flat_plate
    }

    /// Normalized concentrator module used by the CPV orchestrators.
    pub fn cpv_module(&self) -> &ModuleParameters {
        &self.cpv
    }

    /// Sun positions for every timestamp of `weather`.
    pub fn solar_positions(&self, weather: &WeatherSeries) -> SolarPositionSeries {
        SolarPositionSeries::compute(&self.engine, &self.location, weather)
    }

    /// Maximum power at standard test conditions.
    pub fn stc_power(&self, module: &ModuleParameters) -> f64 {
        self.engine
            .solve_single_diode(module.coefficients(), STC_IRRADIANCE, STC_TEMPERATURE)
            .p_mp
    }

    /// Operating point at cell temperature `temp_cell` and at 25 °C.
    pub(super) fn operating_points(
        &self,
        module: &ModuleParameters,
        effective_irradiance: f64,
        temp_cell: f64,
    ) -> (MaxPowerPoint, MaxPowerPoint) {
        let c = module.coefficients();
        (
            self.engine
                .solve_single_diode(c, effective_irradiance, temp_cell),
            self.engine
                .solve_single_diode(c, effective_irradiance, STC_TEMPERATURE),
        )
    }

    /// Horizontal irradiance state for one sample.
    pub(super) fn sky(&self, sample: &WeatherSample, sun: &SolarPosition) -> SkyIrradiance {
        SkyIrradiance {
            ghi: sample.ghi,
            dhi: sample.dhi,
            dni: sample.dni,
            dni_extra: extra_radiation(sample.timestamp.ordinal()),
            airmass: relative_airmass(sun.zenith),
            albedo: self.albedo,
        }
    }

    /// Utilization factor of the concentrator for one sample.
    ///
    /// `airmass` comes from [`WeatherSeries::with_airmass`]; flat plates are
    /// never de-rated.
    pub(super) fn utilization_factor(
        &self,
        module: &ModuleParameters,
        airmass: Option<f64>,
        temp_air: f64,
    ) -> f64 {
        match module.utilization() {
            Some(uf) => uf.factor(airmass, temp_air),
            None => 1.0,
        }
    }

    /// Weather augmented with the airmass of every timestamp.
    pub(super) fn airmass_weather(
        &self,
        weather: &WeatherSeries,
        solar: &SolarPositionSeries,
    ) -> ModelResult<AirmassWeather> {
        weather.with_airmass(&self.engine, &self.location, solar)
    }
}

/// Checks that the inputs are aligned and pairs them up per timestamp.
pub(super) fn aligned_inputs<'a>(
    weather: &'a WeatherSeries,
    solar: &'a SolarPositionSeries,
) -> ModelResult<impl Iterator<Item = (WeatherSample, SolarPosition)> + 'a> {
    ModelError::check_len("solar_position", weather.len(), solar.len())?;
    Ok(weather.samples().zip(solar.iter()))
}

/// Accumulates per-timestamp outputs into a [`super::SystemResult`].
#[derive(Debug, Default)]
pub(super) struct ResultBuilder {
    timestamps: Vec<DateTime<Utc>>,
    irradiance: Vec<f64>,
    effective_irradiance: Vec<f64>,
    temp_cell: Vec<f64>,
    power: Vec<f64>,
    power_25: Vec<f64>,
}

impl ResultBuilder {
    pub(super) fn with_capacity(n: usize) -> Self {
        Self {
            timestamps: Vec::with_capacity(n),
            irradiance: Vec::with_capacity(n),
            effective_irradiance: Vec::with_capacity(n),
            temp_cell: Vec::with_capacity(n),
            power: Vec::with_capacity(n),
            power_25: Vec::with_capacity(n),
        }
    }

    pub(super) fn push(
        &mut self,
        timestamp: DateTime<Utc>,
        irradiance: f64,
        effective_irradiance: f64,
        temp_cell: f64,
        power: f64,
        power_25: f64,
    ) {
        self.timestamps.push(timestamp);
        self.irradiance.push(irradiance);
        self.effective_irradiance.push(effective_irradiance);
        self.temp_cell.push(temp_cell);
        self.power.push(power);
        self.power_25.push(power_25);
    }

    pub(super) fn finish(self, stc_power: f64, area: f64) -> super::SystemResult {
        super::SystemResult {
            timestamps: self.timestamps,
            irradiance: self.irradiance,
            effective_irradiance: self.effective_irradiance,
            temp_cell: self.temp_cell,
            power: self.power,
            power_25: self.power_25,
            stc_power,
            area,
            aperture_efficiency: stc_power / (STC_IRRADIANCE * area),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::params::{ModuleArchetype, ModuleSpec};

    fn modules() -> (ModuleParameters, ModuleParameters) {
        (
            ModuleSpec::new(ModuleArchetype::FlatPlate)
                .nameplate_efficiency(20.0)
                .build()
                .unwrap(),
            ModuleSpec::new(ModuleArchetype::Concentrator)
                .nameplate_efficiency(30.0)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn rejects_swapped_modules() {
        let (fp, cpv) = modules();
        let loc = Location::new(40.4, -3.7, 650.0);
        assert!(Simulator::native(loc, cpv.clone(), fp.clone()).is_err());
        assert!(Simulator::native(loc, fp, cpv).is_ok());
    }

    #[test]
    fn flat_plate_stc_power_matches_nameplate() {
        let (fp, cpv) = modules();
        let sim = Simulator::native(Location::new(40.4, -3.7, 650.0), fp, cpv).unwrap();
        let module = sim.flat_plate_module();
        let eff = sim.stc_power(module) / (1000.0 * module.area());
        assert!((eff - 0.20).abs() < 0.01, "efficiency {eff}");
    }

    #[test]
    fn aligned_inputs_checks_lengths() {
        let weather = WeatherSeries::default();
        let solar = SolarPositionSeries::new(vec![30.0], vec![180.0]).unwrap();
        assert!(aligned_inputs(&weather, &solar).is_err());
    }

    #[test]
    fn flat_plate_has_unit_utilization() {
        let (fp, cpv) = modules();
        let sim = Simulator::native(Location::new(40.4, -3.7, 650.0), fp, cpv).unwrap();
        assert_eq!(sim.utilization_factor(sim.flat_plate_module(), None, 20.0), 1.0);
        assert_eq!(sim.utilization_factor(sim.cpv_module(), None, 20.0), 0.0);
        assert_eq!(sim.utilization_factor(sim.cpv_module(), Some(1.5), 20.0), 1.0);
    }
}
