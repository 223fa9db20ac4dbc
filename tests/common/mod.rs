//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, TimeZone, Utc};
use cpv_sim::Simulator;
use cpv_sim::config::ScenarioConfig;
use cpv_sim::weather::{SolarPositionSeries, SyntheticDay, WeatherSeries};

/// Simulator built from a named preset.
pub fn simulator(preset: &str) -> Simulator {
    ScenarioConfig::from_preset(preset)
        .and_then(|cfg| cfg.build_simulator())
        .unwrap_or_else(|e| panic!("preset {preset} should build: {e}"))
}

/// One noon sample: zenith 30°, azimuth 180°, DNI 800, GHI 900, DHI 200,
/// 25 °C ambient and 1 m/s wind.
pub fn noon_sample() -> (WeatherSeries, SolarPositionSeries) {
    let weather = WeatherSeries::new(
        vec![Utc.with_ymd_and_hms(2021, 6, 21, 12, 0, 0).unwrap()],
        vec![900.0],
        vec![200.0],
        vec![800.0],
        vec![25.0],
        vec![1.0],
    )
    .unwrap();
    let solar = SolarPositionSeries::new(vec![30.0], vec![180.0]).unwrap();
    (weather, solar)
}

/// Clear summer-solstice day at the simulator's site, hourly.
pub fn clear_day(sim: &Simulator) -> (WeatherSeries, SolarPositionSeries) {
    let date = NaiveDate::from_ymd_opt(2021, 6, 21).unwrap();
    let weather = SyntheticDay::clear(date, 60).generate(sim.engine(), sim.location());
    let solar = sim.solar_positions(&weather);
    (weather, solar)
}

/// Cloudy day with the AR(1) cloud process, every 15 minutes.
pub fn cloudy_day(sim: &Simulator, seed: u64) -> (WeatherSeries, SolarPositionSeries) {
    let date = NaiveDate::from_ymd_opt(2021, 9, 15).unwrap();
    let mut day = SyntheticDay::new(date, 15, seed);
    day.cloud_noise_std = 0.4;
    let weather = day.generate(sim.engine(), sim.location());
    let solar = sim.solar_positions(&weather);
    (weather, solar)
}

/// Relative difference of `a` from `b`.
pub fn rel_diff(a: f64, b: f64) -> f64 {
    (a - b).abs() / b.abs()
}
