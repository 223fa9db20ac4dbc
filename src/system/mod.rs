//! System orchestrators: flat-plate PV, tracked CPV, static CPV, static flat
//! plate and the hybrid CPV/flat-plate pair.
//!
//! Every orchestrator is a single pass over the aligned inputs:
//! geometry → optical losses → cell temperature → single-diode solution at
//! the operating temperature and at 25 °C → utilization factor (CPV only).
//! Inputs are borrowed immutably.

mod cpv;
mod hybrid;
pub mod kpi;
mod pv;
pub mod simulator;
mod static_cpv;
mod static_flat_plate;
pub mod types;

pub use kpi::EnergyReport;
pub use simulator::Simulator;
pub use types::{
    FlatPlateOptions, HybridCpvOutput, HybridFlatPlateOutput, IrradianceInput, SystemResult,
};
