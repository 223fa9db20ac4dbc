//! DC power simulation of flat-plate PV, concentrator PV and hybrid static
//! CPV/flat-plate systems.

pub mod config;
pub mod error;
pub mod io;
/// Module electrical parameters and utilization factor.
pub mod module;
pub mod physics;
/// System orchestrators, results and energy reporting.
pub mod system;
pub mod weather;

pub use error::{ModelError, ModelResult};
pub use system::{Simulator, SystemResult};
