//! Physical sub-models: sun geometry, transposition, optics, thermal and
//! electrical behaviour.

pub mod diode;
pub mod engine;
pub mod iam;
pub mod irradiance;
pub mod solar;
pub mod temperature;
pub mod tracking;

pub use diode::{DiodeSolver, MaxPowerPoint, SingleDiodeCoefficients};
pub use engine::{NativeEngine, PhysicsEngine};
pub use iam::{IamModel, IamTable};
pub use irradiance::{DiffuseModel, PoaIrradiance, SkyIrradiance};
pub use solar::{Location, SolarPosition};
pub use temperature::PvsystTemperature;
pub use tracking::{Mounting, SurfaceOrientation, TrackerOrientation, TrackerParameters};
