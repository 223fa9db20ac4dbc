//! Tabular export of simulation results.

pub mod export;
