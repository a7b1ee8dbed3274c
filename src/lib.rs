//! Integrated Wetland Elevation Model
//!
//! Re-exports [`iwem_core`] and, with the `python` feature, builds the `iwem._lib` extension
//! module.

pub use iwem_core::{
    config, constants, errors, output, parameters, runner, scenario, simulator, submodels,
    timeseries,
};
pub use iwem_core::{simulate, simulate_to_file, SimulationConfig, SimulationResult};

#[cfg(feature = "python")]
mod python;
