//! Core of the Integrated Wetland Elevation Model (IWEM)
//!
//! Simulates long-term surface elevation change of coastal wetlands under sea-level rise.
//! Each year the surface is located within the tidal frame, mineral and organic accretion and
//! autocompaction are evaluated at that position, and elevation and mean tide level are
//! advanced to the next year.
//!
//! ```rust
//! use iwem_core::parameters::{InitialConditions, SimulationConfig, SiteParameters};
//! use iwem_core::simulate;
//! use ndarray::array;
//!
//! let config = SimulationConfig::new(
//!     array![2000.0, 2001.0, 2002.0],
//!     array![0.003, 0.003, 0.003],
//!     0.0,
//!     InitialConditions { initial_elevation: 0.6, initial_mtl: 0.0, tidal_range: 2.0 },
//!     SiteParameters {
//!         a_mar: -4.0, b_mar: 5.0,
//!         a_oar_mangrove: 0.0, b_oar_mangrove: -1.0, c_oar_mangrove: 1.5,
//!         a_oar_saltmarsh: 0.0, b_oar_saltmarsh: 0.0, c_oar_saltmarsh: 0.8,
//!         a_autocompaction: 0.1,
//!         mangrove_saltmarsh_threshold: 0.5,
//!     },
//! );
//! let result = simulate(&config).unwrap();
//! assert_eq!(result.len(), 3);
//! ```

pub mod config;
pub mod constants;
pub mod errors;
pub mod output;
pub mod parameters;
#[cfg(feature = "python")]
pub mod python;
pub mod runner;
pub mod scenario;
pub mod simulator;
pub mod submodels;
pub mod timeseries;

pub use output::SimulationResult;
pub use parameters::SimulationConfig;
pub use simulator::{simulate, simulate_to_file};
