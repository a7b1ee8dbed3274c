//! Configuration of a validation batch
//!
//! Batches are described in TOML. Every field has a default, so a configuration file only
//! needs to list the values that differ:
//!
//! ```toml
//! input_dir = "inputs_validation"
//! output_dir = "outputs_validation"
//! gia = 0.0
//! ```

use crate::errors::{IWEMError, IWEMResult};
use crate::timeseries::FloatValue;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Placeholder substituted with the scenario identifier in [`RunnerConfig::slr_file_pattern`]
pub const SCENARIO_PLACEHOLDER: &str = "{scenario}";

/// Settings for [`ValidationRunner`](crate::runner::ValidationRunner)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Directory holding the input tables
    /// default: "inputs_validation"
    pub input_dir: PathBuf,

    /// Directory receiving one CSV per run; created if absent
    /// default: "outputs_validation"
    pub output_dir: PathBuf,

    /// Site parameters table, relative to `input_dir`
    /// default: "Parameters.csv"
    pub parameters_file: PathBuf,

    /// Initial conditions table, relative to `input_dir`
    /// default: "InitialConditions.csv"
    pub initial_conditions_file: PathBuf,

    /// File name of each scenario's sea-level rise table, relative to `input_dir`
    /// default: "SLR_{scenario}.csv"
    pub slr_file_pattern: String,

    /// Glacio-isostatic adjustment applied to every run
    /// unit: mm/yr
    /// default: 0.0
    pub gia: FloatValue,

    /// Distribute runs across threads
    /// default: true
    pub parallel: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("inputs_validation"),
            output_dir: PathBuf::from("outputs_validation"),
            parameters_file: PathBuf::from("Parameters.csv"),
            initial_conditions_file: PathBuf::from("InitialConditions.csv"),
            slr_file_pattern: format!("SLR_{}.csv", SCENARIO_PLACEHOLDER),
            gia: 0.0,
            parallel: true,
        }
    }
}

impl RunnerConfig {
    pub fn from_toml_str(content: &str) -> IWEMResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> IWEMResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| IWEMError::io(path, e))?;
        Self::from_toml_str(&content)
    }

    pub fn parameters_path(&self) -> PathBuf {
        self.input_dir.join(&self.parameters_file)
    }

    pub fn initial_conditions_path(&self) -> PathBuf {
        self.input_dir.join(&self.initial_conditions_file)
    }

    /// Path of the sea-level rise table for `scenario`
    pub fn slr_path(&self, scenario: &str) -> PathBuf {
        self.input_dir
            .join(self.slr_file_pattern.replace(SCENARIO_PLACEHOLDER, scenario))
    }
}
