//! Batch execution of validation runs
//!
//! [`ValidationRunner`] runs the elevation model once for every `(site, scenario, variant)`
//! combination of the initial conditions table and writes each result to
//! `<output_dir>/<site>_<scenario>_<variant>.csv`.
//!
//! Runs are independent: each reads its scenario's sea-level rise table, joins it with the
//! shared (read-only) site tables and simulates without touching any other run's state. A
//! failing run is recorded in the [`BatchReport`] and the remaining runs still execute.

use crate::config::RunnerConfig;
use crate::errors::{IWEMError, IWEMResult};
use crate::scenario::{load_slr, RunKey, ScenarioInputs};
use crate::simulator::simulate_to_file;
use rayon::prelude::*;
use std::path::PathBuf;

/// Result of a single run
#[derive(Debug)]
pub struct RunOutcome {
    pub key: RunKey,
    /// Output file on success
    pub result: IWEMResult<PathBuf>,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes of every run in enumeration order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<RunOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &RunOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &RunOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_success())
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(RunOutcome::is_success)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Runs every validation scenario described by a [`RunnerConfig`]
#[derive(Debug, Clone)]
pub struct ValidationRunner {
    config: RunnerConfig,
}

impl ValidationRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Load the shared tables and execute all runs
    ///
    /// Fails only if the shared tables cannot be loaded or the output directory cannot be
    /// created. Failures of individual runs are reported in the returned [`BatchReport`].
    pub fn run(&self) -> IWEMResult<BatchReport> {
        let inputs = ScenarioInputs::load(
            &self.config.parameters_path(),
            &self.config.initial_conditions_path(),
        )?;
        self.run_with_inputs(&inputs)
    }

    /// Execute all runs of already loaded inputs
    pub fn run_with_inputs(&self, inputs: &ScenarioInputs) -> IWEMResult<BatchReport> {
        let output_dir = &self.config.output_dir;
        std::fs::create_dir_all(output_dir).map_err(|e| IWEMError::io(output_dir, e))?;

        let keys: Vec<&RunKey> = inputs.runs().collect();
        let outcomes: Vec<RunOutcome> = if self.config.parallel {
            keys.par_iter().map(|key| self.execute(inputs, key)).collect()
        } else {
            keys.iter().map(|key| self.execute(inputs, key)).collect()
        };

        let report = BatchReport { outcomes };
        log::info!(
            "Completed {} runs ({} failed)",
            report.len(),
            report.failed().count()
        );
        Ok(report)
    }

    /// Execute a single run, isolating any failure to its outcome
    pub fn execute(&self, inputs: &ScenarioInputs, key: &RunKey) -> RunOutcome {
        log::info!("Running {}", key);
        let result = self.try_execute(inputs, key);
        if let Err(e) = &result {
            log::error!("Run {} failed: {}", key, e);
        }
        RunOutcome {
            key: key.clone(),
            result,
        }
    }

    fn try_execute(&self, inputs: &ScenarioInputs, key: &RunKey) -> IWEMResult<PathBuf> {
        let slr = load_slr(&self.config.slr_path(&key.scenario))?;
        let config = inputs.config_for(key, &slr, self.config.gia)?;
        let out_file = self.config.output_dir.join(key.output_file_name());
        let result = simulate_to_file(&config, Some(&out_file))?;
        if let Some(last) = result.final_state() {
            log::debug!(
                "Run {} finished at elevation {} (z = {}) under {}",
                key,
                last.elevation,
                last.z,
                last.vegetation
            );
        }
        Ok(out_file)
    }
}
