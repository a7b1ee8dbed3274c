//! Validation scenario inputs
//!
//! Validation runs are described by three kinds of CSV table:
//!
//! - a **parameters** table with one row per site, the site identifier in the first column and
//!   the sub-model coefficients in named columns (see [`SiteParameters::CSV_COLUMNS`]),
//! - an **initial conditions** table keyed by `(site, scenario, variant)` in its first three
//!   columns, with the columns listed in [`InitialConditions::CSV_COLUMNS`],
//! - a **sea-level rise** table per scenario with `Year` and `SLR` columns.
//!
//! Every row of the initial conditions table is one run. [`ScenarioInputs::config_for`] joins the
//! tables into the [`SimulationConfig`] of a run.

use crate::errors::{IWEMError, IWEMResult};
use crate::parameters::{InitialConditions, SimulationConfig, SimulationParameters, SiteParameters};
use crate::timeseries::{FloatValue, Time, Timeseries};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Number of leading key columns in the initial conditions table
const RUN_KEY_COLUMNS: usize = 3;

const SLR_TIME_COLUMN: &str = "Year";
const SLR_VALUE_COLUMN: &str = "SLR";

/// Identifier of a single validation run
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunKey {
    pub site: String,
    pub scenario: String,
    pub variant: String,
}

impl RunKey {
    pub fn new(
        site: impl Into<String>,
        scenario: impl Into<String>,
        variant: impl Into<String>,
    ) -> Self {
        Self {
            site: site.into(),
            scenario: scenario.into(),
            variant: variant.into(),
        }
    }

    /// Identifiers joined by underscores, e.g. `Rhyll_ST_1`
    pub fn file_stem(&self) -> String {
        format!("{}_{}_{}", self.site, self.scenario, self.variant)
    }

    /// Name of the CSV file holding this run's output
    pub fn output_file_name(&self) -> String {
        format!("{}.csv", self.file_stem())
    }
}

impl fmt::Display for RunKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.site, self.scenario, self.variant)
    }
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn open(path: &Path) -> IWEMResult<File> {
    File::open(path).map_err(|e| IWEMError::io(path, e))
}

fn require_columns(headers: &csv::StringRecord, columns: &[&str], source: &Path) -> IWEMResult<()> {
    match columns
        .iter()
        .find(|column| !headers.iter().any(|header| header == **column))
    {
        Some(missing) => Err(IWEMError::missing_key(
            format!("columns of {}", source.display()),
            *missing,
        )),
        None => Ok(()),
    }
}

/// Read the site parameters table
pub fn read_parameter_table<R: Read>(
    reader: R,
    source: &Path,
) -> IWEMResult<HashMap<String, SiteParameters>> {
    let mut reader = csv_reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| IWEMError::csv(source, e))?
        .clone();
    require_columns(&headers, &SiteParameters::CSV_COLUMNS, source)?;

    let mut table = HashMap::new();
    for record in reader.records() {
        let record = record.map_err(|e| IWEMError::csv(source, e))?;
        let site = record.get(0).unwrap_or_default().to_string();
        let parameters: SiteParameters = record
            .deserialize(Some(&headers))
            .map_err(|e| IWEMError::csv(source, e))?;
        if table.insert(site.clone(), parameters).is_some() {
            return Err(IWEMError::duplicate_key(source.display().to_string(), site));
        }
    }
    Ok(table)
}

/// Read the initial conditions table, preserving row order
///
/// Repeated keys are reported and only their first occurrence is kept.
pub fn read_initial_conditions_table<R: Read>(
    reader: R,
    source: &Path,
) -> IWEMResult<Vec<(RunKey, InitialConditions)>> {
    let mut reader = csv_reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| IWEMError::csv(source, e))?
        .clone();
    if headers.len() < RUN_KEY_COLUMNS + InitialConditions::CSV_COLUMNS.len() {
        return Err(IWEMError::missing_key(
            format!("columns of {}", source.display()),
            "site, scenario and variant key columns",
        ));
    }
    require_columns(&headers, &InitialConditions::CSV_COLUMNS, source)?;

    let mut runs: Vec<(RunKey, InitialConditions)> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IWEMError::csv(source, e))?;
        let key = RunKey::new(
            record.get(0).unwrap_or_default(),
            record.get(1).unwrap_or_default(),
            record.get(2).unwrap_or_default(),
        );
        let initial: InitialConditions = record
            .deserialize(Some(&headers))
            .map_err(|e| IWEMError::csv(source, e))?;

        if runs.iter().any(|(existing, _)| *existing == key) {
            log::warn!(
                "Ignoring repeated run {} in {}",
                key,
                source.display()
            );
            continue;
        }
        runs.push((key, initial));
    }
    Ok(runs)
}

#[derive(Debug, Deserialize)]
struct SlrRow {
    #[serde(rename = "Year")]
    year: Time,
    #[serde(rename = "SLR")]
    slr: FloatValue,
}

/// Read a sea-level rise table with `Year` and `SLR` columns
pub fn read_slr<R: Read>(reader: R, source: &Path) -> IWEMResult<Timeseries> {
    let mut reader = csv_reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| IWEMError::csv(source, e))?
        .clone();
    require_columns(&headers, &[SLR_TIME_COLUMN, SLR_VALUE_COLUMN], source)?;

    let rows = reader
        .deserialize::<SlrRow>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| IWEMError::csv(source, e))?;

    let time: Array1<Time> = rows.iter().map(|row| row.year).collect();
    let slr: Array1<FloatValue> = rows.iter().map(|row| row.slr).collect();
    Timeseries::try_from_values(slr, time)
}

/// Load a sea-level rise table from disk
pub fn load_slr(path: &Path) -> IWEMResult<Timeseries> {
    let slr = read_slr(open(path)?, path)?;
    log::debug!("Read {} sea-level rise values from {}", slr.len(), path.display());
    Ok(slr)
}

/// Site parameters and run definitions shared by every run of a validation batch
#[derive(Debug, Clone, Default)]
pub struct ScenarioInputs {
    parameters: HashMap<String, SiteParameters>,
    runs: Vec<(RunKey, InitialConditions)>,
}

impl ScenarioInputs {
    pub fn new(
        parameters: HashMap<String, SiteParameters>,
        runs: Vec<(RunKey, InitialConditions)>,
    ) -> Self {
        Self { parameters, runs }
    }

    /// Load the parameters and initial conditions tables
    pub fn load(parameters_path: &Path, initial_conditions_path: &Path) -> IWEMResult<Self> {
        let parameters = read_parameter_table(open(parameters_path)?, parameters_path)?;
        let runs =
            read_initial_conditions_table(open(initial_conditions_path)?, initial_conditions_path)?;
        let inputs = Self::new(parameters, runs);
        log::info!(
            "Loaded parameters for {} sites and {} runs",
            inputs.parameters.len(),
            inputs.n_runs()
        );
        Ok(inputs)
    }

    /// Run keys in table order
    pub fn runs(&self) -> impl Iterator<Item = &RunKey> {
        self.runs.iter().map(|(key, _)| key)
    }

    pub fn n_runs(&self) -> usize {
        self.runs.len()
    }

    pub fn site_parameters(&self, site: &str) -> IWEMResult<&SiteParameters> {
        self.parameters
            .get(site)
            .ok_or_else(|| IWEMError::missing_key("site parameters", site))
    }

    pub fn initial_conditions(&self, key: &RunKey) -> IWEMResult<&InitialConditions> {
        self.runs
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, initial)| initial)
            .ok_or_else(|| IWEMError::missing_key("initial conditions", key.to_string()))
    }

    /// Join the tables into the configuration of a single run
    pub fn config_for(
        &self,
        key: &RunKey,
        slr: &Timeseries,
        gia: FloatValue,
    ) -> IWEMResult<SimulationConfig> {
        let parameters = SimulationParameters {
            gia,
            initial: *self.initial_conditions(key)?,
            site: *self.site_parameters(&key.site)?,
        };
        Ok(SimulationConfig::from_timeseries(slr, parameters))
    }
}
