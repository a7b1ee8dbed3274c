//! Simulation output table
//!
//! A [`SimulationResult`] holds one row per timestep with the columns
//!
//! `Time, SLR, Elevation, MTL, HAT, z, MAR, AC, MangroveOAR, SaltmarshOAR, MangroveOrSaltmarsh, OAR, EGain`
//!
//! Downstream analysis scripts depend on these names and their order, so they are fixed
//! by [`Column::ALL`] and reproduced verbatim in the CSV header.

use crate::errors::{IWEMError, IWEMResult};
use crate::simulator::TimeStepState;
use crate::timeseries::{FloatValue, Time};
use ndarray::Array1;
use serde::{Deserialize, Serialize, Serializer};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Columns of the output table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    Time,
    Slr,
    Elevation,
    Mtl,
    Hat,
    Z,
    Mar,
    Ac,
    MangroveOar,
    SaltmarshOar,
    MangroveOrSaltmarsh,
    Oar,
    EGain,
}

impl Column {
    /// All columns in output order
    pub const ALL: [Column; 13] = [
        Column::Time,
        Column::Slr,
        Column::Elevation,
        Column::Mtl,
        Column::Hat,
        Column::Z,
        Column::Mar,
        Column::Ac,
        Column::MangroveOar,
        Column::SaltmarshOar,
        Column::MangroveOrSaltmarsh,
        Column::Oar,
        Column::EGain,
    ];

    /// Header used in the output table
    pub fn name(&self) -> &'static str {
        match self {
            Column::Time => "Time",
            Column::Slr => "SLR",
            Column::Elevation => "Elevation",
            Column::Mtl => "MTL",
            Column::Hat => "HAT",
            Column::Z => "z",
            Column::Mar => "MAR",
            Column::Ac => "AC",
            Column::MangroveOar => "MangroveOAR",
            Column::SaltmarshOar => "SaltmarshOAR",
            Column::MangroveOrSaltmarsh => "MangroveOrSaltmarsh",
            Column::Oar => "OAR",
            Column::EGain => "EGain",
        }
    }
}

/// Largest magnitude below which every integral `f64` converts exactly to `i64`
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Timestep label as written to the table
///
/// Whole years are written as integers (`2020`), other labels as floats (`2020.5`).
#[derive(Debug, Clone, Copy, PartialEq)]
struct TimeLabel(Time);

impl Serialize for TimeLabel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.0.fract() == 0.0 && self.0.abs() < MAX_EXACT_INTEGER {
            serializer.serialize_i64(self.0 as i64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

/// A single serialised row; field order and names define the CSV layout
#[derive(Debug, Serialize)]
struct OutputRow {
    #[serde(rename = "Time")]
    time: TimeLabel,
    #[serde(rename = "SLR")]
    slr: FloatValue,
    #[serde(rename = "Elevation")]
    elevation: FloatValue,
    #[serde(rename = "MTL")]
    mtl: FloatValue,
    #[serde(rename = "HAT")]
    hat: FloatValue,
    z: FloatValue,
    #[serde(rename = "MAR")]
    mar: FloatValue,
    #[serde(rename = "AC")]
    ac: FloatValue,
    #[serde(rename = "MangroveOAR")]
    mangrove_oar: FloatValue,
    #[serde(rename = "SaltmarshOAR")]
    saltmarsh_oar: FloatValue,
    #[serde(rename = "MangroveOrSaltmarsh")]
    mangrove_or_saltmarsh: FloatValue,
    #[serde(rename = "OAR")]
    oar: FloatValue,
    #[serde(rename = "EGain")]
    e_gain: FloatValue,
}

/// Time series of model state produced by a single run
///
/// Immutable once built; owned entirely by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    time: Array1<Time>,
    slr: Array1<FloatValue>,
    steps: Vec<TimeStepState>,
}

impl SimulationResult {
    pub(crate) fn new(
        time: Array1<Time>,
        slr: Array1<FloatValue>,
        steps: Vec<TimeStepState>,
    ) -> Self {
        debug_assert_eq!(time.len(), steps.len());
        debug_assert_eq!(slr.len(), steps.len());
        Self { time, slr, steps }
    }

    /// Number of timesteps (rows)
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[TimeStepState] {
        &self.steps
    }

    /// State at the last timestep
    pub fn final_state(&self) -> Option<&TimeStepState> {
        self.steps.last()
    }

    /// Value of `column` at row `index`
    pub fn value(&self, column: Column, index: usize) -> Option<FloatValue> {
        let step = self.steps.get(index)?;
        Some(match column {
            Column::Time => self.time[index],
            Column::Slr => self.slr[index],
            Column::Elevation => step.elevation,
            Column::Mtl => step.mtl,
            Column::Hat => step.hat,
            Column::Z => step.z,
            Column::Mar => step.mar,
            Column::Ac => step.autocompaction,
            Column::MangroveOar => step.oar_mangrove,
            Column::SaltmarshOar => step.oar_saltmarsh,
            Column::MangroveOrSaltmarsh => step.oar_selected,
            Column::Oar => step.oar,
            Column::EGain => step.elevation_gain,
        })
    }

    /// Extract a whole column
    pub fn column(&self, column: Column) -> Array1<FloatValue> {
        (0..self.len())
            .filter_map(|index| self.value(column, index))
            .collect()
    }

    /// All columns in output order, paired with their names
    pub fn columns(&self) -> Vec<(&'static str, Array1<FloatValue>)> {
        Column::ALL
            .into_iter()
            .map(|column| (column.name(), self.column(column)))
            .collect()
    }

    fn rows(&self) -> impl Iterator<Item = OutputRow> + '_ {
        self.steps.iter().enumerate().map(|(index, step)| OutputRow {
            time: TimeLabel(self.time[index]),
            slr: self.slr[index],
            elevation: step.elevation,
            mtl: step.mtl,
            hat: step.hat,
            z: step.z,
            mar: step.mar,
            ac: step.autocompaction,
            mangrove_oar: step.oar_mangrove,
            saltmarsh_oar: step.oar_saltmarsh,
            mangrove_or_saltmarsh: step.oar_selected,
            oar: step.oar,
            e_gain: step.elevation_gain,
        })
    }

    /// Serialise the table as CSV with a header row
    pub fn to_csv_writer<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(writer);
        for row in self.rows() {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Render the table as a CSV string
    pub fn to_csv_string(&self) -> IWEMResult<String> {
        let mut buffer = Vec::new();
        self.to_csv_writer(&mut buffer)
            .map_err(|e| IWEMError::csv("<memory>", e))?;
        String::from_utf8(buffer).map_err(|e| {
            IWEMError::io(
                "<memory>",
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })
    }

    /// Write the table to `path`, replacing any existing file
    pub fn write_csv(&self, path: &Path) -> IWEMResult<()> {
        let file = File::create(path).map_err(|e| IWEMError::io(path, e))?;
        self.to_csv_writer(BufWriter::new(file))
            .map_err(|e| IWEMError::csv(path, e))?;
        log::debug!("Wrote {} rows to {}", self.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submodels::Vegetation;
    use ndarray::array;

    fn step(elevation: FloatValue, mtl: FloatValue) -> TimeStepState {
        TimeStepState {
            elevation,
            mtl,
            hat: mtl + 1.0,
            z: elevation - mtl,
            mar: 4.0,
            autocompaction: 0.5,
            oar_mangrove: 1.5,
            oar_saltmarsh: -0.25,
            oar_selected: -0.25,
            oar: 0.0,
            elevation_gain: 3.5,
            vegetation: Vegetation::Saltmarsh,
        }
    }

    fn result() -> SimulationResult {
        SimulationResult::new(
            array![2020.0, 2021.0],
            array![0.005, 0.0],
            vec![step(0.75, 0.0), step(0.7535, 0.005)],
        )
    }

    #[test]
    fn test_column_names_and_order() {
        let names: Vec<_> = Column::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec![
                "Time",
                "SLR",
                "Elevation",
                "MTL",
                "HAT",
                "z",
                "MAR",
                "AC",
                "MangroveOAR",
                "SaltmarshOAR",
                "MangroveOrSaltmarsh",
                "OAR",
                "EGain"
            ]
        );
    }

    #[test]
    fn test_column_extraction() {
        let result = result();
        assert_eq!(result.column(Column::Time), array![2020.0, 2021.0]);
        assert_eq!(result.column(Column::Elevation), array![0.75, 0.7535]);
        assert_eq!(result.column(Column::MangroveOrSaltmarsh), array![-0.25, -0.25]);
        assert_eq!(result.column(Column::Oar), array![0.0, 0.0]);
        assert_eq!(result.value(Column::Slr, 0), Some(0.005));
        assert_eq!(result.value(Column::Slr, 2), None);
        assert_eq!(result.columns().len(), 13);
    }

    #[test]
    fn test_csv_layout() {
        let csv = result().to_csv_string().unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Time,SLR,Elevation,MTL,HAT,z,MAR,AC,MangroveOAR,SaltmarshOAR,MangroveOrSaltmarsh,OAR,EGain"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2020,0.005,0.75,0.0,1.0,0.75,4.0,0.5,1.5,-0.25,-0.25,0.0,3.5"
        );
        assert_eq!(lines.count(), 1);
    }

    #[test]
    fn test_fractional_time_labels() {
        let result = SimulationResult::new(
            array![2020.5, 2021.5],
            array![0.005, 0.0],
            vec![step(0.75, 0.0), step(0.7535, 0.005)],
        );
        let csv = result.to_csv_string().unwrap();
        let times: Vec<_> = csv
            .lines()
            .skip(1)
            .map(|line| line.split(',').next().unwrap())
            .collect();
        assert_eq!(times, vec!["2020.5", "2021.5"]);
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Site_Scenario_1.csv");
        result().write_csv(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, result().to_csv_string().unwrap());
    }

    #[test]
    fn test_write_csv_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let err = result().write_csv(&path).unwrap_err();
        assert!(err.is_io_failure());
    }
}
