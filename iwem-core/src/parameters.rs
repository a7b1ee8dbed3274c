//! Simulation inputs
//!
//! A run is described by a [`SimulationConfig`]: the annual time axis with its sea-level rise
//! rates, the background GIA rate, the site's [`InitialConditions`] and the fitted
//! [`SiteParameters`] of the accretion sub-models.
//!
//! Field names follow Rust conventions; the column names used in the published validation
//! tables (`a_MAR`, `a_OAR_mangr`, `initial_E`, ...) are accepted as serde aliases so that
//! rows can be deserialised directly.

use crate::errors::{IWEMError, IWEMResult};
use crate::submodels::{LinearModel, ProportionalModel, QuadraticModel};
use crate::timeseries::{check_time_values, FloatValue, Time, Timeseries};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Starting position of the wetland surface and the tidal frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialConditions {
    /// Initial surface elevation
    /// unit: m above datum
    #[serde(alias = "initial_E")]
    pub initial_elevation: FloatValue,

    /// Initial mean tide level
    /// unit: m above datum
    #[serde(alias = "initial_MTL")]
    pub initial_mtl: FloatValue,

    /// Tidal range
    /// unit: m
    pub tidal_range: FloatValue,
}

impl InitialConditions {
    /// Column names used by the initial conditions table
    pub const CSV_COLUMNS: [&'static str; 3] = ["initial_E", "initial_MTL", "tidal_range"];

    pub fn validate(&self) -> IWEMResult<()> {
        check_finite("initial_elevation", self.initial_elevation)?;
        check_finite("initial_mtl", self.initial_mtl)?;
        check_finite("tidal_range", self.tidal_range)
    }
}

/// Site-specific coefficients of the accretion and compaction sub-models
///
/// See [`crate::submodels`] for the functional forms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteParameters {
    /// Slope of mineral accretion against relative elevation
    /// unit: mm/yr
    #[serde(alias = "a_MAR")]
    pub a_mar: FloatValue,
    /// Mineral accretion at MTL
    /// unit: mm/yr
    #[serde(alias = "b_MAR")]
    pub b_mar: FloatValue,

    /// Quadratic term of mangrove organic accretion
    /// unit: mm/yr
    #[serde(alias = "a_OAR_mangr")]
    pub a_oar_mangrove: FloatValue,
    /// Linear term of mangrove organic accretion
    /// unit: mm/yr
    #[serde(alias = "b_OAR_mangr")]
    pub b_oar_mangrove: FloatValue,
    /// Constant term of mangrove organic accretion
    /// unit: mm/yr
    #[serde(alias = "c_OAR_mangr")]
    pub c_oar_mangrove: FloatValue,

    /// Quadratic term of saltmarsh organic accretion
    /// unit: mm/yr
    #[serde(alias = "a_OAR_saltm")]
    pub a_oar_saltmarsh: FloatValue,
    /// Linear term of saltmarsh organic accretion
    /// unit: mm/yr
    #[serde(alias = "b_OAR_saltm")]
    pub b_oar_saltmarsh: FloatValue,
    /// Constant term of saltmarsh organic accretion
    /// unit: mm/yr
    #[serde(alias = "c_OAR_saltm")]
    pub c_oar_saltmarsh: FloatValue,

    /// Fraction of mineral accretion lost to autocompaction
    /// unit: dimensionless
    #[serde(alias = "a_AC")]
    pub a_autocompaction: FloatValue,

    /// Cross-over relative elevation from mangrove to saltmarsh
    /// unit: dimensionless (relative elevation in the tidal frame)
    #[serde(alias = "mangr_saltm_threshold")]
    pub mangrove_saltmarsh_threshold: FloatValue,
}

impl SiteParameters {
    /// Column names used by the site parameters table
    pub const CSV_COLUMNS: [&'static str; 10] = [
        "a_MAR",
        "b_MAR",
        "a_OAR_mangr",
        "b_OAR_mangr",
        "c_OAR_mangr",
        "a_OAR_saltm",
        "b_OAR_saltm",
        "c_OAR_saltm",
        "a_AC",
        "mangr_saltm_threshold",
    ];

    pub fn mineral_accretion(&self) -> LinearModel {
        LinearModel::new(self.a_mar, self.b_mar)
    }

    pub fn mangrove_organic_accretion(&self) -> QuadraticModel {
        QuadraticModel::new(self.a_oar_mangrove, self.b_oar_mangrove, self.c_oar_mangrove)
    }

    pub fn saltmarsh_organic_accretion(&self) -> QuadraticModel {
        QuadraticModel::new(
            self.a_oar_saltmarsh,
            self.b_oar_saltmarsh,
            self.c_oar_saltmarsh,
        )
    }

    pub fn autocompaction(&self) -> ProportionalModel {
        ProportionalModel::new(self.a_autocompaction)
    }

    /// Check that every coefficient is finite
    ///
    /// Signs are not constrained.
    pub fn validate(&self) -> IWEMResult<()> {
        [
            ("a_mar", self.a_mar),
            ("b_mar", self.b_mar),
            ("a_oar_mangrove", self.a_oar_mangrove),
            ("b_oar_mangrove", self.b_oar_mangrove),
            ("c_oar_mangrove", self.c_oar_mangrove),
            ("a_oar_saltmarsh", self.a_oar_saltmarsh),
            ("b_oar_saltmarsh", self.b_oar_saltmarsh),
            ("c_oar_saltmarsh", self.c_oar_saltmarsh),
            ("a_autocompaction", self.a_autocompaction),
            (
                "mangrove_saltmarsh_threshold",
                self.mangrove_saltmarsh_threshold,
            ),
        ]
        .into_iter()
        .try_for_each(|(field, value)| check_finite(field, value))
    }
}

/// All scalar inputs of a run
///
/// Used where the time axis and sea-level rise are supplied separately, e.g. from Python.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Glacio-isostatic adjustment
    /// unit: mm/yr
    /// default: 0.0
    #[serde(default, alias = "GIA")]
    pub gia: FloatValue,
    #[serde(flatten)]
    pub initial: InitialConditions,
    #[serde(flatten)]
    pub site: SiteParameters,
}

/// Complete, immutable description of a single simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Timestep labels
    /// unit: yr
    pub time: Array1<Time>,
    /// Sea-level rise rate for each timestep
    /// unit: m/yr
    pub slr: Array1<FloatValue>,
    /// Glacio-isostatic adjustment
    /// unit: mm/yr
    pub gia: FloatValue,
    pub initial: InitialConditions,
    pub site: SiteParameters,
}

impl SimulationConfig {
    /// Assemble a configuration
    ///
    /// No validation happens here; the simulator validates before stepping so that invalid
    /// configurations can still be constructed and reported on.
    pub fn new(
        time: Array1<Time>,
        slr: Array1<FloatValue>,
        gia: FloatValue,
        initial: InitialConditions,
        site: SiteParameters,
    ) -> Self {
        Self {
            time,
            slr,
            gia,
            initial,
            site,
        }
    }

    /// Assemble a configuration from a sea-level rise timeseries
    pub fn from_timeseries(slr: &Timeseries, parameters: SimulationParameters) -> Self {
        Self::new(
            slr.time_axis().values().clone(),
            slr.values().clone(),
            parameters.gia,
            parameters.initial,
            parameters.site,
        )
    }

    /// Number of timesteps
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Check the configuration before simulating
    ///
    /// Degenerate tidal frames can only be detected while stepping, as MTL changes over time.
    pub fn validate(&self) -> IWEMResult<()> {
        if self.time.len() != self.slr.len() {
            return Err(IWEMError::invalid_input(
                "slr",
                format!(
                    "length ({}) does not match length of time ({})",
                    self.slr.len(),
                    self.time.len()
                ),
            ));
        }
        if self.time.is_empty() {
            return Err(IWEMError::invalid_input(
                "time",
                "at least one timestep is required",
            ));
        }
        check_time_values(self.time.iter().copied())?;
        if let Some((index, value)) = self
            .slr
            .iter()
            .enumerate()
            .find(|(_, value)| !value.is_finite())
        {
            return Err(IWEMError::invalid_input(
                "slr",
                format!("value at index {} is not finite ({})", index, value),
            ));
        }
        check_finite("gia", self.gia)?;
        self.initial.validate()?;
        self.site.validate()
    }
}

fn check_finite(field: &str, value: FloatValue) -> IWEMResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(IWEMError::invalid_input(
            field,
            format!("must be finite, got {}", value),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn site_parameters() -> SiteParameters {
        SiteParameters {
            a_mar: -3.0,
            b_mar: 4.0,
            a_oar_mangrove: -1.5,
            b_oar_mangrove: 1.0,
            c_oar_mangrove: 2.0,
            a_oar_saltmarsh: -0.5,
            b_oar_saltmarsh: 0.2,
            c_oar_saltmarsh: 1.0,
            a_autocompaction: 0.1,
            mangrove_saltmarsh_threshold: 0.6,
        }
    }

    fn initial_conditions() -> InitialConditions {
        InitialConditions {
            initial_elevation: 0.8,
            initial_mtl: 0.1,
            tidal_range: 2.4,
        }
    }

    #[test]
    fn test_submodel_accessors() {
        let params = site_parameters();
        assert_eq!(params.mineral_accretion(), LinearModel::new(-3.0, 4.0));
        assert_eq!(
            params.mangrove_organic_accretion(),
            QuadraticModel::new(-1.5, 1.0, 2.0)
        );
        assert_eq!(
            params.saltmarsh_organic_accretion(),
            QuadraticModel::new(-0.5, 0.2, 1.0)
        );
        assert_eq!(params.autocompaction(), ProportionalModel::new(0.1));
    }

    #[test]
    fn test_deserialize_table_column_names() {
        let json = r#"{
            "GIA": 0.5,
            "initial_E": 0.8, "initial_MTL": 0.1, "tidal_range": 2.4,
            "a_MAR": -3.0, "b_MAR": 4.0,
            "a_OAR_mangr": -1.5, "b_OAR_mangr": 1.0, "c_OAR_mangr": 2.0,
            "a_OAR_saltm": -0.5, "b_OAR_saltm": 0.2, "c_OAR_saltm": 1.0,
            "a_AC": 0.1, "mangr_saltm_threshold": 0.6
        }"#;
        let params: SimulationParameters =
            serde_json::from_str(json).expect("Deserialization failed");

        assert_eq!(params.gia, 0.5);
        assert_eq!(params.initial, initial_conditions());
        assert_eq!(params.site, site_parameters());
    }

    #[test]
    fn test_gia_defaults_to_zero() {
        let json = r#"{
            "initial_elevation": 0.8, "initial_mtl": 0.1, "tidal_range": 2.4,
            "a_mar": -3.0, "b_mar": 4.0,
            "a_oar_mangrove": -1.5, "b_oar_mangrove": 1.0, "c_oar_mangrove": 2.0,
            "a_oar_saltmarsh": -0.5, "b_oar_saltmarsh": 0.2, "c_oar_saltmarsh": 1.0,
            "a_autocompaction": 0.1, "mangrove_saltmarsh_threshold": 0.6
        }"#;
        let params: SimulationParameters =
            serde_json::from_str(json).expect("Deserialization failed");
        assert_eq!(params.gia, 0.0);
    }

    #[test]
    fn test_validate_length_mismatch() {
        let config = SimulationConfig::new(
            array![2000.0, 2001.0, 2002.0],
            array![0.003, 0.003],
            0.0,
            initial_conditions(),
            site_parameters(),
        );
        let err = config.validate().unwrap_err();
        assert!(err.is_invalid_input());
        let message = err.to_string();
        assert!(message.contains("slr"), "{}", message);
        assert!(message.contains('2') && message.contains('3'), "{}", message);
    }

    #[test]
    fn test_validate_empty() {
        let config = SimulationConfig::new(
            Array1::zeros(0),
            Array1::zeros(0),
            0.0,
            initial_conditions(),
            site_parameters(),
        );
        assert!(config.validate().unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_validate_non_finite_coefficient() {
        let mut site = site_parameters();
        site.c_oar_saltmarsh = f64::NAN;
        let config = SimulationConfig::new(
            array![2000.0],
            array![0.003],
            0.0,
            initial_conditions(),
            site,
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("c_oar_saltmarsh"));
    }

    #[test]
    fn test_negative_coefficients_are_accepted() {
        let mut site = site_parameters();
        site.b_mar = -10.0;
        site.a_autocompaction = -0.5;
        let config = SimulationConfig::new(
            array![2000.0, 2001.0],
            array![0.003, -0.001],
            -1.2,
            initial_conditions(),
            site,
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_timeseries() {
        let slr = Timeseries::try_from_values(array![0.003, 0.004], array![2000.0, 2001.0])
            .unwrap();
        let params = SimulationParameters {
            gia: 0.2,
            initial: initial_conditions(),
            site: site_parameters(),
        };
        let config = SimulationConfig::from_timeseries(&slr, params);
        assert_eq!(config.len(), 2);
        assert_eq!(config.slr, array![0.003, 0.004]);
        assert_eq!(config.gia, 0.2);
        assert_eq!(config.initial, params.initial);
        assert_eq!(config.site, params.site);
    }
}
