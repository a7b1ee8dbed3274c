//! Python bindings for the elevation model
//!
//! Exposes the simulator to Python with the same keyword arguments used by the existing
//! analysis notebooks. Results are returned as a dict mapping each output column to a
//! numpy array, which converts directly into a `pandas.DataFrame`.

use crate::errors::IWEMError;
use crate::output::{Column, SimulationResult};
use crate::parameters::{InitialConditions, SimulationConfig, SimulationParameters, SiteParameters};
use crate::simulator::simulate_to_file;
use numpy::ToPyArray;
use pyo3::exceptions::{PyOSError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::path::PathBuf;

fn to_py_err(error: IWEMError) -> PyErr {
    if error.is_invalid_input() {
        PyValueError::new_err(error.to_string())
    } else {
        PyOSError::new_err(error.to_string())
    }
}

fn result_to_dict<'py>(
    py: Python<'py>,
    result: &SimulationResult,
) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new_bound(py);
    for (name, values) in result.columns() {
        dict.set_item(name, values.to_pyarray_bound(py))?;
    }
    Ok(dict)
}

fn run<'py>(
    py: Python<'py>,
    config: SimulationConfig,
    out_file: Option<PathBuf>,
) -> PyResult<Bound<'py, PyDict>> {
    let result = py
        .allow_threads(|| simulate_to_file(&config, out_file.as_deref()))
        .map_err(to_py_err)?;
    result_to_dict(py, &result)
}

/// Simulate wetland surface elevation change
///
/// Returns a dict of numpy arrays keyed by output column name. If `out_file` is given the
/// table is also written there as CSV.
#[pyfunction]
#[pyo3(signature = (
    time, slr, gia, initial_e, initial_mtl, tidal_range,
    a_mar, b_mar,
    a_oar_mangr, b_oar_mangr, c_oar_mangr,
    a_oar_saltm, b_oar_saltm, c_oar_saltm,
    a_ac, mangr_saltm_threshold,
    out_file=None
))]
#[allow(clippy::too_many_arguments)]
fn elev_change<'py>(
    py: Python<'py>,
    time: Vec<f64>,
    slr: Vec<f64>,
    gia: f64,
    initial_e: f64,
    initial_mtl: f64,
    tidal_range: f64,
    a_mar: f64,
    b_mar: f64,
    a_oar_mangr: f64,
    b_oar_mangr: f64,
    c_oar_mangr: f64,
    a_oar_saltm: f64,
    b_oar_saltm: f64,
    c_oar_saltm: f64,
    a_ac: f64,
    mangr_saltm_threshold: f64,
    out_file: Option<PathBuf>,
) -> PyResult<Bound<'py, PyDict>> {
    let config = SimulationConfig::new(
        time.into(),
        slr.into(),
        gia,
        InitialConditions {
            initial_elevation: initial_e,
            initial_mtl,
            tidal_range,
        },
        SiteParameters {
            a_mar,
            b_mar,
            a_oar_mangrove: a_oar_mangr,
            b_oar_mangrove: b_oar_mangr,
            c_oar_mangrove: c_oar_mangr,
            a_oar_saltmarsh: a_oar_saltm,
            b_oar_saltmarsh: b_oar_saltm,
            c_oar_saltmarsh: c_oar_saltm,
            a_autocompaction: a_ac,
            mangrove_saltmarsh_threshold: mangr_saltm_threshold,
        },
    );
    run(py, config, out_file)
}

/// Simulate using a dict of parameters
///
/// Keys may use either the model field names (`a_mar`, `initial_elevation`, ...) or the
/// column names of the validation tables (`a_MAR`, `initial_E`, ...).
#[pyfunction]
#[pyo3(signature = (time, slr, parameters, out_file=None))]
fn simulate_from_parameters<'py>(
    py: Python<'py>,
    time: Vec<f64>,
    slr: Vec<f64>,
    parameters: Bound<'py, PyAny>,
    out_file: Option<PathBuf>,
) -> PyResult<Bound<'py, PyDict>> {
    let parameters = pythonize::depythonize_bound::<SimulationParameters>(parameters)
        .map_err(|e| PyValueError::new_err(format!("{}", e)))?;
    let config = SimulationConfig::new(
        time.into(),
        slr.into(),
        parameters.gia,
        parameters.initial,
        parameters.site,
    );
    run(py, config, out_file)
}

#[pymodule]
pub fn core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(elev_change, m)?)?;
    m.add_function(wrap_pyfunction!(simulate_from_parameters, m)?)?;
    m.add(
        "COLUMNS",
        Column::ALL
            .iter()
            .map(|column| column.name())
            .collect::<Vec<_>>(),
    )?;
    Ok(())
}
