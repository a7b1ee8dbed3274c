//! Elevation trajectory simulator
//!
//! Advances the wetland surface elevation and mean tide level (MTL) year by year.
//!
//! # What This Does
//!
//! For every timestep $t$ the surface is located within the tidal frame and the accretion
//! sub-models are evaluated at that position:
//!
//! 1. $HAT_t = R / 2 + MTL_t$ where $R$ is the tidal range
//! 2. $z_t = (E_t - MTL_t) / (HAT_t - MTL_t)$
//! 3. $MAR_t = a_{MAR} z_t + b_{MAR}$
//! 4. $AC_t = a_{AC} MAR_t$
//! 5. Organic accretion of mangrove and saltmarsh from their quadratic fits
//! 6. Mangrove is selected where $z_t$ lies below the cross-over threshold, saltmarsh otherwise
//! 7. $OAR_t = \max(OAR_{selected}, 0)$
//! 8. $\Delta E_t = MAR_t + OAR_t - AC_t$
//!
//! The state for the next step is then
//!
//! $$E_{t+1} = E_t + \frac{\Delta E_t - GIA}{1000}, \qquad MTL_{t+1} = MTL_t + SLR_t$$
//!
//! converting the mm/yr sub-model rates into metres. The final timestep is not advanced.
//!
//! Only the selected organic rate is clamped; negative mineral accretion and the unclamped
//! per-community rates are reported as computed.

use crate::constants::{MIN_ORGANIC_ACCRETION, MM_PER_M};
use crate::errors::{IWEMError, IWEMResult};
use crate::output::SimulationResult;
use crate::parameters::{SimulationConfig, SiteParameters};
use crate::submodels::{TidalFrame, Vegetation};
use crate::timeseries::{FloatValue, Time};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Absolute surface elevation and mean tide level carried between timesteps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TidalState {
    /// unit: m above datum
    pub elevation: FloatValue,
    /// unit: m above datum
    pub mtl: FloatValue,
}

impl TidalState {
    pub fn new(elevation: FloatValue, mtl: FloatValue) -> Self {
        Self { elevation, mtl }
    }

    /// State at the following timestep
    ///
    /// `elevation_gain` and `gia` are rates in mm/yr, `slr` in m/yr.
    pub fn advance(&self, elevation_gain: FloatValue, gia: FloatValue, slr: FloatValue) -> Self {
        Self {
            elevation: self.elevation + elevation_gain / MM_PER_M - gia / MM_PER_M,
            mtl: self.mtl + slr,
        }
    }
}

/// Derived quantities for a single timestep
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeStepState {
    /// Surface elevation [m above datum]
    pub elevation: FloatValue,
    /// Mean tide level [m above datum]
    pub mtl: FloatValue,
    /// Highest astronomical tide [m above datum]
    pub hat: FloatValue,
    /// Relative elevation in the tidal frame [-]
    pub z: FloatValue,
    /// Mineral accretion rate [mm/yr]
    pub mar: FloatValue,
    /// Autocompaction rate [mm/yr]
    pub autocompaction: FloatValue,
    /// Mangrove organic accretion rate [mm/yr]
    pub oar_mangrove: FloatValue,
    /// Saltmarsh organic accretion rate [mm/yr]
    pub oar_saltmarsh: FloatValue,
    /// Organic accretion rate of the community present, before clamping [mm/yr]
    pub oar_selected: FloatValue,
    /// Organic accretion rate after clamping at zero [mm/yr]
    pub oar: FloatValue,
    /// Net elevation gain [mm/yr]
    pub elevation_gain: FloatValue,
    /// Community present at this timestep
    pub vegetation: Vegetation,
}

/// Evaluate the sub-models for one timestep
///
/// Fails if the tidal frame is too thin for $z$ to be finite, e.g. a zero tidal range.
pub fn solve_timestep(
    state: TidalState,
    tidal_range: FloatValue,
    site: &SiteParameters,
    index: usize,
    time: Time,
) -> IWEMResult<TimeStepState> {
    let frame = TidalFrame::from_mtl(state.mtl, tidal_range);
    let z = frame.relative_elevation(state.elevation).ok_or_else(|| {
        IWEMError::invalid_input(
            "tidal_range",
            format!(
                "relative elevation is undefined at index {} (time {}): tidal_range={}, MTL={}, HAT={}",
                index, time, tidal_range, frame.mtl, frame.hat
            ),
        )
    })?;

    let mar = site.mineral_accretion().evaluate(z);
    let autocompaction = site.autocompaction().evaluate(mar);
    let oar_mangrove = site.mangrove_organic_accretion().evaluate(z);
    let oar_saltmarsh = site.saltmarsh_organic_accretion().evaluate(z);

    let vegetation = Vegetation::select(z, site.mangrove_saltmarsh_threshold);
    let oar_selected = match vegetation {
        Vegetation::Mangrove => oar_mangrove,
        Vegetation::Saltmarsh => oar_saltmarsh,
    };
    let oar = oar_selected.max(MIN_ORGANIC_ACCRETION);

    let elevation_gain = mar + oar - autocompaction;

    Ok(TimeStepState {
        elevation: state.elevation,
        mtl: state.mtl,
        hat: frame.hat,
        z,
        mar,
        autocompaction,
        oar_mangrove,
        oar_saltmarsh,
        oar_selected,
        oar,
        elevation_gain,
        vegetation,
    })
}

/// Run the elevation model over the full time axis of `config`
///
/// Returns one [`TimeStepState`] per timestep. The configuration is validated first and any
/// failure aborts the run without returning partial output.
pub fn simulate(config: &SimulationConfig) -> IWEMResult<SimulationResult> {
    config.validate()?;

    let n = config.len();
    let tidal_range = config.initial.tidal_range;
    let initial = TidalState::new(config.initial.initial_elevation, config.initial.initial_mtl);

    let mut steps = Vec::with_capacity(n);
    config
        .time
        .iter()
        .zip(config.slr.iter())
        .enumerate()
        .try_fold(initial, |state, (index, (&time, &slr))| {
            let step = solve_timestep(state, tidal_range, &config.site, index, time)?;
            steps.push(step);
            Ok::<_, IWEMError>(state.advance(step.elevation_gain, config.gia, slr))
        })?;

    log::debug!(
        "Simulated {} timesteps from {} to {}",
        n,
        config.time[0],
        config.time[n - 1]
    );

    Ok(SimulationResult::new(
        config.time.clone(),
        config.slr.clone(),
        steps,
    ))
}

/// Run the elevation model and optionally persist the output table as CSV
///
/// Passing `None` performs no I/O.
pub fn simulate_to_file(
    config: &SimulationConfig,
    out_file: Option<&Path>,
) -> IWEMResult<SimulationResult> {
    let result = simulate(config)?;
    if let Some(path) = out_file {
        result.write_csv(path)?;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::InitialConditions;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn constant_mar_parameters() -> SiteParameters {
        SiteParameters {
            a_mar: 0.0,
            b_mar: 10.0,
            a_oar_mangrove: 0.0,
            b_oar_mangrove: 0.0,
            c_oar_mangrove: 0.0,
            a_oar_saltmarsh: 0.0,
            b_oar_saltmarsh: 0.0,
            c_oar_saltmarsh: 0.0,
            a_autocompaction: 0.0,
            mangrove_saltmarsh_threshold: 0.5,
        }
    }

    fn three_step_config() -> SimulationConfig {
        SimulationConfig::new(
            array![0.0, 1.0, 2.0],
            array![0.01, 0.01, 0.01],
            0.0,
            InitialConditions {
                initial_elevation: 0.5,
                initial_mtl: 0.0,
                tidal_range: 2.0,
            },
            constant_mar_parameters(),
        )
    }

    #[test]
    fn test_advance() {
        let state = TidalState::new(0.5, 0.0).advance(12.0, 2.0, 0.004);
        assert_relative_eq!(state.elevation, 0.51, epsilon = 1e-12);
        assert_relative_eq!(state.mtl, 0.004);
    }

    #[test]
    fn test_three_step_scenario() {
        let result = simulate(&three_step_config()).unwrap();
        assert_eq!(result.len(), 3);

        let first = result.steps()[0];
        assert_relative_eq!(first.hat, 1.0);
        assert_relative_eq!(first.z, 0.5);
        assert_relative_eq!(first.mar, 10.0);
        assert_relative_eq!(first.oar, 0.0);
        assert_relative_eq!(first.elevation_gain, 10.0);
        assert_eq!(first.vegetation, Vegetation::Saltmarsh);

        let second = result.steps()[1];
        assert_relative_eq!(second.elevation, 0.51, epsilon = 1e-12);
        assert_relative_eq!(second.mtl, 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_mangrove_selected_below_threshold() {
        let mut site = constant_mar_parameters();
        site.c_oar_mangrove = 3.0;
        site.c_oar_saltmarsh = 7.0;
        let step = solve_timestep(TidalState::new(0.2, 0.0), 2.0, &site, 0, 2000.0).unwrap();

        assert_relative_eq!(step.z, 0.2);
        assert_eq!(step.vegetation, Vegetation::Mangrove);
        assert_relative_eq!(step.oar_selected, 3.0);
        assert_relative_eq!(step.oar, 3.0);
        assert_relative_eq!(step.elevation_gain, 13.0);
    }

    #[test]
    fn test_negative_organic_accretion_is_clamped() {
        let mut site = constant_mar_parameters();
        site.c_oar_saltmarsh = -4.0;
        site.a_autocompaction = 0.2;
        let step = solve_timestep(TidalState::new(0.9, 0.0), 2.0, &site, 0, 2000.0).unwrap();

        assert_eq!(step.vegetation, Vegetation::Saltmarsh);
        assert_relative_eq!(step.oar_saltmarsh, -4.0);
        assert_relative_eq!(step.oar_selected, -4.0);
        assert_eq!(step.oar, 0.0);
        assert_relative_eq!(step.autocompaction, 2.0);
        assert_relative_eq!(step.elevation_gain, 8.0);
    }

    #[test]
    fn test_negative_mineral_accretion_is_not_clamped() {
        let mut site = constant_mar_parameters();
        site.a_mar = -20.0;
        let step = solve_timestep(TidalState::new(1.0, 0.0), 2.0, &site, 0, 2000.0).unwrap();

        assert_relative_eq!(step.z, 1.0);
        assert_relative_eq!(step.mar, -10.0);
        assert_relative_eq!(step.elevation_gain, -10.0);
    }

    #[test]
    fn test_zero_tidal_range_is_rejected() {
        let mut config = three_step_config();
        config.initial.tidal_range = 0.0;
        config.initial.initial_elevation = config.initial.initial_mtl;

        let err = simulate(&config).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("tidal_range"));
    }

    #[test]
    fn test_subnormal_tidal_range_is_rejected() {
        let mut config = three_step_config();
        config.initial.tidal_range = 1e-320;

        let err = simulate(&config).unwrap_err();
        assert!(matches!(
            err,
            IWEMError::InvalidInput { ref field, .. } if field == "tidal_range"
        ));
    }

    #[test]
    fn test_single_timestep() {
        let mut config = three_step_config();
        config.time = array![2000.0];
        config.slr = array![0.01];

        let result = simulate(&config).unwrap();
        assert_eq!(result.len(), 1);
        assert_relative_eq!(result.steps()[0].elevation, 0.5);
        assert_relative_eq!(result.steps()[0].mtl, 0.0);
    }

    #[test]
    fn test_simulate_without_file_performs_no_io() {
        let result = simulate_to_file(&three_step_config(), None).unwrap();
        assert_eq!(result, simulate(&three_step_config()).unwrap());
    }
}
