//! Annual forcing timeseries
//!
//! Sea-level rise scenarios are supplied as a value per model year. A [`Timeseries`]
//! pairs a strictly increasing [`TimeAxis`] with one value per time point.

use crate::errors::{IWEMError, IWEMResult};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

pub type FloatValue = f64;
pub type Time = f64;

/// Ordered time points (years) at which a timeseries is defined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeAxis {
    values: Array1<Time>,
}

impl TimeAxis {
    /// Create a time axis, checking that every value is finite and strictly increasing
    pub fn try_from_values(values: Array1<Time>) -> IWEMResult<Self> {
        check_time_values(values.iter().copied())?;
        Ok(Self { values })
    }

    pub fn values(&self) -> &Array1<Time> {
        &self.values
    }
}

/// Validate a sequence of time labels
///
/// Rejects NaN/infinite labels and any label that is not strictly greater than its predecessor.
pub(crate) fn check_time_values(values: impl IntoIterator<Item = Time>) -> IWEMResult<()> {
    let mut previous: Option<Time> = None;
    for (index, value) in values.into_iter().enumerate() {
        if !value.is_finite() {
            return Err(IWEMError::invalid_input(
                "time",
                format!("value at index {} is not finite ({})", index, value),
            ));
        }
        if let Some(previous) = previous {
            if value <= previous {
                return Err(IWEMError::invalid_input(
                    "time",
                    format!(
                        "values must be strictly increasing, got {} after {} at index {}",
                        value, previous, index
                    ),
                ));
            }
        }
        previous = Some(value);
    }
    Ok(())
}

/// A scalar value for each point of a [`TimeAxis`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeseries {
    time_axis: TimeAxis,
    values: Array1<FloatValue>,
}

impl Timeseries {
    /// Create a new timeseries from values and the matching time points
    ///
    /// Fails if the lengths differ or the time points are not strictly increasing.
    pub fn try_from_values(values: Array1<FloatValue>, time: Array1<Time>) -> IWEMResult<Self> {
        if values.len() != time.len() {
            return Err(IWEMError::invalid_input(
                "values",
                format!(
                    "expected {} values to match the time axis, got {}",
                    time.len(),
                    values.len()
                ),
            ));
        }
        Ok(Self {
            time_axis: TimeAxis::try_from_values(time)?,
            values,
        })
    }

    pub fn time_axis(&self) -> &TimeAxis {
        &self.time_axis
    }

    pub fn values(&self) -> &Array1<FloatValue> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array};

    #[test]
    fn test_timeseries_from_values() {
        let ts = Timeseries::try_from_values(
            array![0.003, 0.004, 0.005],
            Array::range(2020.0, 2023.0, 1.0),
        )
        .unwrap();

        assert_eq!(ts.len(), 3);
        assert!(!ts.is_empty());
        assert_eq!(ts.time_axis().values(), &array![2020.0, 2021.0, 2022.0]);
        assert_eq!(ts.values(), &array![0.003, 0.004, 0.005]);
    }

    #[test]
    fn test_mismatched_lengths() {
        let err = Timeseries::try_from_values(array![1.0, 2.0], array![2020.0, 2021.0, 2022.0])
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_time_must_increase() {
        let err = TimeAxis::try_from_values(array![2020.0, 2020.0, 2021.0]).unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));

        let err = TimeAxis::try_from_values(array![2020.0, f64::NAN]).unwrap_err();
        assert!(err.to_string().contains("not finite"));
    }

    #[test]
    fn test_empty_axis_is_allowed() {
        let axis = TimeAxis::try_from_values(Array1::<Time>::zeros(0)).unwrap();
        assert!(axis.values().is_empty());
    }
}
