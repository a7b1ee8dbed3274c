//! Empirical sub-models of wetland surface accretion
//!
//! Each sub-model expresses a sedimentation or compaction rate (mm/yr) as a function of the
//! surface position within the tidal frame. The relationships are fitted at a site level and
//! evaluated once per timestep by the [simulator](crate::simulator).
//!
//! # Relationships
//!
//! - Mineral accretion: $MAR = a \cdot z + b$ ([`LinearModel`])
//! - Organic accretion: $OAR = a \cdot z^2 + b \cdot z + c$ ([`QuadraticModel`]),
//!   one per vegetation community
//! - Autocompaction: $AC = a \cdot MAR$ ([`ProportionalModel`])
//!
//! where $z$ is the relative elevation within the tidal frame ([`TidalFrame`]).

use crate::constants::HAT_FRACTION_OF_TIDAL_RANGE;
use crate::timeseries::FloatValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Linear relationship $y = a x + b$
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub a: FloatValue,
    pub b: FloatValue,
}

impl LinearModel {
    pub fn new(a: FloatValue, b: FloatValue) -> Self {
        Self { a, b }
    }

    pub fn evaluate(&self, x: FloatValue) -> FloatValue {
        self.a * x + self.b
    }
}

/// Quadratic relationship $y = a x^2 + b x + c$
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadraticModel {
    pub a: FloatValue,
    pub b: FloatValue,
    pub c: FloatValue,
}

impl QuadraticModel {
    pub fn new(a: FloatValue, b: FloatValue, c: FloatValue) -> Self {
        Self { a, b, c }
    }

    pub fn evaluate(&self, x: FloatValue) -> FloatValue {
        self.a * x.powi(2) + self.b * x + self.c
    }
}

/// Proportional relationship $y = a x$
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProportionalModel {
    pub a: FloatValue,
}

impl ProportionalModel {
    pub fn new(a: FloatValue) -> Self {
        Self { a }
    }

    pub fn evaluate(&self, x: FloatValue) -> FloatValue {
        self.a * x
    }
}

/// Vegetation community occupying the wetland surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vegetation {
    Mangrove,
    Saltmarsh,
}

impl Vegetation {
    /// Community present at relative elevation `z`
    ///
    /// Mangroves occupy the surface strictly below the cross-over elevation, saltmarsh at
    /// and above it. There is no hysteresis: the community is re-evaluated from `z` alone.
    pub fn select(z: FloatValue, threshold: FloatValue) -> Self {
        if z < threshold {
            Vegetation::Mangrove
        } else {
            Vegetation::Saltmarsh
        }
    }
}

impl fmt::Display for Vegetation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vegetation::Mangrove => write!(f, "mangrove"),
            Vegetation::Saltmarsh => write!(f, "saltmarsh"),
        }
    }
}

/// Tidal frame bounded by mean tide level (MTL) and highest astronomical tide (HAT)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TidalFrame {
    pub mtl: FloatValue,
    pub hat: FloatValue,
}

impl TidalFrame {
    /// Frame for a given MTL, with HAT half the tidal range above it
    pub fn from_mtl(mtl: FloatValue, tidal_range: FloatValue) -> Self {
        Self {
            mtl,
            hat: tidal_range * HAT_FRACTION_OF_TIDAL_RANGE + mtl,
        }
    }

    /// Height of HAT above MTL
    pub fn height(&self) -> FloatValue {
        self.hat - self.mtl
    }

    /// Relative elevation $z = (E - MTL) / (HAT - MTL)$
    ///
    /// 0 at MTL and 1 at HAT; values outside the band are not clipped.
    /// Returns `None` when the frame is too thin for `z` to be finite, including zero height.
    pub fn relative_elevation(&self, elevation: FloatValue) -> Option<FloatValue> {
        let height = self.height();
        if height == 0.0 {
            return None;
        }
        let z = (elevation - self.mtl) / height;
        z.is_finite().then_some(z)
    }
}
