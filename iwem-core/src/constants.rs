//! Fixed numerical constants of the elevation model.

/// Millimetres per metre.
///
/// Sub-model rates (mineral/organic accretion, autocompaction and GIA) are fitted in mm/yr
/// while surface elevation and mean tide level are tracked in metres above datum. Rates are
/// divided by this factor before being accumulated into elevation.
pub const MM_PER_M: f64 = 1000.0;

/// Fraction of the tidal range lying between MTL and HAT.
pub const HAT_FRACTION_OF_TIDAL_RANGE: f64 = 0.5;

/// Lower bound applied to the selected organic accretion rate [mm/yr].
pub const MIN_ORGANIC_ACCRETION: f64 = 0.0;
