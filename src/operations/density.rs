use std::fmt;

use crate::error::{GeometryError, Result};

/// Decimal digits carried to the host for every reported value.
pub const REPORT_DIGITS: usize = 3;

const REPORT_SCALE: f64 = 1e3;

/// Rounds `value` to [`REPORT_DIGITS`] decimal places.
#[must_use]
pub fn round_report(value: f64) -> f64 {
    (value * REPORT_SCALE).round() / REPORT_SCALE
}

/// Seismic-profile density of a polygon, every value rounded to 3 digits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityResult {
    /// Profile length per area, km/km².
    pub density: f64,
    /// Total clipped profile length, km.
    pub length: f64,
    /// Polygon area, km².
    pub area: f64,
}

impl DensityResult {
    /// Creates a result, rounding each value for reporting.
    #[must_use]
    pub fn rounded(density: f64, length: f64, area: f64) -> Self {
        Self {
            density: round_report(density),
            length: round_report(length),
            area: round_report(area),
        }
    }

    /// Fixed-point renderings for the host boundary.
    #[must_use]
    pub fn formatted(&self) -> FormattedDensity {
        FormattedDensity {
            density: format_report(self.density),
            length: format_report(self.length),
            area: format_report(self.area),
        }
    }
}

impl fmt::Display for DensityResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.formatted();
        write!(
            f,
            "density {} km/km2, length {} km, area {} km2",
            text.density, text.length, text.area
        )
    }
}

/// The three reported values as fixed-point text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedDensity {
    pub density: String,
    pub length: String,
    pub area: String,
}

fn format_report(value: f64) -> String {
    // Adding 0.0 folds -0.0 into 0.0, so no "-0.000".
    format!("{:.prec$}", value + 0.0, prec = REPORT_DIGITS)
}

/// Computes the density ratio from a length and an area in km units.
///
/// The ratio uses the unrounded inputs; rounding only applies to the
/// reported values, so a tiny area can report as `0.000` next to a very
/// large density.
pub struct ComputeDensity {
    length_km: f64,
    area_km2: f64,
}

impl ComputeDensity {
    /// Creates a new `ComputeDensity` operation.
    #[must_use]
    pub fn new(length_km: f64, area_km2: f64) -> Self {
        Self {
            length_km,
            area_km2,
        }
    }

    /// Executes the computation.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InvalidArea` if the area is not a positive,
    /// finite number.
    pub fn execute(&self) -> Result<DensityResult> {
        if !(self.area_km2.is_finite() && self.area_km2 > 0.0) {
            return Err(GeometryError::InvalidArea(self.area_km2).into());
        }
        let density = self.length_km / self.area_km2;
        Ok(DensityResult::rounded(density, self.length_km, self.area_km2))
    }
}
