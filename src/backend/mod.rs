//! Interchangeable density backends.
//!
//! [`RemoteFunctionBackend`] ships the serialized ring to a stored function
//! and parses its scalar answer; [`LocalClipBackend`] clips a reference line
//! dataset itself. Both take an already validated polygon.

mod local;
mod remote;
mod scratch;
mod transport;

pub use local::{FeatureSetFile, LineSource, LocalClipBackend};
pub use remote::{parse_function_result, AnalyticQuery, BackendValue, FunctionTransport, RemoteFunctionBackend};
pub use scratch::{ScratchId, ScratchLease, ScratchStore};
pub use transport::{CommandTransport, EmbeddedFunction};

use crate::error::Result;
use crate::geometry::Polygon;
use crate::operations::DensityResult;

/// Computes the seismic-profile density of a polygon.
pub trait AnalyticBackend {
    /// Short name used in log records.
    fn name(&self) -> &'static str;

    /// Measures `polygon`, which must already have passed validation.
    ///
    /// # Errors
    ///
    /// Returns a backend error when the data source cannot be reached or
    /// answers unexpectedly, or `GeometryError::InvalidArea` when the area
    /// is not positive.
    fn compute(&self, polygon: &Polygon) -> Result<DensityResult>;
}

impl<B: AnalyticBackend + ?Sized> AnalyticBackend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn compute(&self, polygon: &Polygon) -> Result<DensityResult> {
        (**self).compute(polygon)
    }
}
