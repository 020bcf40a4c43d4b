use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{error, info, info_span, Span};

use crate::backend::AnalyticBackend;
use crate::error::{Result, SeismodensError};
use crate::geometry::Polygon;
use crate::operations::{FormattedDensity, ValidatePolygon};

use super::parse_polygon_feature_set;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// One request from the host: a polygon in, three numbers or an error out.
///
/// Owns the tracing span that every component logs into, so records of
/// concurrent invocations can be told apart. Nothing is shared between
/// invocations besides the backend itself.
#[derive(Debug)]
pub struct Invocation {
    id: u64,
    span: Span,
}

impl Default for Invocation {
    fn default() -> Self {
        Self::new()
    }
}

impl Invocation {
    #[must_use]
    pub fn new() -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            id,
            span: info_span!("seismodens.invocation", id),
        }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Parses a host feature set and measures its first polygon.
    ///
    /// # Errors
    ///
    /// See [`Invocation::run`]; also fails on malformed host input.
    pub fn run_feature_set<B>(&self, text: &str, backend: &B) -> Result<FormattedDensity>
    where
        B: AnalyticBackend + ?Sized,
    {
        let entered = self.span.enter();
        info!(bytes = text.len(), "input feature set received");
        let polygon = parse_polygon_feature_set(text).inspect_err(report)?;
        drop(entered);
        self.run(&polygon, backend)
    }

    /// Validates `polygon` and measures it with `backend`.
    ///
    /// Fails closed: on error nothing is reported but the error itself.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by validation or by the backend.
    pub fn run<B>(&self, polygon: &Polygon, backend: &B) -> Result<FormattedDensity>
    where
        B: AnalyticBackend + ?Sized,
    {
        let _entered = self.span.enter();
        info!(
            backend = backend.name(),
            wkid = polygon.spatial_reference().wkid(),
            parts = polygon.part_count(),
            "processing started"
        );

        let outcome = ValidatePolygon::new(polygon)
            .execute()
            .and_then(|_| backend.compute(polygon));
        match outcome {
            Ok(result) => {
                info!(%result, "processing done");
                Ok(result.formatted())
            }
            Err(err) => {
                report(&err);
                Err(err)
            }
        }
    }
}

fn report(err: &SeismodensError) {
    let kind = err.kind();
    error!(
        ?kind,
        input_fault = kind.is_input_fault(),
        error = %err,
        "processing failed"
    );
}
