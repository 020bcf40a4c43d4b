use tracing::{debug, info, warn};

use crate::error::{BackendError, Result};
use crate::geometry::{Polygon, SpatialReference};
use crate::operations::{
    DensityResult, Reproject, RingText, SerializeRings, WebMercator, DEFAULT_PRECISION,
};

use super::AnalyticBackend;

/// Raw answer of a remote function call, before shape checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendValue {
    /// A single scalar row rendered as text.
    Text(String),
    /// A row set.
    Rows(Vec<String>),
    /// Statement status without a value.
    Status(bool),
}

/// One call of the stored density function.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticQuery {
    pub function_name: String,
    pub rings: RingText,
}

impl AnalyticQuery {
    #[must_use]
    pub fn new(function_name: impl Into<String>, rings: RingText) -> Self {
        Self {
            function_name: function_name.into(),
            rings,
        }
    }

    /// Renders the call as a scalar select statement.
    #[must_use]
    pub fn to_sql(&self) -> String {
        format!(
            "select {}('{}', {}) as calcres from DUAL",
            self.function_name,
            self.rings.text.replace('\'', "''"),
            self.rings.spatial_reference.wkid()
        )
    }
}

/// Delivers an [`AnalyticQuery`] to the remote service.
///
/// Transport and connection failures, including timeouts, surface as
/// `BackendError::Unavailable`.
pub trait FunctionTransport {
    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Unavailable` if the service cannot be reached.
    fn invoke(&self, query: &AnalyticQuery) -> Result<BackendValue>;
}

/// Density computed by a remote stored function over WGS84 ring text.
pub struct RemoteFunctionBackend<T, P = WebMercator> {
    function_name: String,
    transport: T,
    projection: P,
    precision: usize,
}

impl<T: FunctionTransport> RemoteFunctionBackend<T> {
    /// Creates a backend calling `function_name` through `transport`.
    #[must_use]
    pub fn new(function_name: impl Into<String>, transport: T) -> Self {
        Self::with_projection(function_name, transport, WebMercator)
    }
}

impl<T: FunctionTransport, P: Reproject> RemoteFunctionBackend<T, P> {
    /// Creates a backend with a custom reprojection collaborator.
    #[must_use]
    pub fn with_projection(function_name: impl Into<String>, transport: T, projection: P) -> Self {
        Self {
            function_name: function_name.into(),
            transport,
            projection,
            precision: DEFAULT_PRECISION,
        }
    }

    /// Sets the decimal digits used when serializing coordinates.
    #[must_use]
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Calls the remote function with already serialized rings.
    ///
    /// # Errors
    ///
    /// - `BackendError::Unavailable` on transport failure
    /// - `BackendError::UnexpectedResult` if the answer is not a single text row
    /// - `BackendError::MalformedNumericField` if a field is not a number
    pub fn compute_text(&self, rings: &RingText) -> Result<DensityResult> {
        let query = AnalyticQuery::new(self.function_name.as_str(), rings.clone());
        debug!(sql = %query.to_sql(), "invoking remote density function");

        match self.transport.invoke(&query)? {
            BackendValue::Text(text) => {
                info!(result = text.trim(), "remote function answered");
                parse_function_result(&text)
            }
            BackendValue::Rows(rows) => {
                for row in &rows {
                    debug!(row = row.as_str(), "unexpected row");
                }
                warn!(rows = rows.len(), "remote function returned a row set");
                Err(BackendError::UnexpectedResult(format!(
                    "expected a single scalar row, got {} rows",
                    rows.len()
                ))
                .into())
            }
            BackendValue::Status(ok) => {
                warn!(ok, "remote function returned a status instead of a value");
                Err(BackendError::UnexpectedResult(format!(
                    "expected a single scalar row, got statement status {ok}"
                ))
                .into())
            }
        }
    }
}

impl<T: FunctionTransport, P: Reproject> AnalyticBackend for RemoteFunctionBackend<T, P> {
    fn name(&self) -> &'static str {
        "remote-function"
    }

    fn compute(&self, polygon: &Polygon) -> Result<DensityResult> {
        let geographic = self
            .projection
            .reproject_polygon(polygon, SpatialReference::wgs84())?;
        let rings = SerializeRings::new(&geographic)
            .with_precision(self.precision)
            .execute();
        debug!(
            wkid = rings.spatial_reference.wkid(),
            text = rings.text.as_str(),
            "serialized input rings"
        );
        self.compute_text(&rings)
    }
}

/// Parses the `density, length, area` text answered by the stored function.
///
/// Values are rounded to the report precision.
///
/// # Errors
///
/// - `BackendError::UnexpectedResult` unless there are exactly three fields
/// - `BackendError::MalformedNumericField` if a field is not a finite number
pub fn parse_function_result(text: &str) -> Result<DensityResult> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    let [density, length, area] = fields.as_slice() else {
        return Err(BackendError::UnexpectedResult(format!(
            "expected 3 comma-separated numbers, got {:?}",
            text.trim()
        ))
        .into());
    };

    let number = |index: usize, field: &str| -> Result<f64> {
        match field.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(BackendError::MalformedNumericField {
                index,
                value: field.to_owned(),
            }
            .into()),
        }
    };
    Ok(DensityResult::rounded(
        number(0, *density)?,
        number(1, *length)?,
        number(2, *area)?,
    ))
}
