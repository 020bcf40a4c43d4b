use thiserror::Error;

/// Top-level error type for the seismic density pipeline.
#[derive(Debug, Error)]
pub enum SeismodensError {
    #[error("invalid input polygon: {0}")]
    Geometry(#[from] GeometryError),

    #[error("backend fault: {0}")]
    Backend(#[from] BackendError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid host input: {0}")]
    Host(#[from] HostError),
}

/// Errors caused by the polygon the caller supplied.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("polygon has no ring")]
    NoRing,

    #[error("polygon has {0} rings, only a single ring without holes is supported")]
    MultipleRings(usize),

    #[error(
        "ring area is {area}, you should send a non-self-intersecting clockwise drawn single ring"
    )]
    NotSimpleClockwise { area: f64 },

    #[error("ring has {0} vertices, at least 4 (closed triangle) are required")]
    TooFewVertices(usize),

    #[error("ring is not closed, first and last coordinates differ")]
    NotClosed,

    #[error("ring contains a non-finite coordinate")]
    NonFiniteCoordinate,

    #[error("area {0} km2 is not positive, density is undefined")]
    InvalidArea(f64),
}

/// Errors raised by the analytic backends and their data sources.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("unexpected backend result: {0}")]
    UnexpectedResult(String),

    #[error("backend field {index} is not a number: {value:?}")]
    MalformedNumericField { index: usize, value: String },

    #[error("cannot reproject from wkid {from} to wkid {to}")]
    UnsupportedSpatialReference { from: u32, to: u32 },

    #[error("linear unit of wkid {0} cannot be converted to kilometers")]
    UnsupportedUnit(u32),

    #[error("line dataset: {0}")]
    Dataset(String),
}

/// Errors related to loading the runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("cannot parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Errors in the feature set handed over by the host.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("cannot parse feature set: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("expected esriGeometryPolygon, got {0}")]
    GeometryType(String),

    #[error("feature set has no spatial reference")]
    MissingSpatialReference,
}

/// Coarse classification of a failure, as surfaced to the host operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidGeometry,
    InvalidArea,
    BackendUnavailable,
    UnexpectedBackendResult,
    MalformedNumericField,
    Configuration,
    HostInput,
}

impl ErrorKind {
    /// Returns `true` when the caller can recover by fixing the input polygon.
    #[must_use]
    pub fn is_input_fault(self) -> bool {
        matches!(
            self,
            Self::InvalidGeometry | Self::InvalidArea | Self::HostInput
        )
    }
}

impl SeismodensError {
    /// Classifies this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Geometry(GeometryError::InvalidArea(_)) => ErrorKind::InvalidArea,
            Self::Geometry(_) => ErrorKind::InvalidGeometry,
            Self::Backend(err) => match err {
                BackendError::UnexpectedResult(_) => ErrorKind::UnexpectedBackendResult,
                BackendError::MalformedNumericField { .. } => ErrorKind::MalformedNumericField,
                BackendError::Unavailable(_)
                | BackendError::UnsupportedSpatialReference { .. }
                | BackendError::UnsupportedUnit(_)
                | BackendError::Dataset(_) => ErrorKind::BackendUnavailable,
            },
            Self::Config(_) => ErrorKind::Configuration,
            Self::Host(_) => ErrorKind::HostInput,
        }
    }
}

/// Convenience type alias for results using [`SeismodensError`].
pub type Result<T> = std::result::Result<T, SeismodensError>;
