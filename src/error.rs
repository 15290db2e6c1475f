use http::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to the external image backend
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The backend answered 404 for the identifier
    #[error("Image not found on backend: {0}")]
    NotFound(String),

    /// Network or connection error
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// The call did not complete within the configured timeout
    #[error("Backend request timed out after {millis}ms")]
    Timeout { millis: u64 },

    /// The backend replied with a non-success status other than 404
    #[error("Backend returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// The backend reply could not be understood
    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),
}

/// Request parameter an error refers to.
///
/// Used to render the `parameter` field of error bodies and to classify
/// malformed numbers by the path segment they came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    Identifier,
    Region,
    Size,
    Rotation,
    Quality,
    Format,
}

impl Parameter {
    pub fn name(&self) -> &'static str {
        match self {
            Parameter::Identifier => "identifier",
            Parameter::Region => "region",
            Parameter::Size => "size",
            Parameter::Rotation => "rotation",
            Parameter::Quality => "quality",
            Parameter::Format => "format",
        }
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Protocol-level errors for IIIF image and info requests.
///
/// Every variant keeps the raw offending value so the error body can name it.
/// The HTTP status is a pure function of the variant, see [`IiifError::status`].
#[derive(Debug, Clone, Error)]
pub enum IiifError {
    /// Path is not a valid percent-encoded path or has the wrong shape
    #[error("Malformed path: {path}")]
    MalformedPath { path: String },

    /// Region has the wrong arity or an empty/out-of-range rectangle
    #[error("Malformed region: {value}")]
    MalformedRegion { value: String },

    /// Size has the wrong arity or a zero dimension
    #[error("Malformed size: {value}")]
    MalformedSize { value: String },

    /// Rotation angle outside [0, 360]
    #[error("Malformed rotation: {value} (angle must be between 0 and 360)")]
    MalformedRotation { value: String },

    /// A numeric field could not be parsed
    #[error("Malformed number in {parameter}: {value}")]
    MalformedNumber { parameter: Parameter, value: String },

    /// Output format is not recognised or cannot be produced by the backend (HTTP 415)
    #[error("Unsupported format: {value}")]
    UnsupportedFormat { value: String },

    /// Info document format other than `json`
    #[error("Unsupported info format: {value}")]
    UnsupportedInfoFormat { value: String },

    #[error("Unsupported quality: {value}")]
    UnsupportedQuality { value: String },

    #[error("Unsupported region type: {value}")]
    UnsupportedRegionType { value: String },

    #[error("Unsupported size type: {value}")]
    UnsupportedSizeType { value: String },

    /// Only mirroring is implemented, any non-zero angle is rejected
    #[error("Unsupported rotation angle: {angle} (only 0 is supported)")]
    UnsupportedRotationAngle { angle: f64 },

    /// Mirroring requested but not offered by the service profile
    #[error("Mirroring is not supported: {value}")]
    UnsupportedMirroring { value: String },

    /// Resolved output dimension is larger than the configured maximum
    #[error("Requested size {width}x{height} exceeds the maximum dimension of {limit}")]
    ExceedsMaxDimension {
        limit: u32,
        width: String,
        height: String,
    },

    #[error("Image not found: {identifier}")]
    IdentifierNotFound { identifier: String },

    /// JSONP callback is not a plain JavaScript identifier
    #[error("Invalid callback name: {value}")]
    InvalidCallback { value: String },

    /// The response document could not be rendered
    #[error("Failed to render response: {0}")]
    Render(String),

    /// Backend failure other than a 404
    #[error("Backend error: {0}")]
    Backend(BackendError),
}

impl IiifError {
    /// HTTP status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            IiifError::MalformedPath { .. }
            | IiifError::MalformedRegion { .. }
            | IiifError::MalformedSize { .. }
            | IiifError::MalformedRotation { .. }
            | IiifError::MalformedNumber { .. }
            | IiifError::InvalidCallback { .. } => StatusCode::BAD_REQUEST,

            IiifError::UnsupportedFormat { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,

            IiifError::UnsupportedInfoFormat { .. }
            | IiifError::UnsupportedQuality { .. }
            | IiifError::UnsupportedRegionType { .. }
            | IiifError::UnsupportedSizeType { .. }
            | IiifError::UnsupportedRotationAngle { .. }
            | IiifError::UnsupportedMirroring { .. }
            | IiifError::ExceedsMaxDimension { .. } => StatusCode::NOT_IMPLEMENTED,

            IiifError::IdentifierNotFound { .. } => StatusCode::NOT_FOUND,

            IiifError::Backend(BackendError::MalformedResponse(_))
            | IiifError::Backend(BackendError::Status { .. }) => StatusCode::BAD_GATEWAY,
            IiifError::Backend(_) | IiifError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable error type (e.g. "malformed_region").
    pub fn kind(&self) -> &'static str {
        match self {
            IiifError::MalformedPath { .. } => "malformed_path",
            IiifError::MalformedRegion { .. } => "malformed_region",
            IiifError::MalformedSize { .. } => "malformed_size",
            IiifError::MalformedRotation { .. } => "malformed_rotation",
            IiifError::MalformedNumber { .. } => "malformed_number",
            IiifError::UnsupportedFormat { .. } => "unsupported_format",
            IiifError::UnsupportedInfoFormat { .. } => "unsupported_format",
            IiifError::UnsupportedQuality { .. } => "unsupported_quality",
            IiifError::UnsupportedRegionType { .. } => "unsupported_region",
            IiifError::UnsupportedSizeType { .. } => "unsupported_size",
            IiifError::UnsupportedRotationAngle { .. } => "unsupported_rotation",
            IiifError::UnsupportedMirroring { .. } => "unsupported_mirroring",
            IiifError::ExceedsMaxDimension { .. } => "exceeds_max_dimension",
            IiifError::IdentifierNotFound { .. } => "not_found",
            IiifError::InvalidCallback { .. } => "invalid_callback",
            IiifError::Render(_) => "internal_error",
            IiifError::Backend(_) => "backend_error",
        }
    }

    /// Name of the request parameter at fault, if any.
    pub fn parameter(&self) -> Option<Parameter> {
        match self {
            IiifError::MalformedPath { .. }
            | IiifError::InvalidCallback { .. }
            | IiifError::Render(_)
            | IiifError::Backend(_) => None,
            IiifError::MalformedRegion { .. } | IiifError::UnsupportedRegionType { .. } => {
                Some(Parameter::Region)
            }
            IiifError::MalformedSize { .. }
            | IiifError::UnsupportedSizeType { .. }
            | IiifError::ExceedsMaxDimension { .. } => Some(Parameter::Size),
            IiifError::MalformedRotation { .. }
            | IiifError::UnsupportedRotationAngle { .. }
            | IiifError::UnsupportedMirroring { .. } => Some(Parameter::Rotation),
            IiifError::MalformedNumber { parameter, .. } => Some(*parameter),
            IiifError::UnsupportedFormat { .. } | IiifError::UnsupportedInfoFormat { .. } => {
                Some(Parameter::Format)
            }
            IiifError::UnsupportedQuality { .. } => Some(Parameter::Quality),
            IiifError::IdentifierNotFound { .. } => Some(Parameter::Identifier),
        }
    }
}

impl From<BackendError> for IiifError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound(identifier) => IiifError::IdentifierNotFound { identifier },
            other => IiifError::Backend(other),
        }
    }
}
