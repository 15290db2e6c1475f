//! HTTP request handlers for the IIIF image API.
//!
//! # Endpoints
//!
//! - `GET /iiif/{identifier}` (or with a trailing `/`) - Redirect to the info document
//! - `GET /iiif/{identifier}/info.json` - Image information (JSON-LD)
//! - `GET /iiif/{identifier}/{region}/{size}/{rotation}/{quality}.{format}` - Redirect to the backend
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Query, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::backend::ImageBackend;
use crate::error::IiifError;
use crate::iiif::{parse_image_request, parse_info_request, segment_count, INFO_SEGMENT};
use crate::service::ImageService;

/// Path prefix under which the IIIF endpoints are mounted.
pub const IIIF_PREFIX: &str = "/iiif";

/// Media type for JSON-LD info documents.
pub const JSON_LD_MEDIA_TYPE: &str = "application/ld+json";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the image service.
pub struct AppState<B: ImageBackend> {
    pub image_service: Arc<ImageService<B>>,

    /// Cache-Control max-age in seconds for successful responses
    pub cache_max_age: u32,

    /// Public base URI for `@id`, e.g. `https://images.example.org/iiif`.
    /// When unset it is derived from the request headers.
    pub public_base_uri: Option<String>,
}

impl<B: ImageBackend> AppState<B> {
    pub fn new(image_service: ImageService<B>) -> Self {
        Self {
            image_service: Arc::new(image_service),
            cache_max_age: 3600,
            public_base_uri: None,
        }
    }

    pub fn with_cache_max_age(mut self, cache_max_age: u32) -> Self {
        self.cache_max_age = cache_max_age;
        self
    }

    pub fn with_public_base_uri(mut self, base_uri: Option<String>) -> Self {
        self.public_base_uri = base_uri.map(|uri| uri.trim_end_matches('/').to_string());
        self
    }

    /// Base URI that image identifiers are appended to in `@id`.
    pub fn base_uri(&self, headers: &HeaderMap) -> String {
        if let Some(base) = &self.public_base_uri {
            return base.clone();
        }

        let header_str = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let scheme = header_str("x-forwarded-proto").unwrap_or("http");
        let host = header_str("x-forwarded-host")
            .or_else(|| header_str("host"))
            .unwrap_or("localhost");

        format!("{}://{}{}", scheme, host, IIIF_PREFIX)
    }

    fn cache_control(&self) -> String {
        format!("public, max-age={}", self.cache_max_age)
    }
}

impl<B: ImageBackend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            image_service: Arc::clone(&self.image_service),
            cache_max_age: self.cache_max_age,
            public_base_uri: self.public_base_uri.clone(),
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Query parameters for info requests.
#[derive(Debug, Deserialize)]
pub struct InfoQueryParams {
    /// JSONP callback function name
    #[serde(default)]
    pub callback: Option<String>,
}

/// Whether `name` is safe to emit as a JSONP function name.
///
/// Accepts dotted JavaScript identifiers such as `jQuery123.cb`.
pub fn is_valid_callback(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 128
        && name.split('.').all(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
                _ => return false,
            }
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        })
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "malformed_region", "not_found")
    pub error: String,

    /// Request parameter at fault
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,

    /// Human-readable error message
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            parameter: None,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            status: Some(status.as_u16()),
            ..Self::new(error, message)
        }
    }

    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = Some(parameter.into());
        self
    }
}

impl From<&IiifError> for ErrorResponse {
    fn from(err: &IiifError) -> Self {
        let response = ErrorResponse::with_status(err.kind(), err.to_string(), err.status());
        match err.parameter() {
            Some(parameter) => response.with_parameter(parameter.name()),
            None => response,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert IiifError to HTTP response.
///
/// - 5xx errors are logged at ERROR level
/// - 404 at DEBUG level, since unknown identifiers are routine
/// - other 4xx at WARN level
impl IntoResponse for IiifError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_type = self.kind();

        if status.is_server_error() {
            if status == StatusCode::NOT_IMPLEMENTED {
                warn!(
                    error_type = error_type,
                    status = status.as_u16(),
                    "Unsupported request: {}",
                    self
                );
            } else {
                error!(
                    error_type = error_type,
                    status = status.as_u16(),
                    "Server error: {}",
                    self
                );
            }
        } else if status == StatusCode::NOT_FOUND {
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Image not found: {}",
                self
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                self
            );
        }

        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle every request below `/iiif`.
///
/// The raw, still percent-encoded path is read from the request URI so that
/// an encoded `/` inside an identifier is never treated as a separator.
///
/// # Response
///
/// - `303 See Other`: base URI redirect, or the backend URL for image requests
/// - `200 OK`: info document (`application/ld+json` if accepted, else `application/json`)
/// - `400`, `404`, `415`, `501`, `5xx`: JSON error body
pub async fn iiif_handler<B: ImageBackend + 'static>(
    State(state): State<AppState<B>>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Result<Response, IiifError> {
    let raw = uri.path();
    let path = raw.strip_prefix(IIIF_PREFIX).unwrap_or(raw);

    match segment_count(path) {
        1 => base_uri_redirect(&state, raw, path),
        // `{identifier}/` is the base URI with a trailing slash
        2 if path.ends_with('/') => base_uri_redirect(&state, raw, path),
        2 => {
            let query = info_query(&uri)?;
            info_response(&state, path, query.callback.as_deref(), &headers).await
        }
        5 => image_redirect(&state, path).await,
        _ => Err(IiifError::MalformedPath {
            path: path.to_string(),
        }),
    }
}

/// `/iiif/{identifier}` redirects to its info document.
fn base_uri_redirect<B: ImageBackend>(
    state: &AppState<B>,
    raw: &str,
    path: &str,
) -> Result<Response, IiifError> {
    let identifier = path.strip_prefix('/').unwrap_or(path).trim_end_matches('/');
    if identifier.is_empty()
        || identifier.contains('/')
        || !crate::iiif::parser::is_valid_encoded_path(path)
    {
        return Err(IiifError::MalformedPath {
            path: path.to_string(),
        });
    }

    let location = format!("{}/{}", raw.trim_end_matches('/'), INFO_SEGMENT);
    debug!(location = %location, "Base URI redirect");

    Ok(see_other(location, state.cache_control()))
}

/// Query parameters of an info request.
///
/// Only info requests read the query string, so a query that does not
/// decode never fails an image request.
fn info_query(uri: &Uri) -> Result<InfoQueryParams, IiifError> {
    Query::<InfoQueryParams>::try_from_uri(uri)
        .map(|Query(params)| params)
        .map_err(|_| IiifError::InvalidCallback {
            value: uri.query().unwrap_or_default().to_string(),
        })
}

async fn info_response<B: ImageBackend + 'static>(
    state: &AppState<B>,
    path: &str,
    callback: Option<&str>,
    headers: &HeaderMap,
) -> Result<Response, IiifError> {
    if let Some(name) = callback {
        if !is_valid_callback(name) {
            return Err(IiifError::InvalidCallback {
                value: name.to_string(),
            });
        }
    }

    let request = parse_info_request(path)?;
    let info = state.image_service.info(&request).await?;

    let base_uri = state.base_uri(headers);
    let document = state.image_service.document(&info, &base_uri);
    let json = serde_json::to_string(&document).map_err(|e| IiifError::Render(e.to_string()))?;

    let (content_type, body) = match callback {
        Some(name) => ("application/javascript", format!("{}({});", name, json)),
        None if accepts_json_ld(headers) => (JSON_LD_MEDIA_TYPE, json),
        None => ("application/json", json),
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CACHE_CONTROL, state.cache_control()),
        ],
        body,
    )
        .into_response())
}

async fn image_redirect<B: ImageBackend + 'static>(
    state: &AppState<B>,
    path: &str,
) -> Result<Response, IiifError> {
    let request = parse_image_request(path)?;
    let url = state.image_service.image_url(&request).await?;
    Ok(see_other(url.to_string(), state.cache_control()))
}

fn see_other(location: String, cache_control: String) -> Response {
    (
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, location),
            (header::CACHE_CONTROL, cache_control),
        ],
    )
        .into_response()
}

fn accepts_json_ld(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.contains(JSON_LD_MEDIA_TYPE))
}

/// Handle health check requests.
///
/// `GET /health` returns `{"status": "healthy", "version": "..."}`.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
