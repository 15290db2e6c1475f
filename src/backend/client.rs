//! HTTP client for the external image-processing backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use crate::error::BackendError;

// =============================================================================
// ImageBackend Trait
// =============================================================================

/// The external service that knows image dimensions and renders pixels.
///
/// The engine only ever asks for dimensions; image requests are answered by
/// pointing the client at [`ImageBackend::image_endpoint`] with the translated
/// query parameters.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// True pixel dimensions `(width, height)` of an image.
    async fn fetch_dimensions(&self, identifier: &str) -> Result<(u32, u32), BackendError>;

    /// Base URL that backend image parameters are appended to.
    fn image_endpoint(&self) -> &Url;
}

// =============================================================================
// HTTP Backend
// =============================================================================

/// [`ImageBackend`] reached over HTTP.
///
/// Dimensions come from `GET {info_endpoint}?source={identifier}`, which
/// answers with an XML document containing `Width` and `Height` elements.
#[derive(Debug, Clone)]
pub struct HttpImageBackend {
    client: reqwest::Client,
    info_endpoint: Url,
    image_endpoint: Url,
    timeout: Duration,
}

impl HttpImageBackend {
    /// Create a backend rooted at `base_url`.
    ///
    /// `info_path` and `image_path` are resolved relative to the base, which is
    /// treated as a directory whether or not it ends with a slash.
    pub fn new(
        base_url: &str,
        info_path: &str,
        image_path: &str,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let base = Url::parse(base_url)
            .map_err(|e| BackendError::Unavailable(format!("invalid backend URL {base_url}: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            info_endpoint: endpoint(&base, info_path)?,
            image_endpoint: endpoint(&base, image_path)?,
            timeout,
        })
    }

    pub fn info_endpoint(&self) -> &Url {
        &self.info_endpoint
    }

    fn timeout_millis(&self) -> u64 {
        self.timeout.as_millis().try_into().unwrap_or(u64::MAX)
    }
}

#[async_trait]
impl ImageBackend for HttpImageBackend {
    async fn fetch_dimensions(&self, identifier: &str) -> Result<(u32, u32), BackendError> {
        let mut url = self.info_endpoint.clone();
        url.query_pairs_mut().append_pair("source", identifier);

        debug!(url = %url, "Fetching image dimensions");

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout {
                    millis: self.timeout_millis(),
                }
            } else {
                BackendError::Unavailable(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(identifier.to_string()));
        }
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout {
                    millis: self.timeout_millis(),
                }
            } else {
                BackendError::Unavailable(e.to_string())
            }
        })?;

        parse_dimensions(&body)
    }

    fn image_endpoint(&self) -> &Url {
        &self.image_endpoint
    }
}

/// Resolve `path` below `base`.
fn endpoint(base: &Url, path: &str) -> Result<Url, BackendError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    base.join(path.trim_start_matches('/'))
        .map_err(|e| BackendError::Unavailable(format!("invalid backend path {path}: {e}")))
}

/// Read the first `Width` and `Height` elements of a backend info reply.
pub fn parse_dimensions(xml: &str) -> Result<(u32, u32), BackendError> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| BackendError::MalformedResponse(format!("invalid XML: {e}")))?;

    let dimension = |name: &str| -> Result<u32, BackendError> {
        let text = doc
            .descendants()
            .find(|n| n.has_tag_name(name))
            .and_then(|n| n.text())
            .ok_or_else(|| BackendError::MalformedResponse(format!("missing {name} element")))?;

        match text.trim().parse::<u32>() {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(BackendError::MalformedResponse(format!(
                "invalid {name}: {text}"
            ))),
        }
    };

    Ok((dimension("Width")?, dimension("Height")?))
}
