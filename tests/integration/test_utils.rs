//! Test utilities for integration tests.
//!
//! Provides a mock image backend that records every dimension lookup, and
//! helpers for driving the router.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use url::Url;

use iiif_gateway::error::BackendError;
use iiif_gateway::{create_router, ImageBackend, ImageService, RouterConfig, ServiceProfile};

/// Public base URI used by [`test_router`].
pub const BASE_URI: &str = "http://example.org/iiif";

/// Backend image endpoint of [`MockBackend`].
pub const BACKEND_IMAGE_ENDPOINT: &str = "http://backend.test/image";

// =============================================================================
// Mock Backend with Request Tracking
// =============================================================================

/// In-memory backend serving fixed dimensions per identifier.
///
/// Clones share the lookup log, so a test can keep a handle after moving the
/// backend into a service.
#[derive(Clone)]
pub struct MockBackend {
    images: HashMap<String, (u32, u32)>,
    failures: HashMap<String, BackendError>,
    endpoint: Url,
    delay: Option<Duration>,
    fetch_count: Arc<AtomicUsize>,
    fetches: Arc<Mutex<Vec<String>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            images: HashMap::new(),
            failures: HashMap::new(),
            endpoint: Url::parse(BACKEND_IMAGE_ENDPOINT).unwrap(),
            delay: None,
            fetch_count: Arc::new(AtomicUsize::new(0)),
            fetches: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_image(mut self, identifier: &str, width: u32, height: u32) -> Self {
        self.images.insert(identifier.to_string(), (width, height));
        self
    }

    pub fn with_failure(mut self, identifier: &str, error: BackendError) -> Self {
        self.failures.insert(identifier.to_string(), error);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Number of lookups made for one identifier.
    pub fn fetches_for(&self, identifier: &str) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .iter()
            .filter(|id| id.as_str() == identifier)
            .count()
    }
}

#[async_trait]
impl ImageBackend for MockBackend {
    async fn fetch_dimensions(&self, identifier: &str) -> Result<(u32, u32), BackendError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.fetches.lock().unwrap().push(identifier.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.failures.get(identifier) {
            return Err(error.clone());
        }

        self.images
            .get(identifier)
            .copied()
            .ok_or_else(|| BackendError::NotFound(identifier.to_string()))
    }

    fn image_endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Backend with a small set of images used across the API tests.
pub fn sample_backend() -> MockBackend {
    MockBackend::new()
        .with_image("book", 1000, 1500)
        .with_image("book/page1", 2000, 1000)
        .with_image("square", 800, 800)
        .with_failure(
            "broken",
            BackendError::Unavailable("connection refused".to_string()),
        )
        .with_failure(
            "garbled",
            BackendError::MalformedResponse("missing Width element".to_string()),
        )
}

// =============================================================================
// Router Helpers
// =============================================================================

pub fn router_with(backend: MockBackend, profile: ServiceProfile, config: RouterConfig) -> Router {
    create_router(ImageService::new(backend, profile), config)
}

/// Router with tracing off and a fixed public base URI.
pub fn test_router(backend: MockBackend) -> Router {
    router_with(
        backend,
        ServiceProfile::default(),
        RouterConfig::new()
            .with_tracing(false)
            .with_public_base_uri(BASE_URI),
    )
}

pub async fn get(router: Router, uri: &str) -> Response<Body> {
    get_with_headers(router, uri, &[]).await
}

pub async fn get_with_headers(
    router: Router,
    uri: &str,
    headers: &[(&str, &str)],
) -> Response<Body> {
    let mut builder = Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    router
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

pub fn header<'a>(response: &'a Response<Body>, name: &str) -> &'a str {
    response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("missing header {name}"))
        .to_str()
        .unwrap()
}

/// Query pairs of a redirect's `Location`.
pub fn location_query(response: &Response<Body>) -> HashMap<String, String> {
    let location = Url::parse(header(response, "location")).unwrap();
    location.query_pairs().into_owned().collect()
}
