//! Router configuration for the IIIF gateway.
//!
//! # Route Structure
//!
//! ```text
//! /health                - Health check
//! /iiif/{*path}          - IIIF image API (info, image and base URI requests)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use iiif_gateway::{create_router, HttpImageBackend, ImageService, RouterConfig, ServiceProfile};
//!
//! let backend = HttpImageBackend::new("http://imaging:8080", "info", "image", timeout)?;
//! let service = ImageService::new(backend, ServiceProfile::default());
//!
//! let config = RouterConfig::new()
//!     .with_public_base_uri("https://images.example.org/iiif")
//!     .with_cache_max_age(86400);
//!
//! let router = create_router(service, config);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{routing::get, Router};
use http::header::{ACCEPT, CONTENT_TYPE};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{health_handler, iiif_handler, AppState};
use crate::backend::ImageBackend;
use crate::service::ImageService;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Cache-Control max-age in seconds
    pub cache_max_age: u32,

    /// Whether to enable request tracing
    pub enable_tracing: bool,

    /// Base URI used for `@id` in info documents
    pub public_base_uri: Option<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterConfig {
    /// Create a router configuration.
    ///
    /// By default:
    /// - CORS allows any origin
    /// - Cache max-age is 1 hour (3600 seconds)
    /// - Tracing is enabled
    /// - `@id` is derived from the request headers
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            cache_max_age: 3600,
            enable_tracing: true,
            public_base_uri: None,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    pub fn with_cache_max_age(mut self, seconds: u32) -> Self {
        self.cache_max_age = seconds;
        self
    }

    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }

    pub fn with_public_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.public_base_uri = Some(base_uri.into());
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the application router.
pub fn create_router<B>(image_service: ImageService<B>, config: RouterConfig) -> Router
where
    B: ImageBackend + 'static,
{
    let app_state = AppState::new(image_service)
        .with_cache_max_age(config.cache_max_age)
        .with_public_base_uri(config.public_base_uri.clone());

    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/iiif/{*path}", get(iiif_handler::<B>))
        .with_state(app_state)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}
