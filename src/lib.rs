//! # IIIF Gateway
//!
//! An IIIF Image API 2.0 engine that sits in front of an external
//! image-processing backend.
//!
//! Info requests are answered from cached backend metadata as JSON-LD
//! documents. Image requests are parsed, resolved against the image's true
//! dimensions and translated into backend query parameters; the client is
//! redirected to the resulting backend URL. No pixels pass through this crate.
//!
//! ## Architecture
//!
//! - [`iiif`] - Request grammar, geometry resolution, compliance profiles, info documents
//! - [`backend`] - Backend client and parameter translation
//! - [`service`] - Info cache and the [`ImageService`] facade
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use iiif_gateway::{create_router, HttpImageBackend, ImageService, RouterConfig, ServiceProfile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = HttpImageBackend::new(
//!         "http://imaging:9000",
//!         "info",
//!         "image",
//!         Duration::from_secs(10),
//!     )?;
//!     let service = ImageService::new(backend, ServiceProfile::default());
//!     let router = create_router(service, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod iiif;
pub mod server;
pub mod service;

// Re-export commonly used types
pub use backend::{translate, BackendParams, HttpImageBackend, ImageBackend};
pub use config::Config;
pub use error::{BackendError, IiifError, Parameter};
pub use iiif::{
    format_image_request, parse_image_request, parse_info_request, resolve, Capability,
    ComplianceLevel, Format, ImageInfo, ImageRequest, ImageServerProfile, InfoRequest, Quality,
    Region, ResolvedGeometry, Rotation, ServiceProfile, ServiceReference, Size, TileInfo,
};
pub use server::{create_router, health_handler, AppState, ErrorResponse, RouterConfig};
pub use service::{ImageService, InfoCache};
