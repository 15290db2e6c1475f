//! Configuration for the IIIF gateway.
//!
//! All options can be given on the command line or through environment
//! variables with the `IIIF_` prefix:
//!
//! - `IIIF_HOST` - Server bind address (default: 0.0.0.0)
//! - `IIIF_PORT` - Server port (default: 8080)
//! - `IIIF_BACKEND_URL` - Base URL of the image-processing backend (required)
//! - `IIIF_BACKEND_INFO_PATH` - Dimension lookup path below the base (default: info)
//! - `IIIF_BACKEND_IMAGE_PATH` - Image rendering path below the base (default: image)
//! - `IIIF_BACKEND_TIMEOUT_MS` - Backend lookup timeout (default: 10000)
//! - `IIIF_PUBLIC_BASE_URI` - Base for `@id` (default: derived from request headers)
//! - `IIIF_MAX_DIMENSION` - Largest output width or height, -1 for unlimited (default: -1)
//! - `IIIF_CACHE_CAPACITY` - Cached image infos before the cache is cleared (default: 1000)
//! - `IIIF_TILE_SIZE` - Advertised tile edge length (default: 512)
//! - `IIIF_SCALE_FACTORS` - Advertised tile scale factors (default: 1,2,4,8,16)
//! - `IIIF_COMPLIANCE_LEVEL` - Declared compliance level 0 or 1 (default: 1)
//! - `IIIF_CACHE_MAX_AGE` - HTTP cache max-age seconds (default: 3600)
//! - `IIIF_CORS_ORIGINS` - Allowed CORS origins, comma-separated (default: any)

use std::time::Duration;

use clap::Parser;
use url::Url;

use crate::iiif::{Capability, ComplianceLevel, ServiceProfile, TileInfo, DEFAULT_TILE_SIZE};
use crate::service::DEFAULT_INFO_CACHE_CAPACITY;

// =============================================================================
// Default Values
// =============================================================================

pub const DEFAULT_HOST: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 8080;

pub const DEFAULT_BACKEND_INFO_PATH: &str = "info";

pub const DEFAULT_BACKEND_IMAGE_PATH: &str = "image";

pub const DEFAULT_BACKEND_TIMEOUT_MS: u64 = 10_000;

/// Default HTTP cache max-age in seconds (1 hour).
pub const DEFAULT_CACHE_MAX_AGE: u32 = 3600;

/// Max dimension value meaning "no limit".
pub const UNLIMITED_DIMENSION: i64 = -1;

// =============================================================================
// CLI Arguments
// =============================================================================

/// IIIF Gateway - an IIIF Image API 2.0 front end for an image-processing backend.
///
/// Answers info.json requests from cached backend metadata and redirects image
/// requests to the backend with translated crop, size and effect parameters.
#[derive(Parser, Debug, Clone)]
#[command(name = "iiif-gateway")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "IIIF_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "IIIF_PORT")]
    pub port: u16,

    /// Public base URI of the IIIF service, used for `@id`.
    ///
    /// If not specified, it is derived from the Host and X-Forwarded-* headers.
    #[arg(long, env = "IIIF_PUBLIC_BASE_URI")]
    pub public_base_uri: Option<String>,

    // =========================================================================
    // Backend Configuration
    // =========================================================================
    /// Base URL of the image-processing backend.
    #[arg(long, env = "IIIF_BACKEND_URL")]
    pub backend_url: String,

    /// Path of the backend's dimension lookup, relative to the base URL.
    #[arg(long, default_value = DEFAULT_BACKEND_INFO_PATH, env = "IIIF_BACKEND_INFO_PATH")]
    pub backend_info_path: String,

    /// Path of the backend's image endpoint, relative to the base URL.
    #[arg(long, default_value = DEFAULT_BACKEND_IMAGE_PATH, env = "IIIF_BACKEND_IMAGE_PATH")]
    pub backend_image_path: String,

    /// Timeout for one backend dimension lookup, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_BACKEND_TIMEOUT_MS, env = "IIIF_BACKEND_TIMEOUT_MS")]
    pub backend_timeout_ms: u64,

    // =========================================================================
    // Image API Configuration
    // =========================================================================
    /// Largest output width or height in pixels (-1 for unlimited).
    #[arg(
        long,
        default_value_t = UNLIMITED_DIMENSION,
        allow_negative_numbers = true,
        env = "IIIF_MAX_DIMENSION"
    )]
    pub max_dimension: i64,

    /// Advertised tile edge length in pixels.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE, env = "IIIF_TILE_SIZE")]
    pub tile_size: u32,

    /// Advertised tile scale factors (comma-separated).
    #[arg(
        long,
        default_value = "1,2,4,8,16",
        value_delimiter = ',',
        env = "IIIF_SCALE_FACTORS"
    )]
    pub scale_factors: Vec<u32>,

    /// Declared IIIF compliance level (0 or 1; level 2 implies rotation).
    #[arg(long, default_value_t = 1, env = "IIIF_COMPLIANCE_LEVEL")]
    pub compliance_level: u8,

    // =========================================================================
    // Cache Configuration
    // =========================================================================
    /// Number of image infos to cache before the cache is cleared.
    #[arg(long, default_value_t = DEFAULT_INFO_CACHE_CAPACITY, env = "IIIF_CACHE_CAPACITY")]
    pub cache_capacity: usize,

    /// HTTP Cache-Control max-age in seconds.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "IIIF_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "IIIF_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        match Url::parse(&self.backend_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(format!(
                    "backend_url must use http or https, got '{}'",
                    url.scheme()
                ))
            }
            Err(e) => {
                return Err(format!(
                    "Invalid backend URL '{}': {}. Set --backend-url or IIIF_BACKEND_URL",
                    self.backend_url, e
                ))
            }
        }

        if let Some(base) = &self.public_base_uri {
            Url::parse(base).map_err(|e| format!("Invalid public base URI '{}': {}", base, e))?;
        }

        if self.backend_timeout_ms == 0 {
            return Err("backend_timeout_ms must be greater than 0".to_string());
        }

        if self.cache_capacity == 0 {
            return Err("cache_capacity must be greater than 0".to_string());
        }

        if self.tile_size == 0 {
            return Err("tile_size must be greater than 0".to_string());
        }

        if self.scale_factors.is_empty() || self.scale_factors.contains(&0) {
            return Err("scale_factors must be a non-empty list of positive integers".to_string());
        }

        if self.max_dimension != UNLIMITED_DIMENSION
            && (self.max_dimension <= 0 || self.max_dimension > u32::MAX as i64)
        {
            return Err("max_dimension must be -1 (unlimited) or a positive integer".to_string());
        }

        match self.compliance() {
            None => return Err("compliance_level must be 0 or 1".to_string()),
            // Only mirroring reaches the backend
            Some(level) if level.supports().contains(&Capability::RotationBy90s) => {
                return Err(format!(
                    "compliance_level {} requires rotationBy90s, which the backend cannot render",
                    self.compliance_level
                ));
            }
            Some(_) => {}
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_millis(self.backend_timeout_ms)
    }

    /// Max output dimension, `None` when unlimited.
    pub fn max_dimension(&self) -> Option<u32> {
        u32::try_from(self.max_dimension)
            .ok()
            .filter(|&limit| limit > 0)
    }

    pub fn compliance(&self) -> Option<ComplianceLevel> {
        ComplianceLevel::from_name(&self.compliance_level.to_string())
    }

    /// Build the immutable service profile (call validate() first).
    pub fn service_profile(&self) -> ServiceProfile {
        let profile = ServiceProfile::default();
        let compliance = self.compliance().unwrap_or(profile.compliance);

        profile
            .with_compliance(compliance)
            .with_tiles(vec![TileInfo::square(
                self.tile_size,
                self.scale_factors.clone(),
            )])
            .with_max_dimension(self.max_dimension())
    }
}

// =============================================================================
// Tests
// =============================================================================
