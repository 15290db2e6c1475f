//! IIIF Gateway - an IIIF Image API 2.0 front end.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use iiif_gateway::{
    backend::HttpImageBackend,
    config::Config,
    server::{create_router, RouterConfig},
    service::{ImageService, InfoCache},
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let profile = config.service_profile();

    info!("IIIF Gateway v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Backend: {}", config.backend_url);
    info!("  Backend timeout: {}ms", config.backend_timeout_ms);
    info!("  Compliance: {}", profile.compliance.uri());
    match profile.max_dimension {
        Some(limit) => info!("  Max dimension: {}px", limit),
        None => info!("  Max dimension: unlimited"),
    }
    info!("  Info cache: {} entries", config.cache_capacity);
    if let Some(ref base) = config.public_base_uri {
        info!("  Public base URI: {}", base);
    }

    let backend = match HttpImageBackend::new(
        &config.backend_url,
        &config.backend_info_path,
        &config.backend_image_path,
        config.backend_timeout(),
    ) {
        Ok(backend) => backend,
        Err(e) => {
            error!("Failed to create backend client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let cache = InfoCache::with_capacity(
        backend,
        std::sync::Arc::new(profile),
        config.cache_capacity,
        config.backend_timeout(),
    );
    let image_service = ImageService::with_cache(cache);

    let router = create_router(image_service, build_router_config(&config));

    let addr = config.bind_address();
    info!("Server listening on: http://{}", addr);
    info!("  curl http://{}/health", addr);
    info!("  curl http://{}/iiif/<identifier>/info.json", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "iiif_gateway=debug,tower_http=debug"
    } else {
        "iiif_gateway=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the command line configuration.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_cache_max_age(config.cache_max_age)
        .with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    if let Some(ref base) = config.public_base_uri {
        router_config = router_config.with_public_base_uri(base.clone());
    }

    router_config
}
