//! Image service facade.
//!
//! [`ImageService`] is the entry point for both request kinds:
//!
//! ```text
//! info request  ──► InfoCache ──► ImageInfo ──► info.json document
//!
//! image request ──► ServiceProfile::check
//!                     └─► InfoCache (true dimensions)
//!                           └─► resolve ──► translate ──► backend URL
//! ```

use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::backend::{translate, ImageBackend};
use crate::error::IiifError;
use crate::iiif::{resolve, ImageInfo, ImageRequest, InfoDocument, InfoRequest, ServiceProfile};

use super::cache::InfoCache;

/// Orchestrates cache lookups, geometry resolution and backend translation.
pub struct ImageService<B: ImageBackend> {
    /// Cached image information
    cache: InfoCache<B>,

    /// Declared capabilities, shared with the cache
    profile: Arc<ServiceProfile>,
}

impl<B: ImageBackend> ImageService<B> {
    /// Create a service with default cache settings.
    pub fn new(backend: B, profile: ServiceProfile) -> Self {
        let profile = Arc::new(profile);
        Self {
            cache: InfoCache::new(backend, Arc::clone(&profile)),
            profile,
        }
    }

    /// Create a service around an existing cache, adopting its profile.
    pub fn with_cache(cache: InfoCache<B>) -> Self {
        let profile = Arc::clone(cache.profile());
        Self { cache, profile }
    }

    /// Look up image information.
    pub async fn info(&self, request: &InfoRequest) -> Result<Arc<ImageInfo>, IiifError> {
        Ok(self.cache.lookup(&request.identifier).await?)
    }

    /// Build the backend URL that renders `request`.
    ///
    /// # Errors
    ///
    /// - a capability the profile does not declare (501, 415 for formats)
    /// - an unknown identifier (404) or a failed backend lookup (5xx)
    /// - a non-zero rotation angle or an output over the max dimension (501)
    pub async fn image_url(&self, request: &ImageRequest) -> Result<Url, IiifError> {
        self.profile.check(request)?;

        let info = self.cache.lookup(&request.identifier).await?;
        let geometry = resolve(&request.region, &request.size, info.width, info.height);

        let params = translate(
            &request.identifier,
            &geometry,
            request.quality,
            &request.rotation,
            request.format,
            self.profile.max_dimension,
        )?;

        let url = params.to_url(self.cache.backend().image_endpoint());
        debug!(identifier = %request.identifier, url = %url, "Translated image request");
        Ok(url)
    }

    /// Serializable info.json view of `info` with `@id` under `base_uri`.
    pub fn document<'a>(&self, info: &'a ImageInfo, base_uri: &str) -> InfoDocument<'a> {
        info.document(base_uri)
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    pub async fn cache_len(&self) -> usize {
        self.cache.len().await
    }

    pub fn cache(&self) -> &InfoCache<B> {
        &self.cache
    }

    pub fn profile(&self) -> &ServiceProfile {
        &self.profile
    }
}
