//! Image information cache.
//!
//! Maps an identifier to its [`ImageInfo`], fetching dimensions from the
//! backend on a miss. Eviction is deliberately coarse: when the map is full,
//! the next insertion clears it entirely before inserting.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::debug;

use crate::backend::ImageBackend;
use crate::error::BackendError;
use crate::iiif::{ImageInfo, ServiceProfile};

/// Default number of cached identifiers.
pub const DEFAULT_INFO_CACHE_CAPACITY: usize = 1000;

/// Default budget for one backend dimension lookup.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Thread-safe identifier to [`ImageInfo`] cache with whole-clear eviction.
///
/// Concurrent misses on the same identifier may both reach the backend; the
/// first value inserted wins and both callers get an equivalent result.
pub struct InfoCache<B: ImageBackend> {
    backend: B,
    profile: Arc<ServiceProfile>,
    entries: RwLock<HashMap<String, Arc<ImageInfo>>>,
    capacity: usize,
    timeout: Duration,
}

impl<B: ImageBackend> InfoCache<B> {
    /// Create a cache with default capacity and timeout.
    pub fn new(backend: B, profile: Arc<ServiceProfile>) -> Self {
        Self::with_capacity(
            backend,
            profile,
            DEFAULT_INFO_CACHE_CAPACITY,
            DEFAULT_BACKEND_TIMEOUT,
        )
    }

    /// Create a cache holding at most `capacity` identifiers.
    ///
    /// Each backend call is abandoned after `timeout`.
    pub fn with_capacity(
        backend: B,
        profile: Arc<ServiceProfile>,
        capacity: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            backend,
            profile,
            entries: RwLock::new(HashMap::new()),
            capacity,
            timeout,
        }
    }

    /// Get the info for `identifier`, fetching it from the backend on a miss.
    ///
    /// Failed lookups are never cached.
    pub async fn lookup(&self, identifier: &str) -> Result<Arc<ImageInfo>, BackendError> {
        if let Some(info) = self.entries.read().await.get(identifier) {
            debug!(identifier, "Info cache hit");
            return Ok(Arc::clone(info));
        }

        debug!(identifier, "Info cache miss");

        let fetch = self.backend.fetch_dimensions(identifier);
        let (width, height) = match tokio::time::timeout(self.timeout, fetch).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(BackendError::Timeout {
                    millis: self.timeout.as_millis().try_into().unwrap_or(u64::MAX),
                })
            }
        };

        let info = Arc::new(self.profile.image_info(identifier, width, height));

        let mut entries = self.entries.write().await;
        if entries.len() >= self.capacity && !entries.contains_key(identifier) {
            debug!(
                entries = entries.len(),
                capacity = self.capacity,
                "Info cache full, clearing"
            );
            entries.clear();
        }

        let cached = entries.entry(identifier.to_string()).or_insert(info);
        Ok(Arc::clone(cached))
    }

    /// Number of cached identifiers.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop every cached entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
        debug!("Info cache cleared");
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn profile(&self) -> &Arc<ServiceProfile> {
        &self.profile
    }
}
