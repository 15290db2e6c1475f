//! Service layer between the HTTP handlers and the backend.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └────────────────────┬────────────────────┘
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              ImageService               │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │  InfoCache   │  │ ServiceProfile  │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └────────────────────┬────────────────────┘
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              ImageBackend               │
//! └─────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod image;

pub use cache::{InfoCache, DEFAULT_BACKEND_TIMEOUT, DEFAULT_INFO_CACHE_CAPACITY};
pub use image::ImageService;
