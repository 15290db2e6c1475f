//! HTTP server layer for the IIIF gateway.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │   GET /iiif/{id}/info.json        GET /iiif/{id}/{r}/{s}/{r}/{q}│
//! │                                                                 │
//! │  ┌──────────────────────────┐  ┌─────────────────────────────┐  │
//! │  │        handlers          │  │          routes             │  │
//! │  │ (parse, serialize, map   │  │  (router, CORS, tracing)    │  │
//! │  │  errors to statuses)     │  │                             │  │
//! │  └──────────────────────────┘  └─────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    health_handler, iiif_handler, is_valid_callback, AppState, ErrorResponse, HealthResponse,
    InfoQueryParams, IIIF_PREFIX, JSON_LD_MEDIA_TYPE,
};
pub use routes::{create_router, RouterConfig};
