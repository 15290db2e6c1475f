//! External image backend.
//!
//! - [`client`]: the [`ImageBackend`] seam and its HTTP implementation
//! - [`params`]: translation of resolved requests into backend query parameters

pub mod client;
pub mod params;

pub use client::{parse_dimensions, HttpImageBackend, ImageBackend};
pub use params::{
    backend_profile, translate, BackendParams, EFFECT_FLIP_HORIZONTAL, EFFECT_GRAYSCALE,
};
