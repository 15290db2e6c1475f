//! Translation of resolved geometry into backend query parameters.
//!
//! The backend addresses crops fractionally: `rect` is `left,top,width,height`
//! with every value divided by the true image width or height.

use url::Url;

use crate::error::IiifError;
use crate::iiif::{Format, Quality, ResolvedGeometry, Rotation};

/// Backend effect token for desaturation.
pub const EFFECT_GRAYSCALE: &str = "grayscale";

/// Backend effect token for a horizontal flip.
pub const EFFECT_FLIP_HORIZONTAL: &str = "fliph";

/// Query parameters for one backend image call.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendParams {
    /// Image identifier as known to the backend
    pub source: String,

    /// Fractional crop `(left, top, width, height)`
    pub rect: (f64, f64, f64, f64),

    pub width: Option<u32>,
    pub height: Option<u32>,

    /// Output encoding keyword (`jpeg`, `png`)
    pub profile: &'static str,

    /// Effects applied in order
    pub effects: Vec<&'static str>,
}

impl BackendParams {
    /// The `rect` query value.
    pub fn rect_value(&self) -> String {
        let (left, top, width, height) = self.rect;
        format!("{},{},{},{}", left, top, width, height)
    }

    /// Append these parameters to the backend image endpoint.
    pub fn to_url(&self, endpoint: &Url) -> Url {
        let mut url = endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("source", &self.source);
            query.append_pair("rect", &self.rect_value());
            if let Some(width) = self.width {
                query.append_pair("width", &width.to_string());
            }
            if let Some(height) = self.height {
                query.append_pair("height", &height.to_string());
            }
            query.append_pair("profile", self.profile);
            if !self.effects.is_empty() {
                query.append_pair("effects", &self.effects.join(","));
            }
        }
        url
    }
}

/// Backend profile keyword for an output format.
pub fn backend_profile(format: Format) -> Option<&'static str> {
    match format {
        Format::Jpg => Some("jpeg"),
        Format::Png => Some("png"),
        _ => None,
    }
}

/// Build backend parameters for a resolved request.
///
/// `max_dimension` of `None` means unlimited. Only dimensions that were
/// resolved are compared against it, and only a strictly larger value fails.
pub fn translate(
    source: &str,
    geometry: &ResolvedGeometry,
    quality: Quality,
    rotation: &Rotation,
    format: Format,
    max_dimension: Option<u32>,
) -> Result<BackendParams, IiifError> {
    if rotation.angle != 0.0 {
        return Err(IiifError::UnsupportedRotationAngle {
            angle: rotation.angle,
        });
    }

    let profile = backend_profile(format).ok_or_else(|| IiifError::UnsupportedFormat {
        value: format.to_string(),
    })?;

    if let Some(limit) = max_dimension {
        let exceeds = |d: Option<u32>| d.is_some_and(|d| d > limit);
        if exceeds(geometry.width) || exceeds(geometry.height) {
            let render = |d: Option<u32>| d.map_or_else(|| "auto".to_string(), |d| d.to_string());
            return Err(IiifError::ExceedsMaxDimension {
                limit,
                width: render(geometry.width),
                height: render(geometry.height),
            });
        }
    }

    let mut effects = Vec::new();
    match quality {
        Quality::Default | Quality::Color => {}
        Quality::Gray => effects.push(EFFECT_GRAYSCALE),
    }
    if rotation.mirrored {
        effects.push(EFFECT_FLIP_HORIZONTAL);
    }

    let image_width = geometry.image_width.max(1) as f64;
    let image_height = geometry.image_height.max(1) as f64;

    Ok(BackendParams {
        source: source.to_string(),
        rect: (
            geometry.crop_x as f64 / image_width,
            geometry.crop_y as f64 / image_height,
            geometry.crop_width as f64 / image_width,
            geometry.crop_height as f64 / image_height,
        ),
        width: geometry.width,
        height: geometry.height,
        profile,
        effects,
    })
}
