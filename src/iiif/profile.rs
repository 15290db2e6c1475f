//! Compliance levels and declared server capabilities.
//!
//! A [`ServiceProfile`] is the immutable description of what this server can
//! deliver. It is built once from configuration and handed to the service; it
//! gates incoming requests and supplies the tile and profile sections of every
//! info document.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::IiifError;

use super::info::{ImageInfo, SizeInfo};
use super::types::{Format, ImageRequest, Quality, Region, Size};

// =============================================================================
// Capabilities
// =============================================================================

/// Optional features named in the IIIF Image API 2.0 `supports` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    BaseUriRedirect,
    CanonicalLinkHeader,
    Cors,
    JsonldMediaType,
    Mirroring,
    ProfileLinkHeader,
    RegionByPct,
    RegionByPx,
    RotationArbitrary,
    RotationBy90s,
    SizeAboveFull,
    SizeByForcedWh,
    SizeByH,
    SizeByPct,
    SizeByW,
    SizeByWh,
}

// =============================================================================
// Compliance Level
// =============================================================================

/// IIIF Image API 2.0 compliance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ComplianceLevel {
    Level0,
    Level1,
    Level2,
}

impl ComplianceLevel {
    /// Parse `0`, `1`, `2` (or `level0` etc).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim_start_matches("level") {
            "0" => Some(ComplianceLevel::Level0),
            "1" => Some(ComplianceLevel::Level1),
            "2" => Some(ComplianceLevel::Level2),
            _ => None,
        }
    }

    /// Canonical compliance URI, always the first entry of `profile`.
    pub fn uri(&self) -> &'static str {
        match self {
            ComplianceLevel::Level0 => "http://iiif.io/api/image/2/level0.json",
            ComplianceLevel::Level1 => "http://iiif.io/api/image/2/level1.json",
            ComplianceLevel::Level2 => "http://iiif.io/api/image/2/level2.json",
        }
    }

    pub fn formats(&self) -> BTreeSet<Format> {
        match self {
            ComplianceLevel::Level0 | ComplianceLevel::Level1 => [Format::Jpg].into(),
            ComplianceLevel::Level2 => [Format::Jpg, Format::Png].into(),
        }
    }

    pub fn qualities(&self) -> BTreeSet<Quality> {
        match self {
            ComplianceLevel::Level0 | ComplianceLevel::Level1 => [Quality::Default].into(),
            ComplianceLevel::Level2 => Quality::ALL.into(),
        }
    }

    /// Capabilities every server at this level must support.
    pub fn supports(&self) -> BTreeSet<Capability> {
        use Capability::*;
        match self {
            ComplianceLevel::Level0 => BTreeSet::new(),
            ComplianceLevel::Level1 => [
                BaseUriRedirect,
                Cors,
                JsonldMediaType,
                RegionByPx,
                SizeByH,
                SizeByPct,
                SizeByW,
            ]
            .into(),
            ComplianceLevel::Level2 => [
                BaseUriRedirect,
                Cors,
                JsonldMediaType,
                RegionByPct,
                RegionByPx,
                RotationBy90s,
                SizeByForcedWh,
                SizeByH,
                SizeByPct,
                SizeByW,
                SizeByWh,
            ]
            .into(),
        }
    }
}

// =============================================================================
// Image Server Profile
// =============================================================================

/// A profile object of the info document: formats, qualities and features
/// offered on top of the compliance level.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageServerProfile {
    pub formats: BTreeSet<Format>,
    pub qualities: BTreeSet<Quality>,
    pub supports: BTreeSet<Capability>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<u32>,
}

impl ImageServerProfile {
    /// The part of this profile not already implied by `level`.
    pub fn beyond(&self, level: ComplianceLevel) -> Self {
        Self {
            formats: self.formats.difference(&level.formats()).copied().collect(),
            qualities: self
                .qualities
                .difference(&level.qualities())
                .copied()
                .collect(),
            supports: self
                .supports
                .difference(&level.supports())
                .copied()
                .collect(),
            max_width: self.max_width,
            max_height: self.max_height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
            && self.qualities.is_empty()
            && self.supports.is_empty()
            && self.max_width.is_none()
            && self.max_height.is_none()
    }
}

// =============================================================================
// Tiles and Services
// =============================================================================

/// Tile descriptor advertised for deep-zoom clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileInfo {
    pub width: u32,
    pub height: u32,
    pub scale_factors: Vec<u32>,
}

impl TileInfo {
    pub fn square(size: u32, scale_factors: Vec<u32>) -> Self {
        Self {
            width: size,
            height: size,
            scale_factors,
        }
    }
}

/// Reference to a related service embedded in the info document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceReference {
    #[serde(rename = "@context")]
    pub context: String,

    #[serde(rename = "@id")]
    pub id: String,

    pub profile: String,
}

// =============================================================================
// Service Profile
// =============================================================================

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 512;

/// Default tile scale factors.
pub const DEFAULT_SCALE_FACTORS: [u32; 5] = [1, 2, 4, 8, 16];

/// Everything the server declares about itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceProfile {
    pub compliance: ComplianceLevel,

    /// Formats, qualities and capabilities this deployment actually supports
    pub profile: ImageServerProfile,

    pub tiles: Vec<TileInfo>,

    pub services: Vec<ServiceReference>,

    /// Largest output width or height, `None` for unlimited
    pub max_dimension: Option<u32>,
}

impl Default for ServiceProfile {
    fn default() -> Self {
        use Capability::*;
        Self {
            compliance: ComplianceLevel::Level1,
            profile: ImageServerProfile {
                formats: [Format::Jpg, Format::Png].into(),
                qualities: Quality::ALL.into(),
                supports: [
                    BaseUriRedirect,
                    Cors,
                    JsonldMediaType,
                    Mirroring,
                    RegionByPct,
                    RegionByPx,
                    SizeByForcedWh,
                    SizeByH,
                    SizeByPct,
                    SizeByW,
                    SizeByWh,
                ]
                .into(),
                max_width: None,
                max_height: None,
            },
            tiles: vec![TileInfo::square(
                DEFAULT_TILE_SIZE,
                DEFAULT_SCALE_FACTORS.to_vec(),
            )],
            services: Vec::new(),
            max_dimension: None,
        }
    }
}

impl ServiceProfile {
    pub fn with_max_dimension(mut self, max_dimension: Option<u32>) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    pub fn with_tiles(mut self, tiles: Vec<TileInfo>) -> Self {
        self.tiles = tiles;
        self
    }

    pub fn with_compliance(mut self, compliance: ComplianceLevel) -> Self {
        self.compliance = compliance;
        self
    }

    pub fn with_service(mut self, service: ServiceReference) -> Self {
        self.services.push(service);
        self
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.profile.supports.contains(&capability)
            || self.compliance.supports().contains(&capability)
    }

    pub fn supports_quality(&self, quality: Quality) -> bool {
        self.profile.qualities.contains(&quality) || self.compliance.qualities().contains(&quality)
    }

    pub fn supports_format(&self, format: Format) -> bool {
        self.profile.formats.contains(&format) || self.compliance.formats().contains(&format)
    }

    /// Reject request features this server does not declare.
    ///
    /// Rotation angles are left to the backend translation, which only
    /// implements mirroring.
    pub fn check(&self, request: &ImageRequest) -> Result<(), IiifError> {
        let region_capability = match request.region {
            Region::Full => None,
            Region::Absolute { .. } => Some(Capability::RegionByPx),
            Region::Percentage { .. } => Some(Capability::RegionByPct),
        };
        if let Some(capability) = region_capability {
            if !self.supports(capability) {
                return Err(IiifError::UnsupportedRegionType {
                    value: request.region.to_string(),
                });
            }
        }

        let size_capability = match request.size {
            Size::Full => None,
            Size::Exact { .. } => Some(Capability::SizeByForcedWh),
            Size::ExactWidth { .. } => Some(Capability::SizeByW),
            Size::ExactHeight { .. } => Some(Capability::SizeByH),
            Size::BestFit { .. } => Some(Capability::SizeByWh),
            Size::Percentage { .. } => Some(Capability::SizeByPct),
        };
        if let Some(capability) = size_capability {
            if !self.supports(capability) {
                return Err(IiifError::UnsupportedSizeType {
                    value: request.size.to_string(),
                });
            }
        }

        if request.rotation.mirrored && !self.supports(Capability::Mirroring) {
            return Err(IiifError::UnsupportedMirroring {
                value: request.rotation.to_string(),
            });
        }

        if !self.supports_quality(request.quality) {
            return Err(IiifError::UnsupportedQuality {
                value: request.quality.to_string(),
            });
        }

        if !self.supports_format(request.format) {
            return Err(IiifError::UnsupportedFormat {
                value: request.format.to_string(),
            });
        }

        Ok(())
    }

    /// Preferred whole-image sizes: one per scale factor of the first tile
    /// descriptor, smallest first, skipping any beyond the max dimension.
    pub fn sizes_for(&self, width: u32, height: u32) -> Vec<SizeInfo> {
        let Some(tile) = self.tiles.first() else {
            return Vec::new();
        };

        let mut sizes: Vec<SizeInfo> = tile
            .scale_factors
            .iter()
            .filter(|&&factor| factor > 0)
            .map(|&factor| SizeInfo {
                width: width.div_ceil(factor).max(1),
                height: height.div_ceil(factor).max(1),
            })
            .filter(|size| match self.max_dimension {
                Some(limit) => size.width <= limit && size.height <= limit,
                None => true,
            })
            .collect();

        sizes.sort_by_key(|s| (s.width, s.height));
        sizes.dedup();
        sizes
    }

    /// Assemble the info for an image of the given true dimensions.
    pub fn image_info(&self, identifier: &str, width: u32, height: u32) -> ImageInfo {
        let mut declared = self.profile.clone();
        declared.max_width = self.max_dimension;
        declared.max_height = self.max_dimension;

        let extra = declared.beyond(self.compliance);
        let profiles = if extra.is_empty() {
            Vec::new()
        } else {
            vec![extra]
        };

        ImageInfo {
            identifier: identifier.to_string(),
            width,
            height,
            sizes: self.sizes_for(width, height),
            tiles: self.tiles.clone(),
            compliance: self.compliance,
            profiles,
            services: self.services.clone(),
        }
    }
}
