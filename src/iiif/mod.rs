//! IIIF Image API 2.0 protocol layer.
//!
//! - [`types`]: typed request parameters
//! - [`parser`]: path grammar, parsing and canonical rendering
//! - [`geometry`]: crop and output size resolution
//! - [`profile`]: compliance levels and capability gating
//! - [`info`]: image information and the info.json document

pub mod geometry;
pub mod info;
pub mod parser;
pub mod profile;
pub mod types;

pub use geometry::{resolve, ResolvedGeometry};
pub use info::{ImageInfo, InfoDocument, SizeInfo, IMAGE_CONTEXT, IMAGE_PROTOCOL};
pub use parser::{
    encode_identifier, format_image_request, format_info_request, parse_format,
    parse_image_request, parse_info_request, parse_quality, parse_region, parse_rotation,
    parse_size, segment_count, INFO_SEGMENT,
};
pub use profile::{
    Capability, ComplianceLevel, ImageServerProfile, ServiceProfile, ServiceReference, TileInfo,
    DEFAULT_SCALE_FACTORS, DEFAULT_TILE_SIZE,
};
pub use types::{Format, ImageRequest, InfoFormat, InfoRequest, Quality, Region, Rotation, Size};
