//! Image information and its JSON-LD rendering.

use serde::Serialize;

use super::parser::encode_identifier;
use super::profile::{ComplianceLevel, ImageServerProfile, ServiceReference, TileInfo};

/// JSON-LD context of IIIF Image API 2.0 documents.
pub const IMAGE_CONTEXT: &str = "http://iiif.io/api/image/2/context.json";

/// Protocol URI of the IIIF Image API.
pub const IMAGE_PROTOCOL: &str = "http://iiif.io/api/image";

/// A preferred whole-image size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeInfo {
    pub width: u32,
    pub height: u32,
}

/// Everything known about one image, as cached per identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    /// Decoded image identifier
    pub identifier: String,

    pub width: u32,
    pub height: u32,
    pub sizes: Vec<SizeInfo>,
    pub tiles: Vec<TileInfo>,
    pub compliance: ComplianceLevel,

    /// Profile objects following the compliance URI
    pub profiles: Vec<ImageServerProfile>,

    pub services: Vec<ServiceReference>,
}

impl ImageInfo {
    /// Borrowing view of this info ready for serialization.
    ///
    /// `base_uri` is the service base without a trailing slash; the encoded
    /// identifier is appended to form `@id`.
    pub fn document<'a>(&'a self, base_uri: &str) -> InfoDocument<'a> {
        let mut profile = Vec::with_capacity(self.profiles.len() + 1);
        profile.push(ProfileEntry::Compliance(self.compliance.uri()));
        profile.extend(self.profiles.iter().map(ProfileEntry::Profile));

        let service = match self.services.as_slice() {
            [] => None,
            [one] => Some(ServiceField::One(one)),
            many => Some(ServiceField::Many(many)),
        };

        InfoDocument {
            context: IMAGE_CONTEXT,
            id: format!(
                "{}/{}",
                base_uri.trim_end_matches('/'),
                encode_identifier(&self.identifier)
            ),
            protocol: IMAGE_PROTOCOL,
            width: self.width,
            height: self.height,
            sizes: &self.sizes,
            tiles: &self.tiles,
            profile,
            service,
        }
    }
}

/// The info.json document. Field order here is the order on the wire.
#[derive(Debug, Serialize)]
pub struct InfoDocument<'a> {
    #[serde(rename = "@context")]
    pub context: &'static str,

    #[serde(rename = "@id")]
    pub id: String,

    pub protocol: &'static str,
    pub width: u32,
    pub height: u32,

    #[serde(skip_serializing_if = "<[SizeInfo]>::is_empty")]
    pub sizes: &'a [SizeInfo],

    #[serde(skip_serializing_if = "<[TileInfo]>::is_empty")]
    pub tiles: &'a [TileInfo],

    pub profile: Vec<ProfileEntry<'a>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceField<'a>>,
}

/// One element of the `profile` array.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ProfileEntry<'a> {
    Compliance(&'static str),
    Profile(&'a ImageServerProfile),
}

/// `service` is a single object or an array of them.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ServiceField<'a> {
    One(&'a ServiceReference),
    Many(&'a [ServiceReference]),
}
