//! Value types for IIIF image requests.
//!
//! Each request parameter is a closed sum type. The `Display` impls render the
//! canonical path token, so `parse(x.to_string()) == x` for every value the
//! parser can produce.

use std::fmt;

use serde::{Serialize, Serializer};

// =============================================================================
// Region
// =============================================================================

/// The rectangular portion of the source image to return.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Region {
    /// The whole image
    Full,

    /// Pixel rectangle, `x,y,w,h`
    Absolute {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// Percentages of the full image, `pct:x,y,w,h`
    Percentage {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Full => f.write_str("full"),
            Region::Absolute {
                x,
                y,
                width,
                height,
            } => write!(f, "{},{},{},{}", x, y, width, height),
            Region::Percentage {
                x,
                y,
                width,
                height,
            } => write!(f, "pct:{},{},{},{}", x, y, width, height),
        }
    }
}

// =============================================================================
// Size
// =============================================================================

/// The requested output size of the extracted region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Size {
    /// Same size as the full image
    Full,

    /// Exact `w,h`, aspect ratio not preserved
    Exact { width: u32, height: u32 },

    /// `w,` with the height derived proportionally by the backend
    ExactWidth { width: u32 },

    /// `,h` with the width derived proportionally by the backend
    ExactHeight { height: u32 },

    /// `!w,h`, largest size fitting inside the box with aspect ratio preserved
    BestFit { width: u32, height: u32 },

    /// `pct:n` of the region size
    Percentage { percent: f64 },
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Size::Full => f.write_str("full"),
            Size::Exact { width, height } => write!(f, "{},{}", width, height),
            Size::ExactWidth { width } => write!(f, "{},", width),
            Size::ExactHeight { height } => write!(f, ",{}", height),
            Size::BestFit { width, height } => write!(f, "!{},{}", width, height),
            Size::Percentage { percent } => write!(f, "pct:{}", percent),
        }
    }
}

// =============================================================================
// Rotation
// =============================================================================

/// Clockwise rotation in degrees, applied after an optional horizontal mirror.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    /// Angle in `[0, 360]`
    pub angle: f64,

    /// Mirror horizontally before rotating (`!` prefix)
    pub mirrored: bool,
}

impl Rotation {
    pub fn none() -> Self {
        Self {
            angle: 0.0,
            mirrored: false,
        }
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mirrored {
            f.write_str("!")?;
        }
        // f64 Display drops a zero fraction: 30.0 renders as "30"
        write!(f, "{}", self.angle)
    }
}

// =============================================================================
// Quality
// =============================================================================

/// Colour treatment of the output image.
///
/// `bitonal` is a valid IIIF keyword but the backend cannot produce it, so the
/// parser reports it as unsupported instead of representing it here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Quality {
    Default,
    Color,
    Gray,
}

impl Quality {
    pub const ALL: [Quality; 3] = [Quality::Default, Quality::Color, Quality::Gray];

    pub fn keyword(&self) -> &'static str {
        match self {
            Quality::Default => "default",
            Quality::Color => "color",
            Quality::Gray => "gray",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.keyword() == keyword)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

// =============================================================================
// Format
// =============================================================================

/// Output image format, identified by its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Format {
    Jpg,
    Tif,
    Png,
    Gif,
    Jp2,
    Pdf,
    Webp,
}

impl Format {
    pub const ALL: [Format; 7] = [
        Format::Jpg,
        Format::Tif,
        Format::Png,
        Format::Gif,
        Format::Jp2,
        Format::Pdf,
        Format::Webp,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            Format::Jpg => "jpg",
            Format::Tif => "tif",
            Format::Png => "png",
            Format::Gif => "gif",
            Format::Jp2 => "jp2",
            Format::Pdf => "pdf",
            Format::Webp => "webp",
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.extension() == extension)
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Format::Jpg => "image/jpeg",
            Format::Tif => "image/tiff",
            Format::Png => "image/png",
            Format::Gif => "image/gif",
            Format::Jp2 => "image/jp2",
            Format::Pdf => "application/pdf",
            Format::Webp => "image/webp",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl Serialize for Quality {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.keyword())
    }
}

impl Serialize for Format {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.extension())
    }
}

/// Format of the image information document. Only JSON exists in Image API 2.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InfoFormat {
    #[default]
    Json,
}

// =============================================================================
// Requests
// =============================================================================

/// A fully parsed image request.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    /// Decoded image identifier
    pub identifier: String,
    pub region: Region,
    pub size: Size,
    pub rotation: Rotation,
    pub quality: Quality,
    pub format: Format,
}

impl ImageRequest {
    /// Request for the whole image at full size.
    pub fn full(identifier: impl Into<String>, format: Format) -> Self {
        Self {
            identifier: identifier.into(),
            region: Region::Full,
            size: Size::Full,
            rotation: Rotation::none(),
            quality: Quality::Default,
            format,
        }
    }
}

/// A parsed request for the image information document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoRequest {
    pub identifier: String,
    pub format: InfoFormat,
}

impl InfoRequest {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            format: InfoFormat::Json,
        }
    }
}
