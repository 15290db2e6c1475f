//! Request path grammar.
//!
//! Parses the percent-encoded request path into typed requests and renders
//! typed requests back into canonical paths:
//!
//! ```text
//! /{identifier}/{region}/{size}/{rotation}/{quality}.{format}
//! /{identifier}/info.json
//! ```
//!
//! The path is split on `/` before any decoding, so an identifier containing an
//! encoded slash (`%2F`) stays a single segment.

use std::str::FromStr;

use crate::error::{IiifError, Parameter};

use super::types::{Format, ImageRequest, InfoFormat, InfoRequest, Quality, Region, Rotation, Size};

/// Name of the info document segment.
pub const INFO_SEGMENT: &str = "info.json";

// =============================================================================
// Path handling
// =============================================================================

/// Check that `path` only contains characters allowed in a percent-encoded
/// URI path, and that every `%` starts a two-digit hex escape.
pub fn is_valid_encoded_path(path: &str) -> bool {
    let bytes = path.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'%' {
            if i + 2 >= bytes.len() {
                return false;
            }
            if !bytes[i + 1].is_ascii_hexdigit() || !bytes[i + 2].is_ascii_hexdigit() {
                return false;
            }
            i += 3;
            continue;
        }
        let allowed = b.is_ascii_alphanumeric()
            || matches!(
                b,
                b'-' | b'.'
                    | b'_'
                    | b'~'
                    | b'!'
                    | b'$'
                    | b'&'
                    | b'\''
                    | b'('
                    | b')'
                    | b'*'
                    | b'+'
                    | b','
                    | b';'
                    | b'='
                    | b':'
                    | b'@'
                    | b'/'
            );
        if !allowed {
            return false;
        }
        i += 1;
    }
    true
}

/// Split a raw path into percent-decoded segments.
fn decode_segments(path: &str) -> Result<Vec<String>, IiifError> {
    let malformed = || IiifError::MalformedPath {
        path: path.to_string(),
    };

    if !is_valid_encoded_path(path) {
        return Err(malformed());
    }

    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return Err(malformed());
    }

    trimmed
        .split('/')
        .map(|segment| {
            urlencoding::decode(segment)
                .map(|s| s.into_owned())
                .map_err(|_| malformed())
        })
        .collect()
}

fn identifier_from(segment: String, path: &str) -> Result<String, IiifError> {
    if segment.is_empty() {
        return Err(IiifError::MalformedPath {
            path: path.to_string(),
        });
    }
    Ok(segment)
}

/// Number of raw `/`-separated segments in `path`, ignoring one leading slash.
pub fn segment_count(path: &str) -> usize {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        0
    } else {
        trimmed.split('/').count()
    }
}

// =============================================================================
// Request parsing
// =============================================================================

/// Parse `/{identifier}/info.json`.
pub fn parse_info_request(path: &str) -> Result<InfoRequest, IiifError> {
    let segments = decode_segments(path)?;
    let [identifier, info]: [String; 2] =
        segments
            .try_into()
            .map_err(|_| IiifError::MalformedPath {
                path: path.to_string(),
            })?;

    if info.is_empty() {
        return Err(IiifError::MalformedPath {
            path: path.to_string(),
        });
    }
    if info != INFO_SEGMENT {
        return Err(IiifError::UnsupportedInfoFormat { value: info });
    }

    Ok(InfoRequest {
        identifier: identifier_from(identifier, path)?,
        format: InfoFormat::Json,
    })
}

/// Parse `/{identifier}/{region}/{size}/{rotation}/{quality}.{format}`.
pub fn parse_image_request(path: &str) -> Result<ImageRequest, IiifError> {
    let segments = decode_segments(path)?;
    let [identifier, region, size, rotation, quality_format]: [String; 5] = segments
        .try_into()
        .map_err(|_| IiifError::MalformedPath {
            path: path.to_string(),
        })?;

    let identifier = identifier_from(identifier, path)?;
    let region = parse_region(&region)?;
    let size = parse_size(&size)?;
    let rotation = parse_rotation(&rotation)?;

    let (quality, format) =
        quality_format
            .rsplit_once('.')
            .ok_or_else(|| IiifError::MalformedPath {
                path: path.to_string(),
            })?;
    let quality = parse_quality(quality)?;
    let format = parse_format(format)?;

    Ok(ImageRequest {
        identifier,
        region,
        size,
        rotation,
        quality,
        format,
    })
}

// =============================================================================
// Parameter parsing
// =============================================================================

fn parse_number<T: FromStr>(s: &str, parameter: Parameter, raw: &str) -> Result<T, IiifError> {
    s.parse().map_err(|_| IiifError::MalformedNumber {
        parameter,
        value: raw.to_string(),
    })
}

fn parse_float(s: &str, parameter: Parameter, raw: &str) -> Result<f64, IiifError> {
    let value: f64 = parse_number(s, parameter, raw)?;
    if !value.is_finite() {
        return Err(IiifError::MalformedNumber {
            parameter,
            value: raw.to_string(),
        });
    }
    Ok(value)
}

/// Parse exactly `N` comma-separated fields with `parse`, or fail with `arity`.
fn parse_fields<T, const N: usize>(
    s: &str,
    arity: impl Fn() -> IiifError,
    parse: impl Fn(&str) -> Result<T, IiifError>,
) -> Result<[T; N], IiifError> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != N {
        return Err(arity());
    }
    let values = parts
        .into_iter()
        .map(parse)
        .collect::<Result<Vec<T>, IiifError>>()?;
    values.try_into().map_err(|_| arity())
}

/// Parse a region token: `full`, `pct:x,y,w,h` or `x,y,w,h`.
pub fn parse_region(s: &str) -> Result<Region, IiifError> {
    let malformed = || IiifError::MalformedRegion {
        value: s.to_string(),
    };

    if s == "full" {
        return Ok(Region::Full);
    }

    if let Some(rest) = s.strip_prefix("pct:") {
        let [x, y, width, height] =
            parse_fields(rest, malformed, |p| parse_float(p, Parameter::Region, s))?;
        let in_range = [x, y, width, height]
            .iter()
            .all(|v| (0.0..=100.0).contains(v));
        if !in_range || width <= 0.0 || height <= 0.0 {
            return Err(malformed());
        }
        return Ok(Region::Percentage {
            x,
            y,
            width,
            height,
        });
    }

    let [x, y, width, height] = parse_fields(s, malformed, |p| {
        parse_number::<u32>(p, Parameter::Region, s)
    })?;
    if width == 0 || height == 0 {
        return Err(malformed());
    }
    Ok(Region::Absolute {
        x,
        y,
        width,
        height,
    })
}

/// Parse a size token.
///
/// Forms are tested in order: `full`, `w,`, `,h`, `pct:n`, `!w,h`, `w,h`.
pub fn parse_size(s: &str) -> Result<Size, IiifError> {
    let malformed = || IiifError::MalformedSize {
        value: s.to_string(),
    };
    let dimension = |p: &str| -> Result<u32, IiifError> {
        let value: u32 = parse_number(p, Parameter::Size, s)?;
        if value == 0 {
            return Err(malformed());
        }
        Ok(value)
    };

    if s == "full" {
        return Ok(Size::Full);
    }

    if let Some(width) = s.strip_suffix(',') {
        return Ok(Size::ExactWidth {
            width: dimension(width)?,
        });
    }

    if let Some(height) = s.strip_prefix(',') {
        return Ok(Size::ExactHeight {
            height: dimension(height)?,
        });
    }

    if let Some(percent) = s.strip_prefix("pct:") {
        let percent = parse_float(percent, Parameter::Size, s)?;
        if percent <= 0.0 {
            return Err(malformed());
        }
        return Ok(Size::Percentage { percent });
    }

    if let Some(rest) = s.strip_prefix('!') {
        let [width, height] = parse_fields(rest, malformed, dimension)?;
        return Ok(Size::BestFit { width, height });
    }

    let [width, height] = parse_fields(s, malformed, dimension)?;
    Ok(Size::Exact { width, height })
}

/// Parse a rotation token: optional `!` followed by an angle in `[0, 360]`.
pub fn parse_rotation(s: &str) -> Result<Rotation, IiifError> {
    let (mirrored, angle) = match s.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let angle = parse_float(angle, Parameter::Rotation, s)?;
    if !(0.0..=360.0).contains(&angle) {
        return Err(IiifError::MalformedRotation {
            value: s.to_string(),
        });
    }

    Ok(Rotation { angle, mirrored })
}

pub fn parse_quality(s: &str) -> Result<Quality, IiifError> {
    Quality::from_keyword(s).ok_or_else(|| IiifError::UnsupportedQuality {
        value: s.to_string(),
    })
}

pub fn parse_format(s: &str) -> Result<Format, IiifError> {
    Format::from_extension(s).ok_or_else(|| IiifError::UnsupportedFormat {
        value: s.to_string(),
    })
}

// =============================================================================
// Canonical rendering
// =============================================================================

/// Percent-encode an identifier into a single path segment.
///
/// `/` is written as `%2f` so the identifier never introduces a segment boundary.
pub fn encode_identifier(identifier: &str) -> String {
    urlencoding::encode(identifier).replace("%2F", "%2f")
}

/// Render an image request as its canonical path (inverse of [`parse_image_request`]).
pub fn format_image_request(request: &ImageRequest) -> String {
    format!(
        "/{}/{}/{}/{}/{}.{}",
        encode_identifier(&request.identifier),
        request.region,
        request.size,
        request.rotation,
        request.quality,
        request.format
    )
}

/// Render an info request as its canonical path (inverse of [`parse_info_request`]).
pub fn format_info_request(request: &InfoRequest) -> String {
    format!("/{}/{}", encode_identifier(&request.identifier), INFO_SEGMENT)
}
