//! Geometry resolution.
//!
//! Turns a requested [`Region`] and [`Size`] into absolute pixel values against
//! the true image dimensions. All arithmetic truncates toward zero at each
//! integer step; the best-fit correction depends on that ordering, so the
//! results are pinned by literal width/height tables in the tests below.

use super::types::{Region, Size};

/// Absolute crop rectangle and output size for one request.
///
/// `width`/`height` are `None` when the request leaves that dimension to be
/// derived proportionally by the backend (`w,` and `,h` sizes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedGeometry {
    /// True width of the source image
    pub image_width: u32,

    /// True height of the source image
    pub image_height: u32,

    pub crop_x: u32,
    pub crop_y: u32,
    pub crop_width: u32,
    pub crop_height: u32,

    /// Output width in pixels
    pub width: Option<u32>,

    /// Output height in pixels
    pub height: Option<u32>,
}

/// Resolve a region and size against an image of `image_width` x `image_height`.
///
/// Absolute regions are passed through without clipping to the image bounds.
pub fn resolve(region: &Region, size: &Size, image_width: u32, image_height: u32) -> ResolvedGeometry {
    let (crop_x, crop_y, crop_width, crop_height) =
        resolve_region(region, image_width, image_height);

    let (width, height) = resolve_size(
        size,
        crop_width,
        crop_height,
        image_width,
        image_height,
    );

    ResolvedGeometry {
        image_width,
        image_height,
        crop_x,
        crop_y,
        crop_width,
        crop_height,
        width,
        height,
    }
}

/// Crop rectangle `(x, y, width, height)` in pixels.
pub fn resolve_region(region: &Region, image_width: u32, image_height: u32) -> (u32, u32, u32, u32) {
    match *region {
        Region::Full => (0, 0, image_width, image_height),
        Region::Absolute {
            x,
            y,
            width,
            height,
        } => (x, y, width, height),
        Region::Percentage {
            x,
            y,
            width,
            height,
        } => (
            percent_of(x, image_width),
            percent_of(y, image_height),
            percent_of(width, image_width).max(1),
            percent_of(height, image_height).max(1),
        ),
    }
}

/// Output `(width, height)` for a crop of `crop_width` x `crop_height`.
pub fn resolve_size(
    size: &Size,
    crop_width: u32,
    crop_height: u32,
    image_width: u32,
    image_height: u32,
) -> (Option<u32>, Option<u32>) {
    match *size {
        // Full size is the true image size, not the crop size
        Size::Full => (Some(image_width), Some(image_height)),
        Size::Exact { width, height } => (Some(width), Some(height)),
        Size::ExactWidth { width } => (Some(width), None),
        Size::ExactHeight { height } => (None, Some(height)),
        Size::Percentage { percent } => (
            Some(percent_of(percent, crop_width).max(1)),
            Some(percent_of(percent, crop_height).max(1)),
        ),
        Size::BestFit { width, height } => {
            let (w, h) = best_fit(
                crop_width,
                crop_height,
                width,
                height,
                image_width > image_height,
            );
            (Some(w), Some(h))
        }
    }
}

fn percent_of(percent: f64, total: u32) -> u32 {
    (percent / 100.0 * total as f64) as u32
}

/// Scale `crop_width` x `crop_height` into the `box_width` x `box_height` box.
///
/// The dominant axis (taken from the true image, not the crop) is fitted first.
/// If the derived axis overshoots the box it is pinned to the box and the
/// dominant axis shrinks by the overshoot scaled back through the crop ratio.
fn best_fit(
    crop_width: u32,
    crop_height: u32,
    box_width: u32,
    box_height: u32,
    width_dominant: bool,
) -> (u32, u32) {
    let cw = crop_width.max(1) as f64;
    let ch = crop_height.max(1) as f64;

    if width_dominant {
        let mut width = box_width;
        let mut height = (ch * box_width as f64 / cw) as u32;
        if height > box_height {
            let overshoot = (height - box_height) as f64;
            width = width.saturating_sub((overshoot * cw / ch) as u32);
            height = box_height;
        }
        (width.max(1), height.max(1))
    } else {
        let mut height = box_height;
        let mut width = (cw * box_height as f64 / ch) as u32;
        if width > box_width {
            let overshoot = (width - box_width) as f64;
            height = height.saturating_sub((overshoot * ch / cw) as u32);
            width = box_width;
        }
        (width.max(1), height.max(1))
    }
}
