use std::sync::Arc;

use crate::foundation::error::{FrameitError, FrameitResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Largest edge the rasterizer accepts for a single layer.
pub const MAX_LAYER_DIM: u32 = u16::MAX as u32;

/// A decoded layer bitmap.
///
/// Only constructible through [`PreparedImage::from_premul`] and friends, so dimensions are always
/// non-zero and match the pixel buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedImage {
    width: u32,
    height: u32,
    rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Wrap premultiplied RGBA8 pixels, checking the buffer length.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> FrameitResult<Self> {
        check_dims(width, height)?;
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if rgba8_premul.len() != expected {
            return Err(FrameitError::decode(format!(
                "pixel buffer is {} bytes, expected {expected} for {width}x{height}",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// Build from straight-alpha RGBA8 pixels.
    pub fn from_straight(width: u32, height: u32, mut rgba8: Vec<u8>) -> FrameitResult<Self> {
        premultiply_rgba8_in_place(&mut rgba8);
        Self::from_premul(width, height, rgba8)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Premultiplied RGBA8, row-major, tightly packed.
    pub fn rgba8_premul(&self) -> &[u8] {
        &self.rgba8_premul
    }
}

/// Decode an encoded layer image.
///
/// SVG documents are rasterized to `svg_size` x `svg_size`; every other format goes through the
/// `image` crate's format sniffing.
pub fn decode_layer(bytes: &[u8], svg_size: u32) -> FrameitResult<PreparedImage> {
    if looks_like_svg(bytes) {
        let tree = parse_svg(bytes)?;
        rasterize_svg(&tree, svg_size, svg_size)
    } else {
        decode_image(bytes)
    }
}

pub fn decode_image(bytes: &[u8]) -> FrameitResult<PreparedImage> {
    if bytes.is_empty() {
        return Err(FrameitError::decode("image data is empty"));
    }
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| FrameitError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    PreparedImage::from_straight(width, height, rgba.into_raw())
}

pub fn parse_svg(bytes: &[u8]) -> FrameitResult<usvg::Tree> {
    let opts = usvg::Options::default();
    usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| FrameitError::decode(format!("parse svg tree: {e}")))
}

/// Rasterize an SVG tree stretched to exactly `width` x `height`.
pub fn rasterize_svg(tree: &usvg::Tree, width: u32, height: u32) -> FrameitResult<PreparedImage> {
    check_dims(width, height)?;
    let size = tree.size();
    if !(size.width().is_finite() && size.height().is_finite())
        || size.width() <= 0.0
        || size.height() <= 0.0
    {
        return Err(FrameitError::decode("svg has invalid width/height"));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| FrameitError::decode("failed to allocate svg pixmap"))?;
    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    PreparedImage::from_premul(width, height, pixmap.data().to_vec())
}

/// Cheap content sniff for SVG documents (optionally behind an XML prolog or BOM).
pub fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    if text.starts_with("<svg") {
        return true;
    }
    (text.starts_with("<?xml") || text.starts_with("<!DOCTYPE svg")) && text.contains("<svg")
}

fn check_dims(width: u32, height: u32) -> FrameitResult<()> {
    if width == 0 || height == 0 {
        return Err(FrameitError::decode("image has zero width or height"));
    }
    if width > MAX_LAYER_DIM || height > MAX_LAYER_DIM {
        return Err(FrameitError::decode(format!(
            "image too large: {width}x{height} (max {MAX_LAYER_DIM}x{MAX_LAYER_DIM})"
        )));
    }
    Ok(())
}
