use std::io::Cursor;

use crate::assets::decode::looks_like_svg;
use crate::assets::source::{decode_data_url, encode_data_url};
use crate::foundation::env::{positive_u32, process_env};
use crate::foundation::error::{FrameitError, FrameitResult};

/// Downscaling applied to overlay images before they are persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompressOpts {
    pub max_width: u32,
    /// JPEG quality used for everything that is not a PNG.
    pub jpeg_quality: u8,
}

impl Default for CompressOpts {
    fn default() -> Self {
        Self {
            max_width: 800,
            jpeg_quality: 70,
        }
    }
}

impl CompressOpts {
    /// Defaults with a `FRAMEIT_COMPRESS_MAX_WIDTH` override.
    pub fn from_env() -> Self {
        Self::from_lookup(process_env)
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut opts = Self::default();
        if let Some(w) = positive_u32(&lookup, "FRAMEIT_COMPRESS_MAX_WIDTH") {
            opts.max_width = w;
        }
        opts
    }

    pub fn with_max_width(mut self, max_width: u32) -> Self {
        self.max_width = max_width.max(1);
        self
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }
}

/// Shrink an image data URL for storage.
///
/// Images wider than `max_width` are resized with their aspect ratio kept. PNG input stays PNG so
/// transparent frame windows survive; other raster formats are re-encoded as JPEG. SVG and non-data
/// sources are returned unchanged.
#[tracing::instrument(skip(url), fields(len = url.len()))]
pub fn compress_data_url(url: &str, opts: &CompressOpts) -> FrameitResult<String> {
    if !url.trim_start().starts_with("data:") {
        return Ok(url.to_owned());
    }
    let (mime, bytes) = decode_data_url(url)?;
    if mime == "image/svg+xml" || looks_like_svg(&bytes) {
        return Ok(url.to_owned());
    }

    let mut img = image::load_from_memory(&bytes)
        .map_err(|e| FrameitError::decode(format!("decode image for compression: {e}")))?;
    let (w, h) = (img.width(), img.height());
    let max_w = opts.max_width.max(1);
    if w > max_w {
        let new_h = ((u64::from(h) * u64::from(max_w)) / u64::from(w)).max(1) as u32;
        img = img.resize_exact(max_w, new_h, image::imageops::FilterType::Triangle);
    }

    let mut buf = Vec::new();
    let out_mime = if mime == "image/png" {
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .map_err(|e| FrameitError::encode(format!("png re-encode failed: {e}")))?;
        "image/png"
    } else {
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
            &mut buf,
            opts.jpeg_quality.clamp(1, 100),
        );
        image::DynamicImage::ImageRgb8(img.to_rgb8())
            .write_with_encoder(encoder)
            .map_err(|e| FrameitError::encode(format!("jpeg re-encode failed: {e}")))?;
        "image/jpeg"
    };

    let out = encode_data_url(out_mime, &buf);
    tracing::debug!(from = url.len(), to = out.len(), width = img.width(), "compressed image");
    Ok(out)
}
