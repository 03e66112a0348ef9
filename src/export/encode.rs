use std::io::Cursor;

use chrono::{DateTime, Utc};

use crate::foundation::error::{FrameitError, FrameitResult};
use crate::render::compositor::RasterSurface;
use crate::template::model::validate_frame_id;

/// Encoded output format of an export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Png,
    /// Baseline JPEG; quality in `1..=100`.
    Jpeg { quality: u8 },
}

impl ExportFormat {
    pub const DEFAULT_JPEG_QUALITY: u8 = 95;

    pub fn jpeg(quality: u8) -> FrameitResult<Self> {
        if !(1..=100).contains(&quality) {
            return Err(FrameitError::validation(format!(
                "jpeg quality must be in 1..=100, got {quality}"
            )));
        }
        Ok(Self::Jpeg { quality })
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg { .. } => "jpg",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg { .. } => "image/jpeg",
        }
    }
}

/// Encoded bytes of an exported frame, ready to be handed to a download target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedImage {
    pub format: ExportFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// Serialize a composited surface.
///
/// JPEG has no alpha channel, so translucent pixels are flattened onto black.
#[tracing::instrument(skip(surface), fields(width = surface.width, height = surface.height))]
pub fn encode_surface(
    surface: &RasterSurface,
    format: ExportFormat,
) -> FrameitResult<EncodedImage> {
    let bytes = match format {
        ExportFormat::Png => {
            encode_png_rgba8(surface.width, surface.height, surface.to_straight_rgba8())?
        }
        ExportFormat::Jpeg { quality } => encode_jpeg_rgb8(
            surface.width,
            surface.height,
            surface.to_premul_rgb8(),
            quality,
        )?,
    };
    tracing::debug!(bytes = bytes.len(), format = format.extension(), "encoded frame");
    Ok(EncodedImage {
        format,
        width: surface.width,
        height: surface.height,
        bytes,
    })
}

pub fn encode_png_rgba8(
    width: u32,
    height: u32,
    straight_rgba: Vec<u8>,
) -> FrameitResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(width, height, straight_rgba)
        .ok_or_else(|| FrameitError::encode("rgba buffer does not match surface size"))?;
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| FrameitError::encode(format!("png encoding failed: {e}")))?;
    non_empty(buf)
}

pub fn encode_jpeg_rgb8(
    width: u32,
    height: u32,
    rgb: Vec<u8>,
    quality: u8,
) -> FrameitResult<Vec<u8>> {
    let img = image::RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| FrameitError::encode("rgb buffer does not match surface size"))?;
    let mut buf = Vec::new();
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    image::DynamicImage::ImageRgb8(img)
        .write_with_encoder(encoder)
        .map_err(|e| FrameitError::encode(format!("jpeg encoding failed: {e}")))?;
    non_empty(buf)
}

fn non_empty(buf: Vec<u8>) -> FrameitResult<Vec<u8>> {
    if buf.is_empty() {
        return Err(FrameitError::encode("encoder produced no data"));
    }
    Ok(buf)
}

/// Deterministic download name.
///
/// `frameit-<frameId>.<ext>` for a shared template, `frameit-<unix-millis>.<ext>` for a plain
/// editor download.
pub fn export_file_name(
    frame_id: Option<&str>,
    format: ExportFormat,
    now: DateTime<Utc>,
) -> FrameitResult<String> {
    let ext = format.extension();
    match frame_id {
        Some(id) => {
            validate_frame_id(id)?;
            Ok(format!("frameit-{id}.{ext}"))
        }
        None => Ok(format!("frameit-{}.{ext}", now.timestamp_millis())),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/encode.rs"]
mod tests;
