use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::foundation::core::{Affine, Canvas, FrameColor};
use crate::foundation::env::{positive_u32, process_env};
use crate::foundation::error::{FrameitError, FrameitResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::render::transform::{CanvasGeometry, UserTransform};

/// Sizing options for the compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositorOpts {
    pub(crate) output_size: u32,
    pub(crate) preview_size: u32,
}

impl Default for CompositorOpts {
    fn default() -> Self {
        Self {
            output_size: CanvasGeometry::DEFAULT_OUTPUT_SIZE,
            preview_size: CanvasGeometry::DEFAULT_PREVIEW_SIZE,
        }
    }
}

impl CompositorOpts {
    /// Defaults, with `FRAMEIT_OUTPUT_SIZE` / `FRAMEIT_PREVIEW_SIZE` overrides applied.
    pub fn from_env() -> Self {
        Self::from_lookup(process_env)
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut opts = Self::default();
        if let Some(n) = positive_u32(&lookup, "FRAMEIT_OUTPUT_SIZE") {
            opts.output_size = n;
        }
        if let Some(n) = positive_u32(&lookup, "FRAMEIT_PREVIEW_SIZE") {
            opts.preview_size = n;
        }
        opts
    }

    /// Return options with a different exported image edge length.
    pub fn with_output_size(mut self, size: u32) -> Self {
        self.output_size = size;
        self
    }

    /// Return options with a different editor preview edge length.
    pub fn with_preview_size(mut self, size: u32) -> Self {
        self.preview_size = size;
        self
    }

    pub fn output_size(&self) -> u32 {
        self.output_size
    }

    pub fn preview_size(&self) -> u32 {
        self.preview_size
    }

    /// Validated canvas geometry for these options.
    pub fn geometry(&self) -> FrameitResult<CanvasGeometry> {
        if self.output_size > u32::from(u16::MAX) {
            return Err(FrameitError::validation(format!(
                "output size {} exceeds the rasterizer limit of {}",
                self.output_size,
                u16::MAX
            )));
        }
        CanvasGeometry::new(self.preview_size, self.output_size)
    }
}

/// Everything the compositor draws, already decoded.
#[derive(Clone, Copy, Debug)]
pub struct CompositeInput<'a> {
    /// Background fill, visible wherever neither the photo nor the overlay is opaque.
    pub frame_color: FrameColor,
    pub user_image: Option<&'a PreparedImage>,
    pub user_transform: UserTransform,
    /// Decorative frame drawn edge to edge on top of everything.
    pub overlay: &'a PreparedImage,
}

/// A composited square raster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterSurface {
    pub width: u32,
    pub height: u32,
    /// Premultiplied RGBA8, row-major, tightly packed.
    pub data: Vec<u8>,
}

impl RasterSurface {
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Premultiplied RGBA8 of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha copy of the pixels, as image encoders expect.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        unpremultiply_rgba8_in_place(&mut out);
        out
    }

    /// RGB copy with alpha dropped, i.e. the surface flattened onto black.
    pub fn to_premul_rgb8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.canvas().pixel_count() * 3);
        for px in self.data.chunks_exact(4) {
            out.extend_from_slice(&px[..3]);
        }
        out
    }
}

/// Draw background color, transformed photo and frame overlay, in that order.
///
/// Pure: identical inputs produce byte-identical surfaces.
#[tracing::instrument(
    skip(input),
    fields(size = input.user_transform.output_size(), photo = input.user_image.is_some())
)]
pub fn composite(input: &CompositeInput<'_>) -> FrameitResult<RasterSurface> {
    let size = input.user_transform.output_size();
    let side: u16 = size
        .try_into()
        .map_err(|_| FrameitError::validation("output size exceeds u16"))?;
    if side == 0 {
        return Err(FrameitError::validation("output size must be > 0"));
    }
    let s = f64::from(size);

    let user_paint = input.user_image.map(image_paint).transpose()?;
    let overlay_paint = image_paint(input.overlay)?;

    let mut ctx = vello_cpu::RenderContext::new(side, side);
    ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

    let c = input.frame_color;
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, s, s));

    if let (Some(paint), Some(photo)) = (user_paint, input.user_image) {
        let tr = input
            .user_transform
            .image_transform(photo.width(), photo.height());
        ctx.set_transform(affine_to_cpu(tr));
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(photo.width()),
            f64::from(photo.height()),
        ));
    }

    let overlay = input.overlay;
    let stretch = Affine::scale_non_uniform(
        s / f64::from(overlay.width()),
        s / f64::from(overlay.height()),
    );
    ctx.set_transform(affine_to_cpu(stretch));
    ctx.set_paint(overlay_paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(overlay.width()),
        f64::from(overlay.height()),
    ));

    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(side, side);
    ctx.render_to_pixmap(&mut pixmap);

    Ok(RasterSurface {
        width: size,
        height: size,
        data: pixmap.data_as_u8_slice().to_vec(),
    })
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn image_paint(img: &PreparedImage) -> FrameitResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(img.rgba8_premul(), img.width(), img.height())?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> FrameitResult<vello_cpu::Pixmap> {
    if width == 0 || height == 0 {
        return Err(FrameitError::decode("layer has zero width or height"));
    }
    let w: u16 = width
        .try_into()
        .map_err(|_| FrameitError::decode("layer width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| FrameitError::decode("layer height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(FrameitError::decode("layer byte len mismatch"));
    }
    let mut may_have_opacities = false;
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
