use crate::foundation::core::{Affine, Point, Rect, Vec2};
use crate::foundation::error::{FrameitError, FrameitResult};

/// Sizes of the on-screen editing canvas and of the exported image, both square.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanvasGeometry {
    preview_size: u32,
    output_size: u32,
}

impl CanvasGeometry {
    pub const DEFAULT_PREVIEW_SIZE: u32 = 600;
    pub const DEFAULT_OUTPUT_SIZE: u32 = 1200;

    pub fn new(preview_size: u32, output_size: u32) -> FrameitResult<Self> {
        if preview_size == 0 || output_size == 0 {
            return Err(FrameitError::validation(
                "preview and output canvas sizes must be > 0",
            ));
        }
        Ok(Self {
            preview_size,
            output_size,
        })
    }

    pub fn preview_size(self) -> u32 {
        self.preview_size
    }

    pub fn output_size(self) -> u32 {
        self.output_size
    }

    /// Factor converting preview-space distances into output-space distances.
    pub fn preview_to_output(self) -> f64 {
        f64::from(self.output_size) / f64::from(self.preview_size)
    }
}

impl Default for CanvasGeometry {
    fn default() -> Self {
        Self {
            preview_size: Self::DEFAULT_PREVIEW_SIZE,
            output_size: Self::DEFAULT_OUTPUT_SIZE,
        }
    }
}

/// Where the user put their photo, expressed the way the editor UI reports it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoPlacement {
    /// Uniform scale in percent; the editor offers `50..=150`.
    pub scale_percent: f64,
    /// Clockwise rotation in degrees; the editor offers `0..=360`.
    pub rotate_degrees: f64,
    /// Drag offset in preview-space pixels.
    pub offset: Vec2,
}

impl Default for PhotoPlacement {
    fn default() -> Self {
        Self {
            scale_percent: 100.0,
            rotate_degrees: 0.0,
            offset: Vec2::ZERO,
        }
    }
}

/// Output-space placement of the user photo.
///
/// The photo is first stretched onto the square `[-S/2, S/2]` (S = output size), then moved by
/// [`UserTransform::affine`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UserTransform {
    affine: Affine,
    output_size: u32,
}

impl UserTransform {
    /// Centered, unscaled, unrotated placement.
    pub fn centered(geometry: CanvasGeometry) -> Self {
        resolve_user_transform(geometry, &PhotoPlacement::default())
    }

    /// Maps photo-local coordinates (origin at the photo center) into output space.
    pub fn affine(&self) -> Affine {
        self.affine
    }

    pub fn output_size(&self) -> u32 {
        self.output_size
    }

    /// Local rectangle the photo is stretched onto before the transform applies.
    pub fn draw_rect(&self) -> Rect {
        let half = f64::from(self.output_size) / 2.0;
        Rect::new(-half, -half, half, half)
    }

    /// Maps source pixel coordinates of a `src_w` x `src_h` image into output space.
    pub fn image_transform(&self, src_w: u32, src_h: u32) -> Affine {
        let r = self.draw_rect();
        let sx = r.width() / f64::from(src_w.max(1));
        let sy = r.height() / f64::from(src_h.max(1));
        self.affine * Affine::translate((r.x0, r.y0)) * Affine::scale_non_uniform(sx, sy)
    }

    pub fn map_point(&self, p: Point) -> Point {
        self.affine * p
    }
}

/// Resolve an editor placement into an output-space transform.
///
/// Composition order is fixed: translate to the output center, translate by the scaled offset,
/// rotate, then scale. Inputs are not clamped.
pub fn resolve_user_transform(
    geometry: CanvasGeometry,
    placement: &PhotoPlacement,
) -> UserTransform {
    let size = f64::from(geometry.output_size());
    let center = Vec2::new(size / 2.0, size / 2.0);
    let offset = placement.offset * geometry.preview_to_output();
    let radians = placement.rotate_degrees * std::f64::consts::PI / 180.0;
    let scale = placement.scale_percent / 100.0;

    let affine = Affine::translate(center)
        * Affine::translate(offset)
        * Affine::rotate(radians)
        * Affine::scale(scale);

    UserTransform {
        affine,
        output_size: geometry.output_size(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/transform.rs"]
mod tests;
