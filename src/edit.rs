//! The frame currently being edited, passed explicitly into the render pipeline.

use std::ops::RangeInclusive;

use crate::assets::source::ImageSource;
use crate::foundation::core::{FrameColor, Vec2};
use crate::foundation::error::{FrameitError, FrameitResult};
use crate::render::transform::PhotoPlacement;
use crate::template::model::{FrameTemplate, validate_frame_id};

/// Scale slider range, in percent.
pub const SCALE_RANGE: RangeInclusive<f64> = 50.0..=150.0;
/// Rotation slider range, in degrees.
pub const ROTATE_RANGE: RangeInclusive<f64> = 0.0..=360.0;

/// The user's photo and how they placed it. Lives for one editing session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserCustomization {
    pub user_image: Option<ImageSource>,
    pub placement: PhotoPlacement,
}

impl UserCustomization {
    /// Enforce the editor's slider ranges.
    ///
    /// The transform resolver itself never clamps, so this is the check for callers that accept
    /// placements from outside the editor.
    pub fn validate(&self) -> FrameitResult<()> {
        let p = &self.placement;
        if !SCALE_RANGE.contains(&p.scale_percent) {
            return Err(FrameitError::validation(format!(
                "scale must be within {}..={} percent, got {}",
                SCALE_RANGE.start(),
                SCALE_RANGE.end(),
                p.scale_percent
            )));
        }
        if !ROTATE_RANGE.contains(&p.rotate_degrees) {
            return Err(FrameitError::validation(format!(
                "rotation must be within {}..={} degrees, got {}",
                ROTATE_RANGE.start(),
                ROTATE_RANGE.end(),
                p.rotate_degrees
            )));
        }
        if !(p.offset.x.is_finite() && p.offset.y.is_finite()) {
            return Err(FrameitError::validation("photo offset must be finite"));
        }
        Ok(())
    }
}

/// Everything needed to render one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameEdit {
    /// Set when editing a shared template; drives the export file name.
    pub frame_id: Option<String>,
    pub frame_color: FrameColor,
    pub overlay: ImageSource,
    pub caption: String,
    pub customization: UserCustomization,
}

impl FrameEdit {
    pub fn new(overlay: ImageSource) -> Self {
        Self {
            frame_id: None,
            frame_color: FrameColor::DEFAULT,
            overlay,
            caption: String::new(),
            customization: UserCustomization::default(),
        }
    }

    /// Start editing a shared template with its suggested placement and no photo yet.
    pub fn from_template(template: &FrameTemplate) -> FrameitResult<Self> {
        validate_frame_id(&template.frame_id)?;
        Ok(Self {
            frame_id: Some(template.frame_id.clone()),
            frame_color: template.frame_color,
            overlay: ImageSource::parse(&template.image_url)?,
            caption: template.caption.clone(),
            customization: UserCustomization {
                user_image: None,
                placement: PhotoPlacement {
                    scale_percent: template.scale,
                    rotate_degrees: template.rotate,
                    offset: Vec2::ZERO,
                },
            },
        })
    }

    pub fn with_photo(mut self, photo: ImageSource) -> Self {
        self.customization.user_image = Some(photo);
        self
    }

    pub fn with_placement(mut self, placement: PhotoPlacement) -> Self {
        self.customization.placement = placement;
        self
    }

    pub fn with_frame_color(mut self, color: FrameColor) -> Self {
        self.frame_color = color;
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }
}

#[cfg(test)]
#[path = "../tests/unit/edit/edit.rs"]
mod tests;
