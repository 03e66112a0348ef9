use chrono::{DateTime, Utc};

use crate::assets::compress::{CompressOpts, compress_data_url};
use crate::foundation::error::{FrameitError, FrameitResult};
use crate::template::model::{
    FrameTemplate, ShareOpts, TemplateDraft, generate_frame_id, validate_custom_path,
    validate_frame_id,
};
use crate::template::store::{SaveOutcome, TemplateStore};

/// A stored template and the link that opens it.
#[derive(Clone, Debug, PartialEq)]
pub struct SharedTemplate {
    pub template: FrameTemplate,
    pub share_url: String,
    pub outcome: SaveOutcome,
}

/// Turn a draft into a stored template and return its share link.
///
/// A draft without a frame id gets a fresh one. Data URL images are compressed before storage;
/// if compression fails the original image is stored. `createdAt` is set to `now` on every share,
/// including re-shares.
#[tracing::instrument(skip(store, draft, share, compress), fields(frame_id = ?draft.frame_id))]
pub fn share_template(
    store: &mut dyn TemplateStore,
    owner: &str,
    draft: TemplateDraft,
    share: &ShareOpts,
    compress: &CompressOpts,
    now: DateTime<Utc>,
) -> FrameitResult<SharedTemplate> {
    if owner.trim().is_empty() {
        return Err(FrameitError::validation("sharing requires a signed-in owner"));
    }
    let frame_id = match draft.frame_id {
        Some(id) => {
            validate_frame_id(&id)?;
            id
        }
        None => generate_frame_id(),
    };
    let custom_path = match draft
        .custom_path
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        Some(segment) => {
            validate_custom_path(segment)?;
            Some(share.vanity_host(segment))
        }
        None => None,
    };

    let image_url = match compress_data_url(&draft.image_url, compress) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(error = %e, "image compression failed, storing original");
            draft.image_url
        }
    };

    let template = FrameTemplate {
        frame_id,
        user_id: owner.to_owned(),
        image_url,
        frame_color: draft.frame_color.unwrap_or_default(),
        caption: draft.caption,
        template_name: draft
            .template_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| TemplateDraft::DEFAULT_NAME.to_owned()),
        custom_path,
        scale: draft.scale.unwrap_or(100.0),
        rotate: draft.rotate.unwrap_or(0.0),
        created_at: now,
    };

    let outcome = store.save(template.clone())?;
    let share_url = template.share_url(share);
    tracing::info!(frame_id = %template.frame_id, url = %share_url, "template shared");
    Ok(SharedTemplate {
        template,
        share_url,
        outcome,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/template/share.rs"]
mod tests;
