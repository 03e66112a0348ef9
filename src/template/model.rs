use chrono::{DateTime, Utc};
use rand::Rng;

use crate::foundation::core::FrameColor;
use crate::foundation::error::{FrameitError, FrameitResult};

/// Prefix of generated frame ids.
pub const FRAME_ID_PREFIX: &str = "frame_";

const FRAME_ID_RANDOM_LEN: usize = 9;
const FRAME_ID_MAX_LEN: usize = 64;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A saved, shareable frame configuration.
///
/// Field names serialize in camelCase so stored records stay compatible with the web client.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameTemplate {
    pub frame_id: String,
    /// Owner.
    pub user_id: String,
    /// Frame overlay, as a data URL or a path under the assets root.
    pub image_url: String,
    #[serde(default)]
    pub frame_color: FrameColor,
    /// HTML fragment from the caption editor.
    #[serde(default)]
    pub caption: String,
    #[serde(default = "default_template_name")]
    pub template_name: String,
    /// Full vanity host, e.g. `summer.vercel.app`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_path: Option<String>,
    /// Suggested photo scale in percent.
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Suggested photo rotation in degrees.
    #[serde(default)]
    pub rotate: f64,
    pub created_at: DateTime<Utc>,
}

fn default_template_name() -> String {
    TemplateDraft::DEFAULT_NAME.to_owned()
}

fn default_scale() -> f64 {
    100.0
}

impl FrameTemplate {
    /// Check the invariants a record must satisfy before it is stored.
    pub fn validate(&self) -> FrameitResult<()> {
        validate_frame_id(&self.frame_id)?;
        if self.user_id.trim().is_empty() {
            return Err(FrameitError::validation("template owner must be non-empty"));
        }
        if self.image_url.trim().is_empty() {
            return Err(FrameitError::validation("template image url must be non-empty"));
        }
        if !self.scale.is_finite() || !self.rotate.is_finite() {
            return Err(FrameitError::validation(
                "template scale and rotate must be finite",
            ));
        }
        Ok(())
    }

    pub fn share_url(&self, opts: &ShareOpts) -> String {
        share_url(&self.frame_id, self.custom_path.as_deref(), opts)
    }
}

/// What a user submits when sharing an edited frame; unset fields take defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TemplateDraft {
    /// Id of the template being re-shared, `None` for a new one.
    pub frame_id: Option<String>,
    pub image_url: String,
    pub frame_color: Option<FrameColor>,
    pub caption: String,
    pub template_name: Option<String>,
    /// Vanity subdomain segment, without the domain.
    pub custom_path: Option<String>,
    pub scale: Option<f64>,
    pub rotate: Option<f64>,
}

impl TemplateDraft {
    pub const DEFAULT_NAME: &'static str = "name";

    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            ..Self::default()
        }
    }

    pub fn with_frame_id(mut self, frame_id: impl Into<String>) -> Self {
        self.frame_id = Some(frame_id.into());
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    pub fn with_frame_color(mut self, color: FrameColor) -> Self {
        self.frame_color = Some(color);
        self
    }

    pub fn with_template_name(mut self, name: impl Into<String>) -> Self {
        self.template_name = Some(name.into());
        self
    }

    pub fn with_custom_path(mut self, segment: impl Into<String>) -> Self {
        self.custom_path = Some(segment.into());
        self
    }

    pub fn with_placement(mut self, scale: f64, rotate: f64) -> Self {
        self.scale = Some(scale);
        self.rotate = Some(rotate);
        self
    }
}

/// Frame ids are 1-64 characters of `[A-Za-z0-9_-]`.
pub fn validate_frame_id(id: &str) -> FrameitResult<()> {
    if id.is_empty() || id.len() > FRAME_ID_MAX_LEN {
        return Err(FrameitError::validation(format!(
            "frame id must be 1..={FRAME_ID_MAX_LEN} characters"
        )));
    }
    if !id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    {
        return Err(FrameitError::validation(format!(
            "frame id '{id}' may only contain ASCII letters, digits, '_' and '-'"
        )));
    }
    Ok(())
}

/// A fresh `frame_` + 9 base36 characters id.
pub fn generate_frame_id() -> String {
    generate_frame_id_with(&mut rand::thread_rng())
}

pub fn generate_frame_id_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut id = String::with_capacity(FRAME_ID_PREFIX.len() + FRAME_ID_RANDOM_LEN);
    id.push_str(FRAME_ID_PREFIX);
    for _ in 0..FRAME_ID_RANDOM_LEN {
        id.push(char::from(BASE36[rng.gen_range(0..BASE36.len())]));
    }
    id
}

/// A vanity subdomain segment must be a single DNS label.
pub fn validate_custom_path(segment: &str) -> FrameitResult<()> {
    let ok = !segment.is_empty()
        && segment.len() <= 63
        && !segment.starts_with('-')
        && !segment.ends_with('-')
        && segment
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if !ok {
        return Err(FrameitError::validation(format!(
            "custom path '{segment}' must be 1-63 lowercase letters, digits or inner '-'"
        )));
    }
    Ok(())
}

/// Where share links point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareOpts {
    /// Scheme and host of the app, used when a template has no vanity host.
    pub origin: String,
    pub vanity_domain: String,
}

impl Default for ShareOpts {
    fn default() -> Self {
        Self {
            origin: "http://localhost:3000".to_owned(),
            vanity_domain: "vercel.app".to_owned(),
        }
    }
}

impl ShareOpts {
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn with_vanity_domain(mut self, domain: impl Into<String>) -> Self {
        self.vanity_domain = domain.into();
        self
    }

    /// `<segment>.<vanity_domain>`.
    pub fn vanity_host(&self, segment: &str) -> String {
        format!("{segment}.{}", self.vanity_domain)
    }
}

/// `https://<vanity host>/user/<id>` or `<origin>/user/<id>`.
pub fn share_url(frame_id: &str, vanity_host: Option<&str>, opts: &ShareOpts) -> String {
    match vanity_host.map(str::trim).filter(|h| !h.is_empty()) {
        Some(host) => format!("https://{host}/user/{frame_id}"),
        None => format!("{}/user/{frame_id}", opts.origin.trim_end_matches('/')),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/model.rs"]
mod tests;
