use std::path::Path;
use std::sync::Arc;

use base64::Engine as _;

use crate::foundation::error::{FrameitError, FrameitResult};

/// Where the encoded bytes of a layer image come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    /// `data:<mime>[;base64],<payload>` URL, as produced by browser file readers.
    DataUrl(String),
    /// Normalized path relative to the assets root.
    Path(String),
    /// Encoded bytes that were already loaded by the caller.
    Bytes(Arc<Vec<u8>>),
}

impl ImageSource {
    /// Classify a template `imageUrl` or a user photo reference.
    ///
    /// Remote URLs are rejected: fetching them is the host platform's job.
    pub fn parse(s: &str) -> FrameitResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(FrameitError::validation("image source must be non-empty"));
        }
        if s.starts_with("data:") {
            parse_data_url(s)?;
            return Ok(Self::DataUrl(s.to_owned()));
        }
        if is_remote(s) {
            return Err(FrameitError::decode(format!(
                "remote image '{s}' must be fetched by the caller before compositing"
            )));
        }
        Ok(Self::Path(normalize_rel_path(s)?))
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(Arc::new(bytes.into()))
    }

    /// Load the encoded bytes of this source.
    pub fn load(&self, assets_root: &Path) -> FrameitResult<Vec<u8>> {
        match self {
            Self::DataUrl(url) => Ok(decode_data_url(url)?.1),
            Self::Path(rel) => {
                let p = assets_root.join(Path::new(rel));
                std::fs::read(&p).map_err(|e| {
                    FrameitError::decode(format!("failed to read image '{}': {e}", p.display()))
                })
            }
            Self::Bytes(bytes) => Ok(bytes.as_ref().clone()),
        }
    }

    /// Short human-readable label for logs and error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::DataUrl(url) => match parse_data_url(url) {
                Ok(d) => format!("data URL ({}, {} chars)", d.mime, url.len()),
                Err(_) => "data URL".to_owned(),
            },
            Self::Path(p) => format!("file '{p}'"),
            Self::Bytes(b) => format!("{} in-memory bytes", b.len()),
        }
    }
}

fn is_remote(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    ["http://", "https://", "blob:", "//"]
        .iter()
        .any(|p| lower.starts_with(p))
}

/// Borrowed view of a parsed `data:` URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DataUrl<'a> {
    /// Media type, `text/plain` when the URL omits it.
    pub mime: &'a str,
    pub base64: bool,
    pub payload: &'a str,
}

pub fn parse_data_url(url: &str) -> FrameitResult<DataUrl<'_>> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| FrameitError::validation("data URL must start with 'data:'"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| FrameitError::validation("data URL is missing ',' separator"))?;

    let mut params = header.split(';');
    let mime = match params.next().map(str::trim) {
        Some("") | None => "text/plain",
        Some(m) => m,
    };
    let base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    Ok(DataUrl {
        mime,
        base64,
        payload,
    })
}

/// Decode a `data:` URL into its media type and raw bytes.
pub fn decode_data_url(url: &str) -> FrameitResult<(String, Vec<u8>)> {
    let d = parse_data_url(url)?;
    let bytes = if d.base64 {
        let cleaned: String = d
            .payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        base64::engine::general_purpose::STANDARD
            .decode(cleaned.as_bytes())
            .map_err(|e| FrameitError::decode(format!("invalid base64 in data URL: {e}")))?
    } else {
        if d.payload.contains('%') {
            return Err(FrameitError::validation(
                "percent-encoded data URLs are not supported; use ;base64",
            ));
        }
        d.payload.as_bytes().to_vec()
    };
    Ok((d.mime.to_ascii_lowercase(), bytes))
}

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

pub(crate) fn normalize_rel_path(source: &str) -> FrameitResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(FrameitError::validation("image paths must be relative"));
    }
    if s.is_empty() {
        return Err(FrameitError::validation("image path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(FrameitError::validation("image paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(FrameitError::validation(
            "image path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
