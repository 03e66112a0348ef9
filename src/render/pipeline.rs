use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::assets::decode::{PreparedImage, decode_layer};
use crate::assets::source::ImageSource;
use crate::edit::FrameEdit;
use crate::export::encode::{EncodedImage, ExportFormat, encode_surface, export_file_name};
use crate::export::target::{Delivery, DownloadTarget};
use crate::foundation::error::{FrameitError, FrameitResult};
use crate::render::compositor::{CompositeInput, CompositorOpts, RasterSurface, composite};
use crate::render::transform::resolve_user_transform;

/// Options for a full decode, composite and encode run.
#[derive(Clone, Debug)]
pub struct ExportOpts {
    pub compositor: CompositorOpts,
    pub format: ExportFormat,
    /// Directory relative image paths resolve against.
    pub assets_root: PathBuf,
}

impl Default for ExportOpts {
    fn default() -> Self {
        Self {
            compositor: CompositorOpts::default(),
            format: ExportFormat::Png,
            assets_root: PathBuf::from("."),
        }
    }
}

impl ExportOpts {
    /// Defaults with the compositor's environment overrides applied.
    pub fn from_env() -> Self {
        Self {
            compositor: CompositorOpts::from_env(),
            ..Self::default()
        }
    }

    pub fn with_compositor(mut self, compositor: CompositorOpts) -> Self {
        self.compositor = compositor;
        self
    }

    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_assets_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.assets_root = root.into();
        self
    }
}

/// Both layers of an edit, decoded.
#[derive(Clone, Debug)]
pub struct DecodedLayers {
    pub user_image: Option<PreparedImage>,
    pub overlay: PreparedImage,
}

/// Decode the user photo and the frame overlay concurrently.
///
/// Both decodes are joined before returning. The first failure (photo before overlay) is
/// reported as a single [`FrameitError::Decode`] naming the layer.
#[tracing::instrument(skip(edit, opts), fields(photo = edit.customization.user_image.is_some()))]
pub fn decode_layers(edit: &FrameEdit, opts: &ExportOpts) -> FrameitResult<DecodedLayers> {
    let size = opts.compositor.output_size();
    let root = opts.assets_root.as_path();

    let (photo, overlay) = rayon::join(
        || {
            edit.customization
                .user_image
                .as_ref()
                .map(|src| decode_source("user photo", src, root, size))
                .transpose()
        },
        || decode_source("frame overlay", &edit.overlay, root, size),
    );

    Ok(DecodedLayers {
        user_image: photo?,
        overlay: overlay?,
    })
}

fn decode_source(
    layer: &str,
    src: &ImageSource,
    root: &Path,
    svg_size: u32,
) -> FrameitResult<PreparedImage> {
    let decoded = src.load(root).and_then(|bytes| decode_layer(&bytes, svg_size));
    match decoded {
        Ok(img) => {
            tracing::debug!(layer, width = img.width(), height = img.height(), "decoded layer");
            Ok(img)
        }
        Err(e) => {
            let detail = match e {
                FrameitError::Decode(m) | FrameitError::Validation(m) => m,
                other => other.to_string(),
            };
            Err(FrameitError::decode(format!(
                "{layer} ({}): {detail}",
                src.describe()
            )))
        }
    }
}

/// Decode and composite an edit at the configured output size.
///
/// Nothing is drawn unless both layers decoded.
#[tracing::instrument(skip(edit, opts))]
pub fn render_frame(edit: &FrameEdit, opts: &ExportOpts) -> FrameitResult<RasterSurface> {
    edit.customization.validate()?;
    let geometry = opts.compositor.geometry()?;
    let layers = decode_layers(edit, opts)?;
    let user_transform = resolve_user_transform(geometry, &edit.customization.placement);
    composite(&CompositeInput {
        frame_color: edit.frame_color,
        user_image: layers.user_image.as_ref(),
        user_transform,
        overlay: &layers.overlay,
    })
}

/// An encoded export and the name it should be saved under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub image: EncodedImage,
}

/// Render and encode an edit without delivering it anywhere.
pub fn export_frame(
    edit: &FrameEdit,
    opts: &ExportOpts,
    now: DateTime<Utc>,
) -> FrameitResult<ExportArtifact> {
    let file_name = export_file_name(edit.frame_id.as_deref(), opts.format, now)?;
    let surface = render_frame(edit, opts)?;
    let image = encode_surface(&surface, opts.format)?;
    Ok(ExportArtifact { file_name, image })
}

/// Render, encode and hand the result to `target`.
#[tracing::instrument(skip(edit, opts, target), fields(frame_id = ?edit.frame_id))]
pub fn download_frame(
    edit: &FrameEdit,
    opts: &ExportOpts,
    now: DateTime<Utc>,
    target: &mut dyn DownloadTarget,
) -> FrameitResult<Delivery> {
    let artifact = export_frame(edit, opts, now)?;
    let delivery = target.deliver(&artifact.file_name, &artifact.image)?;
    tracing::info!(file = %delivery.file_name, bytes = delivery.bytes, "frame exported");
    Ok(delivery)
}
