//! FrameIt puts a user's photo inside a decorative frame.
//!
//! The core is a set of pure functions plus a small template store:
//!
//! - Resolve an editor placement into an output-space transform ([`resolve_user_transform`])
//! - Composite background color, photo and frame overlay ([`composite`])
//! - Encode the result and hand it to a [`DownloadTarget`] ([`download_frame`])
//! - Format caption HTML as styled Unicode text ([`format_caption`])
//! - Share templates through a [`TemplateStore`] capped per owner ([`share_template`])
#![forbid(unsafe_code)]

pub mod assets;
pub mod caption;
pub mod edit;
pub mod export;
pub mod foundation;
pub mod render;
pub mod template;

pub use crate::foundation::core::{Affine, Canvas, FrameColor, Point, Rect, Vec2};
pub use crate::foundation::error::{FrameitError, FrameitResult};

pub use crate::assets::compress::{CompressOpts, compress_data_url};
pub use crate::assets::decode::{PreparedImage, decode_layer};
pub use crate::assets::source::ImageSource;
pub use crate::caption::format::format_caption;
pub use crate::edit::{FrameEdit, UserCustomization};
pub use crate::export::encode::{EncodedImage, ExportFormat, encode_surface, export_file_name};
pub use crate::export::target::{Delivery, DirectoryTarget, DownloadTarget, InMemoryTarget};
pub use crate::render::compositor::{CompositeInput, CompositorOpts, RasterSurface, composite};
pub use crate::render::pipeline::{
    ExportArtifact, ExportOpts, download_frame, export_frame, render_frame,
};
pub use crate::render::transform::{
    CanvasGeometry, PhotoPlacement, UserTransform, resolve_user_transform,
};
pub use crate::template::model::{FrameTemplate, ShareOpts, TemplateDraft, generate_frame_id};
pub use crate::template::share::{SharedTemplate, share_template};
pub use crate::template::store::{
    InMemoryTemplateStore, JsonFileTemplateStore, SaveOutcome, StorageInfo, StoreLimits,
    TemplateStore,
};
