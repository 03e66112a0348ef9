use std::path::{Path, PathBuf};

use crate::export::encode::EncodedImage;
use crate::foundation::error::{FrameitError, FrameitResult};

/// Outcome of handing an exported file to a [`DownloadTarget`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub file_name: String,
    /// Where the file ended up, for targets that write to disk.
    pub location: Option<PathBuf>,
    pub bytes: usize,
}

/// The "save file" side effect at the edge of an export.
///
/// Byte production happens before this trait is involved, so exports can be tested with
/// [`InMemoryTarget`] and delivered for real with [`DirectoryTarget`].
pub trait DownloadTarget {
    fn deliver(&mut self, file_name: &str, image: &EncodedImage) -> FrameitResult<Delivery>;
}

/// Writes exports into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    dir: PathBuf,
}

impl DirectoryTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadTarget for DirectoryTarget {
    #[tracing::instrument(skip(self, image), fields(dir = %self.dir.display()))]
    fn deliver(&mut self, file_name: &str, image: &EncodedImage) -> FrameitResult<Delivery> {
        check_file_name(file_name)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            FrameitError::delivery(format!(
                "create output dir '{}': {e}",
                self.dir.display()
            ))
        })?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, &image.bytes)
            .map_err(|e| FrameitError::delivery(format!("write '{}': {e}", path.display())))?;
        tracing::debug!(path = %path.display(), bytes = image.bytes.len(), "saved export");
        Ok(Delivery {
            file_name: file_name.to_owned(),
            location: Some(path),
            bytes: image.bytes.len(),
        })
    }
}

/// In-memory target for tests and previews.
#[derive(Debug, Default)]
pub struct InMemoryTarget {
    pub(crate) saved: Vec<(String, EncodedImage)>,
}

impl InMemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliveries in call order.
    pub fn saved(&self) -> &[(String, EncodedImage)] {
        &self.saved
    }
}

impl DownloadTarget for InMemoryTarget {
    fn deliver(&mut self, file_name: &str, image: &EncodedImage) -> FrameitResult<Delivery> {
        check_file_name(file_name)?;
        self.saved.push((file_name.to_owned(), image.clone()));
        Ok(Delivery {
            file_name: file_name.to_owned(),
            location: None,
            bytes: image.bytes.len(),
        })
    }
}

fn check_file_name(name: &str) -> FrameitResult<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.contains('\0')
    {
        return Err(FrameitError::delivery(format!(
            "'{name}' is not a plain file name"
        )));
    }
    Ok(())
}
