use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::{DateTime, Utc};

use crate::foundation::env::{positive_usize, process_env};
use crate::foundation::error::{FrameitError, FrameitResult};
use crate::template::model::FrameTemplate;

/// Capacity limits of a template store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreLimits {
    pub max_templates_per_owner: usize,
    /// Budget for the serialized store, `None` for unlimited.
    pub max_bytes: Option<usize>,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            max_templates_per_owner: 10,
            max_bytes: Some(5 * 1024 * 1024),
        }
    }
}

impl StoreLimits {
    /// Defaults with `FRAMEIT_MAX_TEMPLATES` / `FRAMEIT_STORE_MAX_BYTES` overrides applied.
    pub fn from_env() -> Self {
        Self::from_lookup(process_env)
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut limits = Self::default();
        if let Some(n) = positive_usize(&lookup, "FRAMEIT_MAX_TEMPLATES") {
            limits.max_templates_per_owner = n;
        }
        if let Some(n) = positive_usize(&lookup, "FRAMEIT_STORE_MAX_BYTES") {
            limits.max_bytes = Some(n);
        }
        limits
    }

    pub fn with_max_templates_per_owner(mut self, n: usize) -> Self {
        self.max_templates_per_owner = n.max(1);
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: Option<usize>) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

/// Result of a successful save.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SaveOutcome {
    /// `true` when an existing record with the same frame id was overwritten.
    pub replaced: bool,
    /// Frame ids removed to make room, oldest first.
    pub evicted: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StorageInfo {
    pub used_bytes: usize,
    pub max_bytes: Option<usize>,
    pub templates: usize,
}

/// CRUD contract for template persistence.
///
/// Saves are upserts keyed by frame id; concurrent saves of one id are last-write-wins.
pub trait TemplateStore {
    fn save(&mut self, template: FrameTemplate) -> FrameitResult<SaveOutcome>;
    fn get(&self, frame_id: &str) -> FrameitResult<Option<FrameTemplate>>;
    /// An owner's templates, oldest first.
    fn list_by_owner(&self, user_id: &str) -> FrameitResult<Vec<FrameTemplate>>;
    fn delete(&mut self, frame_id: &str) -> FrameitResult<bool>;
    fn storage_info(&self) -> FrameitResult<StorageInfo>;
}

/// Records keyed by frame id, plus the cap and quota policy shared by every backend.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub(crate) struct TemplateTable {
    frames: BTreeMap<String, FrameTemplate>,
}

impl TemplateTable {
    /// Insert or replace `template`, evicting as the limits require.
    ///
    /// Either the whole save applies or the table is left untouched.
    pub(crate) fn upsert(
        &mut self,
        template: FrameTemplate,
        limits: &StoreLimits,
    ) -> FrameitResult<SaveOutcome> {
        template.validate()?;
        let replaced = match self.frames.get(&template.frame_id) {
            Some(existing) if existing.user_id != template.user_id => {
                return Err(FrameitError::storage(format!(
                    "frame '{}' belongs to another user",
                    template.frame_id
                )));
            }
            Some(_) => true,
            None => false,
        };

        let mut next = self.clone();
        let mut evicted = Vec::new();

        if !replaced {
            let cap = limits.max_templates_per_owner.max(1);
            let owned = next.oldest_first(|t| t.user_id == template.user_id);
            let excess = (owned.len() + 1).saturating_sub(cap);
            for id in owned.into_iter().take(excess) {
                next.frames.remove(&id);
                tracing::info!(frame_id = %id, owner = %template.user_id, "removed oldest frame");
                evicted.push(id);
            }
        }

        let frame_id = template.frame_id.clone();
        next.frames.insert(frame_id.clone(), template);

        if let Some(max) = limits.max_bytes {
            let used = next.used_bytes()?;
            if used > max {
                let others = next.oldest_first(|t| t.frame_id != frame_id);
                let n = others.len().saturating_mul(3).div_ceil(10).max(1);
                tracing::debug!(used, max, evicting = n.min(others.len()), "store over budget");
                for id in others.into_iter().take(n) {
                    next.frames.remove(&id);
                    tracing::info!(frame_id = %id, "removed frame to free storage");
                    evicted.push(id);
                }
                let used = next.used_bytes()?;
                if used > max {
                    return Err(FrameitError::quota(format!(
                        "frame '{frame_id}' needs {used} bytes of storage, budget is {max}"
                    )));
                }
            }
        }

        *self = next;
        Ok(SaveOutcome { replaced, evicted })
    }

    pub(crate) fn get(&self, frame_id: &str) -> Option<&FrameTemplate> {
        self.frames.get(frame_id)
    }

    pub(crate) fn list_by_owner(&self, user_id: &str) -> Vec<FrameTemplate> {
        let mut out: Vec<_> = self
            .frames
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            (a.created_at, &a.frame_id).cmp(&(b.created_at, &b.frame_id))
        });
        out
    }

    pub(crate) fn remove(&mut self, frame_id: &str) -> bool {
        self.frames.remove(frame_id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.frames.len()
    }

    pub(crate) fn used_bytes(&self) -> FrameitResult<usize> {
        serde_json::to_vec(self)
            .map(|v| v.len())
            .map_err(|e| FrameitError::serde(format!("measure template store: {e}")))
    }

    pub(crate) fn info(&self, limits: &StoreLimits) -> FrameitResult<StorageInfo> {
        Ok(StorageInfo {
            used_bytes: self.used_bytes()?,
            max_bytes: limits.max_bytes,
            templates: self.len(),
        })
    }

    /// Frame ids matching `keep`, oldest `createdAt` first, ties by frame id.
    fn oldest_first(&self, keep: impl Fn(&FrameTemplate) -> bool) -> Vec<String> {
        let mut rows: Vec<(DateTime<Utc>, &String)> = self
            .frames
            .values()
            .filter(|t| keep(*t))
            .map(|t| (t.created_at, &t.frame_id))
            .collect();
        rows.sort();
        rows.into_iter().map(|(_, id)| id.clone()).collect()
    }
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct InMemoryTemplateStore {
    table: TemplateTable,
    limits: StoreLimits,
}

impl InMemoryTemplateStore {
    pub fn new(limits: StoreLimits) -> Self {
        Self {
            table: TemplateTable::default(),
            limits,
        }
    }

    pub fn limits(&self) -> StoreLimits {
        self.limits
    }
}

impl TemplateStore for InMemoryTemplateStore {
    #[tracing::instrument(skip(self, template), fields(frame_id = %template.frame_id))]
    fn save(&mut self, template: FrameTemplate) -> FrameitResult<SaveOutcome> {
        self.table.upsert(template, &self.limits)
    }

    fn get(&self, frame_id: &str) -> FrameitResult<Option<FrameTemplate>> {
        Ok(self.table.get(frame_id).cloned())
    }

    fn list_by_owner(&self, user_id: &str) -> FrameitResult<Vec<FrameTemplate>> {
        Ok(self.table.list_by_owner(user_id))
    }

    fn delete(&mut self, frame_id: &str) -> FrameitResult<bool> {
        Ok(self.table.remove(frame_id))
    }

    fn storage_info(&self) -> FrameitResult<StorageInfo> {
        self.table.info(&self.limits)
    }
}

/// Store persisted as one JSON object keyed by frame id.
///
/// The file is read once on open and rewritten after every mutation.
#[derive(Debug)]
pub struct JsonFileTemplateStore {
    path: PathBuf,
    table: TemplateTable,
    limits: StoreLimits,
}

impl JsonFileTemplateStore {
    /// Open `path`, starting empty when the file does not exist.
    pub fn open(path: impl Into<PathBuf>, limits: StoreLimits) -> FrameitResult<Self> {
        let path = path.into();
        let table = match std::fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => TemplateTable::default(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                FrameitError::serde(format!("parse template store '{}': {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => TemplateTable::default(),
            Err(e) => {
                return Err(FrameitError::storage(format!(
                    "read template store '{}': {e}",
                    path.display()
                )));
            }
        };
        tracing::debug!(path = %path.display(), templates = table.len(), "opened template store");
        Ok(Self {
            path,
            table,
            limits,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, table: &TemplateTable) -> FrameitResult<()> {
        let json = serde_json::to_vec_pretty(table)
            .map_err(|e| FrameitError::serde(format!("serialize template store: {e}")))?;
        write_atomic(&self.path, &json).map_err(|e| FrameitError::storage(format!("{e:#}")))
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create store dir '{}'", parent.display()))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, bytes).with_context(|| format!("write '{}'", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("replace '{}'", path.display()))?;
    Ok(())
}

impl TemplateStore for JsonFileTemplateStore {
    #[tracing::instrument(
        skip(self, template),
        fields(frame_id = %template.frame_id, path = %self.path.display())
    )]
    fn save(&mut self, template: FrameTemplate) -> FrameitResult<SaveOutcome> {
        let mut next = self.table.clone();
        let outcome = next.upsert(template, &self.limits)?;
        self.persist(&next)?;
        self.table = next;
        Ok(outcome)
    }

    fn get(&self, frame_id: &str) -> FrameitResult<Option<FrameTemplate>> {
        Ok(self.table.get(frame_id).cloned())
    }

    fn list_by_owner(&self, user_id: &str) -> FrameitResult<Vec<FrameTemplate>> {
        Ok(self.table.list_by_owner(user_id))
    }

    fn delete(&mut self, frame_id: &str) -> FrameitResult<bool> {
        let mut next = self.table.clone();
        if !next.remove(frame_id) {
            return Ok(false);
        }
        self.persist(&next)?;
        self.table = next;
        Ok(true)
    }

    fn storage_info(&self) -> FrameitResult<StorageInfo> {
        self.table.info(&self.limits)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/store.rs"]
mod tests;
