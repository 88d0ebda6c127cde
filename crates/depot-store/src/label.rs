use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use depot_types::{validate_label_name, ObjectHash};
use tokio::fs;

use crate::error::{StoreError, StoreResult};

/// Mutable label storage: one file per label, content = hex of the bound
/// hash.
///
/// Labels live in their own directory, fully separate from the object shard
/// tree, so a label name can never collide with an object path. A label write
/// replaces any prior binding (last write wins) and is atomic from a reader's
/// point of view: the new value is written to a temporary file and renamed
/// into place, so a concurrent read sees either the old binding or the new
/// one, never a torn write.
pub struct LabelStore {
    root: PathBuf,
    tmp_seq: AtomicU64,
}

impl LabelStore {
    /// Open a label store rooted at `root`, creating the directory if
    /// missing.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            tmp_seq: AtomicU64::new(0),
        })
    }

    /// The root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn label_path(&self, name: &str) -> StoreResult<PathBuf> {
        validate_label_name(name)?;
        Ok(self.root.join(name))
    }

    /// Durably bind `name` to `hash`, replacing any prior binding.
    pub async fn set(&self, name: &str, hash: &ObjectHash) -> StoreResult<()> {
        let path = self.label_path(name)?;
        // Unique temp name per write so concurrent writers to the same label
        // cannot interleave on the staging file; the final rename decides who
        // wins.
        let seq = self.tmp_seq.fetch_add(1, Ordering::Relaxed);
        let tmp = self
            .root
            .join(format!(".tmp.{}.{}", std::process::id(), seq));
        fs::write(&tmp, hash.to_hex()).await?;
        fs::rename(&tmp, &path).await?;
        tracing::debug!(label = name, hash = %hash.short_hex(), "label set");
        Ok(())
    }

    /// Resolve `name` to the most recently bound hash.
    pub async fn get(&self, name: &str) -> StoreResult<ObjectHash> {
        let path = self.label_path(name)?;
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::LabelNotFound(name.to_string()));
            }
            Err(e) => return Err(StoreError::Io(e)),
        };
        ObjectHash::from_hex(content.trim_end()).map_err(|e| StoreError::CorruptLabel {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }
}
