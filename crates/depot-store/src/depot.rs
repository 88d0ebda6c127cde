use std::path::{Path, PathBuf};

use crate::error::StoreResult;
use crate::label::LabelStore;
use crate::object::ObjectStore;

/// Directory name for object storage under a depot root.
pub const OBJECTS_DIR: &str = "objects";
/// Directory name for label storage under a depot root.
pub const LABELS_DIR: &str = "labels";

/// A depot root: the object store and label store that live under it.
///
/// Layout on disk:
///
/// ```text
/// <root>/objects/<shard>/<shard>/<object-file>
/// <root>/labels/<label-name>
/// ```
pub struct Depot {
    root: PathBuf,
    objects: ObjectStore,
    labels: LabelStore,
}

impl Depot {
    /// Open (creating if necessary) both stores under `root`.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        let objects = ObjectStore::open(root.join(OBJECTS_DIR)).await?;
        let labels = LabelStore::open(root.join(LABELS_DIR)).await?;
        Ok(Self {
            root,
            objects,
            labels,
        })
    }

    /// The depot root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The object store under this root.
    pub fn objects(&self) -> &ObjectStore {
        &self.objects
    }

    /// The label store under this root.
    pub fn labels(&self) -> &LabelStore {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_types::ObjectHash;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_both_namespaces() {
        let dir = tempdir().unwrap();
        let depot = Depot::open(dir.path()).await.unwrap();
        assert!(depot.root().join(OBJECTS_DIR).is_dir());
        assert!(depot.root().join(LABELS_DIR).is_dir());
    }

    #[tokio::test]
    async fn namespaces_are_independent() {
        let dir = tempdir().unwrap();
        let depot = Depot::open(dir.path()).await.unwrap();

        let hash = ObjectHash::of(b"blob");
        let mut reader: &[u8] = b"blob";
        depot
            .objects()
            .put(hash.as_bytes(), &mut reader, 4)
            .await
            .unwrap();
        depot.labels().set("v1", &hash).await.unwrap();

        // The label file is not an object and vice versa.
        assert!(depot.root().join(LABELS_DIR).join("v1").is_file());
        assert!(depot.objects().exists(hash.as_bytes()).await.unwrap());
    }
}
