use std::path::{Path, PathBuf};

use tokio::fs::{self, File};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{StoreError, StoreResult};

/// Number of leading key bytes consumed by the shard directories.
pub const SHARD_PREFIX_LEN: usize = 2;

/// Content-addressed blob storage: one file per object.
///
/// Objects are keyed by their content hash. The first two key bytes select a
/// two-level shard directory (hex-named), bounding per-directory fan-out as
/// the object population grows; the remaining bytes, hex-encoded, name the
/// file:
///
/// ```text
/// <root>/<hex(key[0])>/<hex(key[1])>/<hex(key[2..])>
/// ```
///
/// Keys shorter than the shard prefix are rejected with
/// [`StoreError::InvalidKey`] on every operation.
pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    /// Open a store rooted at `root`, creating the directory if missing.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// The root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &[u8]) -> StoreResult<PathBuf> {
        if key.len() <= SHARD_PREFIX_LEN {
            return Err(StoreError::InvalidKey { len: key.len() });
        }
        Ok(self
            .root
            .join(format!("{:02x}", key[0]))
            .join(format!("{:02x}", key[1]))
            .join(hex::encode(&key[SHARD_PREFIX_LEN..])))
    }

    /// Write exactly `size` bytes from `reader` as the object for `key`,
    /// creating missing shard directories.
    ///
    /// Overwriting an existing object is permitted: content addressing makes
    /// an equal-key write byte-identical, so the rewrite is a no-op in
    /// effect. A reader that ends early is an error — a partial object must
    /// never pass for a complete one.
    pub async fn put<R>(&self, key: &[u8], reader: &mut R, size: u64) -> StoreResult<()>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut file = File::create(&path).await?;
        let mut body = reader.take(size);
        let copied = tokio::io::copy(&mut body, &mut file).await?;
        if copied != size {
            return Err(StoreError::TruncatedObject {
                expected: size,
                actual: copied,
            });
        }
        file.flush().await?;
        tracing::debug!(key = %hex::encode(key), size, "stored object");
        Ok(())
    }

    /// Open the object file for `key`, returning the handle and its size.
    ///
    /// Useful when the caller must know the size before consuming the bytes
    /// (e.g. to write a length-prefixed response header).
    pub async fn open_object(&self, key: &[u8]) -> StoreResult<(File, u64)> {
        let path = self.object_path(key)?;
        let file = File::open(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::ObjectNotFound(hex::encode(key))
            } else {
                StoreError::Io(e)
            }
        })?;
        let size = file.metadata().await?.len();
        Ok((file, size))
    }

    /// Stream the full stored blob for `key` into `writer`, returning the
    /// number of bytes written.
    ///
    /// The count reflects what was actually on disk during the copy, not the
    /// size observed at open time: a concurrent equal-hash rewrite may change
    /// the file length between the two.
    pub async fn get<W>(&self, key: &[u8], writer: &mut W) -> StoreResult<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let (mut file, _) = self.open_object(key).await?;
        let copied = tokio::io::copy(&mut file, writer).await?;
        Ok(copied)
    }

    /// Whether an object file is present for `key`.
    pub async fn exists(&self, key: &[u8]) -> StoreResult<bool> {
        let path = self.object_path(key)?;
        match fs::metadata(&path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}
