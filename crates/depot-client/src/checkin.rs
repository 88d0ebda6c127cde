//! Checkin engine: publish a directory tree under a label.
//!
//! A staged pipeline with bounded hand-off queues overlaps filesystem I/O
//! with network I/O:
//!
//! ```text
//! walk ──▶ digest ──▶ manifest (own connection: SET manifest, SET_LABEL)
//!               └────▶ upload   (own connection: SET per file)
//! ```
//!
//! The digest stage fans out each file task to both the manifest and upload
//! stages. Upload and manifest run concurrently on independent connections;
//! their completion order is not guaranteed, and the manifest may legally
//! reference an object whose `SET` has not yet landed on the other
//! connection. The one ordering that matters (the manifest blob is stored
//! before the label points at it) falls out of the manifest stage issuing
//! both requests sequentially on its own connection.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use depot_types::{validate_label_name, Manifest, ObjectHash};
use sha2::{Digest, Sha256};
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tokio::task;
use walkdir::WalkDir;

use crate::connection::StoreClient;
use crate::error::{ClientError, ClientResult};
use crate::paths;
use crate::session::Session;
use crate::QUEUE_DEPTH;

/// Read buffer for streaming file content through the hash function.
const DIGEST_BUF: usize = 64 * 1024;

/// One in-flight unit of pipeline work.
#[derive(Clone, Debug)]
struct Task {
    path: PathBuf,
    key: String,
    is_dir: bool,
    digest: Option<ObjectHash>,
}

/// Check in the tree rooted at `root` under `label`.
///
/// Returns the content hash of the committed manifest. Per-file read
/// failures are logged and skipped; connection-level failures abort the
/// whole invocation with no label committed.
pub async fn checkin(session: &Session, root: &Path, label: &str) -> ClientResult<ObjectHash> {
    validate_label_name(label)?;
    let root = tokio::fs::canonicalize(root).await?;
    tracing::info!(root = %root.display(), label, "checkin starting");

    // Dial both connections before spawning anything so a dial failure
    // aborts the invocation up front.
    let manifest_conn = StoreClient::connect(session).await?;
    let upload_conn = StoreClient::connect(session).await?;

    let abort = Arc::new(AtomicBool::new(false));
    let (digest_tx, digest_rx) = mpsc::channel(QUEUE_DEPTH);
    let (manifest_tx, manifest_rx) = mpsc::channel(QUEUE_DEPTH);
    let (upload_tx, upload_rx) = mpsc::channel(QUEUE_DEPTH);

    let walker = {
        let root = root.clone();
        let abort = Arc::clone(&abort);
        task::spawn_blocking(move || walk_stage(&root, digest_tx, &abort))
    };
    let digester = tokio::spawn(digest_stage(
        digest_rx,
        manifest_tx,
        upload_tx,
        Arc::clone(&abort),
    ));
    let uploader = tokio::spawn(upload_stage(upload_conn, upload_rx));
    let committer = tokio::spawn(manifest_stage(
        manifest_conn,
        manifest_rx,
        label.to_string(),
        Arc::clone(&abort),
    ));

    // Fan-in: the checkin is complete only when every stage has terminated.
    // Join everything before propagating any error so no stage is left
    // detached.
    let walked = walker.await?;
    let digested = digester.await?;
    let uploaded = uploader.await?;
    let committed = committer.await?;

    walked?;
    digested?;
    uploaded?;
    committed
}

/// Stage 1: enumerate every path under the root (root itself excluded) in
/// traversal order and feed the digest queue.
fn walk_stage(root: &Path, tx: mpsc::Sender<Task>, abort: &AtomicBool) -> ClientResult<()> {
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                abort.store(true, Ordering::SeqCst);
                return Err(e.into());
            }
        };
        let key = match paths::manifest_key(root, entry.path()) {
            Ok(key) => key,
            Err(e) => {
                abort.store(true, Ordering::SeqCst);
                return Err(e);
            }
        };
        let task = Task {
            is_dir: entry.file_type().is_dir(),
            path: entry.into_path(),
            key,
            digest: None,
        };
        if tx.blocking_send(task).is_err() {
            // The digest stage is gone; its own error surfaces at fan-in.
            break;
        }
    }
    Ok(())
}

/// Stage 2: digest file content, forwarding directories to manifest only and
/// digested files to both manifest and upload.
async fn digest_stage(
    mut rx: mpsc::Receiver<Task>,
    manifest_tx: mpsc::Sender<Task>,
    upload_tx: mpsc::Sender<Task>,
    abort: Arc<AtomicBool>,
) -> ClientResult<()> {
    while let Some(mut task) = rx.recv().await {
        if task.is_dir {
            if manifest_tx.send(task).await.is_err() {
                abort.store(true, Ordering::SeqCst);
                return Err(ClientError::Aborted);
            }
            continue;
        }
        match digest_file(&task.path).await {
            Ok(digest) => {
                tracing::debug!(
                    path = %task.path.display(),
                    digest = %digest.short_hex(),
                    "digested"
                );
                task.digest = Some(digest);
            }
            Err(e) => {
                tracing::warn!(path = %task.path.display(), error = %e, "skipping unreadable file");
                continue;
            }
        }
        if manifest_tx.send(task.clone()).await.is_err() || upload_tx.send(task).await.is_err() {
            abort.store(true, Ordering::SeqCst);
            return Err(ClientError::Aborted);
        }
    }
    // Dropping the senders closes both downstream queues.
    Ok(())
}

async fn digest_file(path: &Path) -> ClientResult<ObjectHash> {
    let mut file = File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; DIGEST_BUF];
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(ObjectHash::from_digest(hasher.finalize().into()))
}

/// Stage 3: `SET` each digested file on its own connection, streaming the
/// file's current on-disk content (re-opened, not the digest stage's handle).
async fn upload_stage(mut conn: StoreClient, mut rx: mpsc::Receiver<Task>) -> ClientResult<()> {
    while let Some(task) = rx.recv().await {
        let Some(digest) = task.digest else { continue };
        let mut file = match File::open(&task.path).await {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %task.path.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };
        let size = match file.metadata().await {
            Ok(meta) => meta.len(),
            Err(e) => {
                tracing::warn!(path = %task.path.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };
        conn.set_stream(&digest, &mut file, size).await?;
        tracing::debug!(path = %task.path.display(), size, "uploaded");
    }
    Ok(())
}

/// Stage 4: accumulate the manifest, then commit it and bind the label on
/// one connection.
async fn manifest_stage(
    mut conn: StoreClient,
    mut rx: mpsc::Receiver<Task>,
    label: String,
    abort: Arc<AtomicBool>,
) -> ClientResult<ObjectHash> {
    let mut manifest = Manifest::new();
    while let Some(task) = rx.recv().await {
        match &task.digest {
            Some(digest) => manifest.insert_file(task.key, digest),
            None => manifest.insert_dir(task.key),
        }
    }
    // The input queue closed. If an upstream stage died, nothing may be
    // committed: a partial manifest must never reach a label.
    if abort.load(Ordering::SeqCst) {
        return Err(ClientError::Aborted);
    }
    let encoded = manifest.to_bytes()?;
    let hash = ObjectHash::of(&encoded);
    conn.set_bytes(&hash, &encoded).await?;
    conn.set_label(&label, &hash).await?;
    tracing::info!(
        label,
        manifest = %hash.short_hex(),
        entries = manifest.len(),
        "manifest committed"
    );
    Ok(hash)
}
