//! Checkout engine: materialize a labeled tree snapshot.
//!
//! Two stages: resolve the label and fetch the manifest, then download every
//! referenced object into the destination. The download stage reuses the
//! resolve connection — requests on it stay strictly sequential, which is
//! all the protocol requires.

use std::path::{Path, PathBuf};

use depot_types::{validate_label_name, Manifest, ObjectHash};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use crate::connection::StoreClient;
use crate::error::{ClientError, ClientResult};
use crate::paths;
use crate::session::Session;
use crate::QUEUE_DEPTH;

/// One file to download: manifest key plus decoded content hash.
#[derive(Debug)]
struct DownloadTask {
    key: String,
    hash: ObjectHash,
}

/// Check out the tree bound to `label` into `dest`, creating `dest` if
/// missing.
///
/// A connection-level failure aborts the invocation and may leave a
/// partially populated destination; nothing is rolled back or resumed.
pub async fn checkout(session: &Session, dest: &Path, label: &str) -> ClientResult<()> {
    validate_label_name(label)?;
    fs::create_dir_all(dest).await?;

    let mut conn = StoreClient::connect(session).await?;
    let manifest_hash = conn.get_label(label).await?;
    let encoded = conn
        .get_bytes(&manifest_hash, session.limits.max_manifest_size)
        .await?;
    let manifest = Manifest::from_bytes(&encoded)?;
    tracing::info!(
        label,
        manifest = %manifest_hash.short_hex(),
        entries = manifest.len(),
        "checkout starting"
    );

    // Directory entries carry no content; recreate them directly so empty
    // directories survive the round trip.
    for key in manifest.dir_entries() {
        fs::create_dir_all(paths::dest_path(dest, &key)?).await?;
    }

    let (download_tx, download_rx) = mpsc::channel(QUEUE_DEPTH);
    let downloader = tokio::spawn(download_stage(conn, download_rx, dest.to_path_buf()));

    let mut fed = Ok(());
    for (key, hash) in manifest.file_entries()? {
        if download_tx.send(DownloadTask { key, hash }).await.is_err() {
            fed = Err(ClientError::Aborted);
            break;
        }
    }
    drop(download_tx);

    // The download stage's own error is the interesting one when both fail.
    downloader.await??;
    fed
}

async fn download_stage(
    mut conn: StoreClient,
    mut rx: mpsc::Receiver<DownloadTask>,
    dest: PathBuf,
) -> ClientResult<()> {
    while let Some(task) = rx.recv().await {
        let path = paths::dest_path(&dest, &task.key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut file = File::create(&path).await?;
        let size = conn.get_to_writer(&task.hash, &mut file).await?;
        file.flush().await?;
        tracing::debug!(path = %path.display(), size, "downloaded");
    }
    Ok(())
}
