//! Per-connection request dispatch.
//!
//! A handler reads one full request, performs the store operation, writes the
//! response, and loops until the client closes the connection. Recoverable
//! conditions (missing object, bad label name) are reported with an in-band
//! status and the connection keeps serving; anything that leaves the stream
//! position untrustworthy (bad size field, failure mid-body) reports a status
//! when possible and then drops the connection.

use std::net::SocketAddr;
use std::sync::Arc;

use depot_protocol::{wire, Opcode, ProtocolError, Status, WireLimits};
use depot_store::{Depot, StoreError};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use crate::error::ServerResult;

/// Entry point spawned per accepted connection.
pub async fn handle_connection(
    depot: Arc<Depot>,
    limits: WireLimits,
    stream: TcpStream,
    peer: SocketAddr,
) {
    let (mut reader, mut writer) = stream.into_split();
    match serve_connection(&depot, limits, &mut reader, &mut writer).await {
        Ok(()) => tracing::info!(%peer, "connection closed"),
        Err(e) => tracing::warn!(%peer, error = %e, "connection terminated"),
    }
}

/// Request/response loop over any byte stream (split out for testing).
pub async fn serve_connection<R, W>(
    depot: &Depot,
    limits: WireLimits,
    reader: &mut R,
    writer: &mut W,
) -> ServerResult<()>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    while let Some(opcode) = wire::read_opcode(reader).await? {
        tracing::debug!(op = %opcode, "request");
        match opcode {
            Opcode::Set => op_set(depot, limits, reader, writer).await?,
            Opcode::Get => op_get(depot, reader, writer).await?,
            Opcode::Exists => op_exists(depot, reader, writer).await?,
            Opcode::SetLabel => op_set_label(depot, limits, reader, writer).await?,
            Opcode::GetLabel => op_get_label(depot, limits, reader, writer).await?,
        }
    }
    Ok(())
}

async fn op_set<R, W>(
    depot: &Depot,
    limits: WireLimits,
    reader: &mut R,
    writer: &mut W,
) -> ServerResult<()>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let hash = wire::read_hash(reader).await?;
    let size = match wire::read_size(reader, limits.max_object_size).await {
        Ok(size) => size,
        Err(e) => return reject_size(writer, e).await,
    };
    match depot.objects().put(hash.as_bytes(), reader, size).await {
        Ok(()) => {
            wire::write_status(writer, Status::Ok).await?;
            Ok(())
        }
        Err(e @ StoreError::TruncatedObject { .. }) => {
            // Client hung up mid-body; nothing left to respond to.
            Err(e.into())
        }
        Err(e) => {
            // The body may be partially consumed; the stream position is no
            // longer trustworthy.
            tracing::error!(hash = %hash.short_hex(), error = %e, "SET failed");
            let _ = wire::write_status(writer, Status::ServerError).await;
            Err(e.into())
        }
    }
}

async fn op_get<R, W>(depot: &Depot, reader: &mut R, writer: &mut W) -> ServerResult<()>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let hash = wire::read_hash(reader).await?;
    match depot.objects().open_object(hash.as_bytes()).await {
        Ok((mut file, size)) => {
            wire::write_status(writer, Status::Ok).await?;
            wire::write_size(writer, size).await?;
            let copied = tokio::io::copy(&mut file, writer).await?;
            if copied != size {
                // Size header already sent; the response is unsalvageable.
                return Err(ProtocolError::Truncated {
                    expected: size,
                    actual: copied,
                }
                .into());
            }
            Ok(())
        }
        Err(StoreError::ObjectNotFound(_)) => {
            wire::write_status(writer, Status::NotFound).await?;
            Ok(())
        }
        Err(e) => {
            tracing::error!(hash = %hash.short_hex(), error = %e, "GET failed");
            wire::write_status(writer, Status::ServerError).await?;
            Ok(())
        }
    }
}

async fn op_exists<R, W>(depot: &Depot, reader: &mut R, writer: &mut W) -> ServerResult<()>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let hash = wire::read_hash(reader).await?;
    match depot.objects().exists(hash.as_bytes()).await {
        Ok(present) => {
            wire::write_status(writer, Status::Ok).await?;
            tokio::io::AsyncWriteExt::write_u8(writer, present as u8).await?;
            Ok(())
        }
        Err(e) => {
            tracing::error!(hash = %hash.short_hex(), error = %e, "EXISTS failed");
            wire::write_status(writer, Status::ServerError).await?;
            Ok(())
        }
    }
}

async fn op_set_label<R, W>(
    depot: &Depot,
    limits: WireLimits,
    reader: &mut R,
    writer: &mut W,
) -> ServerResult<()>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let hash = wire::read_hash(reader).await?;
    let name = match wire::read_label(reader, limits.max_label_len).await {
        Ok(name) => name,
        Err(e @ ProtocolError::InvalidUtf8(_)) => {
            // The payload was fully consumed; the stream is still in sync.
            wire::write_status(writer, Status::InvalidRequest).await?;
            tracing::warn!(error = %e, "SET_LABEL rejected");
            return Ok(());
        }
        Err(e) => return reject_size(writer, e).await,
    };
    match depot.labels().set(&name, &hash).await {
        Ok(()) => {
            wire::write_status(writer, Status::Ok).await?;
            Ok(())
        }
        Err(StoreError::InvalidLabel(e)) => {
            wire::write_status(writer, Status::InvalidRequest).await?;
            tracing::warn!(label = name, error = %e, "SET_LABEL rejected");
            Ok(())
        }
        Err(e) => {
            tracing::error!(label = name, error = %e, "SET_LABEL failed");
            wire::write_status(writer, Status::ServerError).await?;
            Ok(())
        }
    }
}

async fn op_get_label<R, W>(
    depot: &Depot,
    limits: WireLimits,
    reader: &mut R,
    writer: &mut W,
) -> ServerResult<()>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let name = match wire::read_label(reader, limits.max_label_len).await {
        Ok(name) => name,
        Err(e @ ProtocolError::InvalidUtf8(_)) => {
            wire::write_status(writer, Status::InvalidRequest).await?;
            tracing::warn!(error = %e, "GET_LABEL rejected");
            return Ok(());
        }
        Err(e) => return reject_size(writer, e).await,
    };
    match depot.labels().get(&name).await {
        Ok(hash) => {
            wire::write_status(writer, Status::Ok).await?;
            wire::write_hash(writer, &hash).await?;
            Ok(())
        }
        Err(StoreError::LabelNotFound(_)) => {
            wire::write_status(writer, Status::NotFound).await?;
            Ok(())
        }
        Err(StoreError::InvalidLabel(e)) => {
            wire::write_status(writer, Status::InvalidRequest).await?;
            tracing::warn!(label = name, error = %e, "GET_LABEL rejected");
            Ok(())
        }
        Err(e) => {
            tracing::error!(label = name, error = %e, "GET_LABEL failed");
            wire::write_status(writer, Status::ServerError).await?;
            Ok(())
        }
    }
}

/// Report a bad size field and drop the connection: the declared length is
/// untrustworthy, so the stream cannot be resynchronized past the payload.
async fn reject_size<W>(writer: &mut W, e: ProtocolError) -> ServerResult<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    if matches!(
        e,
        ProtocolError::NegativeSize(_) | ProtocolError::PayloadTooLarge { .. }
    ) {
        let _ = wire::write_status(writer, Status::InvalidRequest).await;
    }
    Err(e.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_types::ObjectHash;
    use tempfile::tempdir;
    use tokio::io::AsyncWriteExt;

    /// Run one scripted connection: feed `request` bytes, collect the full
    /// response, return it along with the handler result.
    async fn exchange(depot: &Depot, request: &[u8]) -> (ServerResult<()>, Vec<u8>) {
        let mut reader = request;
        let mut response = Vec::new();
        let result =
            serve_connection(depot, WireLimits::default(), &mut reader, &mut response).await;
        (result, response)
    }

    async fn open_depot(dir: &tempfile::TempDir) -> Depot {
        Depot::open(dir.path()).await.unwrap()
    }

    async fn set_request(hash: &ObjectHash, content: &[u8]) -> Vec<u8> {
        let mut req = Vec::new();
        wire::write_opcode(&mut req, Opcode::Set).await.unwrap();
        wire::write_hash(&mut req, hash).await.unwrap();
        wire::write_size(&mut req, content.len() as u64)
            .await
            .unwrap();
        req.write_all(content).await.unwrap();
        req
    }

    #[tokio::test]
    async fn set_then_get_roundtrip() {
        let dir = tempdir().unwrap();
        let depot = open_depot(&dir).await;
        let hash = ObjectHash::of(b"payload");

        let (result, response) = exchange(&depot, &set_request(&hash, b"payload").await).await;
        result.unwrap();
        assert_eq!(response, [Status::Ok as u8]);

        let mut req = Vec::new();
        wire::write_opcode(&mut req, Opcode::Get).await.unwrap();
        wire::write_hash(&mut req, &hash).await.unwrap();
        let (result, response) = exchange(&depot, &req).await;
        result.unwrap();

        let mut resp = response.as_slice();
        assert_eq!(wire::read_status(&mut resp).await.unwrap(), Status::Ok);
        let size = wire::read_size(&mut resp, u64::MAX).await.unwrap();
        assert_eq!(size, 7);
        assert_eq!(resp, b"payload");
    }

    #[tokio::test]
    async fn get_unknown_hash_is_not_found() {
        let dir = tempdir().unwrap();
        let depot = open_depot(&dir).await;

        let mut req = Vec::new();
        wire::write_opcode(&mut req, Opcode::Get).await.unwrap();
        wire::write_hash(&mut req, &ObjectHash::of(b"missing"))
            .await
            .unwrap();
        let (result, response) = exchange(&depot, &req).await;
        result.unwrap();
        // Status only, no size or payload bytes.
        assert_eq!(response, [Status::NotFound as u8]);
    }

    #[tokio::test]
    async fn exists_reports_presence() {
        let dir = tempdir().unwrap();
        let depot = open_depot(&dir).await;
        let hash = ObjectHash::of(b"thing");

        let mut req = Vec::new();
        wire::write_opcode(&mut req, Opcode::Exists).await.unwrap();
        wire::write_hash(&mut req, &hash).await.unwrap();
        let (result, response) = exchange(&depot, &req).await;
        result.unwrap();
        assert_eq!(response, [Status::Ok as u8, 0]);

        exchange(&depot, &set_request(&hash, b"thing").await)
            .await
            .0
            .unwrap();

        let mut req = Vec::new();
        wire::write_opcode(&mut req, Opcode::Exists).await.unwrap();
        wire::write_hash(&mut req, &hash).await.unwrap();
        let (result, response) = exchange(&depot, &req).await;
        result.unwrap();
        assert_eq!(response, [Status::Ok as u8, 1]);
    }

    #[tokio::test]
    async fn label_roundtrip_and_overwrite() {
        let dir = tempdir().unwrap();
        let depot = open_depot(&dir).await;
        let first = ObjectHash::of(b"m1");
        let second = ObjectHash::of(b"m2");

        for hash in [&first, &second] {
            let mut req = Vec::new();
            wire::write_opcode(&mut req, Opcode::SetLabel).await.unwrap();
            wire::write_hash(&mut req, hash).await.unwrap();
            wire::write_label(&mut req, "v1").await.unwrap();
            let (result, response) = exchange(&depot, &req).await;
            result.unwrap();
            assert_eq!(response, [Status::Ok as u8]);
        }

        let mut req = Vec::new();
        wire::write_opcode(&mut req, Opcode::GetLabel).await.unwrap();
        wire::write_label(&mut req, "v1").await.unwrap();
        let (result, response) = exchange(&depot, &req).await;
        result.unwrap();

        let mut resp = response.as_slice();
        assert_eq!(wire::read_status(&mut resp).await.unwrap(), Status::Ok);
        assert_eq!(wire::read_hash(&mut resp).await.unwrap(), second);
    }

    #[tokio::test]
    async fn unknown_label_is_not_found() {
        let dir = tempdir().unwrap();
        let depot = open_depot(&dir).await;

        let mut req = Vec::new();
        wire::write_opcode(&mut req, Opcode::GetLabel).await.unwrap();
        wire::write_label(&mut req, "never-set").await.unwrap();
        let (result, response) = exchange(&depot, &req).await;
        result.unwrap();
        assert_eq!(response, [Status::NotFound as u8]);
    }

    #[tokio::test]
    async fn bad_label_name_is_invalid_request() {
        let dir = tempdir().unwrap();
        let depot = open_depot(&dir).await;

        let mut req = Vec::new();
        wire::write_opcode(&mut req, Opcode::SetLabel).await.unwrap();
        wire::write_hash(&mut req, &ObjectHash::of(b"m")).await.unwrap();
        wire::write_label(&mut req, "../escape").await.unwrap();
        let (result, response) = exchange(&depot, &req).await;
        // Connection survives: the payload was consumed cleanly.
        result.unwrap();
        assert_eq!(response, [Status::InvalidRequest as u8]);
    }

    #[tokio::test]
    async fn negative_size_kills_connection() {
        let dir = tempdir().unwrap();
        let depot = open_depot(&dir).await;

        let mut req = Vec::new();
        wire::write_opcode(&mut req, Opcode::Set).await.unwrap();
        wire::write_hash(&mut req, &ObjectHash::of(b"x")).await.unwrap();
        req.extend_from_slice(&(-1i64).to_le_bytes());
        let (result, response) = exchange(&depot, &req).await;
        assert!(result.is_err());
        assert_eq!(response, [Status::InvalidRequest as u8]);
    }

    #[tokio::test]
    async fn oversized_label_kills_connection() {
        let dir = tempdir().unwrap();
        let depot = open_depot(&dir).await;

        let mut req = Vec::new();
        wire::write_opcode(&mut req, Opcode::GetLabel).await.unwrap();
        wire::write_size(&mut req, 1 << 40).await.unwrap();
        let (result, response) = exchange(&depot, &req).await;
        assert!(result.is_err());
        assert_eq!(response, [Status::InvalidRequest as u8]);
    }

    #[tokio::test]
    async fn unknown_opcode_kills_connection() {
        let dir = tempdir().unwrap();
        let depot = open_depot(&dir).await;
        let (result, response) = exchange(&depot, &[42]).await;
        assert!(result.is_err());
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn truncated_set_body_kills_connection() {
        let dir = tempdir().unwrap();
        let depot = open_depot(&dir).await;
        let hash = ObjectHash::of(b"full body");

        let mut req = Vec::new();
        wire::write_opcode(&mut req, Opcode::Set).await.unwrap();
        wire::write_hash(&mut req, &hash).await.unwrap();
        wire::write_size(&mut req, 100).await.unwrap();
        req.extend_from_slice(b"only a few bytes");
        let (result, _) = exchange(&depot, &req).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn requests_are_sequential_on_one_connection() {
        let dir = tempdir().unwrap();
        let depot = open_depot(&dir).await;
        let a = ObjectHash::of(b"aaa");
        let b = ObjectHash::of(b"bbb");

        let mut req = set_request(&a, b"aaa").await;
        req.extend(set_request(&b, b"bbb").await);
        let (result, response) = exchange(&depot, &req).await;
        result.unwrap();
        assert_eq!(response, [Status::Ok as u8, Status::Ok as u8]);
        assert!(depot.objects().exists(a.as_bytes()).await.unwrap());
        assert!(depot.objects().exists(b.as_bytes()).await.unwrap());
    }
}
