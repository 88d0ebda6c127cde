//! Async read/write primitives for the depot wire format.
//!
//! These helpers are shared by the server's connection handler and the
//! client's request methods, so both sides frame bytes identically. Size
//! fields are little-endian signed 64-bit and are validated against a caller
//! supplied maximum before any payload allocation.

use depot_types::{ObjectHash, HASH_LEN};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{ProtocolError, ProtocolResult};
use crate::opcode::{Opcode, Status};

/// Read the opcode that starts a request.
///
/// Returns `Ok(None)` on clean end-of-stream (the peer closed between
/// requests), which is how a connection ends normally.
pub async fn read_opcode<R>(reader: &mut R) -> ProtocolResult<Option<Opcode>>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut byte = [0u8; 1];
    match reader.read(&mut byte).await? {
        0 => Ok(None),
        _ => Ok(Some(Opcode::try_from(byte[0])?)),
    }
}

pub async fn write_opcode<W>(writer: &mut W, opcode: Opcode) -> ProtocolResult<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    writer.write_u8(opcode as u8).await?;
    Ok(())
}

/// Read the status byte that starts a response.
pub async fn read_status<R>(reader: &mut R) -> ProtocolResult<Status>
where
    R: AsyncRead + Unpin + ?Sized,
{
    Status::try_from(reader.read_u8().await?)
}

pub async fn write_status<W>(writer: &mut W, status: Status) -> ProtocolResult<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    writer.write_u8(status as u8).await?;
    Ok(())
}

/// Read a fixed 32-byte hash (never length-prefixed).
pub async fn read_hash<R>(reader: &mut R) -> ProtocolResult<ObjectHash>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut digest = [0u8; HASH_LEN];
    reader.read_exact(&mut digest).await?;
    Ok(ObjectHash::from_digest(digest))
}

pub async fn write_hash<W>(writer: &mut W, hash: &ObjectHash) -> ProtocolResult<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    writer.write_all(hash.as_bytes()).await?;
    Ok(())
}

/// Read a size field, rejecting negative values and anything above `max`.
pub async fn read_size<R>(reader: &mut R, max: u64) -> ProtocolResult<u64>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let size = reader.read_i64_le().await?;
    if size < 0 {
        return Err(ProtocolError::NegativeSize(size));
    }
    let size = size as u64;
    if size > max {
        return Err(ProtocolError::PayloadTooLarge { size, max });
    }
    Ok(size)
}

pub async fn write_size<W>(writer: &mut W, size: u64) -> ProtocolResult<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    writer.write_i64_le(size as i64).await?;
    Ok(())
}

/// Read a length-prefixed UTF-8 label name, capped at `max_len`.
pub async fn read_label<R>(reader: &mut R, max_len: u64) -> ProtocolResult<String>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let size = read_size(reader, max_len).await?;
    let mut buf = vec![0u8; size as usize];
    reader.read_exact(&mut buf).await?;
    String::from_utf8(buf).map_err(|e| ProtocolError::InvalidUtf8(e.to_string()))
}

/// Write a length-prefixed UTF-8 label name.
pub async fn write_label<W>(writer: &mut W, name: &str) -> ProtocolResult<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    write_size(writer, name.len() as u64).await?;
    writer.write_all(name.as_bytes()).await?;
    Ok(())
}

/// Stream exactly `size` payload bytes from `reader` into `writer`.
///
/// A stream that ends early is a framing violation, reported as
/// [`ProtocolError::Truncated`].
pub async fn copy_body<R, W>(reader: &mut R, writer: &mut W, size: u64) -> ProtocolResult<()>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut body = reader.take(size);
    let copied = tokio::io::copy(&mut body, writer).await?;
    if copied != size {
        return Err(ProtocolError::Truncated {
            expected: size,
            actual: copied,
        });
    }
    Ok(())
}

/// Buffer exactly `size` payload bytes in memory.
///
/// The caller is responsible for having validated `size` against a limit
/// (see [`read_size`]); this is used for payloads that must be decoded as a
/// whole, such as manifests.
pub async fn read_body<R>(reader: &mut R, size: u64) -> ProtocolResult<Vec<u8>>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buf = vec![0u8; size as usize];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn opcode_roundtrip() {
        let mut buf = Vec::new();
        write_opcode(&mut buf, Opcode::SetLabel).await.unwrap();
        assert_eq!(buf, [3]);
        let mut reader = buf.as_slice();
        assert_eq!(
            read_opcode(&mut reader).await.unwrap(),
            Some(Opcode::SetLabel)
        );
    }

    #[tokio::test]
    async fn clean_eof_ends_request_loop() {
        let mut reader: &[u8] = &[];
        assert_eq!(read_opcode(&mut reader).await.unwrap(), None);
    }

    #[tokio::test]
    async fn garbage_opcode_rejected() {
        let mut reader: &[u8] = &[77];
        assert!(matches!(
            read_opcode(&mut reader).await,
            Err(ProtocolError::UnknownOpcode(77))
        ));
    }

    #[tokio::test]
    async fn size_is_little_endian_signed() {
        let mut buf = Vec::new();
        write_size(&mut buf, 300).await.unwrap();
        assert_eq!(buf, 300i64.to_le_bytes());
        let mut reader = buf.as_slice();
        assert_eq!(read_size(&mut reader, 1024).await.unwrap(), 300);
    }

    #[tokio::test]
    async fn negative_size_rejected() {
        let buf = (-5i64).to_le_bytes();
        let mut reader = buf.as_slice();
        assert!(matches!(
            read_size(&mut reader, 1024).await,
            Err(ProtocolError::NegativeSize(-5))
        ));
    }

    #[tokio::test]
    async fn oversized_size_rejected() {
        let buf = 2048i64.to_le_bytes();
        let mut reader = buf.as_slice();
        assert!(matches!(
            read_size(&mut reader, 1024).await,
            Err(ProtocolError::PayloadTooLarge {
                size: 2048,
                max: 1024
            })
        ));
    }

    #[tokio::test]
    async fn hash_roundtrip() {
        let hash = ObjectHash::of(b"wire");
        let mut buf = Vec::new();
        write_hash(&mut buf, &hash).await.unwrap();
        assert_eq!(buf.len(), HASH_LEN);
        let mut reader = buf.as_slice();
        assert_eq!(read_hash(&mut reader).await.unwrap(), hash);
    }

    #[tokio::test]
    async fn label_roundtrip() {
        let mut buf = Vec::new();
        write_label(&mut buf, "v1").await.unwrap();
        let mut reader = buf.as_slice();
        assert_eq!(read_label(&mut reader, 4096).await.unwrap(), "v1");
    }

    #[tokio::test]
    async fn label_must_be_utf8() {
        let mut buf = Vec::new();
        write_size(&mut buf, 2).await.unwrap();
        buf.extend_from_slice(&[0xff, 0xfe]);
        let mut reader = buf.as_slice();
        assert!(matches!(
            read_label(&mut reader, 4096).await,
            Err(ProtocolError::InvalidUtf8(_))
        ));
    }

    #[tokio::test]
    async fn label_length_capped() {
        let mut buf = Vec::new();
        write_label(&mut buf, &"x".repeat(100)).await.unwrap();
        let mut reader = buf.as_slice();
        assert!(matches!(
            read_label(&mut reader, 10).await,
            Err(ProtocolError::PayloadTooLarge { .. })
        ));
    }

    #[tokio::test]
    async fn copy_body_moves_exact_bytes() {
        let mut reader: &[u8] = b"0123456789tail";
        let mut out = Vec::new();
        copy_body(&mut reader, &mut out, 10).await.unwrap();
        assert_eq!(out, b"0123456789");
        assert_eq!(reader, b"tail");
    }

    #[tokio::test]
    async fn copy_body_detects_truncation() {
        let mut reader: &[u8] = b"short";
        let mut out = Vec::new();
        assert!(matches!(
            copy_body(&mut reader, &mut out, 10).await,
            Err(ProtocolError::Truncated {
                expected: 10,
                actual: 5
            })
        ));
    }

    #[tokio::test]
    async fn status_roundtrip() {
        let mut buf = Vec::new();
        write_status(&mut buf, Status::NotFound).await.unwrap();
        let mut reader = buf.as_slice();
        assert_eq!(read_status(&mut reader).await.unwrap(), Status::NotFound);
    }
}
