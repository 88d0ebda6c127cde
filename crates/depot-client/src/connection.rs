use depot_protocol::{wire, Opcode, WireLimits};
use depot_types::{validate_label_name, ObjectHash};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use crate::error::ClientResult;
use crate::session::Session;

/// One request/response connection to the store server.
///
/// Requests on a connection are strictly sequential: each method writes one
/// full request, then reads the complete response before returning. Pipeline
/// stages that run concurrently each own their own `StoreClient`.
pub struct StoreClient {
    reader: OwnedReadHalf,
    writer: OwnedWriteHalf,
    limits: WireLimits,
}

impl StoreClient {
    /// Dial the session's server.
    pub async fn connect(session: &Session) -> ClientResult<Self> {
        let stream = TcpStream::connect(session.server).await?;
        tracing::debug!(server = %session.server, "connected");
        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader,
            writer,
            limits: session.limits,
        })
    }

    /// `SET`: store `size` bytes streamed from `reader` under `hash`.
    pub async fn set_stream<R>(
        &mut self,
        hash: &ObjectHash,
        reader: &mut R,
        size: u64,
    ) -> ClientResult<()>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        wire::write_opcode(&mut self.writer, Opcode::Set).await?;
        wire::write_hash(&mut self.writer, hash).await?;
        wire::write_size(&mut self.writer, size).await?;
        wire::copy_body(reader, &mut self.writer, size).await?;
        self.writer.flush().await?;
        wire::read_status(&mut self.reader).await?.into_result()?;
        Ok(())
    }

    /// `SET` with an in-memory body.
    pub async fn set_bytes(&mut self, hash: &ObjectHash, data: &[u8]) -> ClientResult<()> {
        let mut reader = data;
        self.set_stream(hash, &mut reader, data.len() as u64).await
    }

    /// `GET`: stream the object body for `hash` into `writer`, returning its
    /// size.
    pub async fn get_to_writer<W>(&mut self, hash: &ObjectHash, writer: &mut W) -> ClientResult<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        wire::write_opcode(&mut self.writer, Opcode::Get).await?;
        wire::write_hash(&mut self.writer, hash).await?;
        self.writer.flush().await?;
        wire::read_status(&mut self.reader).await?.into_result()?;
        let size = wire::read_size(&mut self.reader, self.limits.max_object_size).await?;
        wire::copy_body(&mut self.reader, writer, size).await?;
        Ok(size)
    }

    /// `GET` with the body buffered in memory, capped at `max` bytes.
    pub async fn get_bytes(&mut self, hash: &ObjectHash, max: u64) -> ClientResult<Vec<u8>> {
        wire::write_opcode(&mut self.writer, Opcode::Get).await?;
        wire::write_hash(&mut self.writer, hash).await?;
        self.writer.flush().await?;
        wire::read_status(&mut self.reader).await?.into_result()?;
        let size = wire::read_size(&mut self.reader, max).await?;
        Ok(wire::read_body(&mut self.reader, size).await?)
    }

    /// `EXISTS`: whether the server holds an object for `hash`.
    pub async fn exists(&mut self, hash: &ObjectHash) -> ClientResult<bool> {
        wire::write_opcode(&mut self.writer, Opcode::Exists).await?;
        wire::write_hash(&mut self.writer, hash).await?;
        self.writer.flush().await?;
        wire::read_status(&mut self.reader).await?.into_result()?;
        Ok(self.reader.read_u8().await? != 0)
    }

    /// `SET_LABEL`: bind `name` to `hash`, replacing any prior binding.
    pub async fn set_label(&mut self, name: &str, hash: &ObjectHash) -> ClientResult<()> {
        validate_label_name(name)?;
        wire::write_opcode(&mut self.writer, Opcode::SetLabel).await?;
        wire::write_hash(&mut self.writer, hash).await?;
        wire::write_label(&mut self.writer, name).await?;
        self.writer.flush().await?;
        wire::read_status(&mut self.reader).await?.into_result()?;
        Ok(())
    }

    /// `GET_LABEL`: resolve `name` to its bound hash.
    pub async fn get_label(&mut self, name: &str) -> ClientResult<ObjectHash> {
        validate_label_name(name)?;
        wire::write_opcode(&mut self.writer, Opcode::GetLabel).await?;
        wire::write_label(&mut self.writer, name).await?;
        self.writer.flush().await?;
        wire::read_status(&mut self.reader).await?.into_result()?;
        Ok(wire::read_hash(&mut self.reader).await?)
    }
}
