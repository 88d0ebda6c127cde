use crate::error::ProtocolError;

/// One-byte operation selector leading every request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Store an object under its content hash.
    Set = 0,
    /// Fetch an object by content hash.
    Get = 1,
    /// Query whether an object is present.
    Exists = 2,
    /// Bind a label name to a hash.
    SetLabel = 3,
    /// Resolve a label name to its bound hash.
    GetLabel = 4,
}

impl Opcode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Set => "SET",
            Self::Get => "GET",
            Self::Exists => "EXISTS",
            Self::SetLabel => "SET_LABEL",
            Self::GetLabel => "GET_LABEL",
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for Opcode {
    type Error = ProtocolError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0 => Ok(Self::Set),
            1 => Ok(Self::Get),
            2 => Ok(Self::Exists),
            3 => Ok(Self::SetLabel),
            4 => Ok(Self::GetLabel),
            other => Err(ProtocolError::UnknownOpcode(other)),
        }
    }
}

/// One-byte status leading every response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Status {
    /// The operation succeeded; any response payload follows.
    Ok = 0,
    /// The requested object or label does not exist.
    NotFound = 1,
    /// The request was malformed or exceeded a configured limit.
    InvalidRequest = 2,
    /// The server failed to complete a valid request.
    ServerError = 3,
}

impl Status {
    /// Map a non-OK status into a [`ProtocolError::Remote`].
    pub fn into_result(self) -> Result<(), ProtocolError> {
        match self {
            Self::Ok => Ok(()),
            other => Err(ProtocolError::Remote(other)),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Ok => "ok",
            Self::NotFound => "not found",
            Self::InvalidRequest => "invalid request",
            Self::ServerError => "server error",
        };
        f.write_str(name)
    }
}

impl TryFrom<u8> for Status {
    type Error = ProtocolError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0 => Ok(Self::Ok),
            1 => Ok(Self::NotFound),
            2 => Ok(Self::InvalidRequest),
            3 => Ok(Self::ServerError),
            other => Err(ProtocolError::UnknownStatus(other)),
        }
    }
}
