//! Wire protocol for depot.
//!
//! A single persistent TCP connection carries a sequence of independent,
//! strictly sequential request/response exchanges — no multiplexing, no
//! request IDs. Requests are framed as `[1-byte opcode][payload]`; every
//! response begins with a 1-byte [`Status`] so failures are signaled in-band
//! rather than by connection teardown.
//!
//! All multi-byte integers are little-endian signed 64-bit. Hashes are always
//! exactly 32 raw bytes and never length-prefixed. Declared payload sizes
//! drive allocation and are bounded by [`WireLimits`]; anything negative or
//! above the configured maximum is rejected before a byte of payload is read.
//!
//! | Opcode | Request payload | Response payload |
//! |---|---|---|
//! | `SET` | hash, size, content | status |
//! | `GET` | hash | status, then size + content on OK |
//! | `EXISTS` | hash | status, 1-byte boolean |
//! | `SET_LABEL` | hash, size, label bytes | status |
//! | `GET_LABEL` | size, label bytes | status, then hash on OK |

pub mod error;
pub mod limits;
pub mod opcode;
pub mod wire;

pub use error::{ProtocolError, ProtocolResult};
pub use limits::WireLimits;
pub use opcode::{Opcode, Status};
