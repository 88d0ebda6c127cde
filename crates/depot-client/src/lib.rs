//! Client side of depot: a thin connection wrapper plus the two pipeline
//! engines.
//!
//! - [`StoreClient`] — one sequential request/response connection
//! - [`checkin`] — walk, digest, and publish a tree under a label
//! - [`checkout`] — resolve a label and materialize its tree
//!
//! The engines never touch store-internal paths; everything goes through the
//! wire protocol.

pub mod checkin;
pub mod checkout;
pub mod connection;
pub mod error;
pub mod paths;
pub mod session;

pub use checkin::checkin;
pub use checkout::checkout;
pub use connection::StoreClient;
pub use error::{ClientError, ClientResult};
pub use session::Session;

/// Depth of each bounded hand-off queue between pipeline stages.
pub(crate) const QUEUE_DEPTH: usize = 64;
