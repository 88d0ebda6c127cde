//! Store server for depot.
//!
//! Accepts TCP connections, decodes the wire protocol, and dispatches each
//! request onto the object and label stores. One handler task per connection;
//! a handler failure closes that connection only and never affects other
//! connections or the accept loop.

pub mod config;
pub mod error;
pub mod handler;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::Server;
