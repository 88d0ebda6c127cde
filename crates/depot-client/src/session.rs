use std::net::SocketAddr;

use depot_protocol::WireLimits;

/// Connection parameters for one engine invocation.
///
/// A session value is passed into every pipeline stage constructor; stages
/// that need their own connection dial it independently. There is no shared
/// mutable state between stages beyond the hand-off queues.
#[derive(Clone, Copy, Debug)]
pub struct Session {
    /// Address of the store server.
    pub server: SocketAddr,
    /// Payload size limits (must be at least as strict as the server's).
    pub limits: WireLimits,
}

impl Session {
    pub fn new(server: SocketAddr) -> Self {
        Self {
            server,
            limits: WireLimits::default(),
        }
    }
}
