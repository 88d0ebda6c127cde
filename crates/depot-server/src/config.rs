use std::net::SocketAddr;
use std::path::PathBuf;

use depot_protocol::WireLimits;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Address the accept loop binds to.
    pub bind_addr: SocketAddr,
    /// Depot root directory (holds `objects/` and `labels/`).
    pub root: PathBuf,
    /// Payload size limits applied to every connection.
    pub limits: WireLimits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:7420".parse().expect("static addr"),
            root: PathBuf::from("."),
            limits: WireLimits::default(),
        }
    }
}
