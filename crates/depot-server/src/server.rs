use std::net::SocketAddr;
use std::sync::Arc;

use depot_store::Depot;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::handler;

/// Depot store server.
///
/// Binding is separated from serving so callers (and tests) can bind to an
/// ephemeral port and learn the actual address before the accept loop runs.
pub struct Server {
    config: ServerConfig,
    depot: Arc<Depot>,
    listener: TcpListener,
}

impl Server {
    /// Open the stores under the configured root and bind the listener.
    pub async fn bind(config: ServerConfig) -> ServerResult<Self> {
        let depot = Arc::new(Depot::open(&config.root).await?);
        let listener = TcpListener::bind(config.bind_addr).await?;
        tracing::info!(
            addr = %listener.local_addr()?,
            root = %config.root.display(),
            "depot server listening"
        );
        Ok(Self {
            config,
            depot,
            listener,
        })
    }

    /// The address the listener is actually bound to.
    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Accept connections forever, one handler task per connection.
    pub async fn run(self) -> ServerResult<()> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            tracing::info!(%peer, "accepted connection");
            let depot = Arc::clone(&self.depot);
            let limits = self.config.limits;
            tokio::spawn(handler::handle_connection(depot, limits, stream, peer));
        }
    }
}
