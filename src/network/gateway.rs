//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds to a socket and spawns Connection tasks for each
//! incoming client. The accept loop only produces new connection handles;
//! it does not mutate the three indexes itself. ConnId assignment happens
//! here, at accept time, but registration into the indexes happens inside
//! the spawned task, guarded by each index's own mutex — serializing
//! access without funneling accept through a channel the main loop drains.

use crate::network::Connection;
use crate::state::Relay;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::TcpListener;
use tracing::{error, info, instrument};

/// The Gateway accepts incoming TCP connections and spawns per-connection tasks.
pub struct Gateway {
    listener: TcpListener,
    relay: Arc<Relay>,
    next_id: AtomicU64,
}

impl Gateway {
    /// Bind the gateway to the specified address.
    pub async fn bind(addr: SocketAddr, relay: Arc<Relay>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "Gateway listening");
        Ok(Self {
            listener,
            relay,
            next_id: AtomicU64::new(1),
        })
    }

    /// Run the gateway, accepting connections forever.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> std::io::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    info!(id, %addr, "Connection accepted");

                    let relay = Arc::clone(&self.relay);
                    tokio::spawn(async move {
                        let connection = Connection::new(id, stream, addr, relay);
                        connection.run().await;
                        info!(id, %addr, "Connection closed");
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }
}
