//! Connection - drives one client's byte stream.
//!
//! Each connection runs a single task with a `tokio::select!` loop reading
//! fixed 1024-byte frames off the socket and draining an outbound `mpsc`
//! channel that other connections' chat fan-out and command replies write
//! into. Every frame is one logical line, dispatched immediately.

use crate::command;
use crate::state::{ConnId, Frame, Relay};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Bound on the per-connection outbound queue. A slow reader can still
/// stall fan-out once this fills; bounded only so one dead peer can't grow
/// memory without limit.
const OUTBOX_CAPACITY: usize = 256;

pub struct Connection {
    id: ConnId,
    addr: SocketAddr,
    stream: TcpStream,
    relay: Arc<Relay>,
}

impl Connection {
    pub fn new(id: ConnId, stream: TcpStream, addr: SocketAddr, relay: Arc<Relay>) -> Self {
        Self { id, addr, stream, relay }
    }

    #[instrument(skip(self), fields(id = self.id, addr = %self.addr), name = "connection")]
    pub async fn run(mut self) {
        let (tx, mut rx) = mpsc::channel::<Frame>(OUTBOX_CAPACITY);
        if let Err(e) = self.relay.register(self.id, tx) {
            warn!(id = self.id, error = %e, "registration failed, closing connection");
            return;
        }

        let mut buf = [0u8; 1024];
        loop {
            tokio::select! {
                read = self.stream.read(&mut buf) => {
                    match read {
                        Ok(0) => {
                            info!(id = self.id, "client disconnected");
                            break;
                        }
                        Ok(n) => {
                            debug!(id = self.id, bytes = n, "received frame");
                            command::dispatch(&self.relay, self.id, &buf[..n]).await;
                            if let Err(e) = self.relay.recency().touch(self.id) {
                                debug!(id = self.id, error = %e, "touch after dispatch");
                            }
                            self.relay.debug_dump();
                        }
                        Err(e) => {
                            warn!(id = self.id, error = %e, "read error");
                            break;
                        }
                    }
                }
                Some(frame) = rx.recv() => {
                    if let Err(e) = self.stream.write_all(&frame).await {
                        warn!(id = self.id, error = %e, "write error");
                        break;
                    }
                }
            }
        }

        self.relay.deregister(self.id);
        self.relay.debug_dump();
    }
}
