//! In-memory and persisted state for the relay: the three indices the
//! connection multiplexer keeps in lockstep, plus the aggregate [`Relay`]
//! handle threaded through the command dispatcher and network layer.

pub mod credentials;
pub mod recency;
pub mod rooms;

pub use credentials::CredentialStore;
pub use recency::RecencyIndex;
pub use rooms::RoomRegistry;

use crate::db::Database;
use crate::error::{CredentialError, RecencyError, RoomError};
use dashmap::DashMap;
use tokio::sync::mpsc;

/// Opaque per-connection identifier, assigned once at accept time and never
/// reused while the connection is live.
pub type ConnId = u64;

/// A single fixed-size 1024-byte frame, the wire protocol's unit in both
/// directions.
pub type Frame = [u8; 1024];

/// Encodes `text` as a zero-padded 1024-byte frame, truncating if too long.
pub fn encode_frame(text: &str) -> Frame {
    let mut frame = [0u8; 1024];
    let bytes = text.as_bytes();
    let n = bytes.len().min(frame.len());
    frame[..n].copy_from_slice(&bytes[..n]);
    frame
}

/// Combines the three membership indices, the persisted credential store,
/// and the per-connection outbound channel table the multiplexer uses to
/// fan messages out to writer tasks.
///
/// Registration/deregistration always touches all three indices together —
/// see [`Relay::register`] and [`Relay::deregister`] — so their invariants
/// can never be observed to hold for one index and not another.
pub struct Relay {
    recency: RecencyIndex,
    rooms: RoomRegistry,
    credentials: CredentialStore,
    outbox: DashMap<ConnId, mpsc::Sender<Frame>>,
}

impl Relay {
    pub fn new(db: Database) -> Self {
        Self {
            recency: RecencyIndex::new(),
            rooms: RoomRegistry::new(),
            credentials: CredentialStore::new(db),
            outbox: DashMap::new(),
        }
    }

    pub fn recency(&self) -> &RecencyIndex {
        &self.recency
    }

    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Registers a freshly accepted connection across all three indices and
    /// its outbound frame channel. Rolls back any partial registration on
    /// failure — a connection must never be left half-registered.
    pub fn register(&self, id: ConnId, sender: mpsc::Sender<Frame>) -> Result<(), RelayError> {
        self.recency.add(id)?;
        if let Err(e) = self.rooms.add_connection(id) {
            let _ = self.recency.remove(id);
            return Err(e.into());
        }
        if let Err(e) = self.credentials.add_connection(id) {
            let _ = self.recency.remove(id);
            let _ = self.rooms.remove_connection(id);
            return Err(e.into());
        }
        self.outbox.insert(id, sender);
        Ok(())
    }

    /// Deregisters a connection from all indices, in the order EOF handling
    /// requires (recency, room, credentials), and drops its outbound
    /// channel. Best-effort: logs rather than fails, since deregistration
    /// always follows detected disconnection.
    pub fn deregister(&self, id: ConnId) {
        if let Err(e) = self.recency.remove(id) {
            tracing::debug!(id, error = %e, "recency deregistration no-op");
        }
        if let Err(e) = self.rooms.remove_connection(id) {
            tracing::debug!(id, error = %e, "room deregistration no-op");
        }
        if let Err(e) = self.credentials.remove_connection(id) {
            tracing::debug!(id, error = %e, "credential deregistration no-op");
        }
        self.outbox.remove(&id);
    }

    /// The outbound sender for a live connection, if any.
    pub fn sender_of(&self, id: ConnId) -> Option<mpsc::Sender<Frame>> {
        self.outbox.get(&id).map(|e| e.value().clone())
    }

    /// Queues `frame` on `id`'s outbound channel. Silently drops it if `id`
    /// has since disconnected or its writer task's channel is saturated and
    /// closed — a departed connection is not this relay's problem anymore.
    pub async fn send_to(&self, id: ConnId, frame: Frame) {
        if let Some(tx) = self.sender_of(id) {
            let _ = tx.send(frame).await;
        }
    }

    /// Logs a diagnostic snapshot of the recency order and current room
    /// membership, gated behind the `debug` log level. Called after every
    /// dispatched line and after every disconnection.
    pub fn debug_dump(&self) {
        tracing::debug!(
            recency = ?self.recency.snapshot(),
            rooms = ?self.rooms.snapshot(),
            "state snapshot",
        );
    }
}

/// Unified registration-path error, so the three per-index errors can
/// propagate through [`Relay::register`] with `?`.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error(transparent)]
    Recency(#[from] RecencyError),
    #[error(transparent)]
    Room(#[from] RoomError),
    #[error(transparent)]
    Credential(#[from] CredentialError),
}
