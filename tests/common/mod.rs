//! Integration test common infrastructure.
//!
//! Spawns a real `slircd-core` server process against a temp SQLite file
//! and a `TestClient` that speaks the fixed 1024-byte-frame wire protocol.

pub mod client;
pub mod server;

pub use client::TestClient;
pub use server::TestServer;
