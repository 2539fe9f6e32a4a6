//! Error taxonomy for the relay core.
//!
//! Each pure-state component gets its own small error enum rather than one
//! shared God-enum. The command dispatcher is the only place that turns
//! these into the wire reply strings.

use thiserror::Error;

/// Failures from the recency index.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecencyError {
    #[error("connection already present in recency index")]
    AlreadyPresent,
    #[error("connection not present in recency index")]
    NotPresent,
}

/// Failures from the room registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoomError {
    #[error("connection already registered")]
    DuplicateConnection,
    #[error("unknown connection")]
    UnknownConnection,
    #[error("room exists already")]
    RoomExists,
    #[error("room does not exist")]
    NoSuchRoom,
}

/// Failures from the credential store.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("connection already registered")]
    DuplicateConnection,
    #[error("unknown connection")]
    UnknownConnection,
    #[error("username exists already")]
    UsernameTaken,
    #[error("wrong username or password")]
    BadCredentials,
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("password hashing failed: {0}")]
    Hash(String),
}
