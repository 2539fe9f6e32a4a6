//! Credential store: persisted username/password rows plus the in-memory
//! "logged-in-as" binding per connection.
//!
//! The persisted half is delegated to [`crate::db::CredentialRepository`];
//! this module owns only the connection-lifecycle bookkeeping — a bound
//! username always exists in the persisted store, since `login` only
//! binds on a verified row.

use crate::db::Database;
use crate::error::CredentialError;
use crate::state::ConnId;
use parking_lot::Mutex;
use std::collections::HashMap;

pub struct CredentialStore {
    /// Connection → bound username. Key presence means "registered"; `None`
    /// means "not logged in".
    bindings: Mutex<HashMap<ConnId, Option<String>>>,
    db: Database,
}

impl CredentialStore {
    pub fn new(db: Database) -> Self {
        Self {
            bindings: Mutex::new(HashMap::new()),
            db,
        }
    }

    pub fn add_connection(&self, id: ConnId) -> Result<(), CredentialError> {
        let mut bindings = self.bindings.lock();
        if bindings.contains_key(&id) {
            return Err(CredentialError::DuplicateConnection);
        }
        bindings.insert(id, None);
        Ok(())
    }

    pub fn remove_connection(&self, id: ConnId) -> Result<(), CredentialError> {
        let mut bindings = self.bindings.lock();
        bindings
            .remove(&id)
            .map(|_| ())
            .ok_or(CredentialError::UnknownConnection)
    }

    /// Inserts a new credential row. Does not modify `id`'s login binding.
    /// Fails with `UsernameTaken` if the username exists.
    pub async fn create(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(), CredentialError> {
        self.db.credentials().create(username, password).await
    }

    /// Succeeds iff a row exists matching `(username, password)` exactly. On
    /// success, binds `id → username`, replacing any prior binding.
    pub async fn login(
        &self,
        id: ConnId,
        username: &str,
        password: &str,
    ) -> Result<(), CredentialError> {
        if !self.bindings.lock().contains_key(&id) {
            return Err(CredentialError::UnknownConnection);
        }
        if self.db.credentials().verify(username, password).await? {
            self.bindings.lock().insert(id, Some(username.to_string()));
            Ok(())
        } else {
            Err(CredentialError::BadCredentials)
        }
    }

    /// Clears `id`'s binding. Idempotent if already logged out. Fails with
    /// `UnknownConnection` if `id` is not registered.
    pub fn logout(&self, id: ConnId) -> Result<(), CredentialError> {
        let mut bindings = self.bindings.lock();
        let slot = bindings.get_mut(&id).ok_or(CredentialError::UnknownConnection)?;
        *slot = None;
        Ok(())
    }

    /// The username `id` is logged in as, or `None`. Fails with
    /// `UnknownConnection` if `id` is not registered.
    pub fn name_of(&self, id: ConnId) -> Result<Option<String>, CredentialError> {
        self.bindings
            .lock()
            .get(&id)
            .cloned()
            .ok_or(CredentialError::UnknownConnection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> CredentialStore {
        let db = Database::new(":memory:").await.unwrap();
        CredentialStore::new(db)
    }

    #[tokio::test]
    async fn create_then_login_succeeds_and_binds() {
        let store = store().await;
        store.add_connection(1).unwrap();

        store.create("alice", "pw").await.unwrap();
        store.login(1, "alice", "pw").await.unwrap();

        assert_eq!(store.name_of(1).unwrap(), Some("alice".to_string()));
    }

    #[tokio::test]
    async fn login_with_wrong_password_fails() {
        let store = store().await;
        store.add_connection(1).unwrap();
        store.create("alice", "pw").await.unwrap();

        let err = store.login(1, "alice", "not-pw").await.unwrap_err();
        assert!(matches!(err, CredentialError::BadCredentials));
        assert_eq!(store.name_of(1).unwrap(), None);
    }

    #[tokio::test]
    async fn a_username_may_be_bound_to_multiple_connections() {
        let store = store().await;
        store.add_connection(1).unwrap();
        store.add_connection(2).unwrap();
        store.create("alice", "pw").await.unwrap();

        store.login(1, "alice", "pw").await.unwrap();
        store.login(2, "alice", "pw").await.unwrap();

        assert_eq!(store.name_of(1).unwrap(), Some("alice".to_string()));
        assert_eq!(store.name_of(2).unwrap(), Some("alice".to_string()));
    }

    #[tokio::test]
    async fn logout_clears_binding_and_is_idempotent() {
        let store = store().await;
        store.add_connection(1).unwrap();
        store.create("alice", "pw").await.unwrap();
        store.login(1, "alice", "pw").await.unwrap();

        store.logout(1).unwrap();
        assert_eq!(store.name_of(1).unwrap(), None);
        store.logout(1).unwrap(); // idempotent
    }

    #[tokio::test]
    async fn login_replaces_prior_binding() {
        let store = store().await;
        store.add_connection(1).unwrap();
        store.create("alice", "pw1").await.unwrap();
        store.create("bob", "pw2").await.unwrap();

        store.login(1, "alice", "pw1").await.unwrap();
        store.login(1, "bob", "pw2").await.unwrap();

        assert_eq!(store.name_of(1).unwrap(), Some("bob".to_string()));
    }
}
