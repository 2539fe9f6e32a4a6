//! Credential repository: persisted username/password rows.
//!
//! Transaction-free insert-or-fail on create, point-lookup by username on
//! verify. Passwords are hashed with Argon2, never stored or compared in
//! plaintext.

use crate::error::CredentialError;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng};
use argon2::Argon2;
use sqlx::SqlitePool;

/// A dummy hash verified against on lookup-miss, so a nonexistent username
/// and a wrong password take the same code path (timing-oracle mitigation).
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHRzYWx0$9xoj5Eaamzf5BPZH9ZS+NA";

/// Repository for credential operations.
pub struct CredentialRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CredentialRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new credential row. Fails with `UsernameTaken` if the
    /// username exists.
    pub async fn create(&self, username: &str, password: &str) -> Result<(), CredentialError> {
        let password = password.to_string();
        let hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| CredentialError::Hash(e.to_string()))?
            .map_err(|e| CredentialError::Hash(e.to_string()))?;

        sqlx::query("INSERT INTO credentials (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(&hash)
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return CredentialError::UsernameTaken;
                }
                CredentialError::from(e)
            })?;

        Ok(())
    }

    /// Verify `(username, password)` against the stored row. Returns `true`
    /// iff a row exists with exactly that username and the password matches.
    pub async fn verify(&self, username: &str, password: &str) -> Result<bool, CredentialError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT password_hash FROM credentials WHERE username = ?")
                .bind(username)
                .fetch_optional(self.pool)
                .await?;

        let (hash, real_row) = match row {
            Some((hash,)) => (hash, true),
            None => (DUMMY_HASH.to_string(), false),
        };

        let password = password.to_string();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| CredentialError::Hash(e.to_string()))?;

        Ok(real_row && matches)
    }
}

fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
