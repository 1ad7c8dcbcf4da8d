//! Persistence collaborators (数据库访问层)
//!
//! The session core only talks to these traits. Postgres implementations
//! back production; the in-memory ones serve embedding and tests.

pub mod credential_repo;
pub mod memory;
pub mod refresh_token_repo;

pub use credential_repo::PgCredentialRepository;
pub use memory::{InMemoryCredentialRepository, InMemoryRefreshTokenRepository};
pub use refresh_token_repo::PgRefreshTokenRepository;

use crate::{
    error::StorageError,
    models::{Credential, NewRefreshToken, RefreshToken},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Persist a freshly issued token
    async fn create(&self, token: NewRefreshToken) -> Result<RefreshToken, StorageError>;

    async fn get_by_token(&self, token: &str) -> Result<Option<RefreshToken>, StorageError>;

    /// Set `revoked_at` if unset. Returns rows affected; an already revoked
    /// row still counts and keeps its original timestamp.
    async fn revoke(&self, token: &str, revoked_at: DateTime<Utc>) -> Result<u64, StorageError>;

    async fn get_owner_by_token(&self, token: &str) -> Result<Option<Uuid>, StorageError>;
}

#[async_trait]
pub trait CredentialRepository: Send + Sync {
    async fn get_credential_by_email(&self, email: &str)
        -> Result<Option<Credential>, StorageError>;

    /// Replace the stored digest. Returns false when the owner does not exist.
    async fn update_password(&self, owner_id: Uuid, digest: &str) -> Result<bool, StorageError>;
}
