//! In-memory repositories
//!
//! Same contracts as the Postgres implementations. `set_unavailable(true)`
//! makes every call fail with [`StorageError::Unavailable`].

use super::{CredentialRepository, RefreshTokenRepository};
use crate::{
    error::StorageError,
    models::{Credential, NewRefreshToken, RefreshToken},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryRefreshTokenRepository {
    rows: RwLock<HashMap<String, RefreshToken>>,
    unavailable: AtomicBool,
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(
                "refresh token store offline".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn create(&self, token: NewRefreshToken) -> Result<RefreshToken, StorageError> {
        self.check_available()?;

        let mut rows = self.rows.write().await;
        if rows.contains_key(&token.token) {
            return Err(StorageError::Conflict(
                "refresh token already exists".to_string(),
            ));
        }

        let record = RefreshToken::from(token);
        rows.insert(record.token.clone(), record.clone());
        Ok(record)
    }

    async fn get_by_token(&self, token: &str) -> Result<Option<RefreshToken>, StorageError> {
        self.check_available()?;
        Ok(self.rows.read().await.get(token).cloned())
    }

    async fn revoke(&self, token: &str, revoked_at: DateTime<Utc>) -> Result<u64, StorageError> {
        self.check_available()?;

        let mut rows = self.rows.write().await;
        match rows.get_mut(token) {
            Some(record) => {
                record.revoked_at.get_or_insert(revoked_at);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn get_owner_by_token(&self, token: &str) -> Result<Option<Uuid>, StorageError> {
        self.check_available()?;
        Ok(self.rows.read().await.get(token).map(|r| r.owner_id))
    }
}

#[derive(Default)]
pub struct InMemoryCredentialRepository {
    by_email: RwLock<HashMap<String, Credential>>,
    unavailable: AtomicBool,
}

impl InMemoryCredentialRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Register a credential (registration itself lives outside this crate)
    pub async fn insert(&self, email: &str, owner_id: Uuid, digest: String) {
        self.by_email
            .write()
            .await
            .insert(email.to_string(), Credential { owner_id, digest });
    }

    pub async fn digest_for(&self, owner_id: Uuid) -> Option<String> {
        self.by_email
            .read()
            .await
            .values()
            .find(|c| c.owner_id == owner_id)
            .map(|c| c.digest.clone())
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(
                "credential store offline".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialRepository for InMemoryCredentialRepository {
    async fn get_credential_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Credential>, StorageError> {
        self.check_available()?;
        Ok(self.by_email.read().await.get(email).cloned())
    }

    async fn update_password(&self, owner_id: Uuid, digest: &str) -> Result<bool, StorageError> {
        self.check_available()?;

        let mut by_email = self.by_email.write().await;
        match by_email.values_mut().find(|c| c.owner_id == owner_id) {
            Some(credential) => {
                credential.digest = digest.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_token(token: &str, owner_id: Uuid) -> NewRefreshToken {
        let now = Utc::now();
        NewRefreshToken {
            token: token.to_string(),
            owner_id,
            created_at: now,
            expires_at: now + Duration::days(60),
        }
    }

    #[tokio::test]
    async fn test_duplicate_token_conflicts() {
        let repo = InMemoryRefreshTokenRepository::new();
        let owner = Uuid::new_v4();

        repo.create(new_token("abc", owner)).await.unwrap();
        let err = repo.create(new_token("abc", owner)).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_revoke_keeps_first_timestamp() {
        let repo = InMemoryRefreshTokenRepository::new();
        repo.create(new_token("abc", Uuid::new_v4())).await.unwrap();

        let first = Utc::now();
        assert_eq!(repo.revoke("abc", first).await.unwrap(), 1);
        assert_eq!(
            repo.revoke("abc", first + Duration::hours(1)).await.unwrap(),
            1
        );

        let record = repo.get_by_token("abc").await.unwrap().unwrap();
        assert_eq!(record.revoked_at, Some(first));
        assert_eq!(repo.revoke("missing", first).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails() {
        let repo = InMemoryCredentialRepository::new();
        repo.insert("a@b.com", Uuid::new_v4(), "digest".to_string())
            .await;
        repo.set_unavailable(true);

        let err = repo.get_credential_by_email("a@b.com").await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_update_password() {
        let repo = InMemoryCredentialRepository::new();
        let owner = Uuid::new_v4();
        repo.insert("a@b.com", owner, "old".to_string()).await;

        assert!(repo.update_password(owner, "new").await.unwrap());
        assert_eq!(repo.digest_for(owner).await.as_deref(), Some("new"));
        assert!(!repo.update_password(Uuid::new_v4(), "new").await.unwrap());
    }
}
