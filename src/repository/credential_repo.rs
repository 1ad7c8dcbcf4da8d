//! Credential repository (PostgreSQL)

use super::CredentialRepository;
use crate::{error::StorageError, models::Credential};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgCredentialRepository {
    db: PgPool,
}

impl PgCredentialRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialRepository for PgCredentialRepository {
    async fn get_credential_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Credential>, StorageError> {
        let credential = sqlx::query_as::<_, Credential>(
            "SELECT id, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(credential)
    }

    async fn update_password(&self, owner_id: Uuid, digest: &str) -> Result<bool, StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET hashed_password = $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(owner_id)
        .bind(digest)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
