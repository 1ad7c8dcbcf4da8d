//! Refresh token repository (PostgreSQL)

use super::RefreshTokenRepository;
use crate::{
    error::StorageError,
    models::{NewRefreshToken, RefreshToken},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgRefreshTokenRepository {
    db: PgPool,
}

impl PgRefreshTokenRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RefreshTokenRepository for PgRefreshTokenRepository {
    async fn create(&self, token: NewRefreshToken) -> Result<RefreshToken, StorageError> {
        let record = sqlx::query_as::<_, RefreshToken>(
            r#"
            INSERT INTO refresh_tokens (token, user_id, created_at, updated_at, expires_at, revoked_at)
            VALUES ($1, $2, $3, $3, $4, NULL)
            RETURNING token, user_id, created_at, expires_at, revoked_at
            "#,
        )
        .bind(&token.token)
        .bind(token.owner_id)
        .bind(token.created_at)
        .bind(token.expires_at)
        .fetch_one(&self.db)
        .await?;

        Ok(record)
    }

    async fn get_by_token(&self, token: &str) -> Result<Option<RefreshToken>, StorageError> {
        let record = sqlx::query_as::<_, RefreshToken>(
            "SELECT token, user_id, created_at, expires_at, revoked_at FROM refresh_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.db)
        .await?;

        Ok(record)
    }

    async fn revoke(&self, token: &str, revoked_at: DateTime<Utc>) -> Result<u64, StorageError> {
        // COALESCE keeps the first revocation time
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = COALESCE(revoked_at, $2),
                updated_at = $2
            WHERE token = $1
            "#,
        )
        .bind(token)
        .bind(revoked_at)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected())
    }

    async fn get_owner_by_token(&self, token: &str) -> Result<Option<Uuid>, StorageError> {
        let owner = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT users.id
            FROM refresh_tokens
            JOIN users ON users.id = refresh_tokens.user_id
            WHERE refresh_tokens.token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.db)
        .await?;

        Ok(owner)
    }
}
