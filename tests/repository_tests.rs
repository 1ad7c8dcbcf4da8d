//! 仓库层集成测试（需要 PostgreSQL，设置 TEST_DATABASE_URL 后运行 `--ignored`）

mod common;

use chirpy_auth::{
    db,
    models::NewRefreshToken,
    repository::{
        CredentialRepository, PgCredentialRepository, PgRefreshTokenRepository,
        RefreshTokenRepository,
    },
};
use chrono::{Duration, Utc};
use common::create_test_config;
use sqlx::PgPool;
use uuid::Uuid;

/// 表结构由外部迁移维护，这里只为测试建最小表
async fn setup_test_db() -> PgPool {
    let config = create_test_config();
    let pool = db::create_pool(&config.database)
        .await
        .expect("Failed to create test database pool");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            hashed_password TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(&pool)
    .await
    .expect("create users");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS refresh_tokens (
            token TEXT PRIMARY KEY,
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            expires_at TIMESTAMPTZ NOT NULL,
            revoked_at TIMESTAMPTZ
        )
        "#,
    )
    .execute(&pool)
    .await
    .expect("create refresh_tokens");

    pool
}

async fn create_test_user(pool: &PgPool, email: &str) -> Uuid {
    let user_id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, email, hashed_password) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(email)
        .bind("digest")
        .execute(pool)
        .await
        .expect("insert user");
    user_id
}

#[tokio::test]
#[ignore] // 需要数据库
async fn test_refresh_token_repository_roundtrip() {
    let pool = setup_test_db().await;
    let user_id = create_test_user(&pool, &format!("{}@test.com", Uuid::new_v4())).await;
    let repo = PgRefreshTokenRepository::new(pool.clone());

    let now = Utc::now();
    let token = chirpy_auth::auth::RefreshTokenStore::generate().unwrap();
    let created = repo
        .create(NewRefreshToken {
            token: token.clone(),
            owner_id: user_id,
            created_at: now,
            expires_at: now + Duration::days(60),
        })
        .await
        .unwrap();
    assert_eq!(created.owner_id, user_id);
    assert!(created.revoked_at.is_none());

    let found = repo.get_by_token(&token).await.unwrap().unwrap();
    assert_eq!(found.token, token);
    assert_eq!(repo.get_owner_by_token(&token).await.unwrap(), Some(user_id));

    // 撤销是幂等且单调的
    assert_eq!(repo.revoke(&token, now).await.unwrap(), 1);
    assert_eq!(
        repo.revoke(&token, now + Duration::hours(1)).await.unwrap(),
        1
    );
    let revoked = repo.get_by_token(&token).await.unwrap().unwrap();
    assert_eq!(
        revoked.revoked_at.map(|t| t.timestamp()),
        Some(now.timestamp())
    );

    assert_eq!(repo.revoke("missing", now).await.unwrap(), 0);
    assert!(repo.get_by_token("missing").await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // 需要数据库
async fn test_credential_repository() {
    let pool = setup_test_db().await;
    let email = format!("{}@test.com", Uuid::new_v4());
    let user_id = create_test_user(&pool, &email).await;
    let repo = PgCredentialRepository::new(pool.clone());

    let credential = repo.get_credential_by_email(&email).await.unwrap().unwrap();
    assert_eq!(credential.owner_id, user_id);
    assert_eq!(credential.digest, "digest");

    assert!(repo.update_password(user_id, "new-digest").await.unwrap());
    let credential = repo.get_credential_by_email(&email).await.unwrap().unwrap();
    assert_eq!(credential.digest, "new-digest");

    assert!(!repo.update_password(Uuid::new_v4(), "x").await.unwrap());
    assert!(repo
        .get_credential_by_email("nobody@test.com")
        .await
        .unwrap()
        .is_none());
}
