//! 数据库连接池
//! 提供 PostgreSQL 连接池与健康检查；表结构与迁移由外部维护

use crate::config::DatabaseConfig;
use secrecy::ExposeSecret;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// 创建数据库连接池
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    let db_url = config.url.expose_secret();

    tracing::debug!(max_connections = config.max_connections, "Connecting to credential store");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .test_before_acquire(true)
        .connect(db_url)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Credential store connection failed");
            DbError::ConnectionFailed(e.to_string())
        })?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Credential store pool ready"
    );

    Ok(pool)
}

/// 数据库健康检查
///
/// Also publishes the pool gauges.
pub async fn health_check(pool: &PgPool) -> HealthStatus {
    let status = match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => {
            tracing::debug!("Credential store reachable");
            HealthStatus::Healthy
        }
        Err(e) => {
            tracing::warn!(error = %e, "Credential store unreachable");
            HealthStatus::Unhealthy(e.to_string())
        }
    };

    record_pool_metrics(pool, &status);
    status
}

/// 记录连接池指标
pub fn record_pool_metrics(pool: &PgPool, status: &HealthStatus) {
    metrics::gauge!("auth_db_pool_connections").set(pool.size() as f64);
    metrics::gauge!("auth_db_pool_idle").set(pool.num_idle() as f64);
    metrics::gauge!("auth_db_up").set(if status.is_healthy() { 1.0 } else { 0.0 });
}

/// 数据库错误类型
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
}

/// 健康状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}
