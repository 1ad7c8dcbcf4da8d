//! 认证中间件
//!
//! Glue between the host's router and [`SessionService`]: one layer per
//! trust tier. Routes behind `require_user` get an [`AuthUser`] in their
//! request extensions; routes behind `require_service` only know the caller
//! holds the API key.

use crate::{error::AppError, services::SessionService};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

/// 认证上下文（附加到请求扩展）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
}

// 实现 FromRequestParts 以便在 handler 中直接提取 AuthUser
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or(AppError::Unauthorized)
    }
}

/// 用户访问令牌认证 - 必须认证
pub async fn require_user(
    State(sessions): State<Arc<SessionService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = sessions.authenticate_request(req.headers()).await?;

    req.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(req).await)
}

/// 服务间 API Key 认证
pub async fn require_service(
    State(sessions): State<Arc<SessionService>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    sessions.authenticate_service(req.headers())?;

    Ok(next.run(req).await)
}
