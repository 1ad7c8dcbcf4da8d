//! 会话服务：登录、请求认证、令牌刷新、登出
//!
//! Anonymous -> (password verified) -> Authenticated with an access token
//! plus a refresh token. Refresh tokens are not rotated: a refresh only
//! mints a new access token. Logout revokes the refresh token; access
//! tokens already handed out stay valid until their own expiry.

use crate::{
    auth::{
        api_key::ApiKeyVerifier,
        credentials::{extract_api_key, extract_bearer},
        jwt::TokenSigner,
        password::{PasswordHasher, PasswordPolicy},
        refresh_token::{fingerprint, RefreshTokenStore},
    },
    clock::Clock,
    config::AppConfig,
    error::{AppError, PasswordError, RefreshTokenError, TokenError},
    models::{AccessGrant, Session},
    repository::{CredentialRepository, RefreshTokenRepository},
};
use axum::http::HeaderMap;
use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

pub struct SessionService {
    credentials: Arc<dyn CredentialRepository>,
    hasher: PasswordHasher,
    policy: PasswordPolicy,
    signer: Arc<TokenSigner>,
    refresh_tokens: RefreshTokenStore,
    api_keys: ApiKeyVerifier,
}

impl SessionService {
    pub fn new(
        credentials: Arc<dyn CredentialRepository>,
        hasher: PasswordHasher,
        policy: PasswordPolicy,
        signer: Arc<TokenSigner>,
        refresh_tokens: RefreshTokenStore,
        api_keys: ApiKeyVerifier,
    ) -> Self {
        Self {
            credentials,
            hasher,
            policy,
            signer,
            refresh_tokens,
            api_keys,
        }
    }

    /// Wire every component from startup configuration
    pub fn from_config(
        config: &AppConfig,
        credentials: Arc<dyn CredentialRepository>,
        refresh_repo: Arc<dyn RefreshTokenRepository>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let hasher = PasswordHasher::from_config(&config.security)
            .map_err(|e| AppError::Config(e.to_string()))?;
        let signer = Arc::new(TokenSigner::from_config(config, clock.clone())?);
        let refresh_tokens = RefreshTokenStore::new(
            refresh_repo,
            clock,
            Duration::seconds(config.security.refresh_token_exp_secs as i64),
        );

        Ok(Self::new(
            credentials,
            hasher,
            PasswordPolicy::from_config(&config.security),
            signer,
            refresh_tokens,
            ApiKeyVerifier::from_config(config)?,
        ))
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    pub fn refresh_tokens(&self) -> &RefreshTokenStore {
        &self.refresh_tokens
    }

    fn expires_in(&self) -> u64 {
        self.signer.access_token_ttl().num_seconds().max(0) as u64
    }

    /// 用户登录
    ///
    /// Unknown email and wrong password fail identically, each after one Argon2 verification.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let credential = match self.credentials.get_credential_by_email(email).await {
            Ok(Some(credential)) => credential,
            Ok(None) => {
                self.hasher.verify_decoy(password);
                tracing::debug!("Login rejected: unknown email");
                record_outcome("auth_login_total", "invalid_credentials");
                return Err(AppError::InvalidCredentials);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Credential lookup failed");
                record_outcome("auth_login_total", "error");
                return Err(e.into());
            }
        };

        match self.hasher.verify(&credential.digest, password) {
            Ok(()) => {}
            Err(PasswordError::Mismatch) => {
                tracing::debug!(owner_id = %credential.owner_id, "Login rejected: wrong password");
                record_outcome("auth_login_total", "invalid_credentials");
                return Err(AppError::InvalidCredentials);
            }
            Err(e) => {
                tracing::error!(owner_id = %credential.owner_id, error = %e, "Password verification failed");
                record_outcome("auth_login_total", "error");
                return Err(AppError::Internal(e.to_string()));
            }
        }

        let access_token = self
            .signer
            .mint_access_token(credential.owner_id)
            .map_err(|e| mint_failure("auth_login_total", e))?;

        let refresh = self
            .refresh_tokens
            .issue(credential.owner_id)
            .await
            .map_err(|e| {
                record_outcome("auth_login_total", "error");
                refresh_failure(e)
            })?;

        tracing::info!(owner_id = %credential.owner_id, "User logged in");
        record_outcome("auth_login_total", "success");

        Ok(Session {
            subject: credential.owner_id,
            access_token,
            refresh_token: refresh.token,
            expires_in: self.expires_in(),
        })
    }

    /// 认证请求：校验 Bearer 访问令牌并返回主体
    pub async fn authenticate_request(&self, headers: &HeaderMap) -> Result<Uuid, AppError> {
        let token = extract_bearer(headers).map_err(|e| {
            tracing::debug!(cause = %e, "Request rejected");
            AppError::Unauthorized
        })?;

        self.signer.validate(token).map_err(|e: TokenError| {
            tracing::debug!(cause = %e, "Access token rejected");
            match e {
                TokenError::Encoding(msg) => AppError::Internal(msg),
                _ => AppError::Unauthorized,
            }
        })
    }

    /// 刷新访问令牌（刷新令牌本身不轮换）
    pub async fn refresh(&self, headers: &HeaderMap) -> Result<AccessGrant, AppError> {
        let token = extract_bearer(headers).map_err(|e| {
            tracing::debug!(cause = %e, "Refresh rejected");
            record_outcome("auth_refresh_total", "unauthorized");
            AppError::Unauthorized
        })?;

        let owner_id = self.refresh_tokens.resolve(token).await.map_err(|e| {
            tracing::debug!(token = %fingerprint(token), cause = %e, "Refresh token rejected");
            record_outcome("auth_refresh_total", outcome_label(&e));
            refresh_failure(e)
        })?;

        let access_token = self
            .signer
            .mint_access_token(owner_id)
            .map_err(|e| mint_failure("auth_refresh_total", e))?;
        record_outcome("auth_refresh_total", "success");

        Ok(AccessGrant {
            token: access_token,
            expires_in: self.expires_in(),
        })
    }

    /// 登出（撤销刷新令牌）
    pub async fn logout(&self, headers: &HeaderMap) -> Result<(), AppError> {
        let token = extract_bearer(headers).map_err(|e| {
            tracing::debug!(cause = %e, "Logout rejected");
            record_outcome("auth_logout_total", "unauthorized");
            AppError::Unauthorized
        })?;

        self.refresh_tokens.revoke(token).await.map_err(|e| {
            tracing::debug!(token = %fingerprint(token), cause = %e, "Logout rejected");
            record_outcome("auth_logout_total", outcome_label(&e));
            refresh_failure(e)
        })?;

        tracing::info!(token = %fingerprint(token), "Refresh token revoked on logout");
        record_outcome("auth_logout_total", "success");
        Ok(())
    }

    /// 服务间调用认证（API Key 层级，与用户令牌互不通用）
    pub fn authenticate_service(&self, headers: &HeaderMap) -> Result<(), AppError> {
        let key = extract_api_key(headers).map_err(|e| {
            tracing::debug!(cause = %e, "Service request rejected");
            AppError::Unauthorized
        })?;

        if !self.api_keys.verify(key) {
            tracing::debug!("Service request rejected: API key mismatch");
            return Err(AppError::Unauthorized);
        }

        Ok(())
    }

    /// 修改密码
    pub async fn change_password(&self, subject: Uuid, new_password: &str) -> Result<(), AppError> {
        self.policy.validate(new_password)?;

        let digest = self
            .hasher
            .hash(new_password)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        if !self.credentials.update_password(subject, &digest).await? {
            tracing::debug!(%subject, "Password change for unknown subject");
            return Err(AppError::Unauthorized);
        }

        tracing::info!(%subject, "Password changed");
        Ok(())
    }

    /// 资源归属检查
    pub fn ensure_owner(subject: Uuid, resource_owner: Uuid) -> Result<(), AppError> {
        if subject != resource_owner {
            tracing::debug!(%subject, %resource_owner, "Ownership check failed");
            return Err(AppError::Forbidden);
        }
        Ok(())
    }
}

fn mint_failure(metric: &'static str, e: TokenError) -> AppError {
    tracing::error!(error = %e, "Failed to mint access token");
    record_outcome(metric, "error");
    AppError::Internal(e.to_string())
}

fn refresh_failure(e: RefreshTokenError) -> AppError {
    match e {
        RefreshTokenError::NotFound | RefreshTokenError::Revoked | RefreshTokenError::Expired => {
            AppError::Unauthorized
        }
        RefreshTokenError::Generation(msg) => AppError::Internal(msg),
        RefreshTokenError::Storage(e) => {
            tracing::warn!(error = %e, "Refresh token storage failed");
            AppError::Storage(e)
        }
    }
}

fn outcome_label(e: &RefreshTokenError) -> &'static str {
    match e {
        RefreshTokenError::NotFound => "not_found",
        RefreshTokenError::Revoked => "revoked",
        RefreshTokenError::Expired => "expired",
        RefreshTokenError::Generation(_) | RefreshTokenError::Storage(_) => "error",
    }
}

fn record_outcome(name: &'static str, outcome: &'static str) {
    metrics::counter!(name, "outcome" => outcome).increment(1);
}
