//! Credential extraction from request headers
//!
//! Two separate trust tiers, two separate headers:
//! - `Authorization: Bearer <token>` carries end-user access or refresh tokens
//! - `X-Api-Key: <key>` carries the server-to-server API key
//!
//! Neither extractor ever looks at the other tier's header.

use crate::error::CredentialError;
use axum::http::{header::AUTHORIZATION, HeaderMap};

/// Case-sensitive bearer scheme prefix
pub const BEARER_PREFIX: &str = "Bearer ";

/// Header carrying the service API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Extract the bearer token from the `Authorization` header.
///
/// A blank token after the prefix counts as missing.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, CredentialError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(CredentialError::Missing)
}

/// Extract the service API key from the `X-Api-Key` header
pub fn extract_api_key(headers: &HeaderMap) -> Result<&str, CredentialError> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or(CredentialError::Missing)
}
