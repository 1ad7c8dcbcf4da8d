//! Authentication-related models

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Password change request
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Result of a successful login
#[derive(Debug, Serialize)]
pub struct Session {
    pub subject: Uuid,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64, // seconds until access token expires
}

/// Fresh access token handed out by the refresh endpoint
#[derive(Debug, Serialize)]
pub struct AccessGrant {
    pub token: String,
    pub expires_in: u64,
}
