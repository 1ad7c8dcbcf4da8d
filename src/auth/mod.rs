//! Authentication module

pub mod api_key;
pub mod credentials;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod refresh_token;

pub use api_key::ApiKeyVerifier;
pub use credentials::{extract_api_key, extract_bearer, API_KEY_HEADER, BEARER_PREFIX};
pub use jwt::{Claims, TokenSigner, ACCESS_TOKEN_ISSUER};
pub use middleware::{require_service, require_user, AuthUser};
pub use password::{PasswordHasher, PasswordPolicy};
pub use refresh_token::RefreshTokenStore;
