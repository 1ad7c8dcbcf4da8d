//! Credential models

use std::fmt;
use uuid::Uuid;

/// Stored login credential: owner plus Argon2 PHC digest
#[derive(Clone, sqlx::FromRow)]
pub struct Credential {
    #[sqlx(rename = "id")]
    pub owner_id: Uuid,
    #[sqlx(rename = "hashed_password")]
    pub digest: String,
}

// The digest never shows up in logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("owner_id", &self.owner_id)
            .field("digest", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_digest() {
        let credential = Credential {
            owner_id: Uuid::new_v4(),
            digest: "$argon2id$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA".to_string(),
        };

        let rendered = format!("{:?}", credential);
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("argon2id"));
    }
}
