//! Authentication types for JWT and tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: Uuid, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }
}

/// Registration and login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsRequest {
    /// User login.
    pub login: String,
    /// User password.
    pub password: String,
}

impl CredentialsRequest {
    /// Rejects empty login or password.
    ///
    /// # Errors
    ///
    /// Returns a message naming the empty field.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.login.trim().is_empty() {
            return Err("login is empty");
        }
        if self.password.is_empty() {
            return Err("password is empty");
        }
        Ok(())
    }
}

/// Response returned after successful registration or login.
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    /// Bearer token.
    pub access_token: String,
    /// Token expiration in seconds.
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_validation() {
        let ok = CredentialsRequest {
            login: "alice".into(),
            password: "secret".into(),
        };
        assert!(ok.validate().is_ok());

        let no_login = CredentialsRequest {
            login: "  ".into(),
            password: "secret".into(),
        };
        assert_eq!(no_login.validate(), Err("login is empty"));

        let no_password = CredentialsRequest {
            login: "alice".into(),
            password: String::new(),
        };
        assert_eq!(no_password.validate(), Err("password is empty"));
    }

    #[test]
    fn test_claims_user_id() {
        let id = Uuid::new_v4();
        let claims = Claims::new(id, Utc::now() + chrono::Duration::hours(24));
        assert_eq!(claims.user_id(), id);
        assert!(claims.exp > claims.iat);
    }
}
