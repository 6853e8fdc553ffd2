//! Signed bearer credentials (HS256 JWT).

use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::domain::MarketError;

/// Claims carried by a credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user identifier.
    pub sub: String,
    pub username: String,
    /// Issued at (Unix seconds).
    pub iat: i64,
    /// Expiry (Unix seconds).
    pub exp: i64,
}

/// Issues and verifies credentials with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("keys", &"[hidden]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenService {
    // ---
    pub fn new(secret: &str, ttl: Duration) -> Self {
        // ---
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret, config.token_ttl)
    }

    /// Signs a credential for the user, valid for the configured window.
    pub fn issue(&self, user_id: Uuid, username: &str) -> Result<String, MarketError> {
        // ---
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            iat: now,
            exp: now + self.ttl.as_secs() as i64,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| MarketError::operation(format!("Failed to sign credential: {e}")))
    }

    /// Verifies signature and expiry.
    ///
    /// A token that is not even a JWT is `Unauthenticated`; a JWT that
    /// fails verification is `InvalidCredential`.
    pub fn verify(&self, token: &str) -> Result<Claims, MarketError> {
        // ---
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Utf8(_) => {
                    MarketError::unauthenticated("Malformed token")
                }
                _ => MarketError::invalid_credential(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret-key-12345", Duration::from_secs(24 * 3600))
    }

    #[test]
    fn issue_then_verify_round_trips_identity() {
        // ---
        let user_id = Uuid::new_v4();
        let token = service().issue(user_id, "frodo").unwrap();

        let claims = service().verify(&token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.username, "frodo");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn wrong_secret_is_invalid_credential() {
        // ---
        let other = TokenService::new("another-secret", Duration::from_secs(3600));
        let token = other.issue(Uuid::new_v4(), "sam").unwrap();

        assert!(matches!(
            service().verify(&token),
            Err(MarketError::InvalidCredential { .. })
        ));
    }

    #[test]
    fn expired_token_is_invalid_credential() {
        // ---
        let past = Utc::now() - chrono::Duration::hours(1);
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            username: "merry".to_string(),
            iat: (past - chrono::Duration::hours(2)).timestamp(),
            exp: past.timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key-12345"),
        )
        .unwrap();

        assert!(matches!(
            service().verify(&token),
            Err(MarketError::InvalidCredential { .. })
        ));
    }

    #[test]
    fn garbage_is_unauthenticated() {
        // ---
        assert!(matches!(
            service().verify("not-a-token"),
            Err(MarketError::Unauthenticated { .. })
        ));
    }
}
