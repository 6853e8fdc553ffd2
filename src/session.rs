//! Bearer-credential sessions for authenticated users.
//!
//! A session is nothing more than the identity decoded from a verified
//! credential; no server-side state is kept.

use axum::http::{header, HeaderMap};
use uuid::Uuid;

use crate::domain::MarketError;
use crate::infrastructure::auth::Claims;

// ---

/// Identity attached to a request once its credential checks out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    //
    pub user_id: Uuid,
    pub username: String,
}

impl TryFrom<Claims> for SessionInfo {
    type Error = MarketError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        // ---
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| MarketError::invalid_credential("Credential subject is not a user id"))?;

        Ok(Self {
            user_id,
            username: claims.username,
        })
    }
}

// ---

/// Pulls the token out of an `Authorization: Bearer <token>` header.
///
/// # Errors
/// `Unauthenticated` when the header is missing, not valid ASCII, uses
/// another scheme, or carries an empty token. The scheme is matched
/// without regard to case.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, MarketError> {
    // ---
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| {
            tracing::debug!("Missing Authorization header");
            MarketError::unauthenticated("Missing token")
        })?
        .to_str()
        .map_err(|_| MarketError::unauthenticated("Invalid Authorization header"))?;

    let token = value
        .split_once(' ')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("Bearer"))
        .map(|(_, token)| token.trim())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            tracing::debug!("Authorization header missing Bearer token");
            MarketError::unauthenticated("Missing token")
        })?;

    Ok(token)
}
