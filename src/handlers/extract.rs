use axum::{extract::FromRequestParts, http::request::Parts};

use crate::app_state::AppState;
use crate::domain::MarketError;
use crate::session::{extract_bearer, SessionInfo};

/// Extractor that requires a valid bearer credential.
///
/// On success the decoded identity is also stored in the request
/// extensions for any later layer that wants it.
#[derive(Debug, Clone)]
pub struct AuthSession(pub SessionInfo);

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = MarketError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // ---
        let token = extract_bearer(&parts.headers)?;
        let session = state.auth().authenticate(token)?;

        tracing::debug!("Authenticated {} ({})", session.username, session.user_id);
        parts.extensions.insert(session.clone());

        Ok(AuthSession(session))
    }
}
