//! Mapping of `MarketError` onto HTTP responses.
//!
//! Clients get a status code and a short message. Server-side faults are
//! logged in full and reported with a generic message.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::shared_types::ErrorResponse;
use crate::domain::MarketError;

pub(crate) fn status_for(err: &MarketError) -> StatusCode {
    // ---
    match err {
        MarketError::Validation { .. } | MarketError::InvalidIdentifier { .. } => {
            StatusCode::BAD_REQUEST
        }
        MarketError::Unauthenticated { .. } | MarketError::InvalidCredentials => {
            StatusCode::UNAUTHORIZED
        }
        MarketError::InvalidCredential { .. } => StatusCode::FORBIDDEN,
        MarketError::NotFound { .. } => StatusCode::NOT_FOUND,
        MarketError::Conflict { .. } => StatusCode::CONFLICT,
        MarketError::Connection { .. } | MarketError::Operation { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn client_message(err: &MarketError) -> String {
    // ---
    match err {
        MarketError::Validation { message }
        | MarketError::Unauthenticated { message }
        | MarketError::NotFound { message }
        | MarketError::InvalidIdentifier { message }
        | MarketError::Conflict { message } => message.clone(),
        MarketError::InvalidCredential { .. } => "Invalid token".to_string(),
        MarketError::InvalidCredentials => "Invalid credentials".to_string(),
        MarketError::Connection { .. } | MarketError::Operation { .. } => {
            "Internal server error".to_string()
        }
    }
}

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        // ---
        let status = status_for(&self);

        if self.is_internal() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self);
        }

        let body = ErrorResponse {
            error: client_message(&self),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for MarketError {
    fn from(rejection: JsonRejection) -> Self {
        MarketError::validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for MarketError {
    fn from(rejection: QueryRejection) -> Self {
        MarketError::validation(format!("Invalid query: {}", rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn taxonomy_maps_to_expected_statuses() {
        // ---
        let cases = [
            (MarketError::validation("x"), StatusCode::BAD_REQUEST),
            (MarketError::invalid_identifier("x"), StatusCode::BAD_REQUEST),
            (MarketError::unauthenticated("x"), StatusCode::UNAUTHORIZED),
            (MarketError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (MarketError::invalid_credential("x"), StatusCode::FORBIDDEN),
            (MarketError::not_found("x"), StatusCode::NOT_FOUND),
            (MarketError::conflict("x"), StatusCode::CONFLICT),
            (MarketError::operation("x"), StatusCode::INTERNAL_SERVER_ERROR),
            (MarketError::connection("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(status_for(&err), expected, "{err:?}");
        }
    }

    #[test]
    fn internal_details_are_not_leaked() {
        // ---
        let err = MarketError::operation("password authentication failed for user admin");
        assert_eq!(client_message(&err), "Internal server error");
    }
}
