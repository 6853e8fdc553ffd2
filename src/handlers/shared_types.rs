use crate::domain::MarketError;
use axum::extract::FromRequest;
use serde::Serialize;

/// JSON body extractor whose rejections use the `{ "error": ... }` shape
/// and a 400 status.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(MarketError))]
pub struct ApiJson<T>(pub T);

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Acknowledgement for list actions.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_name: Option<String>,
}

impl MessageResponse {
    // ---
    pub fn new(message: &'static str) -> Self {
        Self {
            message,
            card_name: None,
        }
    }

    pub fn with_card(message: &'static str, card_name: String) -> Self {
        Self {
            message,
            card_name: Some(card_name),
        }
    }
}
