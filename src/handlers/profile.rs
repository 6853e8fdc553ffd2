//! Handlers for the authenticated user's own lists.

use axum::{
    extract::{Path, State},
    Json,
};

use super::extract::AuthSession;
use super::shared_types::MessageResponse;
use crate::app_state::AppState;
use crate::domain::MarketError;
use crate::services::{parse_id, Profile};

pub async fn get_profile(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<Json<Profile>, MarketError> {
    // ---
    let profile = state.users().get_profile(session.user_id).await?;
    Ok(Json(profile))
}

#[tracing::instrument(skip(state, session), fields(user = %session.username))]
pub async fn buy_card(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(card_id): Path<String>,
) -> Result<Json<MessageResponse>, MarketError> {
    // ---
    let card_id = parse_id(&card_id)?;
    let card = state.users().buy(session.user_id, card_id).await?;

    Ok(Json(MessageResponse::with_card(
        "Card bought successfully",
        card.name,
    )))
}

#[tracing::instrument(skip(state, session), fields(user = %session.username))]
pub async fn sell_card(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(card_id): Path<String>,
) -> Result<Json<MessageResponse>, MarketError> {
    // ---
    let card_id = parse_id(&card_id)?;
    state.users().sell(session.user_id, card_id).await?;

    Ok(Json(MessageResponse::new("Card sold and moved to sold cards")))
}

pub async fn add_to_wishlist(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(card_id): Path<String>,
) -> Result<Json<MessageResponse>, MarketError> {
    // ---
    let card_id = parse_id(&card_id)?;
    let card = state.users().add_wishlist(session.user_id, card_id).await?;

    Ok(Json(MessageResponse::with_card(
        "Card added to wishlist",
        card.name,
    )))
}

pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    Path(card_id): Path<String>,
) -> Result<Json<MessageResponse>, MarketError> {
    // ---
    let card_id = parse_id(&card_id)?;
    state
        .users()
        .remove_wishlist(session.user_id, card_id)
        .await?;

    Ok(Json(MessageResponse::new("Card removed from wishlist")))
}
