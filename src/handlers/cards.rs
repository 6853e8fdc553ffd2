use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared_types::ApiJson;
use crate::app_state::AppState;
use crate::domain::{Card, CardPatch, MarketError, NewCard};
use crate::services::parse_id;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// `true` returns the whole catalog instead of the unsold view.
    #[serde(default)]
    pub all: bool,
}

#[derive(Debug, Deserialize)]
pub struct PriceRequest {
    pub price: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertedResponse {
    pub inserted_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifiedResponse {
    pub modified_count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedResponse {
    pub deleted_count: u64,
}

pub async fn list_cards(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Card>>, MarketError> {
    // ---
    let Query(query) = query?;

    let cards = if query.all {
        state.cards().list().await?
    } else {
        state.cards().list_unsold().await?
    };

    Ok(Json(cards))
}

pub async fn popular_cards(State(state): State<AppState>) -> Result<Json<Vec<Card>>, MarketError> {
    // ---
    Ok(Json(state.cards().list_popular().await?))
}

pub async fn get_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Card>, MarketError> {
    // ---
    let card = state.cards().get(parse_id(&id)?).await?;
    Ok(Json(card))
}

#[tracing::instrument(skip(state, new_card), fields(name = %new_card.name))]
pub async fn create_card(
    State(state): State<AppState>,
    ApiJson(new_card): ApiJson<NewCard>,
) -> Result<(StatusCode, Json<InsertedResponse>), MarketError> {
    // ---
    let card = state.cards().create(new_card).await?;
    state.metrics().record_card_created();

    Ok((
        StatusCode::CREATED,
        Json(InsertedResponse {
            inserted_id: card.id,
        }),
    ))
}

pub async fn patch_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<CardPatch>,
) -> Result<Json<ModifiedResponse>, MarketError> {
    // ---
    let modified_count = state.cards().patch(parse_id(&id)?, patch).await?;
    Ok(Json(ModifiedResponse { modified_count }))
}

pub async fn update_card_price(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<PriceRequest>,
) -> Result<Json<Card>, MarketError> {
    // ---
    let card = state
        .cards()
        .update_price(parse_id(&id)?, request.price)
        .await?;
    Ok(Json(card))
}

pub async fn delete_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, MarketError> {
    // ---
    let deleted_count = state.cards().delete(parse_id(&id)?).await?;
    Ok(Json(DeletedResponse { deleted_count }))
}
