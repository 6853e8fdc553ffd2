use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

use crate::infrastructure::auth::TokenService;
use crate::infrastructure::{create_memory_repository, create_noop_metrics};

const SECRET: &str = "router-test-secret";

fn app() -> Router {
    // ---
    crate::build_router(
        create_memory_repository(),
        create_noop_metrics().unwrap(),
        TokenService::new(SECRET, Duration::from_secs(3600)),
    )
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    // ---
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, value)
}

/// Registers and logs in, returning the bearer token.
async fn sign_up(app: &Router, username: &str) -> String {
    // ---
    let email = format!("{username}@shire.me");
    let (status, _) = send(
        app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({ "username": username, "email": email, "password": "second-breakfast" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "email": email, "password": "second-breakfast" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], username);
    assert!(body["userId"].is_string());

    body["token"].as_str().unwrap().to_string()
}

async fn add_card(app: &Router, name: &str, price: f64) -> String {
    // ---
    let (status, body) = send(
        app,
        Method::POST,
        "/api/cards",
        None,
        Some(json!({ "name": name, "game": "Magic", "set": "Alpha", "price": price })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    body["insertedId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn register_login_and_profile() {
    // ---
    let app = app();
    let token = sign_up(&app, "frodo").await;

    let (status, profile) = send(&app, Method::GET, "/api/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["username"], "frodo");
    assert_eq!(profile["totalCards"], 0);
    assert_eq!(profile["wishlist"], json!([]));
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    // ---
    let app = app();
    sign_up(&app, "sam").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({ "username": "sam", "email": "other@shire.me", "password": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn incomplete_registration_is_rejected() {
    // ---
    let (status, body) = send(
        &app(),
        Method::POST,
        "/api/register",
        None,
        Some(json!({ "username": "merry" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "All fields are required");
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    // ---
    let app = app();
    sign_up(&app, "pippin").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({ "email": "pippin@shire.me", "password": "elevenses" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn credential_failures_map_to_401_and_403() {
    // ---
    let app = app();

    let (status, _) = send(&app, Method::GET, "/api/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/profile", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = TokenService::new("some-other-secret", Duration::from_secs(3600))
        .issue(Uuid::new_v4(), "gollum")
        .unwrap();
    let (status, body) = send(&app, Method::GET, "/api/profile", Some(&forged), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn lowercase_bearer_scheme_is_accepted() {
    // ---
    let app = app();
    let token = sign_up(&app, "rosie").await;

    let request = Request::builder()
        .uri("/api/profile")
        .header(header::AUTHORIZATION, format!("bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn valid_token_for_deleted_user_is_not_found() {
    // ---
    let token = TokenService::new(SECRET, Duration::from_secs(3600))
        .issue(Uuid::new_v4(), "ghost")
        .unwrap();

    let (status, body) = send(&app(), Method::GET, "/api/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn card_crud_round() {
    // ---
    let app = app();
    let id = add_card(&app, "Black Lotus", 100.0).await;
    let uri = format!("/api/cards/{id}");

    let (status, card) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(card["name"], "Black Lotus");
    assert_eq!(card["priceHistory"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        Method::PATCH,
        &uri,
        None,
        Some(json!({ "set": "Beta" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["modifiedCount"], 1);

    let (status, card) = send(
        &app,
        Method::PUT,
        &format!("{uri}/price"),
        None,
        Some(json!({ "price": 125.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(card["price"], 125.5);
    assert_eq!(card["set"], "Beta");
    assert_eq!(card["priceHistory"].as_array().unwrap().len(), 2);

    let (status, body) = send(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedCount"], 1);

    let (status, _) = send(&app, Method::DELETE, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_identifier_is_bad_request() {
    // ---
    let app = app();
    let token = sign_up(&app, "bilbo").await;

    let (status, body) = send(&app, Method::GET, "/api/cards/123abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid card ID format");

    let (status, _) = send(&app, Method::POST, "/api/buy/123abc", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bad_bodies_are_validation_errors() {
    // ---
    let app = app();
    let id = add_card(&app, "Mox Pearl", 10.0).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/cards")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/cards/{id}"),
        None,
        Some(json!({ "rarity": "mythic" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/cards/{id}/price"),
        None,
        Some(json!({ "price": -3.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn buy_sell_and_wishlist_flow() {
    // ---
    let app = app();
    let token = sign_up(&app, "gandalf").await;
    let lotus = add_card(&app, "Black Lotus", 100.0).await;
    let ruby = add_card(&app, "Mox Ruby", 40.0).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/wishlist/{lotus}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cardName"], "Black Lotus");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/buy/{lotus}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Card bought successfully");
    assert_eq!(body["cardName"], "Black Lotus");

    let (_, profile) = send(&app, Method::GET, "/api/profile", Some(&token), None).await;
    assert_eq!(profile["wishlist"], json!([]));
    assert_eq!(profile["bought"].as_array().unwrap().len(), 1);
    assert_eq!(profile["totalCards"], 1);
    assert_eq!(profile["totalValue"], 100.0);

    // Bought cards drop out of the default listing but stay in the catalog.
    let (_, unsold) = send(&app, Method::GET, "/api/cards", None, None).await;
    let names: Vec<_> = unsold
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Mox Ruby".to_string()]);

    let (_, all) = send(&app, Method::GET, "/api/cards?all=true", None, None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/sell/{lotus}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Card sold and moved to sold cards");

    // Owned cards cannot go back on the wishlist.
    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/wishlist/{lotus}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/wishlist/{ruby}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, profile) = send(&app, Method::GET, "/api/profile", Some(&token), None).await;
    assert_eq!(profile["bought"], json!([]));
    assert_eq!(profile["sold"][0]["name"], "Black Lotus");
}

#[tokio::test]
async fn buying_unknown_card_is_not_found() {
    // ---
    let app = app();
    let token = sign_up(&app, "aragorn").await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/buy/{}", Uuid::new_v4()),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Card not found");
}

#[tokio::test]
async fn simulate_reprices_cards() {
    // ---
    let app = app();
    let id = add_card(&app, "Time Walk", 50.0).await;

    let (status, body) = send(&app, Method::GET, "/api/simulate", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 1);
    assert!(body["message"].is_string());

    let (_, card) = send(&app, Method::GET, &format!("/api/cards/{id}"), None, None).await;
    let price = card["price"].as_f64().unwrap();
    assert!((45.0..=55.0).contains(&price));
    assert_eq!(card["priceHistory"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn popular_is_empty_for_fresh_cards() {
    // ---
    let app = app();
    add_card(&app, "Ancestral Recall", 30.0).await;

    let (status, body) = send(&app, Method::GET, "/api/popular", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn operational_routes_respond() {
    // ---
    let app = app();

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, Method::GET, "/health?mode=full", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, _) = send(&app, Method::GET, "/metrics", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&text).contains("/api/simulate"));
}
