use axum::response::IntoResponse;

pub async fn root_handler() -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION");
    format!(
        r#"Welcome to the Card Market API
Version: {version}

Available endpoints:
  - POST   /api/register              - Create an account
  - POST   /api/login                 - Obtain a bearer token
  - GET    /api/profile               - Wishlist, bought and sold cards (auth)
  - POST   /api/buy/{{cardId}}          - Buy a card (auth)
  - POST   /api/sell/{{cardId}}         - Sell a card (auth)
  - POST   /api/wishlist/{{cardId}}     - Add a card to the wishlist (auth)
  - DELETE /api/wishlist/{{cardId}}     - Remove a card from the wishlist (auth)
  - GET    /api/cards                 - Unsold cards (?all=true for the full catalog)
  - POST   /api/cards                 - Add a card
  - GET    /api/cards/{{id}}            - Fetch a card
  - PATCH  /api/cards/{{id}}            - Update card fields
  - PUT    /api/cards/{{id}}/price      - Set a new price
  - DELETE /api/cards/{{id}}            - Remove a card
  - GET    /api/popular               - Cards up at least 20 over ten days
  - GET    /api/simulate              - Run one market simulation pass
  - GET    /health                    - Light health check
  - GET    /health?mode=full          - Full health check (includes the store)
  - GET    /metrics                   - Prometheus metrics
"#
    )
}
