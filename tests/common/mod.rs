// Test helpers are intentionally partially used
#![allow(dead_code)]

use card_market::create_router;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Once;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::sleep;

macro_rules! set_env_if_unset {
    // ---
    ($key:expr, $val:expr) => {
        if std::env::var($key).is_err() {
            std::env::set_var($key, $val);
        }
    };
}

static INIT: Once = Once::new();

// ============================================================================
// Test Setup
// ============================================================================

/// Initialize test environment variables once.
///
/// End-to-end tests run against the in-memory store, so every server
/// starts with an empty catalog.
pub async fn setup_test_env() {
    // ---
    INIT.call_once(|| {
        // ---
        std::env::set_var("MARKET_STORE", "memory");
        set_env_if_unset!("JWT_SECRET", "integration-test-secret");
        set_env_if_unset!("MARKET_METRICS_TYPE", "noop");
    });
}

pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub client: Client,
}

impl TestServer {
    // ---
    pub async fn new() -> Self {
        // --
        setup_test_env().await;

        let app = create_router().expect("Should be able to create router");
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start
        sleep(Duration::from_millis(100)).await;

        let client = Client::new();

        Self { addr, client }
    }

    pub fn url(&self, path: &str) -> String {
        // ---
        format!("http://{}{}", self.addr, path)
    }

    /// Registers an account and logs in, returning the bearer token.
    pub async fn sign_up(&self, username: &str) -> String {
        // ---
        let email = format!("{username}@rivendell.me");

        let res = self
            .client
            .post(self.url("/api/register"))
            .json(&json!({ "username": username, "email": email, "password": "mithril" }))
            .send()
            .await
            .expect("Failed to register");
        assert_eq!(res.status(), reqwest::StatusCode::CREATED);

        let res = self
            .client
            .post(self.url("/api/login"))
            .json(&json!({ "email": email, "password": "mithril" }))
            .send()
            .await
            .expect("Failed to log in");
        assert!(res.status().is_success());

        let body: Value = res.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    /// Adds a card to the catalog, returning its id.
    pub async fn add_card(&self, name: &str, price: f64) -> String {
        // ---
        let res = self
            .client
            .post(self.url("/api/cards"))
            .json(&json!({ "name": name, "game": "Pokemon", "set": "Base", "price": price }))
            .send()
            .await
            .expect("Failed to add card");
        assert_eq!(res.status(), reqwest::StatusCode::CREATED);

        let body: Value = res.json().await.unwrap();
        body["insertedId"].as_str().unwrap().to_string()
    }
}
