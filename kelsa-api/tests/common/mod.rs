//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - An app wired to the in-memory store and the mock gateway
//! - Test user creation with JWT tokens
//! - JSON request helpers
//! - Gateway signatures computed independently of the server

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use hmac::{Hmac, Mac};
use kelsa_api::app::{build_router, AppState};
use kelsa_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig, PaymentConfig};
use kelsa_shared::auth::jwt::{create_token, Claims, TokenType};
use kelsa_shared::models::user::CreateUser;
use kelsa_shared::payment::mock::MockGateway;
use kelsa_shared::store::memory::MemoryStore;
use kelsa_shared::store::UserStore;
use serde_json::Value;
use sha2::Sha256;
use std::sync::Arc;
use tower::Service as _;
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const KEY_SECRET: &str = "rzp_test_secret";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub gateway: Arc<MockGateway>,
    pub app: axum::Router,
}

impl TestContext {
    /// App with a configured gateway secret
    pub fn new() -> Self {
        Self::with_key_secret(Some(KEY_SECRET))
    }

    pub fn with_key_secret(key_secret: Option<&str>) -> Self {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: "postgresql://unused".to_string(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: JWT_SECRET.to_string(),
            },
            payment: PaymentConfig {
                key_id: Some("rzp_test_key".to_string()),
                key_secret: key_secret.map(str::to_string),
                ..Default::default()
            },
        };

        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(MockGateway::new());
        let state = AppState::new(store.clone(), gateway.clone(), config);

        TestContext {
            store,
            gateway,
            app: build_router(state),
        }
    }

    /// Creates a user directly in the store and returns it with an access token
    pub async fn user(&self, email: &str) -> TestUser {
        let user = self
            .store
            .create_user(CreateUser {
                email: email.to_string(),
                password_hash: "not-used".to_string(),
                name: None,
            })
            .await
            .expect("Failed to create user");

        let claims = Claims::new(user.id, TokenType::Access);
        let token = create_token(&claims, JWT_SECRET).expect("Failed to create token");

        TestUser { id: user.id, token }
    }

    /// Sends a JSON request and returns the status with the parsed body
    ///
    /// Empty bodies come back as `Value::Null`.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("Non-JSON body ({}): {}", status, String::from_utf8_lossy(&bytes))
            })
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send("GET", uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, token, Some(body)).await
    }
}

/// A user with a valid access token
pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

/// Signature the gateway would send for a completed payment
pub fn gateway_signature(secret: &str, order_id: &str, payment_id: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// IDs of the board's lists in display order
pub fn list_ids(board: &Value) -> Vec<String> {
    board["lists"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["id"].as_str().unwrap().to_string())
        .collect()
}

/// IDs of the cards in one list, in display order
pub fn card_ids_in(board: &Value, list_id: &str) -> Vec<String> {
    let mut cards: Vec<&Value> = board["cards"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|c| c["list_id"] == list_id)
        .collect();
    cards.sort_by_key(|c| c["position"].as_i64().unwrap());
    cards
        .iter()
        .map(|c| c["id"].as_str().unwrap().to_string())
        .collect()
}
