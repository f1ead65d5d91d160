#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use loyalty_domain::nft::{NftPoints, NftPointsResolver};
use loyalty_domain::shared::{DomainError, WalletAddress};
use loyalty_infrastructure::persistence::Database;
use loyalty_lib::presentation::bootstrap::wire_app_state;
use loyalty_lib::presentation::router;

/// Resolver that answers every wallet the same way
pub struct StubResolver {
    points: Option<NftPoints>,
}

impl StubResolver {
    pub fn returning(points: NftPoints) -> Self {
        Self {
            points: Some(points),
        }
    }

    pub fn failing() -> Self {
        Self { points: None }
    }
}

#[async_trait]
impl NftPointsResolver for StubResolver {
    async fn resolve(&self, _wallet_address: &WalletAddress) -> Result<NftPoints, DomainError> {
        self.points
            .clone()
            .ok_or_else(|| DomainError::ExternalService("resolver unavailable".to_string()))
    }
}

/// Router over a fresh in-memory database with migrations applied
pub async fn test_app(resolver: StubResolver) -> Router {
    let database = Database::in_memory()
        .await
        .expect("Failed to create in-memory database");
    database
        .run_migrations()
        .await
        .expect("Failed to run migrations");

    let state = wire_app_state(Arc::new(database.pool().clone()), Arc::new(resolver));
    router(state)
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Router should not fail");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub async fn post_json(app: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("Invalid request");
    send(app, request).await
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).expect("Invalid request");
    send(app, request).await
}

pub async fn check_in(app: &Router, wallet: &str) -> (StatusCode, Value) {
    post_json(app, "/check-in", &format!(r#"{{"wallet_address":"{}"}}"#, wallet)).await
}
