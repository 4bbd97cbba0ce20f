//! HTTP health probe, served on its own port so load balancers never
//! have to speak WebSocket.

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::ServerError;

pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// Binds `addr` and serves the health router until the process exits.
pub async fn serve(addr: &str) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr, "health endpoint listening");
    axum::serve(listener, router()).await?;
    Ok(())
}
