//! Health check endpoint.

use crate::state::AppState;
use axum::{
    Router,
    body::Body,
    response::{IntoResponse, Response},
    routing::get,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Liveness probe. Answers 200 OK whenever the server is up; it does
/// not touch the store or the OAuth provider.
async fn health_check() -> impl IntoResponse {
    Response::new(Body::from("OK"))
}
