//! Profile endpoint for the logged-in user.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use tracing::error;

use crate::auth::AuthUser;
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

pub fn routes() -> Router<AppState> {
    Router::new().route("/profile", get(profile))
}

/// Profile payload. Tokens are deliberately absent.
#[derive(Serialize)]
struct ProfileResponse {
    welcome: String,
    user_id: String,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    customer_id: String,
    phone_number: String,
}

/// Returns the authenticated user's profile together with their
/// customer record.
async fn profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<ProfileResponse>, HTTPError> {
    let customer = state
        .store
        .find_customer_by_user(&user.id)
        .await
        .map_err(|e| {
            error!("Store error loading customer profile: {}", e);
            HTTPError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Store error: {}", e),
            )
        })?
        .ok_or_else(|| {
            HTTPError::new(
                StatusCode::NOT_FOUND,
                "Customer profile not found for this user",
            )
        })?;

    Ok(Json(ProfileResponse {
        welcome: format!("Welcome, {}", user.full_name()),
        user_id: user.id,
        username: user.username,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        customer_id: customer.id,
        phone_number: customer.phone_number,
    }))
}
