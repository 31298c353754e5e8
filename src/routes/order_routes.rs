//! Order endpoints, scoped to the authenticated user's customer record.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use crate::auth::AuthUser;
use crate::models::{Customer, Order};
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(list_orders).post(create_order))
        .route(
            "/api/orders/:id",
            get(get_order).put(update_order).delete(delete_order),
        )
}

#[derive(Deserialize)]
struct OrderPayload {
    total_amount: f64,
}

fn map_store_error(e: String) -> HTTPError {
    error!("Store error: {}", e);
    HTTPError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Store error: {}", e),
    )
}

/// Lists the caller's orders, newest last. Users without a customer
/// record have no orders.
async fn list_orders(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Order>>, HTTPError> {
    let customer = state
        .store
        .find_customer_by_user(&user.id)
        .await
        .map_err(map_store_error)?;

    let orders = match customer {
        Some(customer) => state
            .store
            .orders_for_customer(&customer.id)
            .await
            .map_err(map_store_error)?,
        None => Vec::new(),
    };

    Ok(Json(orders))
}

/// Places an order for the caller's customer record and sends the
/// confirmation SMS. A failed SMS never fails the order.
async fn create_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<OrderPayload>,
) -> Result<Response, HTTPError> {
    let customer = match state
        .store
        .find_customer_by_user(&user.id)
        .await
        .map_err(map_store_error)?
    {
        Some(customer) => customer,
        None => {
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(json!({"customer": "Customer not found for this user"})),
            )
                .into_response());
        }
    };

    if customer.phone_number.trim().is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({"phone_number": "Customer must have a phone number to place orders"})),
        )
            .into_response());
    }

    let order = state
        .store
        .create_order(&Order::new(customer.id.clone(), payload.total_amount))
        .await
        .map_err(map_store_error)?;

    if let Err(e) = state.sms.send_order_confirmation(&user, &customer, &order).await {
        warn!("Failed to send confirmation SMS for order '{}': {}", order.order_code, e);
    }

    Ok((StatusCode::CREATED, Json(order)).into_response())
}

async fn get_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Order>, HTTPError> {
    let (order, _) = owned_order(&state, &user.id, &id).await?;
    Ok(Json(order))
}

async fn update_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<OrderPayload>,
) -> Result<Json<Order>, HTTPError> {
    let (order, _) = owned_order(&state, &user.id, &id).await?;

    let order = state
        .store
        .update_order_amount(&order.id, payload.total_amount)
        .await
        .map_err(map_store_error)?;

    Ok(Json(order))
}

async fn delete_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, HTTPError> {
    let (order, _) = owned_order(&state, &user.id, &id).await?;

    state
        .store
        .delete_order(&order.id)
        .await
        .map_err(map_store_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Looks up an order by id, treating orders that belong to another
/// user's customer record as absent.
async fn owned_order(
    state: &AppState,
    user_id: &str,
    order_id: &str,
) -> Result<(Order, Customer), HTTPError> {
    let customer = state
        .store
        .find_customer_by_user(user_id)
        .await
        .map_err(map_store_error)?
        .ok_or_else(|| HTTPError::new(StatusCode::NOT_FOUND, "Order not found"))?;

    let order = state
        .store
        .find_order(order_id)
        .await
        .map_err(map_store_error)?
        .filter(|order| order.customer_id == customer.id)
        .ok_or_else(|| HTTPError::new(StatusCode::NOT_FOUND, "Order not found"))?;

    Ok((order, customer))
}
