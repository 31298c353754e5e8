//! Customer record endpoints, scoped to the authenticated user.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::auth::AuthUser;
use crate::models::Customer;
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/customers", get(list_customers).post(create_customer))
        .route(
            "/api/customers/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}

/// Customer payload returned by the API. The stored provider tokens
/// never leave the store through these endpoints.
#[derive(Serialize)]
struct CustomerResponse {
    id: String,
    user_id: String,
    phone_number: String,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        CustomerResponse {
            id: customer.id,
            user_id: customer.user_id,
            phone_number: customer.phone_number,
        }
    }
}

#[derive(Deserialize)]
struct CustomerPayload {
    phone_number: Option<String>,
}

fn map_store_error(e: String) -> HTTPError {
    error!("Store error: {}", e);
    HTTPError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Store error: {}", e),
    )
}

fn empty_phone_response() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"phone_number": "Phone number cannot be empty"})),
    )
        .into_response()
}

/// Lists the caller's customer records. A user has at most one, so the
/// list holds zero or one entries.
async fn list_customers(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<CustomerResponse>>, HTTPError> {
    let customers = state
        .store
        .find_customer_by_user(&user.id)
        .await
        .map_err(map_store_error)?
        .into_iter()
        .map(CustomerResponse::from)
        .collect();
    Ok(Json(customers))
}

/// Creates the caller's customer record, or updates the phone number on
/// the existing one.
async fn create_customer(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CustomerPayload>,
) -> Result<Response, HTTPError> {
    if let Some(phone) = &payload.phone_number {
        if phone.trim().is_empty() {
            return Ok(empty_phone_response());
        }
    }

    let existing = state
        .store
        .find_customer_by_user(&user.id)
        .await
        .map_err(map_store_error)?;

    match existing {
        Some(customer) => {
            let customer = match payload.phone_number {
                Some(phone) => state
                    .store
                    .update_customer_phone(&customer.id, &phone)
                    .await
                    .map_err(map_store_error)?,
                None => customer,
            };
            Ok((StatusCode::OK, Json(CustomerResponse::from(customer))).into_response())
        }
        None => {
            let mut customer = Customer::new(user.id.clone());
            if let Some(phone) = payload.phone_number {
                customer.phone_number = phone;
            }
            let created = state
                .store
                .upsert_customer(&customer)
                .await
                .map_err(map_store_error)?;
            Ok((StatusCode::CREATED, Json(CustomerResponse::from(created))).into_response())
        }
    }
}

async fn get_customer(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<CustomerResponse>, HTTPError> {
    let customer = owned_customer(&state, &user.id, &id).await?;
    Ok(Json(CustomerResponse::from(customer)))
}

async fn update_customer(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<CustomerPayload>,
) -> Result<Response, HTTPError> {
    if let Some(phone) = &payload.phone_number {
        if phone.trim().is_empty() {
            return Ok(empty_phone_response());
        }
    }

    let customer = owned_customer(&state, &user.id, &id).await?;

    let customer = match payload.phone_number {
        Some(phone) => state
            .store
            .update_customer_phone(&customer.id, &phone)
            .await
            .map_err(map_store_error)?,
        None => customer,
    };

    Ok((StatusCode::OK, Json(CustomerResponse::from(customer))).into_response())
}

/// Deletes the customer record along with all of its orders.
async fn delete_customer(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, HTTPError> {
    let customer = owned_customer(&state, &user.id, &id).await?;

    state
        .store
        .delete_customer(&customer.id)
        .await
        .map_err(map_store_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Looks up a customer by id, treating records owned by other users as
/// absent.
async fn owned_customer(
    state: &AppState,
    user_id: &str,
    customer_id: &str,
) -> Result<Customer, HTTPError> {
    state
        .store
        .find_customer_by_id(customer_id)
        .await
        .map_err(map_store_error)?
        .filter(|customer| customer.user_id == user_id)
        .ok_or_else(|| HTTPError::new(StatusCode::NOT_FOUND, "Customer not found"))
}
