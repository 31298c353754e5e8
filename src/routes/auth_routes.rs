//! Login, OAuth callback and token refresh endpoint handlers.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, routing::post, Json, Router};
use http::header::{LOCATION, SET_COOKIE};
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::auth::cookie::{
    auth_cookie, read_cookie, ACCESS_TOKEN_COOKIE, ACCESS_TOKEN_MAX_AGE_SECS,
    REFRESH_TOKEN_COOKIE, REFRESH_TOKEN_MAX_AGE_SECS,
};
use crate::auth::{AuthError, ProviderOperation};
use crate::models::{Customer, User};
use crate::state::AppState;

/// Registers the login and token lifecycle routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(login_page))
        .route("/oauth", get(login_page))
        .route("/accounts/login", get(google_login))
        .route("/accounts/google/login/callback", get(google_callback))
        .route("/refresh-token", post(refresh_token))
}

#[derive(Serialize)]
struct LoginMessage {
    msg: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct ExchangeErrorResponse {
    error: String,
    details: Value,
}

#[derive(Serialize)]
struct RefreshResponse {
    success: bool,
}

#[derive(Deserialize)]
struct LoginParams {
    state: Option<String>,
}

#[derive(Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
}

/// Landing page, also served at /oauth.
async fn login_page() -> Json<LoginMessage> {
    Json(LoginMessage {
        msg: "Hello, world. You're at the login page.".to_string(),
    })
}

/// Redirects the browser to the provider's consent screen. An optional
/// `state` query parameter is passed through to the provider untouched.
async fn google_login(
    State(state): State<AppState>,
    Query(params): Query<LoginParams>,
) -> Response {
    let url = state.oauth.authorization_url(params.state.as_deref());
    found_redirect(&url)
}

/// Handles the provider callback: exchanges the code, resolves the
/// profile to a local account, persists the tokens, and issues the
/// token cookies before redirecting to the profile page.
async fn google_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    match callback_flow(&state, params).await {
        Ok(response) => response,
        Err(e) => callback_error_response(e),
    }
}

async fn callback_flow(state: &AppState, params: CallbackParams) -> Result<Response, AuthError> {
    let code = params
        .code
        .filter(|code| !code.is_empty())
        .ok_or(AuthError::MissingCode)?;

    if let Some(oauth_state) = &params.state {
        debug!("OAuth callback carried state '{}'", oauth_state);
    }

    let tokens = state.oauth.exchange_code(&code).await?;
    let profile = state.oauth.fetch_profile(&tokens.access_token).await?;

    // Both provider calls succeeded; only now touch the store. Profiles
    // without an email cannot be linked to an account and are skipped.
    if let Some(email) = profile.email.as_deref().filter(|email| !email.is_empty()) {
        let user = match state
            .store
            .find_user_by_email(email)
            .await
            .map_err(AuthError::Store)?
        {
            Some(user) => {
                debug!("Found existing user '{}' for OAuth login", user.username);
                user
            }
            None => {
                let user = User::new(
                    email.to_string(),
                    profile.given_name.clone(),
                    profile.family_name.clone(),
                );
                info!("Creating user '{}' on first OAuth login", user.username);
                state
                    .store
                    .create_user(&user)
                    .await
                    .map_err(AuthError::Store)?
            }
        };

        let customer = state
            .store
            .upsert_customer(&Customer::new(user.id.clone()))
            .await
            .map_err(AuthError::Store)?;

        // A token response without a refresh token leaves the stored
        // refresh token in place.
        state
            .store
            .update_customer_tokens(
                &customer.id,
                &tokens.access_token,
                tokens.refresh_token.as_deref(),
            )
            .await
            .map_err(AuthError::Store)?;
    }

    let mut response = found_redirect(&state.config.profile_redirect);
    append_cookie(
        &mut response,
        auth_cookie(
            ACCESS_TOKEN_COOKIE,
            &tokens.access_token,
            ACCESS_TOKEN_MAX_AGE_SECS,
        ),
    );
    if let Some(refresh) = &tokens.refresh_token {
        append_cookie(
            &mut response,
            auth_cookie(REFRESH_TOKEN_COOKIE, refresh, REFRESH_TOKEN_MAX_AGE_SECS),
        );
    }

    Ok(response)
}

/// Refreshes the access token from the refresh token cookie. On success
/// the stored access token is overwritten and a fresh cookie is issued;
/// the stored refresh token is never touched here.
async fn refresh_token(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match refresh_flow(&state, &headers).await {
        Ok(response) => response,
        Err(e) => refresh_error_response(e),
    }
}

async fn refresh_flow(state: &AppState, headers: &HeaderMap) -> Result<Response, AuthError> {
    let refresh_token =
        read_cookie(headers, REFRESH_TOKEN_COOKIE).ok_or(AuthError::MissingRefreshToken)?;

    let tokens = state.oauth.refresh(&refresh_token).await?;

    // The presented refresh token must match a stored one exactly;
    // tokens the provider still accepts but we no longer hold are
    // rejected without any store mutation.
    let customer = state
        .store
        .find_customer_by_refresh_token(&refresh_token)
        .await
        .map_err(AuthError::Store)?
        .ok_or(AuthError::InvalidRefreshToken)?;

    state
        .store
        .update_customer_tokens(&customer.id, &tokens.access_token, None)
        .await
        .map_err(AuthError::Store)?;

    let mut response = (
        StatusCode::OK,
        Json(RefreshResponse { success: true }),
    )
        .into_response();
    append_cookie(
        &mut response,
        auth_cookie(
            ACCESS_TOKEN_COOKIE,
            &tokens.access_token,
            ACCESS_TOKEN_MAX_AGE_SECS,
        ),
    );

    Ok(response)
}

/// Build a 302 redirect to the given location.
fn found_redirect(location: &str) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::FOUND;
    if let Ok(header_value) = location.parse() {
        response.headers_mut().insert(LOCATION, header_value);
    }
    response
}

/// Append a Set-Cookie header to the response.
fn append_cookie(response: &mut Response, cookie_value: String) {
    if let Ok(header_value) = cookie_value.parse() {
        response.headers_mut().append(SET_COOKIE, header_value);
    }
}

fn callback_error_response(error: AuthError) -> Response {
    match error {
        AuthError::MissingCode => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "No code received".to_string(),
            }),
        )
            .into_response(),
        AuthError::Provider {
            operation: ProviderOperation::CodeExchange,
            body,
            ..
        } => {
            let details = serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body));
            (
                StatusCode::BAD_REQUEST,
                Json(ExchangeErrorResponse {
                    error: "Failed to exchange code for tokens".to_string(),
                    details,
                }),
            )
                .into_response()
        }
        AuthError::Transport {
            operation: ProviderOperation::CodeExchange,
            message,
        } => (
            StatusCode::BAD_REQUEST,
            Json(ExchangeErrorResponse {
                error: "Failed to exchange code for tokens".to_string(),
                details: Value::String(message),
            }),
        )
            .into_response(),
        AuthError::Provider {
            operation: ProviderOperation::ProfileFetch,
            ..
        }
        | AuthError::Transport {
            operation: ProviderOperation::ProfileFetch,
            ..
        } => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Failed to get user info".to_string(),
            }),
        )
            .into_response(),
        AuthError::Store(e) => {
            error!("Store error during login callback: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Store error: {}", e),
                }),
            )
                .into_response()
        }
        other => {
            error!("Unexpected error during login callback: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: other.to_string(),
                }),
            )
                .into_response()
        }
    }
}

fn refresh_error_response(error: AuthError) -> Response {
    match error {
        AuthError::MissingRefreshToken => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "No refresh token".to_string(),
            }),
        )
            .into_response(),
        AuthError::Provider {
            operation: ProviderOperation::TokenRefresh,
            ..
        }
        | AuthError::Transport {
            operation: ProviderOperation::TokenRefresh,
            ..
        } => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Failed to refresh token".to_string(),
            }),
        )
            .into_response(),
        AuthError::InvalidRefreshToken => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Invalid refresh token".to_string(),
            }),
        )
            .into_response(),
        AuthError::Store(e) => {
            error!("Store error during token refresh: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Store error: {}", e),
                }),
            )
                .into_response()
        }
        other => {
            error!("Unexpected error during token refresh: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: other.to_string(),
                }),
            )
                .into_response()
        }
    }
}
