use std::net::SocketAddr;

use axum::async_trait;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::auth::{AuthError, AuthUser};
use crate::state::AppState;

/// A general purpose HTTP error type that can be converted into an `IntoResponse`.
pub struct HTTPError {
    status: StatusCode,
    message: String,
}

impl HTTPError {
    /// Creates a new HTTP error with the given status code and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        HTTPError {
            status,
            message: message.into(),
        }
    }
}

/// Converts our `HTTPError` into an HTTP response.
impl IntoResponse for HTTPError {
    fn into_response(self) -> Response {
        let body = format!("{{\"error\": \"{}\"}}", self.message);
        Response::builder()
            .status(self.status)
            .header("Content-Type", "application/json")
            .body(body.into())
            .unwrap()
    }
}

/// Extractor implementation: tries to convert the request parts into an
/// `AuthUser`. This reads the access token cookie and calls
/// `CookieAuth::authenticate`; routes using this extractor reject
/// anonymous requests.
#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = HTTPError;
    async fn from_request_parts<'a, 'b>(
        parts: &'a mut http::request::Parts,
        state: &'b AppState,
    ) -> Result<AuthUser, HTTPError> {
        // Get the client IP for logging purposes
        let client_ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| {
                tracing::warn!("Unable to determine client IP address.");
                "unknown".to_string()
            });

        tracing::debug!("Authenticating request from IP='{}'", client_ip);

        match state.auth.authenticate(&parts.headers).await {
            Ok(Some(user)) => Ok(AuthUser(user)),
            Ok(None) => Err(HTTPError::new(
                http::StatusCode::UNAUTHORIZED,
                "Unauthorized access",
            )),
            Err(AuthError::Store(e)) => {
                tracing::error!("Store error during authentication: {}", e);
                Err(HTTPError::new(
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Authentication backend unavailable",
                ))
            }
            Err(e) => Err(HTTPError::new(http::StatusCode::UNAUTHORIZED, e.to_string())),
        }
    }
}
