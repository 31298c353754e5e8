use std::sync::Arc;

use http::HeaderMap;
use tracing::{debug, warn};

use super::cookie::{read_cookie, ACCESS_TOKEN_COOKIE};
use super::error::AuthError;
use crate::models::User;
use crate::store::Store;

/// Resolves the requesting user from the access token cookie.
///
/// The outcome is tri-state: `Ok(None)` means no credentials were
/// supplied (the request is anonymous), `Ok(Some(user))` means the
/// cookie matched a stored token, and `Err(..)` means a cookie was
/// supplied but could not be accepted.
pub struct CookieAuth {
    store: Arc<dyn Store>,
}

impl CookieAuth {
    pub fn new(store: Arc<dyn Store>) -> Self {
        CookieAuth { store }
    }

    /// Authenticate a request from its headers.
    ///
    /// A token is valid exactly when it matches a stored access token;
    /// there is no expiry check at this layer, since cookies age out on
    /// their own and refreshed tokens overwrite the stored value.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Option<User>, AuthError> {
        let access_token = match read_cookie(headers, ACCESS_TOKEN_COOKIE) {
            Some(token) => token,
            None => {
                debug!("No access token cookie supplied; request is anonymous.");
                return Ok(None);
            }
        };

        match self
            .store
            .user_for_access_token(&access_token)
            .await
            .map_err(AuthError::Store)?
        {
            Some(user) => {
                debug!("Access token matched user '{}'", user.username);
                Ok(Some(user))
            }
            None => {
                warn!("Access token cookie did not match any stored token.");
                Err(AuthError::InvalidCredential)
            }
        }
    }
}

/// Extractor wrapper for handlers that require an authenticated user.
///
/// The `FromRequestParts` implementation lives in `utils::http_helpers`
/// and rejects anonymous requests with a 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);
