use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info};

use crate::auth::{AuthError, ProviderOperation};
use crate::config::GoogleConfig;

/// Per-request timeout for calls against the provider. There are no
/// retries; a failed call fails the surrounding flow.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Token payload returned by the provider for both the authorization
/// code grant and the refresh grant. The refresh grant usually omits
/// `refresh_token`, so it stays optional.
#[derive(Deserialize, Debug, Clone)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

/// The subset of the userinfo payload this service consumes.
#[derive(Deserialize, Debug, Clone)]
pub struct UserProfile {
    pub email: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

/// Client for Google's OAuth 2.0 authorization code flow.
///
/// Exchanges authorization codes for tokens, fetches the user profile,
/// and refreshes access tokens. Endpoint URLs come from the config so
/// a stand-in server can be used in tests.
pub struct GoogleOAuthClient {
    config: GoogleConfig,
    auth_url: Url,
    http: reqwest::Client,
}

impl GoogleOAuthClient {
    /// Creates a new client, validating the configured authorization URL.
    pub fn new(config: &GoogleConfig) -> Result<Self, String> {
        info!("Creating Google OAuth client for client_id='{}'", config.client_id);
        let auth_url = Url::parse(&config.auth_url)
            .map_err(|e| format!("Invalid Google auth_url '{}': {}", config.auth_url, e))?;
        Ok(Self {
            config: config.clone(),
            auth_url,
            http: reqwest::Client::new(),
        })
    }

    /// Build the URL the browser is redirected to for consent.
    ///
    /// Requests offline access and forces the consent dialog so the
    /// provider includes a refresh token in the code exchange. The
    /// `state` value is passed through untouched when given.
    pub fn authorization_url(&self, state: Option<&str>) -> String {
        let mut url = self.auth_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("client_id", &self.config.client_id);
            query.append_pair("redirect_uri", &self.config.redirect_uri);
            query.append_pair("response_type", "code");
            query.append_pair("scope", "email profile");
            query.append_pair("access_type", "offline");
            query.append_pair("prompt", "consent");
            if let Some(state) = state {
                query.append_pair("state", state);
            }
            query.append_pair("include_granted_scopes", "true");
        }
        url.to_string()
    }

    /// Exchange an authorization code for an access and refresh token.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AuthError> {
        let operation = ProviderOperation::CodeExchange;
        debug!("Exchanging authorization code at {}", self.config.token_url);

        let form = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
            ("access_type", "offline"),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .timeout(REQUEST_TIMEOUT)
            .form(&form)
            .send()
            .await
            .map_err(|e| transport(operation, e))?;

        parse_token_response(response, operation).await
    }

    /// Fetch the user profile with a bearer access token.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<UserProfile, AuthError> {
        let operation = ProviderOperation::ProfileFetch;
        debug!("Fetching user profile from {}", self.config.userinfo_url);

        let response = self
            .http
            .get(&self.config.userinfo_url)
            .timeout(REQUEST_TIMEOUT)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| transport(operation, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Provider {
                operation,
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<UserProfile>()
            .await
            .map_err(|e| transport(operation, e))
    }

    /// Obtain a fresh access token with a refresh token. The response
    /// may or may not carry a new refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AuthError> {
        let operation = ProviderOperation::TokenRefresh;
        debug!("Refreshing access token at {}", self.config.token_url);

        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .timeout(REQUEST_TIMEOUT)
            .form(&form)
            .send()
            .await
            .map_err(|e| transport(operation, e))?;

        parse_token_response(response, operation).await
    }
}

fn transport(operation: ProviderOperation, error: reqwest::Error) -> AuthError {
    AuthError::Transport {
        operation,
        message: error.to_string(),
    }
}

async fn parse_token_response(
    response: reqwest::Response,
    operation: ProviderOperation,
) -> Result<TokenResponse, AuthError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::Provider {
            operation,
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| transport(operation, e))
}
