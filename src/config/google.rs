use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Configuration for the Google OAuth client.
///
/// The endpoint URLs default to Google's public endpoints and only need
/// to be set explicitly when pointing the client at a stand-in server.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    /// The callback URL registered with the provider, e.g.
    /// "http://127.0.0.1:8000/accounts/google/login/callback".
    pub redirect_uri: String,
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_userinfo_url")]
    pub userinfo_url: String,
}

fn default_auth_url() -> String {
    "https://accounts.google.com/o/oauth2/auth".to_string()
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_userinfo_url() -> String {
    "https://www.googleapis.com/oauth2/v3/userinfo".to_string()
}
