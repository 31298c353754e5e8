use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Configuration for the SMS gateway used for order confirmations.
///
/// With `enabled: false` the notifier logs messages instead of sending
/// them, which is the mode used in development and tests.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct SmsConfig {
    pub enabled: bool,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    pub username: String,
    pub api_key: String,
    /// Registered sender id or short code the messages are sent from.
    pub sender_id: String,
}

fn default_api_url() -> String {
    "https://api.africastalking.com/version1/messaging".to_string()
}
