use std::time::Duration;

use tracing::{debug, info};

use crate::config::SmsConfig;
use crate::models::{Customer, Order, User};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends SMS messages through an HTTP gateway.
///
/// Delivery is best-effort: callers log failures and move on, so a
/// gateway outage never fails the request that triggered the message.
/// With `enabled: false` messages are logged instead of sent.
pub struct SmsNotifier {
    config: SmsConfig,
    http: reqwest::Client,
}

impl SmsNotifier {
    pub fn new(config: &SmsConfig) -> Self {
        Self {
            config: config.clone(),
            http: reqwest::Client::new(),
        }
    }

    /// The confirmation text sent after an order is placed.
    pub fn order_confirmation_message(first_name: &str, order_code: &str) -> String {
        format!(
            "Hello {}, your order with code {} has been confirmed. Thank you for shopping with us!",
            first_name, order_code
        )
    }

    /// Send a message to a single recipient.
    pub async fn send(&self, to: &str, message: &str) -> Result<(), String> {
        if !self.config.enabled {
            info!("SMS delivery disabled; would send to {}: {}", to, message);
            return Ok(());
        }

        debug!("Sending SMS to {} via {}", to, self.config.api_url);

        let form = [
            ("username", self.config.username.as_str()),
            ("to", to),
            ("message", message),
            ("from", self.config.sender_id.as_str()),
        ];

        let response = self
            .http
            .post(&self.config.api_url)
            .timeout(REQUEST_TIMEOUT)
            .header("apiKey", &self.config.api_key)
            .header("Accept", "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| format!("Failed to send SMS: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("SMS gateway returned status {}: {}", status, body));
        }

        info!("SMS sent to {}", to);
        Ok(())
    }

    /// Send the order confirmation for a freshly created order. The
    /// caller has already checked that the customer has a phone number.
    pub async fn send_order_confirmation(
        &self,
        user: &User,
        customer: &Customer,
        order: &Order,
    ) -> Result<(), String> {
        let message = Self::order_confirmation_message(&user.first_name, &order.order_code);
        self.send(&customer.phone_number, &message).await
    }
}
