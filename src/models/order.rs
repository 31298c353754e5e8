use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A customer order with a generated, unique order code.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub order_date: DateTime<Utc>,
    pub order_code: String,
    pub total_amount: f64,
}

impl Order {
    /// Create a new order for the given customer. The order date is set
    /// to the current time and a fresh order code is generated.
    pub fn new(customer_id: String, total_amount: f64) -> Self {
        Order {
            id: Uuid::new_v4().to_string(),
            customer_id,
            order_date: Utc::now(),
            order_code: Self::generate_order_code(),
            total_amount,
        }
    }

    /// Generate an order code of the form "ORD-" followed by the first
    /// eight hex characters of a UUID, uppercased.
    pub fn generate_order_code() -> String {
        let hex = Uuid::new_v4().simple().to_string();
        format!("ORD-{}", hex[..8].to_uppercase())
    }
}
