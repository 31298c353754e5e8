use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A customer profile, one-to-one with a User.
///
/// Holds the contact phone number and the OAuth tokens issued for the
/// account. The token fields are written by the login callback and the
/// refresh endpoint only; authentication reads them but never writes.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Customer {
    pub id: String,
    pub user_id: String,
    pub phone_number: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl Customer {
    /// Construct an empty customer profile for the given user.
    pub fn new(user_id: String) -> Self {
        Customer {
            id: Uuid::new_v4().to_string(),
            user_id,
            phone_number: String::new(),
            access_token: None,
            refresh_token: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test that a new customer starts with no phone number and no tokens.
    #[test]
    fn test_new_customer_is_empty() {
        let customer = Customer::new("user-1".to_string());
        assert_eq!(customer.user_id, "user-1");
        assert!(customer.phone_number.is_empty());
        assert!(customer.access_token.is_none());
        assert!(customer.refresh_token.is_none());
    }
}
