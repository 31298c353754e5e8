use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The User struct represents an authenticated account in the system.
///
/// Users are created on first successful OAuth login, keyed by their
/// unique email address.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl User {
    /// Construct a new User from an email address and optional names.
    ///
    /// The username is derived from the local part of the email address.
    pub fn new(email: String, first_name: Option<String>, last_name: Option<String>) -> Self {
        let username = email.split('@').next().unwrap_or_default().to_string();
        User {
            id: Uuid::new_v4().to_string(),
            username,
            email,
            first_name: first_name.unwrap_or_default(),
            last_name: last_name.unwrap_or_default(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
