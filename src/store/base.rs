use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use super::{memory_store::MemoryStore, mongodb_store::MongoDBStore};
use crate::config::StoreConfig;
use crate::models::{Customer, Order, User};

/// The Store trait abstracts persistence for users, customer profiles
/// (including their OAuth tokens) and orders.
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user(&self, user: &User) -> Result<User, String>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, String>;
    async fn find_user_by_id(&self, user_id: &str) -> Result<Option<User>, String>;
    /// Resolve a user by exact match on a stored access token. This is
    /// the only lookup cookie authentication performs.
    async fn user_for_access_token(&self, access_token: &str) -> Result<Option<User>, String>;

    async fn find_customer_by_user(&self, user_id: &str) -> Result<Option<Customer>, String>;
    async fn find_customer_by_id(&self, customer_id: &str) -> Result<Option<Customer>, String>;
    async fn find_customer_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<Customer>, String>;
    /// Get-or-create keyed by user id: if the user already has a
    /// customer profile it is returned unchanged.
    async fn upsert_customer(&self, customer: &Customer) -> Result<Customer, String>;
    async fn update_customer_phone(
        &self,
        customer_id: &str,
        phone_number: &str,
    ) -> Result<Customer, String>;
    /// Overwrite the stored access token. Passing `None` for the
    /// refresh token leaves the stored refresh token unchanged, which
    /// is how refresh grants write back.
    async fn update_customer_tokens(
        &self,
        customer_id: &str,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<(), String>;
    /// Delete a customer profile together with its orders.
    async fn delete_customer(&self, customer_id: &str) -> Result<(), String>;

    async fn create_order(&self, order: &Order) -> Result<Order, String>;
    async fn orders_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, String>;
    async fn find_order(&self, order_id: &str) -> Result<Option<Order>, String>;
    async fn update_order_amount(
        &self,
        order_id: &str,
        total_amount: f64,
    ) -> Result<Order, String>;
    async fn delete_order(&self, order_id: &str) -> Result<(), String>;
}

/// Creates a concrete store implementation based on the StoreConfig.
pub async fn create_store(config: &StoreConfig) -> Arc<dyn Store> {
    match config {
        StoreConfig::MongoDB(mongo_config) => match MongoDBStore::new(mongo_config).await {
            Ok(store) => {
                info!("Successfully created MongoDB store.");
                Arc::new(store)
            }
            Err(e) => {
                error!("Failed to create MongoDB store: {}", e);
                std::process::exit(1);
            }
        },
        StoreConfig::Memory => {
            info!("Using in-memory store.");
            Arc::new(MemoryStore::new())
        }
    }
}
