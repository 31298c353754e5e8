use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::models::{Customer, Order, User};
use crate::store::Store;

/// In-process `Store` implementation backed by hash maps.
///
/// Token and email lookups go through secondary indexes so they stay
/// exact-match, the same way the MongoDB backend resolves them. Used
/// for development and tests; nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    users: HashMap<String, User>,
    user_id_by_email: HashMap<String, String>,
    customers: HashMap<String, Customer>,
    customer_id_by_user: HashMap<String, String>,
    customer_id_by_access: HashMap<String, String>,
    customer_id_by_refresh: HashMap<String, String>,
    orders: HashMap<String, Order>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>, String> {
        self.state
            .read()
            .map_err(|_| "Memory store lock poisoned".to_string())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>, String> {
        self.state
            .write()
            .map_err(|_| "Memory store lock poisoned".to_string())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: &User) -> Result<User, String> {
        let mut state = self.write()?;
        if state.user_id_by_email.contains_key(&user.email) {
            return Err(format!("Duplicate email: {}", user.email));
        }
        state
            .user_id_by_email
            .insert(user.email.clone(), user.id.clone());
        state.users.insert(user.id.clone(), user.clone());
        Ok(user.clone())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, String> {
        let state = self.read()?;
        Ok(state
            .user_id_by_email
            .get(email)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn find_user_by_id(&self, user_id: &str) -> Result<Option<User>, String> {
        Ok(self.read()?.users.get(user_id).cloned())
    }

    async fn user_for_access_token(&self, access_token: &str) -> Result<Option<User>, String> {
        let state = self.read()?;
        Ok(state
            .customer_id_by_access
            .get(access_token)
            .and_then(|customer_id| state.customers.get(customer_id))
            .and_then(|customer| state.users.get(&customer.user_id))
            .cloned())
    }

    async fn find_customer_by_user(&self, user_id: &str) -> Result<Option<Customer>, String> {
        let state = self.read()?;
        Ok(state
            .customer_id_by_user
            .get(user_id)
            .and_then(|id| state.customers.get(id))
            .cloned())
    }

    async fn find_customer_by_id(&self, customer_id: &str) -> Result<Option<Customer>, String> {
        Ok(self.read()?.customers.get(customer_id).cloned())
    }

    async fn find_customer_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<Customer>, String> {
        let state = self.read()?;
        Ok(state
            .customer_id_by_refresh
            .get(refresh_token)
            .and_then(|id| state.customers.get(id))
            .cloned())
    }

    async fn upsert_customer(&self, customer: &Customer) -> Result<Customer, String> {
        let mut state = self.write()?;
        if let Some(existing) = state
            .customer_id_by_user
            .get(&customer.user_id)
            .and_then(|id| state.customers.get(id))
        {
            return Ok(existing.clone());
        }
        state
            .customer_id_by_user
            .insert(customer.user_id.clone(), customer.id.clone());
        state
            .customers
            .insert(customer.id.clone(), customer.clone());
        Ok(customer.clone())
    }

    async fn update_customer_phone(
        &self,
        customer_id: &str,
        phone_number: &str,
    ) -> Result<Customer, String> {
        let mut state = self.write()?;
        let customer = state
            .customers
            .get_mut(customer_id)
            .ok_or_else(|| "Customer not found".to_string())?;
        customer.phone_number = phone_number.to_string();
        Ok(customer.clone())
    }

    async fn update_customer_tokens(
        &self,
        customer_id: &str,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<(), String> {
        let mut state = self.write()?;

        let (old_access, old_refresh) = {
            let customer = state
                .customers
                .get_mut(customer_id)
                .ok_or_else(|| "Customer not found".to_string())?;
            let old_access = customer.access_token.take();
            let mut old_refresh = None;
            customer.access_token = Some(access_token.to_string());
            if let Some(rt) = refresh_token {
                old_refresh = customer.refresh_token.take();
                customer.refresh_token = Some(rt.to_string());
            }
            (old_access, old_refresh)
        };

        // Move the token indexes so stale tokens no longer resolve.
        if let Some(old) = old_access {
            state.customer_id_by_access.remove(&old);
        }
        state
            .customer_id_by_access
            .insert(access_token.to_string(), customer_id.to_string());

        if let Some(rt) = refresh_token {
            if let Some(old) = old_refresh {
                state.customer_id_by_refresh.remove(&old);
            }
            state
                .customer_id_by_refresh
                .insert(rt.to_string(), customer_id.to_string());
        }

        Ok(())
    }

    async fn delete_customer(&self, customer_id: &str) -> Result<(), String> {
        let mut state = self.write()?;
        let customer = match state.customers.remove(customer_id) {
            Some(customer) => customer,
            None => return Ok(()),
        };
        state.customer_id_by_user.remove(&customer.user_id);
        if let Some(token) = &customer.access_token {
            state.customer_id_by_access.remove(token);
        }
        if let Some(token) = &customer.refresh_token {
            state.customer_id_by_refresh.remove(token);
        }
        state
            .orders
            .retain(|_, order| order.customer_id != customer_id);
        Ok(())
    }

    async fn create_order(&self, order: &Order) -> Result<Order, String> {
        let mut state = self.write()?;
        state.orders.insert(order.id.clone(), order.clone());
        Ok(order.clone())
    }

    async fn orders_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, String> {
        let state = self.read()?;
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|order| order.customer_id == customer_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| a.order_date.cmp(&b.order_date));
        Ok(orders)
    }

    async fn find_order(&self, order_id: &str) -> Result<Option<Order>, String> {
        Ok(self.read()?.orders.get(order_id).cloned())
    }

    async fn update_order_amount(
        &self,
        order_id: &str,
        total_amount: f64,
    ) -> Result<Order, String> {
        let mut state = self.write()?;
        let order = state
            .orders
            .get_mut(order_id)
            .ok_or_else(|| "Order not found".to_string())?;
        order.total_amount = total_amount;
        Ok(order.clone())
    }

    async fn delete_order(&self, order_id: &str) -> Result<(), String> {
        self.write()?.orders.remove(order_id);
        Ok(())
    }
}
