use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, IndexModel};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::{Customer, Order, User};
use crate::store::Store;

/// The config struct for MongoDB connections.
/// Contains the URI and database name.
#[derive(Deserialize, Serialize, JsonSchema, Debug)]
pub struct MongoDBConfig {
    pub uri: String,
    pub database: String,
}

/// A concrete `Store` implementation that uses MongoDB.
///
/// This struct holds references to three collections:
/// - `user_collection`: account records
/// - `customer_collection`: customer profiles and their tokens
/// - `order_collection`: orders
pub struct MongoDBStore {
    user_collection: Collection<UserDocument>,
    customer_collection: Collection<CustomerDocument>,
    order_collection: Collection<OrderDocument>,
}

/// Document shape for storing users in MongoDB.
#[derive(Serialize, Deserialize, Clone, Debug)]
struct UserDocument {
    _id: ObjectId,
    user: User,
}

/// Document shape for storing customer profiles in MongoDB.
#[derive(Serialize, Deserialize, Clone, Debug)]
struct CustomerDocument {
    _id: ObjectId,
    customer: Customer,
}

/// Document shape for storing orders in MongoDB.
#[derive(Serialize, Deserialize, Clone, Debug)]
struct OrderDocument {
    _id: ObjectId,
    order: Order,
}

fn unique_index(keys: Document) -> IndexModel {
    let mut index = IndexModel::default();
    index.keys = keys;
    index.options = Some(IndexOptions::builder().unique(true).build());
    index
}

impl MongoDBStore {
    /// Creates a new `MongoDBStore` from the given config.
    /// It initializes client connections, sets up indexes, etc.
    pub async fn new(config: &MongoDBConfig) -> Result<Self, String> {
        info!("Connecting to MongoDB at URI: {}", config.uri);

        // Parse the connection string from the config
        let mut client_options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|e| format!("Failed to parse MongoDB URI: {}", e))?;

        // Optionally set the client application name
        client_options.app_name = Some("Storefront".to_string());

        // Create a new MongoDB client
        let client = Client::with_options(client_options)
            .map_err(|e| format!("Failed to create MongoDB client: {}", e))?;

        info!("MongoDB connection established successfully.");

        // Retrieve the specified database and relevant collections
        let database = client.database(&config.database);
        let user_collection = database.collection::<UserDocument>("users");
        let customer_collection = database.collection::<CustomerDocument>("customers");
        let order_collection = database.collection::<OrderDocument>("orders");

        // Setup indexes for uniqueness and performance

        // 1) Users are unique by email and by id
        user_collection
            .create_index(unique_index(doc! { "user.email": 1 }), None)
            .await
            .map_err(|e| format!("Failed to create unique index on email: {}", e))?;
        user_collection
            .create_index(unique_index(doc! { "user.id": 1 }), None)
            .await
            .map_err(|e| format!("Failed to create unique index on user id: {}", e))?;

        // 2) At most one customer profile per user
        customer_collection
            .create_index(unique_index(doc! { "customer.user_id": 1 }), None)
            .await
            .map_err(|e| format!("Failed to create unique index on customer user_id: {}", e))?;
        customer_collection
            .create_index(unique_index(doc! { "customer.id": 1 }), None)
            .await
            .map_err(|e| format!("Failed to create unique index on customer id: {}", e))?;

        // 3) Order codes and ids are unique
        order_collection
            .create_index(unique_index(doc! { "order.order_code": 1 }), None)
            .await
            .map_err(|e| format!("Failed to create unique index on order_code: {}", e))?;
        order_collection
            .create_index(unique_index(doc! { "order.id": 1 }), None)
            .await
            .map_err(|e| format!("Failed to create unique index on order id: {}", e))?;

        Ok(Self {
            user_collection,
            customer_collection,
            order_collection,
        })
    }

    /// Helper function to convert a `User` struct to our `UserDocument`.
    fn user_to_doc(user: &User) -> UserDocument {
        UserDocument {
            _id: ObjectId::new(),
            user: user.clone(),
        }
    }

    /// Convert a `UserDocument` back into a `User` struct.
    fn doc_to_user(doc: &UserDocument) -> User {
        doc.user.clone()
    }

    /// Convert a `Customer` to a `CustomerDocument`.
    fn customer_to_doc(customer: &Customer) -> CustomerDocument {
        CustomerDocument {
            _id: ObjectId::new(),
            customer: customer.clone(),
        }
    }

    /// Convert a `CustomerDocument` back to a `Customer` struct.
    fn doc_to_customer(doc: &CustomerDocument) -> Customer {
        doc.customer.clone()
    }

    /// Convert an `Order` to an `OrderDocument`.
    fn order_to_doc(order: &Order) -> OrderDocument {
        OrderDocument {
            _id: ObjectId::new(),
            order: order.clone(),
        }
    }

    /// Convert an `OrderDocument` back to an `Order` struct.
    fn doc_to_order(doc: &OrderDocument) -> Order {
        doc.order.clone()
    }
}

#[async_trait]
impl Store for MongoDBStore {
    /// Inserts a new user document.
    async fn create_user(&self, user: &User) -> Result<User, String> {
        let user_doc = Self::user_to_doc(user);
        self.user_collection
            .insert_one(user_doc.clone(), None)
            .await
            .map_err(|e| format!("Failed to insert new user document: {}", e))?;
        Ok(Self::doc_to_user(&user_doc))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, String> {
        let user_doc = self
            .user_collection
            .find_one(doc! { "user.email": email }, None)
            .await
            .map_err(|e| format!("Failed to query user by email: {}", e))?;
        Ok(user_doc.as_ref().map(Self::doc_to_user))
    }

    async fn find_user_by_id(&self, user_id: &str) -> Result<Option<User>, String> {
        let user_doc = self
            .user_collection
            .find_one(doc! { "user.id": user_id }, None)
            .await
            .map_err(|e| format!("Failed to query user by id: {}", e))?;
        Ok(user_doc.as_ref().map(Self::doc_to_user))
    }

    /// Given an access token, returns the associated `User`, if any.
    async fn user_for_access_token(&self, access_token: &str) -> Result<Option<User>, String> {
        // 1) Look up the customer document holding this token
        let customer_doc = self
            .customer_collection
            .find_one(doc! { "customer.access_token": access_token }, None)
            .await
            .map_err(|e| format!("Failed to query customer by access token: {}", e))?;

        // 2) If a customer was found, fetch the user it belongs to
        if let Some(cd) = customer_doc {
            let user_doc = self
                .user_collection
                .find_one(doc! { "user.id": &cd.customer.user_id }, None)
                .await
                .map_err(|e| format!("Failed to fetch user by user_id: {}", e))?;

            if let Some(ud) = user_doc {
                debug!("User document found for access token. user_id = {}", ud.user.id);
                return Ok(Some(Self::doc_to_user(&ud)));
            }
        }

        Ok(None)
    }

    async fn find_customer_by_user(&self, user_id: &str) -> Result<Option<Customer>, String> {
        let customer_doc = self
            .customer_collection
            .find_one(doc! { "customer.user_id": user_id }, None)
            .await
            .map_err(|e| format!("Failed to query customer by user: {}", e))?;
        Ok(customer_doc.as_ref().map(Self::doc_to_customer))
    }

    async fn find_customer_by_id(&self, customer_id: &str) -> Result<Option<Customer>, String> {
        let customer_doc = self
            .customer_collection
            .find_one(doc! { "customer.id": customer_id }, None)
            .await
            .map_err(|e| format!("Failed to query customer by id: {}", e))?;
        Ok(customer_doc.as_ref().map(Self::doc_to_customer))
    }

    async fn find_customer_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<Customer>, String> {
        let customer_doc = self
            .customer_collection
            .find_one(doc! { "customer.refresh_token": refresh_token }, None)
            .await
            .map_err(|e| format!("Failed to query customer by refresh token: {}", e))?;
        Ok(customer_doc.as_ref().map(Self::doc_to_customer))
    }

    /// Returns the existing customer profile for the user, inserting the
    /// given one if none exists yet.
    async fn upsert_customer(&self, customer: &Customer) -> Result<Customer, String> {
        let existing = self
            .customer_collection
            .find_one(doc! { "customer.user_id": &customer.user_id }, None)
            .await
            .map_err(|e| format!("Failed to query customer: {}", e))?;

        match existing {
            Some(cd) => Ok(Self::doc_to_customer(&cd)),
            None => {
                debug!("Customer not found in DB, inserting new customer document.");
                let new_doc = Self::customer_to_doc(customer);
                self.customer_collection
                    .insert_one(new_doc.clone(), None)
                    .await
                    .map_err(|e| format!("Failed to insert new customer document: {}", e))?;
                Ok(Self::doc_to_customer(&new_doc))
            }
        }
    }

    async fn update_customer_phone(
        &self,
        customer_id: &str,
        phone_number: &str,
    ) -> Result<Customer, String> {
        self.customer_collection
            .update_one(
                doc! { "customer.id": customer_id },
                doc! { "$set": { "customer.phone_number": phone_number } },
                None,
            )
            .await
            .map_err(|e| format!("Failed to update customer phone number: {}", e))?;

        self.find_customer_by_id(customer_id)
            .await?
            .ok_or_else(|| "Customer not found".to_string())
    }

    async fn update_customer_tokens(
        &self,
        customer_id: &str,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<(), String> {
        let mut set = doc! { "customer.access_token": access_token };
        if let Some(rt) = refresh_token {
            set.insert("customer.refresh_token", rt);
        }

        self.customer_collection
            .update_one(
                doc! { "customer.id": customer_id },
                doc! { "$set": set },
                None,
            )
            .await
            .map_err(|e| format!("Failed to update customer tokens: {}", e))?;

        Ok(())
    }

    /// Deletes a customer document and every order that references it.
    async fn delete_customer(&self, customer_id: &str) -> Result<(), String> {
        self.order_collection
            .delete_many(doc! { "order.customer_id": customer_id }, None)
            .await
            .map_err(|e| format!("Failed to delete customer orders: {}", e))?;

        self.customer_collection
            .delete_one(doc! { "customer.id": customer_id }, None)
            .await
            .map_err(|e| format!("Failed to delete customer: {}", e))?;

        Ok(())
    }

    async fn create_order(&self, order: &Order) -> Result<Order, String> {
        let order_doc = Self::order_to_doc(order);
        self.order_collection
            .insert_one(order_doc.clone(), None)
            .await
            .map_err(|e| format!("Failed to insert order: {}", e))?;
        Ok(Self::doc_to_order(&order_doc))
    }

    /// Lists all orders placed by a given customer.
    async fn orders_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, String> {
        let mut cursor = self
            .order_collection
            .find(doc! { "order.customer_id": customer_id }, None)
            .await
            .map_err(|e| format!("Failed to list orders for customer: {}", e))?;

        let mut orders = Vec::new();
        while let Some(order_doc) = cursor
            .try_next()
            .await
            .map_err(|e| format!("Failed to read order document: {}", e))?
        {
            orders.push(Self::doc_to_order(&order_doc));
        }

        Ok(orders)
    }

    async fn find_order(&self, order_id: &str) -> Result<Option<Order>, String> {
        let order_doc = self
            .order_collection
            .find_one(doc! { "order.id": order_id }, None)
            .await
            .map_err(|e| format!("Failed to query order: {}", e))?;
        Ok(order_doc.as_ref().map(Self::doc_to_order))
    }

    async fn update_order_amount(
        &self,
        order_id: &str,
        total_amount: f64,
    ) -> Result<Order, String> {
        self.order_collection
            .update_one(
                doc! { "order.id": order_id },
                doc! { "$set": { "order.total_amount": total_amount } },
                None,
            )
            .await
            .map_err(|e| format!("Failed to update order amount: {}", e))?;

        self.find_order(order_id)
            .await?
            .ok_or_else(|| "Order not found".to_string())
    }

    /// Deletes an order document matching the provided order id.
    async fn delete_order(&self, order_id: &str) -> Result<(), String> {
        self.order_collection
            .delete_one(doc! { "order.id": order_id }, None)
            .await
            .map_err(|e| format!("Failed to delete order: {}", e))?;

        Ok(())
    }
}
