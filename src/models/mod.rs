pub mod customer;
pub mod order;
pub mod user;

// Re-export the model types so code outside can do
// "use crate::models::{Customer, Order, User};"
pub use customer::Customer;
pub use order::Order;
pub use user::User;
