//! Library exports for storefront, shared between the binary and tests.

pub mod auth;
pub mod config;
pub mod models;
pub mod notify;
pub mod oauth;
pub mod routes;
pub mod startup;
pub mod state;
pub mod store;
pub mod utils;
