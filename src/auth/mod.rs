pub mod cookie;
pub mod cookie_auth;
pub mod error;

// Re-export the main types so we can do "use crate::auth::{AuthUser, CookieAuth};"
pub use cookie_auth::{AuthUser, CookieAuth};
pub use error::{AuthError, ProviderOperation};
