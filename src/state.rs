//! Shared application state.
//!
//! Contains the state that is shared across all request handlers,
//! including configuration, authentication, storage and the outbound
//! clients.

use crate::auth::CookieAuth;
use crate::config::ConfigV1;
use crate::notify::SmsNotifier;
use crate::oauth::GoogleOAuthClient;
use crate::store::Store;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// This state is cloned for each request handler and contains
/// references to the configuration, cookie authenticator, store,
/// OAuth client and SMS notifier.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Cookie authenticator resolving users from the access token cookie.
    pub auth: Arc<CookieAuth>,
    /// Store for users, customer profiles and orders.
    pub store: Arc<dyn Store>,
    /// Client for the Google OAuth token and userinfo endpoints.
    pub oauth: Arc<GoogleOAuthClient>,
    /// Outbound SMS gateway client for order confirmations.
    pub sms: Arc<SmsNotifier>,
}
