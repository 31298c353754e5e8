//! Application startup and server initialization.
//!
//! This module handles the creation and configuration of the HTTP server,
//! including initialization of the store, the cookie authenticator, the
//! OAuth client, the SMS notifier, and route setup.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::auth::CookieAuth;
use crate::config::ConfigV1;
use crate::notify::SmsNotifier;
use crate::oauth::GoogleOAuthClient;
use crate::routes;
use crate::state::AppState;
use crate::store::create_store;

/// Initializes and runs the application server.
///
/// Sets up the store, authentication and outbound clients, then binds
/// to the address specified in the configuration and starts serving
/// requests.
///
/// # Errors
///
/// Returns an error if the server fails to bind to the specified address
/// or encounters a runtime error during execution.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let store = create_store(&config.store).await;
    let auth = Arc::new(CookieAuth::new(store.clone()));
    let oauth = match GoogleOAuthClient::new(&config.google) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to create OAuth client: {}", e);
            std::process::exit(1);
        }
    };
    let sms = Arc::new(SmsNotifier::new(&config.sms));

    info!("Starting server on {}", config.bind_address);

    let state = AppState {
        config: config.clone(),
        auth,
        store,
        oauth,
        sms,
    };

    let app = routes::create_router(state);

    let listener = TcpListener::bind(&config.bind_address)
        .await
        .expect("Could not bind to specified address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .unwrap();

    Ok(())
}
