#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::ConnectInfo;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, Response};
use figment::{
    Figment,
    providers::{Format, Yaml},
};
use serde_json::Value;
use storefront::auth::CookieAuth;
use storefront::config::{Config, ConfigV1};
use storefront::models::{Customer, User};
use storefront::notify::SmsNotifier;
use storefront::oauth::GoogleOAuthClient;
use storefront::routes::create_router;
use storefront::state::AppState;
use storefront::store::{Store, create_store};

/// Builds a test configuration backed by the in-memory store, with all
/// outbound endpoints pointed at a stand-in server.
pub fn build_config(server_url: &str, sms_enabled: bool) -> ConfigV1 {
    let yaml = format!(
        r#"
version: "1.0.0"
logging:
  level: "warn"
  format: "json"
store:
  type: "memory"
google:
  client_id: "storefront-client"
  client_secret: "storefront-secret"
  redirect_uri: "http://127.0.0.1:8080/accounts/google/login/callback"
  token_url: "{server_url}/token"
  userinfo_url: "{server_url}/oauth2/v3/userinfo"
sms:
  enabled: {sms_enabled}
  api_url: "{server_url}/version1/messaging"
  username: "sandbox"
  api_key: "test-api-key"
  sender_id: "STOREFRONT"
bind_address: 127.0.0.1:8083
"#
    );

    let config: Config = Figment::new()
        .merge(Yaml::string(&yaml))
        .extract()
        .expect("Failed to parse test config YAML");

    match config {
        Config::ConfigV1(cfg) => cfg,
    }
}

pub async fn build_app(config: ConfigV1) -> (Router, Arc<ConfigV1>, Arc<dyn Store>) {
    let config = Arc::new(config);
    let store = create_store(&config.store).await;
    let auth = Arc::new(CookieAuth::new(store.clone()));
    let oauth = Arc::new(
        GoogleOAuthClient::new(&config.google).expect("Failed to build OAuth client"),
    );
    let sms = Arc::new(SmsNotifier::new(&config.sms));

    let state = AppState {
        config: config.clone(),
        auth,
        store: store.clone(),
        oauth,
        sms,
    };

    (create_router(state), config, store)
}

/// Seeds a logged-in account: a user with a customer profile holding
/// the given tokens and phone number. Returns the user and the customer
/// as stored.
pub async fn seed_account(
    store: &Arc<dyn Store>,
    email: &str,
    first_name: &str,
    access_token: &str,
    refresh_token: &str,
    phone_number: &str,
) -> (User, Customer) {
    let user = store
        .create_user(&User::new(
            email.to_string(),
            Some(first_name.to_string()),
            Some("Tester".to_string()),
        ))
        .await
        .expect("failed to seed user");
    let customer = store
        .upsert_customer(&Customer::new(user.id.clone()))
        .await
        .expect("failed to seed customer");
    if !phone_number.is_empty() {
        store
            .update_customer_phone(&customer.id, phone_number)
            .await
            .expect("failed to seed phone number");
    }
    store
        .update_customer_tokens(&customer.id, access_token, Some(refresh_token))
        .await
        .expect("failed to seed tokens");
    let customer = store
        .find_customer_by_id(&customer.id)
        .await
        .expect("failed to reload customer")
        .expect("seeded customer should exist");

    (user, customer)
}

pub fn request(path: &str, method: Method) -> Request<Body> {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .expect("failed to build request");

    with_connect_info(request)
}

pub fn request_with_cookie(path: &str, method: Method, cookie: &str) -> Request<Body> {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .header(COOKIE, cookie)
        .body(Body::empty())
        .expect("failed to build request");

    with_connect_info(request)
}

pub fn json_request(path: &str, method: Method, cookie: &str, body: Value) -> Request<Body> {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .header(COOKIE, cookie)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request");

    with_connect_info(request)
}

// Handlers resolve the peer address for logging, so every test request
// carries one.
fn with_connect_info(mut request: Request<Body>) -> Request<Body> {
    request.extensions_mut().insert(ConnectInfo(SocketAddr::new(
        IpAddr::V4(Ipv4Addr::LOCALHOST),
        0,
    )));

    request
}

pub async fn response_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(|value| value.to_string())
        .collect()
}

/// Extracts the value of a named cookie from Set-Cookie headers.
pub fn cookie_value(cookies: &[String], name: &str) -> Option<String> {
    cookies.iter().find_map(|cookie| {
        let pair = cookie.split(';').next()?;
        let (cookie_name, value) = pair.split_once('=')?;
        (cookie_name == name).then(|| value.to_string())
    })
}
