mod common;

use axum::http::{Method, StatusCode};
use mockito::{Matcher, Server};
use serde_json::json;
use tower::ServiceExt;

use common::{
    build_app, build_config, cookie_value, request, request_with_cookie, response_json,
    seed_account, set_cookies,
};

#[tokio::test]
async fn integration_login_page_greets() {
    let server = Server::new_async().await;
    let (app, _config, _store) = build_app(build_config(&server.url(), false)).await;

    for path in ["/", "/oauth"] {
        let response = app
            .clone()
            .oneshot(request(path, Method::GET))
            .await
            .expect("request should succeed");

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["msg"], "Hello, world. You're at the login page.");
    }
}

#[tokio::test]
async fn integration_login_redirects_to_consent_screen() {
    let server = Server::new_async().await;
    let (app, _config, _store) = build_app(build_config(&server.url(), false)).await;

    let response = app
        .oneshot(request("/accounts/login?state=abc123", Method::GET))
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::FOUND);
    let location = response
        .headers()
        .get("location")
        .expect("Location header missing")
        .to_str()
        .expect("Location header not valid UTF-8");
    assert!(location.starts_with("https://accounts.google.com/o/oauth2/auth?"));
    assert!(location.contains("client_id=storefront-client"));
    assert!(location.contains("access_type=offline"));
    assert!(location.contains("prompt=consent"));
    assert!(location.contains("state=abc123"));
}

#[tokio::test]
async fn integration_first_login_creates_account_and_issues_cookies() {
    let mut server = Server::new_async().await;

    let token_mock = server
        .mock("POST", "/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("code".into(), "first-code".into()),
            Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
            Matcher::UrlEncoded("client_id".into(), "storefront-client".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": "ya29.first-access",
                "refresh_token": "1//first-refresh",
                "expires_in": 3599
            })
            .to_string(),
        )
        .create_async()
        .await;

    let userinfo_mock = server
        .mock("GET", "/oauth2/v3/userinfo")
        .match_header("authorization", "Bearer ya29.first-access")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "email": "ada@example.com",
                "given_name": "Ada",
                "family_name": "Lovelace"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let (app, config, store) = build_app(build_config(&server.url(), false)).await;

    let response = app
        .oneshot(request(
            "/accounts/google/login/callback?code=first-code&state=abc123",
            Method::GET,
        ))
        .await
        .expect("request should succeed");

    token_mock.assert_async().await;
    userinfo_mock.assert_async().await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok()),
        Some(config.profile_redirect.as_str())
    );

    let cookies = set_cookies(&response);
    assert_eq!(
        cookie_value(&cookies, "access_token").as_deref(),
        Some("ya29.first-access")
    );
    assert_eq!(
        cookie_value(&cookies, "refresh_token").as_deref(),
        Some("1//first-refresh")
    );
    let access_cookie = cookies
        .iter()
        .find(|c| c.starts_with("access_token="))
        .expect("access token cookie missing");
    assert!(access_cookie.contains("Max-Age=3600"));
    assert!(access_cookie.contains("HttpOnly"));
    assert!(access_cookie.contains("Secure"));
    assert!(access_cookie.contains("SameSite=Lax"));
    let refresh_cookie = cookies
        .iter()
        .find(|c| c.starts_with("refresh_token="))
        .expect("refresh token cookie missing");
    assert!(refresh_cookie.contains("Max-Age=2592000"));

    let user = store
        .find_user_by_email("ada@example.com")
        .await
        .expect("store lookup failed")
        .expect("user should have been created");
    assert_eq!(user.username, "ada");
    assert_eq!(user.first_name, "Ada");
    assert_eq!(user.last_name, "Lovelace");

    let customer = store
        .find_customer_by_user(&user.id)
        .await
        .expect("store lookup failed")
        .expect("customer should have been created");
    assert_eq!(customer.access_token.as_deref(), Some("ya29.first-access"));
    assert_eq!(customer.refresh_token.as_deref(), Some("1//first-refresh"));
}

#[tokio::test]
async fn integration_repeat_login_reuses_account() {
    let mut server = Server::new_async().await;

    let first_token_mock = server
        .mock("POST", "/token")
        .match_body(Matcher::UrlEncoded("code".into(), "first-code".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": "ya29.first-access",
                "refresh_token": "1//first-refresh",
                "expires_in": 3599
            })
            .to_string(),
        )
        .create_async()
        .await;

    // The second exchange omits the refresh token, as providers do on
    // repeat consent.
    let second_token_mock = server
        .mock("POST", "/token")
        .match_body(Matcher::UrlEncoded("code".into(), "second-code".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": "ya29.second-access",
                "expires_in": 3599
            })
            .to_string(),
        )
        .create_async()
        .await;

    let userinfo_mock = server
        .mock("GET", "/oauth2/v3/userinfo")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "email": "ada@example.com",
                "given_name": "Ada",
                "family_name": "Lovelace"
            })
            .to_string(),
        )
        .expect(2)
        .create_async()
        .await;

    let (app, _config, store) = build_app(build_config(&server.url(), false)).await;

    let first = app
        .clone()
        .oneshot(request(
            "/accounts/google/login/callback?code=first-code",
            Method::GET,
        ))
        .await
        .expect("request should succeed");
    assert_eq!(first.status(), StatusCode::FOUND);

    let first_user = store
        .find_user_by_email("ada@example.com")
        .await
        .expect("store lookup failed")
        .expect("user should exist after first login");

    let second = app
        .clone()
        .oneshot(request(
            "/accounts/google/login/callback?code=second-code",
            Method::GET,
        ))
        .await
        .expect("request should succeed");
    assert_eq!(second.status(), StatusCode::FOUND);

    first_token_mock.assert_async().await;
    second_token_mock.assert_async().await;
    userinfo_mock.assert_async().await;

    // No refresh token came back, so no refresh cookie is set.
    let cookies = set_cookies(&second);
    assert_eq!(
        cookie_value(&cookies, "access_token").as_deref(),
        Some("ya29.second-access")
    );
    assert!(cookie_value(&cookies, "refresh_token").is_none());

    let second_user = store
        .find_user_by_email("ada@example.com")
        .await
        .expect("store lookup failed")
        .expect("user should still exist");
    assert_eq!(second_user.id, first_user.id);

    // The stored access token moved forward while the refresh token from
    // the first login was preserved.
    let customer = store
        .find_customer_by_user(&second_user.id)
        .await
        .expect("store lookup failed")
        .expect("customer should still exist");
    assert_eq!(customer.access_token.as_deref(), Some("ya29.second-access"));
    assert_eq!(customer.refresh_token.as_deref(), Some("1//first-refresh"));
}

#[tokio::test]
async fn integration_callback_without_code_is_rejected() {
    let mut server = Server::new_async().await;
    let token_mock = server
        .mock("POST", "/token")
        .expect(0)
        .create_async()
        .await;

    let (app, _config, _store) = build_app(build_config(&server.url(), false)).await;

    let missing = app
        .clone()
        .oneshot(request("/accounts/google/login/callback", Method::GET))
        .await
        .expect("request should succeed");
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    let body = response_json(missing).await;
    assert_eq!(body["error"], "No code received");

    // A blank code is treated the same as a missing one.
    let blank = app
        .clone()
        .oneshot(request("/accounts/google/login/callback?code=", Method::GET))
        .await
        .expect("request should succeed");
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

    token_mock.assert_async().await;
}

#[tokio::test]
async fn integration_exchange_failure_returns_provider_details() {
    let mut server = Server::new_async().await;

    let token_mock = server
        .mock("POST", "/token")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "error": "invalid_grant",
                "error_description": "Malformed auth code."
            })
            .to_string(),
        )
        .create_async()
        .await;
    let userinfo_mock = server
        .mock("GET", "/oauth2/v3/userinfo")
        .expect(0)
        .create_async()
        .await;

    let (app, _config, _store) = build_app(build_config(&server.url(), false)).await;

    let response = app
        .oneshot(request(
            "/accounts/google/login/callback?code=bad-code",
            Method::GET,
        ))
        .await
        .expect("request should succeed");

    token_mock.assert_async().await;
    userinfo_mock.assert_async().await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Failed to exchange code for tokens");
    assert_eq!(body["details"]["error"], "invalid_grant");
}

#[tokio::test]
async fn integration_userinfo_failure_persists_nothing() {
    let mut server = Server::new_async().await;

    let token_mock = server
        .mock("POST", "/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": "ya29.orphaned-access",
                "refresh_token": "1//orphaned-refresh",
                "expires_in": 3599
            })
            .to_string(),
        )
        .create_async()
        .await;
    let userinfo_mock = server
        .mock("GET", "/oauth2/v3/userinfo")
        .with_status(401)
        .with_body("Unauthorized")
        .create_async()
        .await;

    let (app, _config, store) = build_app(build_config(&server.url(), false)).await;

    let response = app
        .oneshot(request(
            "/accounts/google/login/callback?code=some-code",
            Method::GET,
        ))
        .await
        .expect("request should succeed");

    token_mock.assert_async().await;
    userinfo_mock.assert_async().await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Failed to get user info");

    // The exchanged tokens were never written to the store.
    let customer = store
        .find_customer_by_refresh_token("1//orphaned-refresh")
        .await
        .expect("store lookup failed");
    assert!(customer.is_none());
}

#[tokio::test]
async fn integration_refresh_rotates_access_token() {
    let mut server = Server::new_async().await;

    let token_mock = server
        .mock("POST", "/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
            Matcher::UrlEncoded("refresh_token".into(), "1//seeded-refresh".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": "ya29.rotated-access",
                "expires_in": 3599
            })
            .to_string(),
        )
        .create_async()
        .await;

    let (app, _config, store) = build_app(build_config(&server.url(), false)).await;
    let (_user, customer) = seed_account(
        &store,
        "ada@example.com",
        "Ada",
        "ya29.seeded-access",
        "1//seeded-refresh",
        "+254700000001",
    )
    .await;

    let response = app
        .oneshot(request_with_cookie(
            "/refresh-token",
            Method::POST,
            "refresh_token=1//seeded-refresh",
        ))
        .await
        .expect("request should succeed");

    token_mock.assert_async().await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert_eq!(
        cookie_value(&cookies, "access_token").as_deref(),
        Some("ya29.rotated-access")
    );
    let body = response_json(response).await;
    assert_eq!(body["success"], json!(true));

    let stored = store
        .find_customer_by_id(&customer.id)
        .await
        .expect("store lookup failed")
        .expect("customer should still exist");
    assert_eq!(stored.access_token.as_deref(), Some("ya29.rotated-access"));
    assert_eq!(stored.refresh_token.as_deref(), Some("1//seeded-refresh"));

    // Only the new access token authenticates now.
    assert!(store
        .user_for_access_token("ya29.seeded-access")
        .await
        .expect("store lookup failed")
        .is_none());
    assert!(store
        .user_for_access_token("ya29.rotated-access")
        .await
        .expect("store lookup failed")
        .is_some());
}

#[tokio::test]
async fn integration_refresh_without_cookie_is_unauthorized() {
    let mut server = Server::new_async().await;
    let token_mock = server
        .mock("POST", "/token")
        .expect(0)
        .create_async()
        .await;

    let (app, _config, _store) = build_app(build_config(&server.url(), false)).await;

    let response = app
        .oneshot(request("/refresh-token", Method::POST))
        .await
        .expect("request should succeed");

    token_mock.assert_async().await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response).await;
    assert_eq!(body["error"], "No refresh token");
}

#[tokio::test]
async fn integration_refresh_provider_rejection_leaves_store_untouched() {
    let mut server = Server::new_async().await;

    let token_mock = server
        .mock("POST", "/token")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(json!({"error": "invalid_grant"}).to_string())
        .create_async()
        .await;

    let (app, _config, store) = build_app(build_config(&server.url(), false)).await;
    let (_user, customer) = seed_account(
        &store,
        "ada@example.com",
        "Ada",
        "ya29.seeded-access",
        "1//seeded-refresh",
        "+254700000001",
    )
    .await;

    let response = app
        .oneshot(request_with_cookie(
            "/refresh-token",
            Method::POST,
            "refresh_token=1//seeded-refresh",
        ))
        .await
        .expect("request should succeed");

    token_mock.assert_async().await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Failed to refresh token");

    let stored = store
        .find_customer_by_id(&customer.id)
        .await
        .expect("store lookup failed")
        .expect("customer should still exist");
    assert_eq!(stored.access_token.as_deref(), Some("ya29.seeded-access"));
}

#[tokio::test]
async fn integration_refresh_with_unknown_token_is_rejected() {
    let mut server = Server::new_async().await;

    // The provider accepts the token, but no stored customer holds it.
    let token_mock = server
        .mock("POST", "/token")
        .match_body(Matcher::UrlEncoded(
            "refresh_token".into(),
            "1//unknown-refresh".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": "ya29.should-not-be-stored",
                "expires_in": 3599
            })
            .to_string(),
        )
        .create_async()
        .await;

    let (app, _config, store) = build_app(build_config(&server.url(), false)).await;
    let (_user, customer) = seed_account(
        &store,
        "ada@example.com",
        "Ada",
        "ya29.seeded-access",
        "1//seeded-refresh",
        "+254700000001",
    )
    .await;

    let response = app
        .oneshot(request_with_cookie(
            "/refresh-token",
            Method::POST,
            "refresh_token=1//unknown-refresh",
        ))
        .await
        .expect("request should succeed");

    token_mock.assert_async().await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Invalid refresh token");

    let stored = store
        .find_customer_by_id(&customer.id)
        .await
        .expect("store lookup failed")
        .expect("customer should still exist");
    assert_eq!(stored.access_token.as_deref(), Some("ya29.seeded-access"));
    assert_eq!(stored.refresh_token.as_deref(), Some("1//seeded-refresh"));
}

#[tokio::test]
async fn integration_refresh_is_repeatable() {
    let mut server = Server::new_async().await;

    let token_mock = server
        .mock("POST", "/token")
        .match_body(Matcher::UrlEncoded(
            "refresh_token".into(),
            "1//seeded-refresh".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": "ya29.rotated-access",
                "expires_in": 3599
            })
            .to_string(),
        )
        .expect(2)
        .create_async()
        .await;

    let (app, _config, store) = build_app(build_config(&server.url(), false)).await;
    seed_account(
        &store,
        "ada@example.com",
        "Ada",
        "ya29.seeded-access",
        "1//seeded-refresh",
        "+254700000001",
    )
    .await;

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(request_with_cookie(
                "/refresh-token",
                Method::POST,
                "refresh_token=1//seeded-refresh",
            ))
            .await
            .expect("request should succeed");
        assert_eq!(response.status(), StatusCode::OK);
    }

    token_mock.assert_async().await;
}
