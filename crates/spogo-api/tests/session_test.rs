#![allow(clippy::unwrap_used)]
// Integration tests for the cookie-backed session using wiremock.

mod support;

use chrono::Utc;
use futures_util::future::join_all;
use secrecy::ExposeSecret;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use spogo_api::{Cookie, Endpoints, Error};

use support::{CLIENT_TOKEN, CLIENT_VERSION, DEVICE_ID, landing_page, token_response};

// ── Helpers ─────────────────────────────────────────────────────────

async fn mount_page_and_client_token(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(landing_page("")))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/clienttoken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "granted_token": { "token": CLIENT_TOKEN, "expires_in": 1800 }
        })))
        .expect(1)
        .mount(server)
        .await;
}

// ── Authorization ───────────────────────────────────────────────────

#[tokio::test]
async fn test_authorize_returns_full_credentials() {
    let server = MockServer::start().await;
    support::mount_auth(&server, "").await;
    let session = support::session(&server).await;

    let creds = session.authorize().await.unwrap();

    assert_eq!(creds.access_token.expose_secret(), support::ACCESS_TOKEN);
    assert_eq!(creds.client_token.expose_secret(), CLIENT_TOKEN);
    assert_eq!(creds.client_version, CLIENT_VERSION);
    assert_eq!(creds.device_id, DEVICE_ID);
    assert_eq!(creds.connect_version, "harmony:test");
}

#[tokio::test]
async fn test_token_request_carries_totp_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/token"))
        .and(query_param("reason", "init"))
        .and(query_param("productType", "web-player"))
        .and(query_param("totpVer", "18"))
        .respond_with(token_response())
        .expect(1)
        .mount(&server)
        .await;
    let session = support::session(&server).await;

    let token = session.access_token().await.unwrap();

    assert_eq!(token.expose_secret(), support::ACCESS_TOKEN);
}

#[tokio::test]
async fn test_concurrent_authorize_refreshes_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/token"))
        .respond_with(token_response())
        .expect(1)
        .mount(&server)
        .await;
    mount_page_and_client_token(&server).await;
    let session = support::session(&server).await;

    let results = join_all((0..8).map(|_| session.authorize())).await;

    assert!(results.iter().all(Result::is_ok), "all callers should succeed");
    let tokens: Vec<String> = results
        .into_iter()
        .map(|r| r.unwrap().client_token.expose_secret().to_owned())
        .collect();
    assert!(tokens.iter().all(|t| t == CLIENT_TOKEN));
}

#[tokio::test]
async fn test_invalidate_forces_new_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/token"))
        .respond_with(token_response())
        .expect(2)
        .mount(&server)
        .await;
    let session = support::session(&server).await;

    session.access_token().await.unwrap();
    session.access_token().await.unwrap();
    session.invalidate_access_token().await;
    session.access_token().await.unwrap();
}

// ── Failure modes ───────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_device_cookie_is_discovery_error() {
    let server = MockServer::start().await;
    support::mount_auth(&server, "").await;
    let endpoints = Endpoints::rooted_at(&server.uri()).unwrap();
    let session = support::session_for(&server, endpoints, vec![Cookie::new("sp_dc", "dc")]);

    let err = session.authorize().await.unwrap_err();

    assert!(
        matches!(&err, Error::Discovery { what } if what == "missing sp_t cookie"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_empty_cookie_source_is_rejected() {
    let server = MockServer::start().await;
    let endpoints = Endpoints::rooted_at(&server.uri()).unwrap();
    let session = support::session_for(&server, endpoints, Vec::new());

    let err = session.access_token().await.unwrap_err();

    assert!(matches!(err, Error::Cookies { .. }), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_token_without_value_is_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "",
            "isAnonymous": true,
        })))
        .mount(&server)
        .await;
    let session = support::session(&server).await;

    let err = session.access_token().await.unwrap_err();

    assert!(err.is_auth(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_token_http_error_keeps_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/token"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": {"message": "bad cookie"}})),
        )
        .mount(&server)
        .await;
    let session = support::session(&server).await;

    let err = session.access_token().await.unwrap_err();

    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_refreshed_token_without_client_id_keeps_previous_one() {
    let server = MockServer::start().await;
    // Expiry inside the freshness margin, so every call re-exchanges cookies.
    let expires = Utc::now().timestamp_millis() + 30_000;
    Mock::given(method("GET"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "first",
            "accessTokenExpirationTimestampMs": expires,
            "clientId": support::CLIENT_ID,
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "second",
            "accessTokenExpirationTimestampMs": expires,
        })))
        .mount(&server)
        .await;
    mount_page_and_client_token(&server).await;
    let session = support::session(&server).await;

    session.authorize().await.unwrap();
    let creds = session.authorize().await.unwrap();

    assert_eq!(creds.access_token.expose_secret(), "second");
    assert_eq!(creds.client_token.expose_secret(), CLIENT_TOKEN);
}

#[tokio::test]
async fn test_unparseable_body_with_multibyte_text_is_deserialization_error() {
    let server = MockServer::start().await;
    let body = format!("{}\u{e9} and more", "a".repeat(199));
    Mock::given(method("GET"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;
    let session = support::session(&server).await;

    let err = session.access_token().await.unwrap_err();

    assert!(
        matches!(&err, Error::Deserialization { body, .. } if body.ends_with("and more")),
        "unexpected error: {err:?}"
    );
}
