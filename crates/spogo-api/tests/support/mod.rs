// Shared wiremock fixtures for the spogo-api integration tests.
#![allow(clippy::unwrap_used, dead_code)]

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use spogo_api::{
    Cookie, Endpoints, SecretCache, Session, StaticCookieSource, TotpEngine, TransportConfig,
};

pub const ACCESS_TOKEN: &str = "access-token";
pub const CLIENT_TOKEN: &str = "client-token";
pub const CLIENT_ID: &str = "client-id";
pub const DEVICE_ID: &str = "device-sp-t";
pub const CLIENT_VERSION: &str = "1.2.50.335";

pub fn cookies() -> Vec<Cookie> {
    vec![Cookie::new("sp_dc", "dc-value"), Cookie::new("sp_t", DEVICE_ID)]
}

pub fn landing_page(extra: &str) -> String {
    let config = STANDARD.encode(
        json!({ "clientVersion": format!("{CLIENT_VERSION}.g0a1b2c3d") }).to_string(),
    );
    format!(
        "<html><head><script id=\"appServerConfig\" type=\"text/plain\">{config}</script>{extra}</head></html>"
    )
}

pub fn session_for(server: &MockServer, endpoints: Endpoints, cookies: Vec<Cookie>) -> Arc<Session> {
    let _ = server;
    let totp = TotpEngine::with_sources(Vec::new(), SecretCache::new()).unwrap();
    Arc::new(
        Session::new(
            Arc::new(StaticCookieSource::new(cookies)),
            Arc::new(endpoints),
            TransportConfig::default(),
            totp,
        )
        .unwrap()
        .with_connect_version("harmony:test"),
    )
}

pub async fn session(server: &MockServer) -> Arc<Session> {
    let endpoints = Endpoints::rooted_at(&server.uri()).unwrap();
    session_for(server, endpoints, cookies())
}

pub fn token_response() -> ResponseTemplate {
    let expires = Utc::now().timestamp_millis() + 3_600_000;
    ResponseTemplate::new(200).set_body_json(json!({
        "accessToken": ACCESS_TOKEN,
        "accessTokenExpirationTimestampMs": expires,
        "isAnonymous": false,
        "clientId": CLIENT_ID,
    }))
}

/// Token, landing page and client-token endpoints.
pub async fn mount_auth(server: &MockServer, extra_html: &str) {
    Mock::given(method("GET"))
        .and(path("/api/token"))
        .respond_with(token_response())
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(landing_page(extra_html)))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/clienttoken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "granted_token": { "token": CLIENT_TOKEN, "expires_in": 1800 }
        })))
        .mount(server)
        .await;
}
