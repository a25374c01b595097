// Pathfinder persisted-query client.
//
// Requests carry only the operation name, JSON-encoded variables and the
// `persistedQuery` extension; the query text itself lives server side and
// is referenced by the hash the resolver discovered.

use std::sync::Arc;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION};
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::Error;
use crate::hash::HashResolver;
use crate::session::Session;
use crate::token::read_json;

/// Authenticated GraphQL client for the private web-player API.
#[derive(Debug, Clone)]
pub struct Pathfinder {
    session: Arc<Session>,
    hashes: Arc<HashResolver>,
    language: Option<String>,
}

impl Pathfinder {
    pub fn new(session: Arc<Session>, hashes: Arc<HashResolver>) -> Self {
        Self {
            session,
            hashes,
            language: None,
        }
    }

    /// Send `Accept-Language` with every query.
    #[must_use]
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language.filter(|l| !l.is_empty());
        self
    }

    pub fn hashes(&self) -> &HashResolver {
        &self.hashes
    }

    /// Run `operation` and return the raw payload.
    ///
    /// A non-empty `errors` array fails the call with its first message.
    pub async fn query(&self, operation: &str, variables: Value) -> Result<Value, Error> {
        let creds = self.session.authorize().await?;
        let hash = self.hashes.resolve(operation).await?;

        let variables = if variables.is_null() { json!({}) } else { variables };
        let extensions = json!({
            "persistedQuery": { "version": 1, "sha256Hash": hash }
        });

        let mut url = self.session.endpoints().pathfinder.clone();
        url.query_pairs_mut()
            .append_pair("operationName", operation)
            .append_pair("variables", &variables.to_string())
            .append_pair("extensions", &extensions.to_string());

        debug!(operation, "POST pathfinder");
        let mut req = self
            .session
            .http()
            .post(url)
            .header(
                AUTHORIZATION,
                format!("Bearer {}", creds.access_token.expose_secret()),
            )
            .header("Client-Token", creds.client_token.expose_secret())
            .header("Spotify-App-Version", creds.client_version.as_str())
            .header(ACCEPT, "application/json")
            .header("app-platform", "WebPlayer");
        if let Some(lang) = &self.language {
            req = req.header(ACCEPT_LANGUAGE, lang.as_str());
        }

        let payload: Value = read_json(req.send().await?).await?;
        match graphql_error(&payload) {
            Some(message) => Err(Error::Pathfinder { message }),
            None => Ok(payload),
        }
    }
}

fn graphql_error(payload: &Value) -> Option<String> {
    let first = payload.get("errors")?.as_array()?.first()?;
    let message = first
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or("pathfinder error");
    Some(message.to_owned())
}
