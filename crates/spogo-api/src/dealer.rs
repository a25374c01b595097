//! Dealer handshake.
//!
//! The dealer socket greets every new connection with a message whose
//! headers carry `Spotify-Connection-Id`. Connect device registration
//! needs that id, so [`connection_id`] opens the socket, reads the first
//! frame and closes it again. Nothing is kept open for push updates.

use std::time::Duration;

use futures_util::StreamExt;
use serde_json::Value;
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder};
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;

/// Deadline for connect plus the first frame.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

const CONNECTION_ID_HEADER: &str = "Spotify-Connection-Id";

/// Open the dealer, read one message and return the assigned connection id.
pub async fn connection_id(
    dealer: &Url,
    access_token: &str,
    user_agent: &str,
    timeout: Duration,
) -> Result<String, Error> {
    let timeout_secs = timeout.as_secs();
    tokio::time::timeout(timeout, handshake(dealer, access_token, user_agent))
        .await
        .map_err(|_| Error::Timeout { timeout_secs })?
}

async fn handshake(dealer: &Url, access_token: &str, user_agent: &str) -> Result<String, Error> {
    let mut url = dealer.clone();
    url.query_pairs_mut().append_pair("access_token", access_token);
    debug!(url = %dealer, "connecting to dealer");

    let uri: tungstenite::http::Uri = url
        .as_str()
        .parse()
        .map_err(|e: tungstenite::http::uri::InvalidUri| Error::WebSocketConnect(e.to_string()))?;
    let request = ClientRequestBuilder::new(uri).with_header("User-Agent", user_agent);

    let (mut ws, _response) = tokio_tungstenite::connect_async(request)
        .await
        .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

    let payload = loop {
        match ws.next().await {
            Some(Ok(tungstenite::Message::Text(text))) => break parse_message(text.as_bytes()),
            Some(Ok(tungstenite::Message::Binary(data))) => break parse_message(&data),
            Some(Ok(tungstenite::Message::Close(_))) | None => {
                break Err(Error::WebSocketConnect(
                    "dealer closed before sending a message".into(),
                ));
            }
            Some(Ok(_)) => trace!("dealer control frame"),
            Some(Err(e)) => break Err(Error::WebSocketConnect(e.to_string())),
        }
    };

    if let Err(e) = ws.close(None).await {
        trace!(error = %e, "dealer close failed");
    }

    payload.and_then(|msg| extract_connection_id(&msg))
}

fn parse_message(data: &[u8]) -> Result<Value, Error> {
    serde_json::from_slice(data).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: String::from_utf8_lossy(data).into_owned(),
    })
}

/// Case-insensitive lookup of the connection id in `headers`.
pub(crate) fn extract_connection_id(message: &Value) -> Result<String, Error> {
    let headers = message
        .get("headers")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::discovery("missing headers"))?;

    headers
        .iter()
        .filter(|(key, _)| key.eq_ignore_ascii_case(CONNECTION_ID_HEADER))
        .find_map(|(_, value)| value.as_str().filter(|id| !id.is_empty()))
        .map(str::to_owned)
        .ok_or_else(|| Error::discovery("missing connection id"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::net::TcpListener;
    use futures_util::SinkExt;

    #[test]
    fn header_lookup_ignores_case() {
        let msg = json!({"headers": {"spotify-connection-id": "conn-1"}});
        assert_eq!(extract_connection_id(&msg).expect("id"), "conn-1");
    }

    #[test]
    fn missing_headers_and_id_are_distinct() {
        assert_eq!(
            extract_connection_id(&json!({"type": "message"}))
                .expect_err("no headers")
                .to_string(),
            "missing headers"
        );
        assert_eq!(
            extract_connection_id(&json!({"headers": {"Spotify-Connection-Id": ""}}))
                .expect_err("empty id")
                .to_string(),
            "missing connection id"
        );
    }

    #[tokio::test]
    async fn reads_first_message_from_local_dealer() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let mut ws = tokio_tungstenite::accept_async(stream).await.expect("upgrade");
            ws.send(tungstenite::Message::text(
                r#"{"headers":{"Spotify-Connection-Id":"abc123"},"method":"PUT"}"#,
            ))
            .await
            .expect("send");
            // Drain until the client closes.
            while let Some(Ok(_)) = ws.next().await {}
        });

        let dealer = Url::parse(&format!("ws://{addr}/")).expect("url");
        let id = connection_id(&dealer, "token", "spogo-test", Duration::from_secs(5))
            .await
            .expect("connection id");
        assert_eq!(id, "abc123");
        server.await.expect("server task");
    }

    #[tokio::test]
    async fn silent_dealer_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let _ws = tokio_tungstenite::accept_async(stream).await.expect("upgrade");
            tokio::time::sleep(Duration::from_secs(2)).await;
        });

        let dealer = Url::parse(&format!("ws://{addr}/")).expect("url");
        let err = connection_id(&dealer, "token", "spogo-test", Duration::from_millis(200))
            .await
            .expect_err("timeout");
        assert!(matches!(err, Error::Timeout { .. }));
        server.abort();
    }
}
