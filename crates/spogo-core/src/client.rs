// ── Backend assembly ──
//
// One session is shared by every engine built from a config, so credential
// refreshes and discovered hashes are reused across engines.

use std::sync::Arc;

use spogo_api::{
    ConnectClient, HashResolver, LocalPlayer, Pathfinder, SecretCache, Session, TotpEngine,
    TransportConfig, WebClient, WebOptions,
};
use tracing::debug;

use crate::backend::SpotifyBackend;
use crate::config::{ClientConfig, Engine};
use crate::engine::{ConnectEngine, LocalEngine, WebEngine};
use crate::error::CoreError;
use crate::router::{AutoRouter, FallbackRouter};

/// Build the backend `config.engine` selects.
pub async fn build_backend(config: ClientConfig) -> Result<Arc<dyn SpotifyBackend>, CoreError> {
    let totp = match config.totp {
        Some(totp) => totp,
        None => TotpEngine::from_env(SecretCache::new())?,
    };
    let transport = TransportConfig::default().with_timeout(config.timeout);
    let web_player = config.endpoints.web_player.clone();
    let mut session = Session::new(config.cookies, Arc::new(config.endpoints), transport, totp)?;
    if let Some(version) = config.connect_version.filter(|v| !v.trim().is_empty()) {
        session = session.with_connect_version(version);
    }
    let session = Arc::new(session);

    let web: Arc<dyn SpotifyBackend> = Arc::new(WebEngine::new(WebClient::new(
        Arc::clone(&session),
        WebOptions {
            market: config.market,
            language: config.language.clone(),
            device: config.device,
        },
    )));

    let hashes = Arc::new(HashResolver::new(session.http().clone(), web_player));
    if !config.known_hashes.is_empty() {
        hashes.seed(config.known_hashes).await;
    }
    let pathfinder =
        Pathfinder::new(Arc::clone(&session), hashes).with_language(config.language.clone());
    let connect: Arc<dyn SpotifyBackend> = Arc::new(
        ConnectEngine::new(Arc::new(ConnectClient::new(session)), pathfinder)
            .with_web(Arc::clone(&web))
            .with_language(config.language),
    );

    debug!(engine = %config.engine, "building backend");
    let backend: Arc<dyn SpotifyBackend> = match config.engine {
        Engine::Auto => Arc::new(AutoRouter::new(connect, Some(web))),
        Engine::Web => Arc::new(FallbackRouter::new(web, Some(connect))),
        Engine::Connect => connect,
        Engine::Applescript => {
            let auto: Arc<dyn SpotifyBackend> = Arc::new(AutoRouter::new(connect, Some(web)));
            Arc::new(LocalEngine::new(LocalPlayer::new()).with_fallback(auto))
        }
    };
    Ok(backend)
}
