// ── Dispatch routers ──
//
// Routers are backends composed of backends. A call goes to the primary
// first and moves to the secondary only when the primary's error matches
// the router's policy; any other error comes back unchanged.

pub mod auto;
pub mod fallback;

pub use auto::AutoRouter;
pub use fallback::FallbackRouter;

use futures_util::future::BoxFuture;
use tracing::{debug, warn};

use crate::backend::SpotifyBackend;
use crate::error::CoreError;

/// Which primary errors move a call to the secondary backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// The primary reported the operation unsupported, or answered 429.
    UnsupportedOrRateLimited,
    /// Only HTTP 429.
    RateLimitedOnly,
}

impl FallbackPolicy {
    pub fn should_fallback(self, err: &CoreError) -> bool {
        match self {
            Self::UnsupportedOrRateLimited => err.is_unsupported() || err.is_rate_limited(),
            Self::RateLimitedOnly => err.is_rate_limited(),
        }
    }
}

/// Run `call` on `primary`, then on `secondary` if the policy allows.
///
/// `T` is whatever the operation yields; unit, a page and a tuple all go
/// through the same path.
pub(crate) async fn cascade<'a, T, F>(
    operation: &'static str,
    primary: &'a dyn SpotifyBackend,
    secondary: Option<&'a dyn SpotifyBackend>,
    policy: FallbackPolicy,
    call: F,
) -> Result<T, CoreError>
where
    F: Fn(&'a dyn SpotifyBackend) -> BoxFuture<'a, Result<T, CoreError>>,
{
    let err = match call(primary).await {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };
    let Some(secondary) = secondary else {
        return Err(err);
    };
    if !policy.should_fallback(&err) {
        debug!(operation, backend = primary.name(), error = %err, "no fallback for error");
        return Err(err);
    }
    warn!(
        operation,
        from = primary.name(),
        to = secondary.name(),
        error = %err,
        "falling back"
    );
    call(secondary).await
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted backend that counts calls.

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::backend::SpotifyBackend;
    use crate::error::CoreError;
    use crate::model::{Item, ItemKind, LibraryKind, Page, PlaybackStatus, SearchResult};

    pub(crate) enum Script {
        Ok,
        Unsupported,
        Status(u16),
        Transport,
    }

    pub(crate) struct Scripted {
        pub name: &'static str,
        pub script: Script,
        pub calls: AtomicUsize,
    }

    impl Scripted {
        pub(crate) fn new(name: &'static str, script: Script) -> Self {
            Self {
                name,
                script,
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn answer(&self, operation: &str) -> Result<(), CoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script {
                Script::Ok => Ok(()),
                Script::Unsupported => Err(CoreError::unsupported(operation, self.name)),
                Script::Status(status) => Err(CoreError::Api {
                    status,
                    message: String::new(),
                }),
                Script::Transport => Err(CoreError::ConnectionFailed {
                    reason: "connection reset".into(),
                }),
            }
        }
    }

    #[async_trait]
    impl SpotifyBackend for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn search(
            &self,
            kind: ItemKind,
            _query: &str,
            limit: u32,
            offset: u32,
        ) -> Result<SearchResult, CoreError> {
            self.answer("search")?;
            Ok(SearchResult {
                kind,
                limit,
                offset,
                total: 1,
                items: vec![Item::new(kind, self.name, self.name)],
            })
        }

        async fn playback(&self) -> Result<PlaybackStatus, CoreError> {
            self.answer("playback")?;
            Ok(PlaybackStatus::default())
        }

        async fn pause(&self) -> Result<(), CoreError> {
            self.answer("pause")
        }

        async fn library(
            &self,
            _kind: LibraryKind,
            _limit: u32,
            _offset: u32,
        ) -> Result<Page<Item>, CoreError> {
            self.answer("library")?;
            Ok(Page { items: Vec::new(), total: 0 })
        }
    }
}
