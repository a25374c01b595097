//! Command dispatch: bridges CLI args -> backend calls -> output formatting.

pub mod auth;
pub mod catalog;
pub mod devices;
pub mod library;
pub mod playback;
pub mod playlist;
pub mod util;

use std::future::Future;

use tokio_util::sync::CancellationToken;

use spogo_core::{CoreError, SpotifyBackend, cancellable};

use crate::cli::{Command, OutputFormat};
use crate::error::CliError;

/// Per-invocation state shared by every handler.
#[derive(Debug, Clone)]
pub struct Context {
    pub output: OutputFormat,
    pub quiet: bool,
    pub color: bool,
    cancel: CancellationToken,
}

impl Context {
    pub fn new(output: OutputFormat, quiet: bool, color: bool, cancel: CancellationToken) -> Self {
        Self {
            output,
            quiet,
            color,
            cancel,
        }
    }

    /// Await a backend call, aborting it when Ctrl-C fires.
    pub async fn run<T>(
        &self,
        fut: impl Future<Output = Result<T, CoreError>>,
    ) -> Result<T, CliError> {
        Ok(cancellable(&self.cancel, fut).await?)
    }

    pub fn is_table(&self) -> bool {
        self.output == OutputFormat::Table
    }
}

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    backend: &dyn SpotifyBackend,
    ctx: &Context,
) -> Result<(), CliError> {
    match cmd {
        Command::Search(args) => catalog::search(backend, args, ctx).await,
        Command::Info { resource } => catalog::info(backend, &resource, ctx).await,
        Command::Status => playback::status(backend, ctx).await,
        Command::Play { resource } => playback::play(backend, resource.as_deref(), ctx).await,
        Command::Pause => playback::pause(backend, ctx).await,
        Command::Next => playback::next(backend, ctx).await,
        Command::Prev => playback::previous(backend, ctx).await,
        Command::Seek { position_ms } => playback::seek(backend, position_ms, ctx).await,
        Command::Volume { percent } => playback::volume(backend, percent, ctx).await,
        Command::Shuffle { state } => playback::shuffle(backend, state.enabled(), ctx).await,
        Command::Repeat { mode } => playback::repeat(backend, mode.into(), ctx).await,
        Command::Device(args) => devices::handle_device(backend, args, ctx).await,
        Command::Queue(args) => devices::handle_queue(backend, args, ctx).await,
        Command::Library(args) => library::handle(backend, args, ctx).await,
        Command::Playlist(args) => playlist::handle(backend, args, ctx).await,
        // Auth and Completions never build a backend
        Command::Auth(_) | Command::Completions(_) => Err(CliError::Failed {
            message: "command does not use a backend".into(),
        }),
    }
}
