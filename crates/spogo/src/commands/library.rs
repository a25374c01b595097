//! Library command handlers: saved tracks and albums, followed artists.

use spogo_core::{ItemKind, LibraryKind, SpotifyBackend};

use crate::cli::{ArtistsCommand, LibraryArgs, LibraryCommand, SavedCommand};
use crate::commands::Context;
use crate::error::CliError;
use crate::output;

use super::{catalog, util};

pub async fn handle(
    backend: &dyn SpotifyBackend,
    args: LibraryArgs,
    ctx: &Context,
) -> Result<(), CliError> {
    match args.command {
        LibraryCommand::Tracks(saved) => {
            handle_saved(backend, LibraryKind::Tracks, saved.command, ctx).await
        }
        LibraryCommand::Albums(saved) => {
            handle_saved(backend, LibraryKind::Albums, saved.command, ctx).await
        }
        LibraryCommand::Artists(artists) => handle_artists(backend, artists.command, ctx).await,
    }
}

fn item_kind(kind: LibraryKind) -> ItemKind {
    match kind {
        LibraryKind::Tracks => ItemKind::Track,
        LibraryKind::Albums => ItemKind::Album,
    }
}

async fn handle_saved(
    backend: &dyn SpotifyBackend,
    kind: LibraryKind,
    command: SavedCommand,
    ctx: &Context,
) -> Result<(), CliError> {
    match command {
        SavedCommand::List(list) => {
            let page = ctx.run(backend.library(kind, list.limit, list.offset)).await?;
            catalog::print_items(&page.items, ctx)?;
            if ctx.is_table() {
                output::print_status(
                    &output::dim(
                        &util::page_footer(list.offset, page.items.len(), page.total),
                        ctx.color,
                    ),
                    ctx.quiet,
                );
            }
            Ok(())
        }

        SavedCommand::Add { items } => {
            let ids = util::id_args(&items, item_kind(kind))?;
            ctx.run(backend.library_modify(kind, &ids, true)).await?;
            output::print_status(&format!("Saved {} {kind}", ids.len()), ctx.quiet);
            Ok(())
        }

        SavedCommand::Remove { items } => {
            let ids = util::id_args(&items, item_kind(kind))?;
            ctx.run(backend.library_modify(kind, &ids, false)).await?;
            output::print_status(&format!("Removed {} {kind}", ids.len()), ctx.quiet);
            Ok(())
        }
    }
}

async fn handle_artists(
    backend: &dyn SpotifyBackend,
    command: ArtistsCommand,
    ctx: &Context,
) -> Result<(), CliError> {
    match command {
        ArtistsCommand::List { limit, after } => {
            let page = ctx
                .run(backend.followed_artists(limit, after.as_deref()))
                .await?;
            catalog::print_items(&page.items, ctx)?;
            if ctx.is_table() && !page.next_after.is_empty() {
                output::print_status(
                    &output::dim(
                        &format!("More: --after {}", page.next_after),
                        ctx.color,
                    ),
                    ctx.quiet,
                );
            }
            Ok(())
        }

        ArtistsCommand::Follow { artists } => {
            let ids = util::id_args(&artists, ItemKind::Artist)?;
            ctx.run(backend.follow_artists(&ids, true)).await?;
            output::print_status(&format!("Followed {} artists", ids.len()), ctx.quiet);
            Ok(())
        }

        ArtistsCommand::Unfollow { artists } => {
            let ids = util::id_args(&artists, ItemKind::Artist)?;
            ctx.run(backend.follow_artists(&ids, false)).await?;
            output::print_status(&format!("Unfollowed {} artists", ids.len()), ctx.quiet);
            Ok(())
        }
    }
}
