//! Playlist command handlers.

use spogo_core::{ItemKind, SpotifyBackend};

use crate::cli::{PlaylistArgs, PlaylistCommand};
use crate::commands::Context;
use crate::error::CliError;
use crate::output;

use super::{catalog, util};

pub async fn handle(
    backend: &dyn SpotifyBackend,
    args: PlaylistArgs,
    ctx: &Context,
) -> Result<(), CliError> {
    match args.command {
        PlaylistCommand::List(list) => {
            let page = ctx.run(backend.playlists(list.limit, list.offset)).await?;
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

        PlaylistCommand::Create {
            name,
            public,
            collaborative,
        } => {
            if name.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "name".into(),
                    reason: "playlist name must not be empty".into(),
                });
            }
            let created = ctx
                .run(backend.create_playlist(&name, public, collaborative))
                .await?;
            let out =
                output::render_single(ctx.output, &created, catalog::detail, |i| i.uri.clone())?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        PlaylistCommand::Tracks { playlist, list } => {
            let id = util::id_arg(&playlist, ItemKind::Playlist)?;
            let page = ctx
                .run(backend.playlist_tracks(&id, list.limit, list.offset))
                .await?;
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

        PlaylistCommand::Add { playlist, items } => {
            let id = util::id_arg(&playlist, ItemKind::Playlist)?;
            let uris = util::uri_args(&items, ItemKind::Track)?;
            ctx.run(backend.add_playlist_tracks(&id, &uris)).await?;
            output::print_status(&format!("Added {} items to {id}", uris.len()), ctx.quiet);
            Ok(())
        }

        PlaylistCommand::Remove { playlist, items } => {
            let id = util::id_arg(&playlist, ItemKind::Playlist)?;
            let uris = util::uri_args(&items, ItemKind::Track)?;
            ctx.run(backend.remove_playlist_tracks(&id, &uris)).await?;
            output::print_status(
                &format!("Removed {} items from {id}", uris.len()),
                ctx.quiet,
            );
            Ok(())
        }
    }
}
