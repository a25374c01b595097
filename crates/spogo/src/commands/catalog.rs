//! Search and item lookup handlers.

use tabled::Tabled;

use spogo_core::{Item, ItemKind, SpotifyBackend};

use crate::cli::SearchArgs;
use crate::commands::Context;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct ItemRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "By")]
    by: String,
    #[tabled(rename = "Album")]
    album: String,
    #[tabled(rename = "Length")]
    length: String,
    #[tabled(rename = "URI")]
    uri: String,
}

impl From<&Item> for ItemRow {
    fn from(i: &Item) -> Self {
        let by = if i.artists.is_empty() {
            i.owner.clone().or_else(|| i.publisher.clone()).unwrap_or_default()
        } else {
            i.artists.join(", ")
        };
        let mut name = i.name.clone();
        if i.explicit {
            name.push_str(" [E]");
        }
        Self {
            name,
            by,
            album: i.album.clone().unwrap_or_default(),
            length: i.duration_ms.map(output::duration).unwrap_or_default(),
            uri: i.uri.clone(),
        }
    }
}

/// Key/value block for one item; absent fields are skipped.
pub fn detail(i: &Item) -> String {
    let mut lines = vec![
        format!("Name:      {}", i.name),
        format!("Kind:      {}", i.kind),
    ];
    if !i.artists.is_empty() {
        lines.push(format!("Artists:   {}", i.artists.join(", ")));
    }
    let optional = [
        ("Album:     ", i.album.clone()),
        ("Owner:     ", i.owner.clone()),
        ("Publisher: ", i.publisher.clone()),
        ("Length:    ", i.duration_ms.map(output::duration)),
        ("Released:  ", i.release_date.clone()),
        ("Tracks:    ", i.total_tracks.map(|n| n.to_string())),
        ("Episodes:  ", i.total_episodes.map(|n| n.to_string())),
        ("Followers: ", i.followers.map(|n| n.to_string())),
        ("About:     ", i.description.clone()),
    ];
    for (label, value) in optional {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            lines.push(format!("{label}{value}"));
        }
    }
    if !i.genres.is_empty() {
        lines.push(format!("Genres:    {}", i.genres.join(", ")));
    }
    if i.explicit {
        lines.push("Explicit:  yes".into());
    }
    if i.is_playable == Some(false) {
        lines.push("Playable:  no".into());
    }
    lines.push(format!("URI:       {}", i.uri));
    lines.push(format!(
        "URL:       {}",
        i.url.clone().unwrap_or_else(|| i.kind.url(&i.id))
    ));
    lines.join("\n")
}

/// Render a list of items and, for tables, a paging footer.
pub fn print_items(items: &[Item], ctx: &Context) -> Result<(), CliError> {
    let out = output::render_list(ctx.output, items, |i| ItemRow::from(i), |i| i.uri.clone())?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn search(
    backend: &dyn SpotifyBackend,
    args: SearchArgs,
    ctx: &Context,
) -> Result<(), CliError> {
    let kind: ItemKind = args.kind.into();
    let query = args.query.join(" ");
    let result = ctx
        .run(backend.search(kind, &query, args.limit, args.offset))
        .await?;

    print_items(&result.items, ctx)?;
    if ctx.is_table() {
        output::print_status(
            &output::dim(
                &util::page_footer(result.offset, result.items.len(), result.total),
                ctx.color,
            ),
            ctx.quiet,
        );
    }
    Ok(())
}

pub async fn info(
    backend: &dyn SpotifyBackend,
    resource: &str,
    ctx: &Context,
) -> Result<(), CliError> {
    let (kind, id) = util::typed_resource(resource)?;
    let item = ctx.run(backend.item(kind, &id)).await?;
    let out = output::render_single(ctx.output, &item, detail, |i| i.uri.clone())?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_prefers_artists_then_owner() {
        let mut track = Item::new(ItemKind::Track, "t1", "Holiday");
        track.artists = vec!["Weezer".into()];
        track.explicit = true;
        track.duration_ms = Some(206_000);
        let row = ItemRow::from(&track);
        assert_eq!(row.by, "Weezer");
        assert_eq!(row.name, "Holiday [E]");
        assert_eq!(row.length, "3:26");

        let mut playlist = Item::new(ItemKind::Playlist, "p1", "Mix");
        playlist.owner = Some("spotify".into());
        assert_eq!(ItemRow::from(&playlist).by, "spotify");
    }

    #[test]
    fn detail_skips_absent_fields() {
        let mut album = Item::new(ItemKind::Album, "a1", "Pinkerton");
        album.release_date = Some("1996-09-24".into());
        let text = detail(&album);
        assert!(text.contains("Released:  1996-09-24"));
        assert!(!text.contains("Owner"));
        assert!(text.contains("URI:       spotify:album:a1"));
        assert!(text.contains("https://open.spotify.com/album/a1"));
    }
}
