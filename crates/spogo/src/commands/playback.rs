//! Playback command handlers.

use spogo_core::{ItemKind, PlaybackStatus, RepeatMode, SpotifyBackend};

use crate::commands::Context;
use crate::error::CliError;
use crate::output;

use super::util;

fn status_detail(s: &PlaybackStatus, color: bool) -> String {
    let Some(item) = s.item.as_ref() else {
        return "Nothing playing".into();
    };
    let mut lines = vec![
        format!("State:    {}", output::paint_state(s.is_playing, color)),
        format!("Title:    {}", item.name),
    ];
    if !item.artists.is_empty() {
        lines.push(format!("Artists:  {}", item.artists.join(", ")));
    }
    if let Some(ref album) = item.album {
        lines.push(format!("Album:    {album}"));
    }
    let progress = match item.duration_ms {
        Some(total) => format!(
            "{} / {}",
            output::duration(s.progress_ms),
            output::duration(total)
        ),
        None => output::duration(s.progress_ms),
    };
    lines.push(format!("Progress: {progress}"));
    if !s.device.name.is_empty() {
        lines.push(format!(
            "Device:   {} ({}, {}%)",
            s.device.name, s.device.device_type, s.device.volume
        ));
    }
    lines.push(format!(
        "Shuffle:  {}",
        if s.shuffle { "on" } else { "off" }
    ));
    lines.push(format!("Repeat:   {}", s.repeat));
    lines.push(output::dim(&item.uri, color));
    lines.join("\n")
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn status(backend: &dyn SpotifyBackend, ctx: &Context) -> Result<(), CliError> {
    let state = ctx.run(backend.playback()).await?;
    let out = output::render_single(
        ctx.output,
        &state,
        |s| status_detail(s, ctx.color),
        |s| s.item.as_ref().map(|i| i.uri.clone()).unwrap_or_default(),
    )?;
    output::print_output(&out, ctx.quiet);
    Ok(())
}

pub async fn play(
    backend: &dyn SpotifyBackend,
    resource: Option<&str>,
    ctx: &Context,
) -> Result<(), CliError> {
    let uri = resource
        .map(|r| util::uri_arg(r, ItemKind::Track))
        .transpose()?;
    ctx.run(backend.play(uri.as_deref())).await?;
    match uri {
        Some(uri) => output::print_status(&format!("Playing {uri}"), ctx.quiet),
        None => output::print_status("Playback resumed", ctx.quiet),
    }
    Ok(())
}

pub async fn pause(backend: &dyn SpotifyBackend, ctx: &Context) -> Result<(), CliError> {
    ctx.run(backend.pause()).await?;
    output::print_status("Playback paused", ctx.quiet);
    Ok(())
}

pub async fn next(backend: &dyn SpotifyBackend, ctx: &Context) -> Result<(), CliError> {
    ctx.run(backend.next()).await?;
    output::print_status("Skipped to next", ctx.quiet);
    Ok(())
}

pub async fn previous(backend: &dyn SpotifyBackend, ctx: &Context) -> Result<(), CliError> {
    ctx.run(backend.previous()).await?;
    output::print_status("Back to previous", ctx.quiet);
    Ok(())
}

pub async fn seek(
    backend: &dyn SpotifyBackend,
    position_ms: i64,
    ctx: &Context,
) -> Result<(), CliError> {
    ctx.run(backend.seek(position_ms)).await?;
    let shown = u64::try_from(position_ms).map_or_else(|_| "0:00".into(), output::duration);
    output::print_status(&format!("Seeked to {shown}"), ctx.quiet);
    Ok(())
}

pub async fn volume(
    backend: &dyn SpotifyBackend,
    percent: i64,
    ctx: &Context,
) -> Result<(), CliError> {
    ctx.run(backend.volume(percent)).await?;
    output::print_status(&format!("Volume set to {percent}%"), ctx.quiet);
    Ok(())
}

pub async fn shuffle(
    backend: &dyn SpotifyBackend,
    enabled: bool,
    ctx: &Context,
) -> Result<(), CliError> {
    ctx.run(backend.shuffle(enabled)).await?;
    let state = if enabled { "on" } else { "off" };
    output::print_status(&format!("Shuffle {state}"), ctx.quiet);
    Ok(())
}

pub async fn repeat(
    backend: &dyn SpotifyBackend,
    mode: RepeatMode,
    ctx: &Context,
) -> Result<(), CliError> {
    ctx.run(backend.repeat(mode)).await?;
    output::print_status(&format!("Repeat {mode}"), ctx.quiet);
    Ok(())
}
