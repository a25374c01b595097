//! Device and queue command handlers.

use tabled::Tabled;

use spogo_core::{Device, ItemKind, SpotifyBackend};

use crate::cli::{DeviceArgs, DeviceCommand, OutputFormat, QueueArgs, QueueCommand};
use crate::commands::Context;
use crate::error::CliError;
use crate::output;

use super::{catalog, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "")]
    active: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    dtype: String,
    #[tabled(rename = "Volume")]
    volume: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            active: if d.active { "*".into() } else { String::new() },
            id: d.id.clone(),
            name: d.name.clone(),
            dtype: d.device_type.clone(),
            volume: if d.restricted {
                "-".into()
            } else {
                format!("{}%", d.volume)
            },
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle_device(
    backend: &dyn SpotifyBackend,
    args: DeviceArgs,
    ctx: &Context,
) -> Result<(), CliError> {
    match args.command {
        DeviceCommand::List => {
            let devices = ctx.run(backend.devices()).await?;
            let out = output::render_list(
                ctx.output,
                &devices,
                |d| DeviceRow::from(d),
                |d| d.id.clone(),
            )?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        DeviceCommand::Set { id } => {
            ctx.run(backend.transfer(&id)).await?;
            output::print_status(&format!("Playback transferred to {id}"), ctx.quiet);
            Ok(())
        }
    }
}

pub async fn handle_queue(
    backend: &dyn SpotifyBackend,
    args: QueueArgs,
    ctx: &Context,
) -> Result<(), CliError> {
    match args.command {
        QueueCommand::Add { resource } => {
            let uri = util::uri_arg(&resource, ItemKind::Track)?;
            ctx.run(backend.queue_add(&uri)).await?;
            output::print_status(&format!("Queued {uri}"), ctx.quiet);
            Ok(())
        }

        QueueCommand::Show => {
            let queue = ctx.run(backend.queue()).await?;
            match ctx.output {
                OutputFormat::Json | OutputFormat::Yaml => {
                    let out =
                        output::render_single(ctx.output, &queue, |_| String::new(), |_| {
                            String::new()
                        })?;
                    output::print_output(&out, ctx.quiet);
                }
                OutputFormat::Table | OutputFormat::Plain => {
                    let current = queue.currently_playing.as_ref().filter(|_| ctx.is_table());
                    if let Some(current) = current {
                        output::print_status(&format!("Now playing: {}", current.name), ctx.quiet);
                    }
                    catalog::print_items(&queue.queue, ctx)?;
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restricted_devices_hide_volume() {
        let device = Device {
            id: "tv".into(),
            name: "Living Room".into(),
            device_type: "tv".into(),
            volume: 30,
            active: true,
            restricted: true,
        };
        let row = DeviceRow::from(&device);
        assert_eq!(row.volume, "-");
        assert_eq!(row.active, "*");
    }
}
