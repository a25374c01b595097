mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use spogo_core::{build_backend, cancellable};

use crate::cli::{Cli, Command};
use crate::commands::Context;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose, cli.global.log_json);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("interrupt received, cancelling");
            on_signal.cancel();
        }
    });

    if let Err(err) = run(cli, cancel).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli, cancel: CancellationToken) -> Result<(), CliError> {
    match cli.command {
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "spogo", &mut std::io::stdout());
            Ok(())
        }

        // Cookie management needs the profile but no backend
        Command::Auth(args) => {
            let settings = config::resolve_settings(&cli.global)?;
            commands::auth::handle(args, &settings, cli.global.quiet)
        }

        cmd => {
            let settings = config::resolve_settings(&cli.global)?;
            tracing::debug!(
                profile = %settings.profile.name,
                engine = %settings.profile.engine,
                cookies = %settings.profile.cookie_path.display(),
                "resolved profile"
            );
            let backend =
                cancellable(&cancel, build_backend(settings.profile.client_config())).await?;
            let ctx = Context::new(
                settings.output,
                cli.global.quiet,
                output::should_color(cli.global.color),
                cancel,
            );

            tracing::debug!(command = ?cmd, backend = backend.name(), "dispatching command");
            commands::dispatch(cmd, backend.as_ref(), &ctx).await
        }
    }
}
