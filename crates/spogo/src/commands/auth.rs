//! Cookie management. These commands never talk to Spotify.

use std::path::Path;

use spogo_api::Cookie;
use spogo_api::cookies::{SESSION_COOKIE, write_cookies};
use tracing::debug;

use crate::cli::{AuthArgs, AuthCommand};
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

pub fn handle(args: AuthArgs, settings: &Settings, quiet: bool) -> Result<(), CliError> {
    let target = &settings.profile.cookie_path;
    match args.command {
        AuthCommand::Import { file } => {
            let cookies = read_cookie_file(&file)?;
            debug!(count = cookies.len(), path = %target.display(), "importing cookies");
            write_cookies(target, &cookies).map_err(|e| CliError::Failed {
                message: format!("could not write {}: {e}", target.display()),
            })?;
            output::print_status(
                &format!(
                    "Imported {} cookies for profile '{}' into {}",
                    cookies.len(),
                    settings.profile.name,
                    target.display()
                ),
                quiet,
            );
            Ok(())
        }

        AuthCommand::Path => {
            output::print_output(&target.display().to_string(), quiet);
            Ok(())
        }
    }
}

/// Parse an exported cookie array and require the session cookie.
fn read_cookie_file(path: &Path) -> Result<Vec<Cookie>, CliError> {
    let contents = std::fs::read_to_string(path)?;
    let cookies: Vec<Cookie> = serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "cookie file".into(),
        reason: format!("expected a JSON array of cookies: {e}"),
    })?;
    if !cookies
        .iter()
        .any(|c| c.name == SESSION_COOKIE && !c.value.is_empty())
    {
        return Err(CliError::Validation {
            field: "cookie file".into(),
            reason: format!("no {SESSION_COOKIE} cookie; export cookies while logged in"),
        });
    }
    Ok(cookies)
}
