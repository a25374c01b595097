//! CLI configuration: thin wrapper around `spogo_config`.
//!
//! Resolves the active profile and layers the global flag overrides
//! (`--market`, `--engine`, `--cookies`, ...) on top of it.

use std::time::Duration;

use clap::ValueEnum;

use spogo_config::{Config, ResolvedProfile, load_config, validate_market};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Everything a command needs besides the backend.
#[derive(Debug)]
pub struct Settings {
    pub profile: ResolvedProfile,
    pub output: OutputFormat,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| spogo_config::DEFAULT_PROFILE.into())
}

/// Load the config file and apply flag overrides.
pub fn resolve_settings(global: &GlobalOpts) -> Result<Settings, CliError> {
    let config = load_config()?;
    resolve_with(&config, global)
}

pub fn resolve_with(config: &Config, global: &GlobalOpts) -> Result<Settings, CliError> {
    let name = active_profile_name(global, config);
    let mut profile = config.resolve(&name)?;

    if let Some(ref path) = global.cookies {
        profile.cookie_path.clone_from(path);
    }
    if let Some(ref market) = global.market {
        profile.market = Some(validate_market(market)?);
    }
    if let Some(ref language) = global.language {
        profile.language = Some(language.clone());
    }
    if let Some(ref device) = global.device {
        profile.device = Some(device.clone());
    }
    if let Some(engine) = global.engine {
        profile.engine = engine.into();
    }
    if let Some(secs) = global.timeout {
        profile.timeout = Duration::from_secs(secs);
    }

    let output = match global.output {
        Some(format) => format,
        None => OutputFormat::from_str(&config.defaults.output, true).map_err(|_| {
            CliError::Validation {
                field: "defaults.output".into(),
                reason: format!(
                    "expected table, json, yaml or plain, got '{}'",
                    config.defaults.output
                ),
            }
        })?,
    };

    Ok(Settings { profile, output })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use spogo_config::Profile;
    use spogo_core::Engine;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["spogo"];
        argv.extend_from_slice(args);
        argv.push("status");
        Cli::try_parse_from(argv).expect("parse").global
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.defaults.output = "plain".into();
        config.profiles.insert(
            "work".into(),
            Profile {
                market: Some("DE".into()),
                engine: Some(Engine::Connect),
                ..Profile::default()
            },
        );
        config
    }

    #[test]
    fn flags_override_profile() {
        let settings = resolve_with(
            &config(),
            &global(&[
                "--profile", "work", "--market", "se", "--engine", "web", "--cookies", "/tmp/c.json",
            ]),
        )
        .expect("resolve");
        assert_eq!(settings.profile.name, "work");
        assert_eq!(settings.profile.market.as_deref(), Some("SE"));
        assert_eq!(settings.profile.engine, Engine::Web);
        assert_eq!(settings.profile.cookie_path, PathBuf::from("/tmp/c.json"));
    }

    #[test]
    fn config_output_applies_without_flag() {
        let settings = resolve_with(&config(), &global(&["--profile", "work"])).expect("resolve");
        assert_eq!(settings.output, OutputFormat::Plain);
        assert_eq!(settings.profile.engine, Engine::Connect);
    }

    #[test]
    fn bad_market_flag_is_usage_error() {
        let err = resolve_with(&config(), &global(&["--market", "nowhere"])).expect_err("invalid");
        assert_eq!(err.exit_code(), crate::error::exit_code::USAGE);
    }
}
