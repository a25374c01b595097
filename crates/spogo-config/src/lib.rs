//! Shared configuration for spogo.
//!
//! TOML profiles under the platform config directory, layered with
//! `SPOGO_*` environment overrides, and translation of a profile into a
//! `spogo_core::ClientConfig`. The CLI applies its flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use spogo_api::FileCookieSource;
use spogo_core::{ClientConfig, Engine};

pub const DEFAULT_PROFILE: &str = "default";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is absent.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    /// `table`, `json` or `plain`.
    #[serde(default = "default_output")]
    pub output: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default)]
    pub engine: Engine,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            engine: Engine::default(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    10
}

/// A named account profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Cookie JSON file; defaults to `<config dir>/cookies/<profile>.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_path: Option<PathBuf>,

    /// ISO 3166-1 alpha-2 market for catalog requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Device id targeted by player commands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,

    /// Overrides `defaults.engine`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<Engine>,
}

// ── Resolved profile ────────────────────────────────────────────────

/// A profile merged with `[defaults]`, ready to build a client from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProfile {
    pub name: String,
    pub cookie_path: PathBuf,
    pub market: Option<String>,
    pub language: Option<String>,
    pub device: Option<String>,
    pub engine: Engine,
    pub timeout: Duration,
}

impl Config {
    /// Merge profile `name` with the defaults.
    ///
    /// A profile missing from the file resolves to the defaults alone, so
    /// a fresh install works once cookies are imported.
    pub fn resolve(&self, name: &str) -> Result<ResolvedProfile, ConfigError> {
        let profile = self.profiles.get(name).cloned().unwrap_or_default();

        if self.defaults.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "defaults.timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        let market = profile.market.map(|m| validate_market(&m)).transpose()?;

        Ok(ResolvedProfile {
            name: name.to_owned(),
            cookie_path: profile
                .cookie_path
                .unwrap_or_else(|| default_cookie_path(name)),
            market,
            language: profile.language.filter(|l| !l.trim().is_empty()),
            device: profile.device.filter(|d| !d.trim().is_empty()),
            engine: profile.engine.unwrap_or(self.defaults.engine),
            timeout: Duration::from_secs(self.defaults.timeout),
        })
    }
}

impl ResolvedProfile {
    /// Core client configuration reading cookies from `cookie_path`.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(Arc::new(FileCookieSource::new(&self.cookie_path)));
        config.engine = self.engine;
        config.market.clone_from(&self.market);
        config.language.clone_from(&self.language);
        config.device.clone_from(&self.device);
        config.timeout = self.timeout;
        config
    }
}

/// Upper-cased two-letter market code.
pub fn validate_market(market: &str) -> Result<String, ConfigError> {
    let market = market.trim();
    if market.len() == 2 && market.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(market.to_ascii_uppercase())
    } else {
        Err(ConfigError::Validation {
            field: "market".into(),
            reason: format!("expected a two-letter country code, got '{market}'"),
        })
    }
}

// ── Paths ───────────────────────────────────────────────────────────

/// Platform config directory for spogo.
pub fn config_dir() -> PathBuf {
    ProjectDirs::from("com", "spogo", "spogo")
        .map_or_else(dirs_fallback, |dirs| dirs.config_dir().to_path_buf())
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("spogo");
    p
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

pub fn default_cookie_path(profile: &str) -> PathBuf {
    config_dir().join("cookies").join(format!("{profile}.json"))
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load the config from the canonical path plus environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Defaults, then `path` (if present), then `SPOGO_*` variables.
///
/// Nested keys use a double underscore: `SPOGO_DEFAULTS__ENGINE=web`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SPOGO_").split("__"));

    Ok(figment.extract()?)
}

// ── Saving ──────────────────────────────────────────────────────────

pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, body).expect("write config");
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = load_config_from(&dir.path().join("absent.toml")).expect("load");
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.output, "table");
        assert_eq!(cfg.defaults.timeout, 10);
        assert_eq!(cfg.defaults.engine, Engine::Auto);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn profiles_and_defaults_parse() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(
            &dir,
            r#"
default_profile = "work"

[defaults]
output = "json"
timeout = 20
engine = "web"

[profiles.work]
cookie_path = "/tmp/work-cookies.json"
market = "de"
language = "de"
engine = "connect"

[profiles.home]
device = "kitchen"
"#,
        );

        let cfg = load_config_from(&path).expect("load");
        assert_eq!(cfg.default_profile.as_deref(), Some("work"));
        assert_eq!(cfg.defaults.output, "json");

        let work = cfg.resolve("work").expect("resolve work");
        assert_eq!(work.cookie_path, PathBuf::from("/tmp/work-cookies.json"));
        assert_eq!(work.market.as_deref(), Some("DE"));
        assert_eq!(work.engine, Engine::Connect);
        assert_eq!(work.timeout, Duration::from_secs(20));

        let home = cfg.resolve("home").expect("resolve home");
        assert_eq!(home.engine, Engine::Web);
        assert_eq!(home.device.as_deref(), Some("kitchen"));
        assert!(home.cookie_path.ends_with("cookies/home.json"));
    }

    #[test]
    fn unknown_profile_resolves_to_defaults() {
        let resolved = Config::default().resolve("scratch").expect("resolve");
        assert_eq!(resolved.name, "scratch");
        assert_eq!(resolved.engine, Engine::Auto);
        assert!(resolved.market.is_none());
        assert_eq!(resolved.cookie_path, default_cookie_path("scratch"));
    }

    #[test]
    fn bad_market_is_rejected() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "x".into(),
            Profile {
                market: Some("germany".into()),
                ..Profile::default()
            },
        );
        let err = cfg.resolve("x").expect_err("invalid market");
        assert!(
            matches!(err, ConfigError::Validation { ref field, .. } if field == "market"),
            "expected market validation, got: {err:?}"
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut cfg = Config::default();
        cfg.defaults.timeout = 0;
        assert!(cfg.resolve("default").is_err());
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                market: Some("US".into()),
                engine: Some(Engine::Applescript),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).expect("save");

        let loaded = load_config_from(&path).expect("load");
        assert_eq!(loaded.profiles, cfg.profiles);
    }

    #[test]
    fn client_config_carries_profile_values() {
        let resolved = ResolvedProfile {
            name: "default".into(),
            cookie_path: PathBuf::from("/tmp/c.json"),
            market: Some("SE".into()),
            language: Some("sv".into()),
            device: None,
            engine: Engine::Web,
            timeout: Duration::from_secs(5),
        };
        let config = resolved.client_config();
        assert_eq!(config.engine, Engine::Web);
        assert_eq!(config.market.as_deref(), Some("SE"));
        assert_eq!(config.language.as_deref(), Some("sv"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
