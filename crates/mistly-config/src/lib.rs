//! Profile configuration for mistly.
//!
//! TOML profiles, API key resolution (env var, then plaintext), and
//! translation to `mistly_api::ClientConfig`. The CLI layers its flag
//! overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mistly_api::ClientConfig;

/// Base URL used when a profile does not name one.
pub const DEFAULT_BASE_URL: &str = "https://api.mist.com";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("no API key configured for profile '{profile}'")]
    NoCredentials { profile: String },

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

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named API profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    10
}

/// A named Mist cloud profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// REST base URL, e.g. `https://api.eu.mist.com`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API token (plaintext; prefer `api_key_env`).
    pub api_key: Option<String>,

    /// Environment variable holding the API token.
    pub api_key_env: Option<String>,

    /// Override of `defaults.timeout`.
    pub timeout: Option<u64>,

    /// Explicit streaming endpoint, for deployments whose host does not
    /// follow the `api.` → `api-ws.` convention.
    pub stream_url: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "mistly", "mistly").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("mistly");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the Config from `path` + environment.
///
/// Environment keys use the `MIST_` prefix with `__` separating levels,
/// e.g. `MIST_DEFAULT_PROFILE` or `MIST_PROFILES__EU__BASE_URL`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("MIST_").split("__"));

    Ok(figment.extract()?)
}

/// Load config, returning a default if the file is missing or unreadable.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(cfg)?)?;
    Ok(())
}

/// Serialize config to TOML and write it to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

// ── Profile selection ───────────────────────────────────────────────

impl Config {
    /// Name of the profile to use: `requested`, else `default_profile`,
    /// else `"default"`.
    pub fn profile_name<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .or(self.default_profile.as_deref())
            .unwrap_or("default")
    }

    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the API key: the profile's `api_key_env` variable, then the
/// plaintext `api_key`.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_api_key_with(profile, profile_name, |name| std::env::var(name).ok())
}

/// [`resolve_api_key`] with an explicit environment lookup.
pub fn resolve_api_key_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    if let Some(val) = profile.api_key_env.as_deref().and_then(&env) {
        return Ok(SecretString::from(val));
    }

    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Build a `ClientConfig` from a profile, no CLI flag overrides.
pub fn profile_to_client_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    validate_url("base_url", &profile.base_url)?;
    if let Some(ref stream_url) = profile.stream_url {
        validate_url("stream_url", stream_url)?;
    }

    let api_key = resolve_api_key(profile, profile_name)?;

    let mut config = ClientConfig::new(profile.base_url.clone(), api_key);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.stream_url.clone_from(&profile.stream_url);
    Ok(config)
}

fn validate_url(field: &str, value: &str) -> Result<(), ConfigError> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| ConfigError::Validation {
            field: field.into(),
            reason: format!("invalid URL '{value}': {e}"),
        })
}
