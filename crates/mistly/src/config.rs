//! CLI-side profile resolution: config file profile + flag overrides.

use std::time::Duration;

use secrecy::SecretString;

use mistly_api::ClientConfig;
use mistly_config::{Config, DEFAULT_BASE_URL, Profile};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Build a `ClientConfig` from the config file, profile, and CLI overrides.
///
/// Flags win over the profile. Without a matching profile the flags alone
/// must supply an API key; the base URL defaults to the global cloud.
pub fn build_client_config(global: &GlobalOpts) -> Result<ClientConfig, CliError> {
    let cfg = mistly_config::load_config_or_default();
    resolve(&cfg, global, |name| std::env::var(name).ok())
}

pub(crate) fn resolve(
    cfg: &Config,
    global: &GlobalOpts,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientConfig, CliError> {
    let name = cfg.profile_name(global.profile.as_deref());

    let profile = match cfg.profiles.get(name) {
        Some(profile) => Some(profile),
        None if global.profile.is_some() => {
            let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name: name.to_owned(),
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None => None,
    };

    let base_url = global
        .base_url
        .clone()
        .or_else(|| profile.map(|p| p.base_url.clone()))
        .unwrap_or_else(|| DEFAULT_BASE_URL.into());
    validate_url("base_url", &base_url)?;

    let api_key = match (&global.api_key, profile) {
        (Some(key), _) => SecretString::from(key.clone()),
        (None, Some(profile)) => mistly_config::resolve_api_key_with(profile, name, env)?,
        (None, None) => {
            return Err(CliError::NoCredentials {
                profile: name.to_owned(),
                path: mistly_config::config_path().display().to_string(),
            });
        }
    };

    let stream_url = global
        .stream_url
        .clone()
        .or_else(|| profile.and_then(|p| p.stream_url.clone()));
    if let Some(ref url) = stream_url {
        validate_url("stream_url", url)?;
    }

    let timeout = global
        .timeout
        .or_else(|| profile.and_then(|p: &Profile| p.timeout))
        .unwrap_or(cfg.defaults.timeout);

    let mut config = ClientConfig::new(base_url, api_key);
    config.timeout = Duration::from_secs(timeout);
    config.stream_url = stream_url;
    Ok(config)
}

fn validate_url(field: &str, value: &str) -> Result<(), CliError> {
    value
        .parse::<url::Url>()
        .map(|_| ())
        .map_err(|e| CliError::Validation {
            field: field.into(),
            reason: format!("invalid URL '{value}': {e}"),
        })
}
