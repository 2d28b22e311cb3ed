//! CLI error types with miette diagnostics.
//!
//! Maps `mistly_api::Error` and `ConfigError` into user-facing errors with
//! actionable help text and distinct exit codes.

use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

use mistly_api::Error as ApiError;
use mistly_config::ConfigError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to {url}")]
    #[diagnostic(
        code(mistly::connection_failed),
        help(
            "Check the base URL and your network connection.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Streaming connection lost: {reason}")]
    #[diagnostic(code(mistly::stream_failed))]
    StreamFailed { reason: String },

    #[error("Server ended the stream on channel {channel}")]
    #[diagnostic(
        code(mistly::stream_closed),
        help("The connection closed before the requested number of updates arrived.")
    )]
    StreamClosed { channel: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed (HTTP {status})")]
    #[diagnostic(
        code(mistly::auth_failed),
        help(
            "Verify the API token and that it has access to this organization or site.\n\
             Tokens are managed under My Account > API Token in the Mist portal."
        )
    )]
    AuthFailed { status: u16 },

    #[error("No API key configured for profile '{profile}'")]
    #[diagnostic(
        code(mistly::no_credentials),
        help(
            "Pass --api-key, set MIST_API_KEY, or add api_key / api_key_env to the profile in\n\
             {path}"
        )
    )]
    NoCredentials { profile: String, path: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Not found: {message}")]
    #[diagnostic(
        code(mistly::not_found),
        help("Check the organization or site ID.")
    )]
    NotFound { message: String },

    #[error("API error (HTTP {status}): {message}")]
    #[diagnostic(code(mistly::api_error))]
    Api { status: u16, message: String },

    // ── Streaming ────────────────────────────────────────────────────
    #[error("Subscription to {channel} was rejected: {event}")]
    #[diagnostic(
        code(mistly::subscription_rejected),
        help("The token may lack access to this site's statistics.")
    )]
    SubscriptionRejected { channel: String, event: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(mistly::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(mistly::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(mistly::config))]
    Config(ConfigError),

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Timed out after {timeout:?}")]
    #[diagnostic(
        code(mistly::timeout),
        help("Increase the timeout with --timeout.")
    )]
    Timeout { timeout: Duration },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error("Unexpected response: {message}")]
    #[diagnostic(code(mistly::decode))]
    Decode { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(mistly::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(mistly::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::StreamFailed { .. } | Self::StreamClosed { .. } => {
                exit_code::CONNECTION
            }
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::SubscriptionRejected { .. } => exit_code::REJECTED,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::ProfileNotFound { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── mistly_api::Error → CliError mapping ─────────────────────────────

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Configuration(reason) => CliError::Validation {
                field: "base_url".into(),
                reason,
            },
            ApiError::InvalidUrl(e) => CliError::Validation {
                field: "url".into(),
                reason: e.to_string(),
            },

            ApiError::Transport(e) => CliError::ConnectionFailed {
                url: e.url().map(ToString::to_string).unwrap_or_default(),
                reason: e.to_string(),
            },
            ApiError::WebSocketConnect {
                channel,
                url,
                reason,
            } => CliError::ConnectionFailed {
                url,
                reason: format!("subscribing to {channel}: {reason}"),
            },
            ApiError::WebSocketTransport { channel, reason } => CliError::StreamFailed {
                reason: format!("{channel}: {reason}"),
            },
            ApiError::WebSocketClosed { code, reason } => CliError::StreamFailed {
                reason: format!("closed by server (code {code}): {reason}"),
            },

            ApiError::Timeout { timeout } | ApiError::SubscriptionTimeout { timeout, .. } => {
                CliError::Timeout { timeout }
            }

            ApiError::SubscriptionRejected { channel, event } => {
                CliError::SubscriptionRejected { channel, event }
            }

            ApiError::Api {
                status: status @ (401 | 403),
                ..
            } => CliError::AuthFailed { status },
            ApiError::Api { status: 404, body } => CliError::NotFound { message: body },
            ApiError::Api { status, body } => CliError::Api {
                status,
                message: body,
            },

            ApiError::Deserialization { message, .. } => CliError::Decode { message },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials {
                profile,
                path: mistly_config::config_path().display().to_string(),
            },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            other => CliError::Config(other),
        }
    }
}
