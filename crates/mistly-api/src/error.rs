use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the `mistly-api` crate.
///
/// Covers every failure mode across both API surfaces: configuration,
/// HTTP transport, REST responses, and the WebSocket streaming endpoint.
/// The CLI maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Configuration ───────────────────────────────────────────────
    /// Malformed base address or an address that cannot be mapped onto
    /// the streaming endpoint. Raised before any I/O.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A REST request timed out.
    #[error("Request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    // ── REST API ────────────────────────────────────────────────────
    /// Non-success HTTP status; `body` is the raw response text.
    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    // ── WebSocket ───────────────────────────────────────────────────
    /// WebSocket connection for a subscription could not be established.
    #[error("failed to subscribe to websocket channel {channel}: connection to {url} failed: {reason}")]
    WebSocketConnect {
        channel: String,
        url: String,
        reason: String,
    },

    /// Sending or receiving a frame on an established connection failed.
    #[error("WebSocket transport error on channel {channel}: {reason}")]
    WebSocketTransport { channel: String, reason: String },

    /// The server closed the connection during the subscription handshake.
    #[error("WebSocket closed (code {code}): {reason}")]
    WebSocketClosed { code: u16, reason: String },

    /// Connecting to the streaming endpoint or waiting for the subscription
    /// acknowledgment took longer than the configured timeout.
    #[error("Timed out after {timeout:?} subscribing to websocket channel {channel}")]
    SubscriptionTimeout { channel: String, timeout: Duration },

    /// The server declined the subscription. `event` is the literal
    /// event string it answered with.
    #[error("websocket subscription to channel {channel} failed: {event}")]
    SubscriptionRejected { channel: String, event: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. }
            | Self::SubscriptionTimeout { .. }
            | Self::WebSocketConnect { .. }
            | Self::WebSocketTransport { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if the server explicitly declined a subscription.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::SubscriptionRejected { .. })
    }

    /// Returns `true` if the error was detected before any I/O.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::InvalidUrl(_))
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// The HTTP status code carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
