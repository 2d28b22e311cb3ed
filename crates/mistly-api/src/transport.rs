// Shared transport configuration for the REST and streaming surfaces.
//
// Both surfaces authenticate with the same static `Token` header, so the
// reqwest client builder, the streaming endpoint derivation, and the
// WebSocket upgrade request all live here.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::debug;
use url::Url;

use crate::error::Error;

/// Request timeout used when none (or zero) is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fixed path of the streaming endpoint on the `api-ws.` host.
pub const STREAM_PATH: &str = "/api-ws/v1/stream";

const USER_AGENT: &str = concat!("mistly/", env!("CARGO_PKG_VERSION"));

/// An open streaming connection as returned by [`connect_stream`].
pub type WsConnection = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Shared transport configuration for building HTTP and WebSocket clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub api_key: SecretString,
    pub timeout: Duration,
}

impl TransportConfig {
    pub fn new(api_key: SecretString, timeout: Duration) -> Self {
        let timeout = if timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            timeout
        };
        Self { api_key, timeout }
    }

    /// `Token <key>`, the value of the `Authorization` header.
    fn authorization(&self) -> String {
        format!("Token {}", self.api_key.expose_secret())
    }

    /// Default headers attached to every REST request.
    pub fn auth_headers(&self) -> Result<HeaderMap, Error> {
        let mut auth = HeaderValue::from_str(&self.authorization())
            .map_err(|e| Error::Configuration(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Build a `reqwest::Client` with the auth headers and timeout applied.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .default_headers(self.auth_headers()?)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))
    }
}

/// Map a REST base address onto the streaming endpoint.
///
/// `http`/`https` become `ws`/`wss` (`ws`/`wss` pass through), the leading
/// `api.` host label becomes `api-ws.`, and the path is replaced with
/// [`STREAM_PATH`]. Any other scheme or host shape is rejected.
///
/// See <https://www.juniper.net/documentation/us/en/software/mist/api/http/guides/websockets/hosts>
pub fn stream_url_for(base: &Url) -> Result<Url, Error> {
    let scheme = match base.scheme() {
        "http" => "ws",
        "https" => "wss",
        s @ ("ws" | "wss") => s,
        other => {
            return Err(Error::Configuration(format!(
                "unsupported websocket URL scheme: {other}"
            )));
        }
    };

    let host = base.host_str().unwrap_or_default();
    let Some(domain) = host.strip_prefix("api.") else {
        return Err(Error::Configuration(format!(
            "unable to determine websocket endpoint address, base URL is not prefixed with 'api.': {host}"
        )));
    };

    let mut url = base.clone();
    url.set_scheme(scheme)
        .map_err(|()| Error::Configuration(format!("cannot switch {base} to {scheme}")))?;
    url.set_host(Some(&format!("api-ws.{domain}")))?;
    url.set_path(STREAM_PATH);
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

/// Open an authenticated WebSocket connection to `url` for a subscription
/// to `channel`.
///
/// The upgrade request carries the same `Authorization` and `Content-Type`
/// headers as REST calls, plus `Origin` set to the REST base address.
/// The whole connect (TCP, TLS, upgrade) is bounded by the transport timeout.
pub async fn connect_stream(
    url: &Url,
    origin: &Url,
    transport: &TransportConfig,
    channel: &str,
) -> Result<WsConnection, Error> {
    let connect_error = |reason: String| Error::WebSocketConnect {
        channel: channel.to_owned(),
        url: url.to_string(),
        reason,
    };

    let uri: tungstenite::http::Uri = url
        .as_str()
        .parse()
        .map_err(|e: tungstenite::http::uri::InvalidUri| connect_error(e.to_string()))?;

    let request = ClientRequestBuilder::new(uri)
        .with_header("Authorization", transport.authorization())
        .with_header("Content-Type", "application/json")
        .with_header("Origin", origin.origin().ascii_serialization());

    debug!(url = %url, channel, "connecting to websocket");

    let (ws_stream, response) =
        tokio::time::timeout(transport.timeout, tokio_tungstenite::connect_async(request))
            .await
            .map_err(|_| Error::SubscriptionTimeout {
                channel: channel.to_owned(),
                timeout: transport.timeout,
            })?
            .map_err(|e| connect_error(e.to_string()))?;

    debug!(url = %url, status = %response.status(), "websocket connected");
    Ok(ws_stream)
}
