// Mist cloud API client
//
// Wraps `reqwest::Client` with token auth, base-URL path joining, and
// response decoding. Endpoint groups (orgs, sites, self) are implemented as
// inherent methods in sibling modules; the WebSocket streaming entry points
// live under `websocket/`.

use std::time::Duration;

use reqwest::Method;
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{Instrument, Span, debug, error};
use url::Url;

use crate::error::Error;
use crate::transport::{self, TransportConfig};

/// API access parameters.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST base address, e.g. `https://api.mist.com`.
    pub base_url: String,
    pub api_key: SecretString,
    /// Applies to REST requests, the WebSocket connect, and the
    /// subscription acknowledgment wait. Zero means the 10s default.
    pub timeout: Duration,
    /// Explicit streaming endpoint. When unset it is derived from
    /// `base_url` (see [`transport::stream_url_for`]).
    pub stream_url: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            timeout: transport::DEFAULT_TIMEOUT,
            stream_url: None,
        }
    }
}

/// Async client for the Mist cloud API.
///
/// Every request carries `Authorization: Token <key>`. Log output from the
/// client and from the background tasks of its subscriptions is recorded
/// inside [`span`](Self::with_span).
pub struct MistClient {
    http: reqwest::Client,
    base_url: Url,
    stream_url: Option<Url>,
    transport: TransportConfig,
    span: Span,
}

impl MistClient {
    // ── Constructors ─────────────────────────────────────────────────

    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let base_url = Url::parse(&config.base_url)?;
        let stream_url = config.stream_url.as_deref().map(Url::parse).transpose()?;
        let transport = TransportConfig::new(config.api_key, config.timeout);
        let http = transport.build_client()?;
        let span = tracing::info_span!("mistly_api", base_url = %base_url);

        Ok(Self {
            http,
            base_url,
            stream_url,
            transport,
            span,
        })
    }

    /// Record this client's log output in `span` instead of the default
    /// `mistly_api` span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// The REST base address.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The effective request timeout.
    pub fn timeout(&self) -> Duration {
        self.transport.timeout
    }

    pub(crate) fn transport(&self) -> &TransportConfig {
        &self.transport
    }

    pub(crate) fn span(&self) -> &Span {
        &self.span
    }

    /// The streaming endpoint: the configured override, or the address
    /// derived from the REST base URL.
    pub fn stream_url(&self) -> Result<Url, Error> {
        match &self.stream_url {
            Some(url) => Ok(url.clone()),
            None => transport::stream_url_for(&self.base_url),
        }
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append an absolute API path (e.g. `/api/v1/self`) to the base URL,
    /// keeping any path prefix the base URL already has.
    pub(crate) fn url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let prefix = self.base_url.path().trim_end_matches('/');
        url.set_path(&format!("{prefix}/{}", path.trim_start_matches('/')));
        url
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.request(Method::GET, self.url(path), &[], None::<&()>)
            .await
    }

    pub async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, Error> {
        self.request(Method::GET, self.url(path), params, None::<&()>)
            .await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        self.request(Method::POST, self.url(path), &[], Some(body))
            .await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        self.request(Method::PUT, self.url(path), &[], Some(body))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path);
        async {
            debug!(method = "DELETE", url = %url, "making API request");
            let resp = self
                .http
                .delete(url)
                .send()
                .await
                .map_err(|e| self.send_error(e))?;
            let status = resp.status();
            debug!(status = status.as_u16(), "API response received");
            if status.is_success() {
                Ok(())
            } else {
                Err(Self::api_error(status, resp).await)
            }
        }
        .instrument(self.span.clone())
        .await
    }

    async fn request<T, B>(
        &self,
        method: Method,
        url: Url,
        params: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        async {
            debug!(method = %method, url = %url, "making API request");

            let mut req = self.http.request(method, url);
            if !params.is_empty() {
                req = req.query(params);
            }
            if let Some(body) = body {
                req = req.json(body);
            }

            let resp = req.send().await.map_err(|e| self.send_error(e))?;
            debug!(status = resp.status().as_u16(), "API response received");

            Self::handle_response(resp).await
        }
        .instrument(self.span.clone())
        .await
    }

    // ── Response handling ────────────────────────────────────────────

    fn send_error(&self, err: reqwest::Error) -> Error {
        error!(error = %err, "request failed");
        if err.is_timeout() {
            Error::Timeout {
                timeout: self.timeout(),
            }
        } else {
            Error::Transport(err)
        }
    }

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::api_error(status, resp).await);
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    /// Build an error from a non-success response, keeping the body text.
    async fn api_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => format!("error reading body: {e}"),
        };
        Error::Api {
            status: status.as_u16(),
            body,
        }
    }
}
