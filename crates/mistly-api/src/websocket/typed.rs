// Typed stream adapter: raw envelopes → channel-specific values.

use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{Span, warn};

use super::frame::DataEnvelope;
use crate::client::MistClient;
use crate::error::Error;

/// Decoded values of one subscription, in arrival order.
///
/// Ends when the underlying subscription ends. Dropping it cancels the
/// subscription.
pub type TypedStream<T> = BoxStream<'static, T>;

impl MistClient {
    /// Subscribe to `channel` and decode every data payload as `T`.
    ///
    /// Payloads that do not decode are logged and skipped; the stream keeps
    /// going.
    pub async fn stream<T>(
        &self,
        cancel: &CancellationToken,
        channel: &str,
    ) -> Result<TypedStream<T>, Error>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let envelopes = self.subscribe(cancel, channel).await.inspect_err(|e| {
            self.span()
                .in_scope(|| warn!(channel, error = %e, "failed to subscribe to channel"));
        })?;

        Ok(decode_stream(envelopes, self.span().clone()))
    }
}

/// Map envelopes through [`DataEnvelope::decode`], dropping failures.
pub(crate) fn decode_stream<S, T>(envelopes: S, span: Span) -> TypedStream<T>
where
    S: futures_util::Stream<Item = DataEnvelope> + Send + 'static,
    T: DeserializeOwned + Send + 'static,
{
    Box::pin(async_stream::stream! {
        futures_util::pin_mut!(envelopes);
        while let Some(envelope) = envelopes.next().await {
            match envelope.decode::<T>() {
                Ok(value) => yield value,
                Err(e) => span.in_scope(|| {
                    warn!(
                        channel = %envelope.channel,
                        error = %e,
                        "failed to unmarshal websocket payload"
                    );
                }),
            }
        }
    })
}
