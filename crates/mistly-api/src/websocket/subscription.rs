// Subscription lifecycle on one WebSocket connection
//
// subscribe → handshake (inline) → spawn watcher + reader → stream of
// envelopes. The handshake must finish before either task starts so that
// no data frame can reach the consumer ahead of the acknowledgment.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_tungstenite::tungstenite::{self, Message, protocol::CloseFrame};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{Instrument, Span, debug, error, trace, warn};

use super::frame::{self, DataEnvelope, SubscribeAck, SubscribeRequest, UnsubscribeRequest};
use crate::client::MistClient;
use crate::error::Error;
use crate::transport;

/// Envelopes buffered between the reader task and the consumer.
const OUTPUT_CAPACITY: usize = 1;

// ── EnvelopeStream ───────────────────────────────────────────────────

/// Raw envelopes of one active subscription, in arrival order.
///
/// Ends when the subscription is cancelled or the connection fails.
/// Dropping the stream cancels the subscription (unsubscribe, then close).
pub struct EnvelopeStream {
    inner: ReceiverStream<DataEnvelope>,
    channel: String,
    cancel: CancellationToken,
    _guard: DropGuard,
}

impl EnvelopeStream {
    /// The channel this stream is subscribed to.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Unsubscribe and close the connection. The stream ends once the
    /// connection is down. Calling this more than once is a no-op.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Stream for EnvelopeStream {
    type Item = DataEnvelope;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

// ── Entry point ──────────────────────────────────────────────────────

impl MistClient {
    /// Open a new connection to the streaming endpoint and subscribe to
    /// `channel`.
    ///
    /// Returns once the server has acknowledged the subscription. Each call
    /// opens its own connection. Firing `cancel` (or dropping the returned
    /// stream) sends an unsubscribe request and closes the connection.
    pub async fn subscribe(
        &self,
        cancel: &CancellationToken,
        channel: &str,
    ) -> Result<EnvelopeStream, Error> {
        let span = self.span().clone();
        let conn = async {
            let url = self
                .stream_url()
                .map_err(|e| endpoint_error(channel, &e))?;
            let conn =
                transport::connect_stream(&url, self.base_url(), self.transport(), channel).await?;
            debug!(url = %url, "successfully connected to websocket");
            Ok::<_, Error>(conn)
        }
        .instrument(span.clone())
        .await
        .inspect_err(|e| {
            span.in_scope(|| warn!(channel, error = %e, "failed to connect to websocket"));
        })?;

        establish(conn, channel, self.timeout(), cancel.child_token(), span).await
    }
}

// ── Handshake ────────────────────────────────────────────────────────

/// Run the subscription handshake on `conn`, then hand the connection to
/// the watcher and reader tasks.
///
/// `cancel` must be owned by this subscription alone; it is cancelled when
/// the returned stream is dropped.
pub(crate) async fn establish<S>(
    mut conn: S,
    channel: &str,
    timeout: Duration,
    cancel: CancellationToken,
    span: Span,
) -> Result<EnvelopeStream, Error>
where
    S: Stream<Item = Result<Message, tungstenite::Error>>
        + Sink<Message, Error = tungstenite::Error>
        + Unpin
        + Send
        + 'static,
{
    let handshake = async {
        let request = frame::encode(&SubscribeRequest {
            subscribe: channel.to_owned(),
        })
        .map_err(|e| transport_error(channel, &e))?;

        conn.send(request)
            .await
            .map_err(|e| transport_error(channel, &e))?;
        debug!(channel, "successfully sent websocket subscription request");

        let ack = read_ack(&mut conn, channel, timeout).await?;
        debug!(channel, "successfully received websocket subscription response");

        if !ack.is_subscribed() {
            return Err(Error::SubscriptionRejected {
                channel: channel.to_owned(),
                event: ack.event,
            });
        }
        Ok(())
    }
    .instrument(span.clone())
    .await;

    if let Err(e) = handshake {
        async {
            match tokio::time::timeout(timeout, conn.close()).await {
                Ok(Ok(())) => debug!(channel, "websocket connection closed after failed subscription"),
                Ok(Err(close)) => debug!(channel, error = %close, "websocket close failed"),
                Err(_) => debug!(channel, "timed out closing websocket connection"),
            }
        }
        .instrument(span)
        .await;
        return Err(e);
    }
    span.in_scope(|| debug!(channel, "successfully subscribed to websocket channel"));

    let (write, read) = conn.split();
    let (tx, rx) = mpsc::channel(OUTPUT_CAPACITY);
    let shutdown = CancellationToken::new();

    tokio::spawn(
        watch_cancellation(
            write,
            channel.to_owned(),
            timeout,
            cancel.clone(),
            shutdown.clone(),
        )
        .instrument(span.clone()),
    );
    tokio::spawn(
        read_loop(read, tx, channel.to_owned(), cancel.clone(), shutdown).instrument(span),
    );

    Ok(EnvelopeStream {
        inner: ReceiverStream::new(rx),
        channel: channel.to_owned(),
        _guard: cancel.clone().drop_guard(),
        cancel,
    })
}

/// Read exactly one data frame and decode it as the acknowledgment.
/// Control frames are skipped; the whole wait is bounded by `timeout`.
async fn read_ack<S>(conn: &mut S, channel: &str, timeout: Duration) -> Result<SubscribeAck, Error>
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    let read = async {
        loop {
            match conn.next().await {
                Some(Ok(Message::Close(frame))) => return Err(closed_error(frame.as_ref())),
                Some(Ok(msg)) => {
                    let Some(payload) = frame::payload(&msg) else {
                        trace!(channel, "skipping control frame during handshake");
                        continue;
                    };
                    return frame::decode::<SubscribeAck>(payload).map_err(|e| {
                        Error::Deserialization {
                            message: format!("invalid subscription response: {e}"),
                            body: String::from_utf8_lossy(payload).into_owned(),
                        }
                    });
                }
                Some(Err(e)) => return Err(transport_error(channel, &e)),
                None => {
                    return Err(Error::WebSocketTransport {
                        channel: channel.to_owned(),
                        reason: "connection closed before subscription response".into(),
                    });
                }
            }
        }
    };

    tokio::time::timeout(timeout, read)
        .await
        .map_err(|_| Error::SubscriptionTimeout {
            channel: channel.to_owned(),
            timeout,
        })?
}

// ── Cancellation watcher ─────────────────────────────────────────────

/// Wait for cancellation, unsubscribe, then close the connection.
///
/// If the reader ends first (connection fault), the write half is closed
/// without unsubscribing. Either way `shutdown` fires once the connection
/// is closed so the reader stops waiting on it.
async fn watch_cancellation<W>(
    mut write: W,
    channel: String,
    timeout: Duration,
    cancel: CancellationToken,
    shutdown: CancellationToken,
) where
    W: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => {
            match tokio::time::timeout(timeout, unsubscribe(&mut write, &channel)).await {
                Ok(Ok(())) => debug!(channel, "successfully unsubscribed from websocket channel"),
                Ok(Err(e)) => error!(channel, error = %e, "failed to unsubscribe from websocket channel"),
                Err(_) => error!(channel, "timed out unsubscribing from websocket channel"),
            }
        }
        () = shutdown.cancelled() => {
            debug!(channel, "reader ended, releasing websocket connection");
        }
    }

    match tokio::time::timeout(timeout, write.close()).await {
        Ok(Ok(())) => debug!(channel, "websocket connection closed"),
        Ok(Err(e)) => debug!(channel, error = %e, "websocket close failed"),
        Err(_) => debug!(channel, "timed out closing websocket connection"),
    }
    shutdown.cancel();
}

async fn unsubscribe<W>(write: &mut W, channel: &str) -> Result<(), Error>
where
    W: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    let request = frame::encode(&UnsubscribeRequest {
        unsubscribe: channel.to_owned(),
    })
    .map_err(|e| transport_error(channel, &e))?;

    write
        .send(request)
        .await
        .map_err(|e| transport_error(channel, &e))
}

// ── Reader loop ──────────────────────────────────────────────────────

/// Forward every envelope to `tx` until the connection ends.
///
/// Read failures after cancellation are the expected consequence of the
/// watcher closing the connection and are logged at debug level only.
async fn read_loop<R>(
    mut read: R,
    tx: mpsc::Sender<DataEnvelope>,
    channel: String,
    cancel: CancellationToken,
    shutdown: CancellationToken,
) where
    R: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    loop {
        let frame = tokio::select! {
            frame = read.next() => frame,
            () = shutdown.cancelled() => break,
        };

        match frame {
            Some(Ok(Message::Close(close))) => {
                if cancel.is_cancelled() {
                    debug!(channel, "websocket closed after unsubscribe");
                } else if let Some(cf) = close {
                    warn!(
                        channel,
                        code = u16::from(cf.code),
                        reason = cf.reason.as_str(),
                        "websocket closed by server"
                    );
                } else {
                    warn!(channel, "websocket closed by server (no payload)");
                }
                break;
            }
            Some(Ok(msg)) => {
                let Some(payload) = frame::payload(&msg) else {
                    // tungstenite answers pings itself
                    trace!(channel, "websocket control frame");
                    continue;
                };
                let envelope = match frame::decode::<DataEnvelope>(payload) {
                    Ok(envelope) => envelope,
                    Err(e) => {
                        warn!(channel, error = %e, "discarding malformed websocket message");
                        continue;
                    }
                };
                debug!(channel, event = %envelope.event, "received websocket message");

                tokio::select! {
                    sent = tx.send(envelope) => {
                        if sent.is_err() {
                            debug!(channel, "stream consumer dropped");
                            break;
                        }
                    }
                    () = shutdown.cancelled() => break,
                }
            }
            Some(Err(e)) => {
                if cancel.is_cancelled() {
                    debug!(channel, error = %e, "websocket read ended after cancellation");
                } else {
                    error!(channel, error = %e, "websocket receive error");
                }
                break;
            }
            None => {
                if !cancel.is_cancelled() {
                    warn!(channel, "websocket stream ended unexpectedly");
                }
                break;
            }
        }
    }

    shutdown.cancel();
    debug!(channel, "websocket reader exiting");
}

// ── Error helpers ────────────────────────────────────────────────────

/// The streaming endpoint could not be determined for `channel`.
fn endpoint_error(channel: &str, err: &Error) -> Error {
    let reason = match err {
        Error::Configuration(reason) => reason.clone(),
        other => other.to_string(),
    };
    Error::Configuration(format!(
        "failed to subscribe to websocket channel {channel}: {reason}"
    ))
}

fn transport_error(channel: &str, err: &impl std::fmt::Display) -> Error {
    Error::WebSocketTransport {
        channel: channel.to_owned(),
        reason: err.to_string(),
    }
}

fn closed_error(frame: Option<&CloseFrame>) -> Error {
    match frame {
        Some(cf) => Error::WebSocketClosed {
            code: cf.code.into(),
            reason: cf.reason.as_str().to_owned(),
        },
        None => Error::WebSocketClosed {
            code: 1005,
            reason: "no close reason".into(),
        },
    }
}
