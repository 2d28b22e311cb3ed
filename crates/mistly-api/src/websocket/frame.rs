// Wire frames of the streaming endpoint
//
// Every frame is a JSON text message; the transport delivers discrete
// messages, so there is no extra framing.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio_tungstenite::tungstenite::Message;

/// Acknowledgment event signalling a successful subscription.
pub const CHANNEL_SUBSCRIBED: &str = "channel_subscribed";

/// `{"subscribe": "<channel>"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub subscribe: String,
}

/// `{"event": "...", "channel": "..."}`, the server's answer to a
/// [`SubscribeRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscribeAck {
    pub event: String,
    pub channel: String,
}

impl SubscribeAck {
    pub fn is_subscribed(&self) -> bool {
        self.event == CHANNEL_SUBSCRIBED
    }
}

/// `{"unsubscribe": "<channel>"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsubscribeRequest {
    pub unsubscribe: String,
}

/// A message pushed on a subscribed channel.
///
/// `data` is itself JSON, encoded as a string; its schema depends on the
/// channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataEnvelope {
    pub event: String,
    pub channel: String,
    pub data: String,
}

impl DataEnvelope {
    /// Decode the payload into the channel's structured type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.data)
    }
}

/// Encode a request as a JSON text frame.
pub(crate) fn encode<T: Serialize>(frame: &T) -> Result<Message, serde_json::Error> {
    Ok(Message::text(serde_json::to_string(frame)?))
}

/// The JSON body of a data frame, or `None` for control frames.
pub(crate) fn payload(msg: &Message) -> Option<&[u8]> {
    match msg {
        Message::Text(text) => Some(text.as_bytes()),
        Message::Binary(bytes) => Some(&bytes[..]),
        _ => None,
    }
}

pub(crate) fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<T, serde_json::Error> {
    serde_json::from_slice(payload)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn requests_encode_as_json_text() {
        let msg = encode(&SubscribeRequest {
            subscribe: "/sites/S/stats/devices".into(),
        })
        .unwrap();
        assert_eq!(
            msg,
            Message::text(r#"{"subscribe":"/sites/S/stats/devices"}"#)
        );

        let msg = encode(&UnsubscribeRequest {
            unsubscribe: "/sites/S/stats/devices".into(),
        })
        .unwrap();
        assert_eq!(
            msg,
            Message::text(r#"{"unsubscribe":"/sites/S/stats/devices"}"#)
        );
    }

    #[test]
    fn ack_success_and_rejection() {
        let ack: SubscribeAck =
            decode(br#"{"event":"channel_subscribed","channel":"/x"}"#).unwrap();
        assert!(ack.is_subscribed());
        assert_eq!(ack.channel, "/x");

        let ack: SubscribeAck = decode(br#"{"event":"subscription_failed"}"#).unwrap();
        assert!(!ack.is_subscribed());
        assert_eq!(ack.event, "subscription_failed");

        let ack: SubscribeAck = decode(b"{}").unwrap();
        assert!(!ack.is_subscribed());
        assert_eq!(ack.event, "");
    }

    #[test]
    fn envelope_payload_decodes_separately() {
        let env: DataEnvelope = decode(
            br#"{"event":"data","channel":"/x","data":"{\"mac\":\"aa:bb:cc\",\"num_clients\":3}"}"#,
        )
        .unwrap();
        assert_eq!(env.event, "data");

        let payload: serde_json::Value = env.decode().unwrap();
        assert_eq!(payload["mac"], "aa:bb:cc");
        assert_eq!(payload["num_clients"], 3);
    }

    #[test]
    fn payload_skips_control_frames() {
        assert_eq!(payload(&Message::text("{}")), Some(&b"{}"[..]));
        assert_eq!(payload(&Message::binary(b"{}".to_vec())), Some(&b"{}"[..]));
        assert_eq!(payload(&Message::Ping(Vec::<u8>::new().into())), None);
        assert_eq!(payload(&Message::Close(None)), None);
    }
}
