// Mist WebSocket streaming
//
// One connection per subscription. `MistClient::subscribe` opens a
// connection, runs the subscribe/acknowledge handshake, and hands back a
// stream of raw envelopes; `MistClient::stream` layers payload decoding on
// top. A cancellation token (or dropping the stream) unsubscribes and
// closes the connection.
//
// See <https://www.juniper.net/documentation/us/en/software/mist/api/http/guides/websockets/overview>

mod frame;
mod subscription;
mod typed;

pub use frame::{
    CHANNEL_SUBSCRIBED, DataEnvelope, SubscribeAck, SubscribeRequest, UnsubscribeRequest,
};
pub use subscription::EnvelopeStream;
pub use typed::TypedStream;
