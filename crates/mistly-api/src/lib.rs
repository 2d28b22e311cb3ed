// mistly-api: Async Rust client for the Juniper Mist cloud API (REST + WebSocket streaming)

mod account;
pub mod client;
pub mod error;
pub mod models;
mod orgs;
mod sites;
pub mod transport;
pub mod websocket;

pub use client::{ClientConfig, MistClient};
pub use error::Error;
pub use models::*;
pub use sites::{client_stats_channel, device_stats_channel};
pub use tokio_util::sync::CancellationToken;
pub use websocket::{DataEnvelope, EnvelopeStream, TypedStream};
