//! `stream` handler: follow a statistics channel as NDJSON.

use std::future;
use std::time::Duration;

use futures_util::StreamExt;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info};

use mistly_api::{
    CancellationToken, MistClient, TypedStream, client_stats_channel, device_stats_channel,
};

use crate::cli::{StreamArgs, StreamCommand, StreamOpts};
use crate::error::CliError;
use crate::output;

pub async fn handle(client: &MistClient, args: StreamArgs) -> Result<(), CliError> {
    let cancel = CancellationToken::new();

    match args.command {
        StreamCommand::Devices(opts) => {
            let channel = device_stats_channel(&opts.site.site);
            let stream = client.stream_site_device_stats(&cancel, &opts.site.site).await?;
            follow(client, stream, &channel, &opts, &cancel).await
        }
        StreamCommand::Clients(opts) => {
            let channel = client_stats_channel(&opts.site.site);
            let stream = client.stream_site_client_stats(&cancel, &opts.site.site).await?;
            follow(client, stream, &channel, &opts, &cancel).await
        }
    }
}

/// Why the output loop stopped.
enum Stop {
    Count,
    Deadline,
    Interrupted,
    ServerClosed,
}

/// Print every value until the count, the deadline, Ctrl-C, or the end of
/// the stream. Then unsubscribe and wait (bounded) for the connection to
/// close so the server sees a clean unsubscribe.
async fn follow<T: Serialize>(
    client: &MistClient,
    mut stream: TypedStream<T>,
    channel: &str,
    opts: &StreamOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    info!(channel, "streaming, press Ctrl-C to stop");

    let deadline = opts
        .duration
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    let expired = async {
        match deadline {
            Some(at) => tokio::time::sleep_until(at).await,
            None => future::pending().await,
        }
    };
    tokio::pin!(expired);
    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    let mut printed = 0u64;
    let stop = loop {
        tokio::select! {
            next = stream.next() => match next {
                Some(value) => {
                    output::print_json_line(&value)?;
                    printed += 1;
                    if opts.count.is_some_and(|n| printed >= n) {
                        break Stop::Count;
                    }
                }
                None => break Stop::ServerClosed,
            },
            () = &mut expired => break Stop::Deadline,
            _ = &mut interrupted => break Stop::Interrupted,
        }
    };

    cancel.cancel();
    let drained = tokio::time::timeout(client.timeout(), async {
        while stream.next().await.is_some() {}
    })
    .await;
    debug!(channel, printed, clean = drained.is_ok(), "stream stopped");

    match stop {
        Stop::ServerClosed => Err(CliError::StreamClosed {
            channel: channel.to_owned(),
        }),
        Stop::Count | Stop::Deadline | Stop::Interrupted => Ok(()),
    }
}
