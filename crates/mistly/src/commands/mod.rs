//! Command dispatch: bridges CLI args -> API calls -> output formatting.

pub mod account;
pub mod orgs;
pub mod sites;
pub mod stream;

use mistly_api::MistClient;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an API-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    client: &MistClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Whoami => account::whoami(client, global).await,
        Command::Sites(args) => orgs::sites(client, args, global).await,
        Command::Tickets(args) => orgs::tickets(client, args, global).await,
        Command::Alarms(args) => orgs::alarms(client, args, global).await,
        Command::Devices(args) => sites::devices(client, args, global).await,
        Command::Clients(args) => sites::clients(client, args, global).await,
        Command::Stream(args) => stream::handle(client, args).await,
        // Completions are handled before dispatch
        Command::Completions(_) => unreachable!(),
    }
}
