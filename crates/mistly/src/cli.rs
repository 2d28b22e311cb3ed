//! Clap derive structures for the `mistly` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// mistly -- query and stream the Juniper Mist cloud API
#[derive(Debug, Parser)]
#[command(
    name = "mistly",
    version,
    about = "Query and stream the Juniper Mist cloud API",
    long_about = "Query organizations, sites, devices and clients through the Mist REST API,\n\
        and follow live device and client statistics over the WebSocket streaming API.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config profile to use
    #[arg(long, short = 'p', env = "MIST_PROFILE", global = true)]
    pub profile: Option<String>,

    /// REST base URL, e.g. https://api.eu.mist.com (overrides profile)
    #[arg(long, env = "MIST_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// API token (overrides profile)
    #[arg(long, env = "MIST_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Streaming endpoint (default: derived from the base URL)
    #[arg(long, env = "MIST_STREAM_URL", global = true)]
    pub stream_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "MIST_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Request timeout in seconds (default: profile, then 10)
    #[arg(long, env = "MIST_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the account behind the API token
    Whoami,

    /// List an organization's sites
    Sites(OrgArgs),

    /// Count an organization's tickets by status
    Tickets(OrgArgs),

    /// Count an organization's alarms by type
    Alarms(OrgArgs),

    /// List a site's devices
    #[command(alias = "dev")]
    Devices(DevicesArgs),

    /// List a site's connected clients
    Clients(SiteArgs),

    /// Follow live statistics as newline-delimited JSON
    Stream(StreamArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Resource arguments ───────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct OrgArgs {
    /// Organization ID
    #[arg(long, env = "MIST_ORG")]
    pub org: String,
}

#[derive(Debug, Args)]
pub struct SiteArgs {
    /// Site ID
    #[arg(long, env = "MIST_SITE")]
    pub site: String,
}

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Include operational statistics
    #[arg(long)]
    pub stats: bool,
}

// ── Streaming ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StreamArgs {
    #[command(subcommand)]
    pub command: StreamCommand,
}

#[derive(Debug, Subcommand)]
pub enum StreamCommand {
    /// Device statistics of a site
    Devices(StreamOpts),

    /// Client statistics of a site
    Clients(StreamOpts),
}

#[derive(Debug, Args)]
pub struct StreamOpts {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Stop after this many updates
    #[arg(long, short = 'n', value_parser = clap::value_parser!(u64).range(1..))]
    pub count: Option<u64>,

    /// Stop after this many seconds
    #[arg(long, short = 'd', value_parser = clap::value_parser!(u64).range(1..))]
    pub duration: Option<u64>,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
