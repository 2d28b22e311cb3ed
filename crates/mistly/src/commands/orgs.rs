//! Organization command handlers: sites, ticket and alarm counts.

use std::collections::BTreeMap;

use tabled::Tabled;

use mistly_api::{MistClient, Site};

use crate::cli::{GlobalOpts, OrgArgs};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Country")]
    country: String,
    #[tabled(rename = "Timezone")]
    timezone: String,
    #[tabled(rename = "Address")]
    address: String,
}

impl From<&Site> for SiteRow {
    fn from(s: &Site) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            country: s.country_code.clone(),
            timezone: s.timezone.clone(),
            address: s.address.clone(),
        }
    }
}

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Count")]
    count: u64,
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn sites(client: &MistClient, args: OrgArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut sites = client.get_org_sites(&args.org).await?;
    sites.sort_by(|a, b| a.name.cmp(&b.name));
    let out = output::render_list(global.output, &sites, |s| SiteRow::from(s))?;
    output::print_output(&out)
}

pub async fn tickets(
    client: &MistClient,
    args: OrgArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let counts: BTreeMap<String, u64> = client
        .count_org_tickets(&args.org)
        .await?
        .into_iter()
        .map(|(status, count)| (status.to_string(), count))
        .collect();
    render_counts(global, &counts)
}

pub async fn alarms(client: &MistClient, args: OrgArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let counts: BTreeMap<String, u64> = client.count_org_alarms(&args.org).await?.into_iter().collect();
    render_counts(global, &counts)
}

/// Tables list one row per key; structured formats emit the map itself.
fn render_counts(global: &GlobalOpts, counts: &BTreeMap<String, u64>) -> Result<(), CliError> {
    let out = output::render_single(global.output, counts, |counts| {
        let rows: Vec<CountRow> = counts
            .iter()
            .map(|(key, count)| CountRow {
                key: key.clone(),
                count: *count,
            })
            .collect();
        output::render_table(&rows)
    })?;
    output::print_output(&out)
}
