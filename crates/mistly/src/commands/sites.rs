//! Site command handlers: device inventory, device stats, clients.

use tabled::Tabled;

use mistly_api::{Client, Device, DeviceStat, MistClient};

use crate::cli::{DevicesArgs, GlobalOpts, SiteArgs};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    dtype: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Serial")]
    serial: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            id: d.id.clone(),
            name: d.name.clone(),
            dtype: d.device_type.to_string(),
            model: d.model.clone(),
            mac: d.mac.clone(),
            serial: d.serial.clone(),
        }
    }
}

#[derive(Tabled)]
struct DeviceStatRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    dtype: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Clients")]
    clients: u32,
    #[tabled(rename = "Uptime")]
    uptime: String,
    #[tabled(rename = "Version")]
    version: String,
}

impl From<&DeviceStat> for DeviceStatRow {
    fn from(s: &DeviceStat) -> Self {
        Self {
            name: s.device.name.clone(),
            dtype: s.device.device_type.to_string(),
            status: s.status.to_string(),
            ip: output::opt(s.ip),
            clients: s.num_clients,
            uptime: output::uptime(s.uptime),
            version: s.version.clone(),
        }
    }
}

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "SSID")]
    ssid: String,
    #[tabled(rename = "Band")]
    band: String,
    #[tabled(rename = "RSSI")]
    rssi: i32,
    #[tabled(rename = "AP")]
    ap: String,
}

impl From<&Client> for ClientRow {
    fn from(c: &Client) -> Self {
        Self {
            mac: c.mac.clone(),
            hostname: c.hostname.clone(),
            ip: output::opt(c.ip),
            ssid: c.ssid.clone(),
            band: c.band.to_string(),
            rssi: c.rssi,
            ap: c.ap_mac.clone(),
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn devices(
    client: &MistClient,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let out = if args.stats {
        let stats = client.get_site_device_stats(&args.site.site).await?;
        output::render_list(global.output, &stats, |s| DeviceStatRow::from(s))?
    } else {
        let devices = client.get_site_devices(&args.site.site).await?;
        output::render_list(global.output, &devices, |d| DeviceRow::from(d))?
    };
    output::print_output(&out)
}

pub async fn clients(
    client: &MistClient,
    args: SiteArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let clients = client.get_site_client_stats(&args.site).await?;
    let out = output::render_list(global.output, &clients, |c| ClientRow::from(c))?;
    output::print_output(&out)
}
