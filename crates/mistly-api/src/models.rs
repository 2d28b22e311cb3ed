// Mist API response types
//
// Models for the REST resources and the streamed statistics payloads.
// Structs use a container-level `#[serde(default)]` because the API omits
// fields freely depending on device type and firmware; absent values take
// their zero value rather than failing the whole decode.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// ── String-backed enums ──────────────────────────────────────────────

/// Serde glue for enums whose wire form is their `strum` string. Unknown
/// strings decode to `Unknown` instead of failing.
macro_rules! string_enum {
    ($($ty:ty),+ $(,)?) => {$(
        impl From<String> for $ty {
            fn from(s: String) -> Self {
                s.parse().unwrap_or(Self::Unknown)
            }
        }

        impl From<$ty> for String {
            fn from(v: $ty) -> Self {
                v.to_string()
            }
        }
    )+};
}

string_enum!(TicketStatus, DeviceType, DeviceStatus, Radio, RadioConfig, Dot11Proto);

/// Support ticket status.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
#[strum(serialize_all = "lowercase")]
pub enum TicketStatus {
    Open,
    Pending,
    Solved,
    Closed,
    Hold,
    #[default]
    Unknown,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
#[strum(serialize_all = "lowercase")]
pub enum DeviceType {
    Ap,
    Switch,
    Gateway,
    #[default]
    Unknown,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
#[strum(serialize_all = "lowercase")]
pub enum DeviceStatus {
    Connected,
    Disconnected,
    Restarting,
    Upgrading,
    #[default]
    Unknown,
}

/// Radio band as reported on clients and in `radio_stat` maps of the
/// REST device stats.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
pub enum Radio {
    #[strum(serialize = "6")]
    Band6,
    #[strum(serialize = "5")]
    Band5,
    #[strum(to_string = "24", serialize = "2.4")]
    Band24,
    #[default]
    #[strum(serialize = "unknown")]
    Unknown,
}

/// Radio band configuration key (`band_24`, `band_5`, `band_6`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
pub enum RadioConfig {
    #[strum(serialize = "band_6")]
    Band6,
    #[strum(serialize = "band_5")]
    Band5,
    #[strum(serialize = "band_24")]
    Band24,
    #[default]
    #[strum(serialize = "unknown")]
    Unknown,
}

/// 802.11 protocol negotiated by a client.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
#[strum(serialize_all = "lowercase")]
pub enum Dot11Proto {
    A,
    Ac,
    Ax,
    B,
    G,
    N,
    #[default]
    Unknown,
}

// ── Field codecs ─────────────────────────────────────────────────────

/// Unix seconds (integer or float) <-> `DateTime<Utc>`.
pub(crate) mod unix_time {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<f64>::deserialize(deserializer)?;
        Ok(raw
            .filter(|secs| *secs > 0.0)
            .and_then(|secs| DateTime::from_timestamp(secs.trunc() as i64, 0)))
    }

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_i64(ts.timestamp()),
            None => serializer.serialize_none(),
        }
    }
}

/// Float seconds <-> `Duration`. The API reports uptimes as floats.
pub(crate) mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<f64>::deserialize(deserializer)?;
        Ok(raw.and_then(|secs| Duration::try_from_secs_f64(secs.trunc()).ok()))
    }

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => serializer.serialize_u64(d.as_secs()),
            None => serializer.serialize_none(),
        }
    }
}

// ── Account ──────────────────────────────────────────────────────────

/// The account behind the API token (`/api/v1/self`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    #[serde(rename = "via_sso")]
    pub sso: bool,
    #[serde(with = "unix_time", skip_serializing_if = "Option::is_none")]
    pub password_modified_time: Option<DateTime<Utc>>,
    pub privileges: Vec<Privilege>,
    pub tags: Vec<String>,
}

/// One scope the account has access to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Privilege {
    /// `"org"`, `"site"`, or `"msp"`.
    pub scope: String,
    pub name: String,
    pub role: String,
    pub views: Vec<String>,
    pub org_id: String,
    pub org_name: String,
    pub site_id: String,
    pub site_name: String,
    pub msp_id: String,
    pub msp_name: String,
    pub msp_url: String,
    pub msp_logo_url: String,
    #[serde(rename = "orggroup_ids")]
    pub org_group_ids: Vec<String>,
    #[serde(rename = "sitegroup_ids")]
    pub site_group_ids: Vec<String>,
}

// ── Organization ─────────────────────────────────────────────────────

/// `{"results": [...]}` wrapper returned by the `*/count` endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CountResult<T> {
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TicketCount {
    pub status: TicketStatus,
    pub count: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AlarmCount {
    #[serde(rename = "type")]
    pub alarm_type: String,
    pub count: u64,
}

// ── Site ─────────────────────────────────────────────────────────────

/// A physical location containing devices.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Site {
    pub id: String,
    pub name: String,
    pub timezone: String,
    pub country_code: String,
    #[serde(rename = "latlng")]
    pub lat_lng: HashMap<String, f64>,
    #[serde(rename = "sitegroup_ids")]
    pub site_group_ids: Vec<String>,
    pub address: String,
}

// ── Device ───────────────────────────────────────────────────────────

/// A physical piece of network equipment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Device {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub model: String,
    pub serial: String,
    pub hw_rev: String,
    pub mac: String,
    pub org_id: String,
    pub site_id: String,
    #[serde(with = "unix_time", skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<DateTime<Utc>>,
    #[serde(with = "unix_time", skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,
}

/// A [`Device`] supplemented with operational statistics
/// (`/api/v1/sites/{site}/stats/devices`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceStat {
    #[serde(flatten)]
    pub device: Device,

    #[serde(with = "unix_time", skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
    pub num_clients: u32,
    pub version: String,
    pub status: DeviceStatus,
    pub ip: Option<IpAddr>,
    pub ext_ip: Option<IpAddr>,
    pub num_wlans: u32,
    #[serde(with = "seconds", skip_serializing_if = "Option::is_none")]
    pub uptime: Option<Duration>,
    pub tx_bps: u64,
    pub rx_bps: u64,
    pub tx_bytes: u64,
    pub rx_bytes: u64,
    pub tx_pkts: u64,
    pub rx_pkts: u64,
    pub cpu_util: u32,
    pub mem_used_kb: u64,
    pub power_src: String,
    #[serde(rename = "radio_stat")]
    pub radio_stats: HashMap<RadioConfig, RadioStat>,
}

/// Per-radio statistics of a [`DeviceStat`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioStat {
    pub mac: String,
    pub num_clients: u32,
    pub num_wlans: u32,
    pub channel: u32,
    pub bandwidth: u32,
    pub power: i32,
    pub tx_bytes: u64,
    pub tx_pkts: u64,
    pub rx_bytes: u64,
    pub rx_pkts: u64,
    pub util_all: u32,
    pub util_tx: u32,
    pub util_rx_in_bss: u32,
    pub util_rx_other_bss: u32,
    pub util_unknown_wifi: u32,
    pub util_non_wifi: u32,
    pub util_undecodable_wifi: u32,
}

// ── Streamed device statistics ───────────────────────────────────────

/// Device statistics pushed on the `/sites/{site}/stats/devices` channel.
///
/// The streamed shape differs from the REST [`DeviceStat`]: addressing is
/// nested under `ip_stat` and only a subset of counters is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamedDeviceStat {
    pub id: String,
    pub mac: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub model: String,
    pub status: DeviceStatus,
    pub version: String,
    pub num_clients: u32,
    #[serde(with = "seconds", skip_serializing_if = "Option::is_none")]
    pub uptime: Option<Duration>,
    #[serde(with = "unix_time", skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
    pub tx_bps: u64,
    pub rx_bps: u64,
    pub tx_bytes: u64,
    pub rx_bytes: u64,
    pub cpu_util: u32,
    pub mem_used_kb: u64,
    #[serde(rename = "radio_stat")]
    pub radio_stats: HashMap<RadioConfig, StreamedRadioStat>,
    pub ip_stat: StreamedIpStat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamedRadioStat {
    pub mac: String,
    pub num_clients: u32,
    pub channel: u32,
    pub bandwidth: u32,
    pub power: i32,
    pub tx_bytes: u64,
    pub rx_bytes: u64,
    pub util_all: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamedIpStat {
    pub ip: Option<IpAddr>,
    pub netmask: Option<IpAddr>,
    pub gateway: Option<IpAddr>,
    pub ip6: Option<IpAddr>,
    /// Prefix length in `/64` form.
    pub netmask6: String,
    pub gateway6: Option<IpAddr>,
    pub dns: Vec<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// An end-user device connected to a [`Device`] radio
/// (`/api/v1/sites/{site}/stats/clients`, also the streamed shape).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Client {
    pub mac: String,
    #[serde(with = "unix_time", skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
    pub username: String,
    pub hostname: String,
    pub os: String,
    pub manufacture: String,
    pub family: String,
    pub model: String,
    pub ip: Option<IpAddr>,
    pub ip6: Option<IpAddr>,
    pub ap_mac: String,
    pub ap_id: String,
    pub ssid: String,
    pub wlan_id: String,
    pub psk_id: String,

    #[serde(with = "seconds", skip_serializing_if = "Option::is_none")]
    pub uptime: Option<Duration>,
    #[serde(rename = "idle_time", with = "seconds", skip_serializing_if = "Option::is_none")]
    pub idletime: Option<Duration>,
    pub power_saving: bool,
    pub band: Radio,
    pub proto: Dot11Proto,
    pub key_mgmt: String,
    pub dual_band: bool,

    pub channel: u32,
    pub vlan_id: String,
    pub airespace_ifname: String,
    pub rssi: i32,
    pub snr: i32,
    pub tx_rate: f64,
    pub rx_rate: f64,

    pub tx_bytes: u64,
    pub tx_bps: u64,
    pub tx_packets: u64,
    pub tx_retries: u64,
    pub rx_bytes: u64,
    pub rx_bps: u64,
    pub rx_packets: u64,
    pub rx_retries: u64,

    pub map_id: String,
    pub x: f64,
    pub y: f64,
    pub x_m: f64,
    pub y_m: f64,
    pub num_locating_aps: u32,

    pub is_guest: bool,
    pub guest: Guest,
    pub airwatch: Airwatch,
    #[serde(rename = "_ttl")]
    pub ttl: u32,
}

/// Guest-portal status of a [`Client`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Guest {
    pub authorized: bool,
    #[serde(with = "unix_time", skip_serializing_if = "Option::is_none")]
    pub authorized_time: Option<DateTime<Utc>>,
    #[serde(with = "unix_time", skip_serializing_if = "Option::is_none")]
    pub authorized_expiring_time: Option<DateTime<Utc>>,
    pub name: String,
    pub email: String,
    pub company: String,
    pub field1: String,
    pub cross_site: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Airwatch {
    pub authorized: bool,
}
