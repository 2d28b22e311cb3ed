// Site endpoints
//
// Device and client inventories with their statistics, plus the streaming
// accessors for the per-site statistics channels.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::MistClient;
use crate::error::Error;
use crate::models::{Client, Device, DeviceStat, StreamedDeviceStat};
use crate::websocket::TypedStream;

/// Channel name of the device statistics feed for a site.
pub fn device_stats_channel(site_id: &str) -> String {
    format!("/sites/{site_id}/stats/devices")
}

/// Channel name of the client statistics feed for a site.
pub fn client_stats_channel(site_id: &str) -> String {
    format!("/sites/{site_id}/stats/clients")
}

impl MistClient {
    /// List all devices configured at a site.
    ///
    /// `GET /api/v1/sites/{site_id}/devices`
    pub async fn get_site_devices(&self, site_id: &str) -> Result<Vec<Device>, Error> {
        debug!(site_id, "listing site devices");
        self.get(&format!("/api/v1/sites/{site_id}/devices")).await
    }

    /// List all devices at a site, supplemented with operational statistics.
    ///
    /// `GET /api/v1/sites/{site_id}/stats/devices`
    pub async fn get_site_device_stats(&self, site_id: &str) -> Result<Vec<DeviceStat>, Error> {
        debug!(site_id, "fetching site device stats");
        self.get(&format!("/api/v1/sites/{site_id}/stats/devices"))
            .await
    }

    /// List all clients connected at a site.
    ///
    /// `GET /api/v1/sites/{site_id}/stats/clients`
    pub async fn get_site_client_stats(&self, site_id: &str) -> Result<Vec<Client>, Error> {
        debug!(site_id, "fetching site client stats");
        self.get(&format!("/api/v1/sites/{site_id}/stats/clients"))
            .await
    }

    /// Subscribe to the site's device statistics feed.
    ///
    /// Yields one [`StreamedDeviceStat`] per pushed update until `cancel`
    /// fires or the connection drops.
    pub async fn stream_site_device_stats(
        &self,
        cancel: &CancellationToken,
        site_id: &str,
    ) -> Result<TypedStream<StreamedDeviceStat>, Error> {
        self.stream(cancel, &device_stats_channel(site_id)).await
    }

    /// Subscribe to the site's client statistics feed.
    pub async fn stream_site_client_stats(
        &self,
        cancel: &CancellationToken,
        site_id: &str,
    ) -> Result<TypedStream<Client>, Error> {
        self.stream(cancel, &client_stats_channel(site_id)).await
    }
}
