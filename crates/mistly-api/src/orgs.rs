// Organization endpoints
//
// Site listing plus the `*/count?distinct=` aggregation endpoints, which
// return `{"results": [{<key>, "count"}]}` and are folded into maps here.

use std::collections::HashMap;

use tracing::debug;

use crate::client::MistClient;
use crate::error::Error;
use crate::models::{AlarmCount, CountResult, Site, TicketCount, TicketStatus};

impl MistClient {
    /// List all sites configured within an organization.
    ///
    /// `GET /api/v1/orgs/{org_id}/sites`
    pub async fn get_org_sites(&self, org_id: &str) -> Result<Vec<Site>, Error> {
        debug!(org_id, "listing org sites");
        self.get(&format!("/api/v1/orgs/{org_id}/sites")).await
    }

    /// Count the organization's support tickets, keyed by status.
    ///
    /// `GET /api/v1/orgs/{org_id}/tickets/count?distinct=status`
    pub async fn count_org_tickets(
        &self,
        org_id: &str,
    ) -> Result<HashMap<TicketStatus, u64>, Error> {
        debug!(org_id, "counting org tickets");
        let result: CountResult<TicketCount> = self
            .get_with_params(
                &format!("/api/v1/orgs/{org_id}/tickets/count"),
                &[("distinct", "status")],
            )
            .await?;

        Ok(result
            .results
            .into_iter()
            .map(|t| (t.status, t.count))
            .collect())
    }

    /// Count the organization's alarms, keyed by alarm type.
    ///
    /// `GET /api/v1/orgs/{org_id}/alarms/count?distinct=type`
    pub async fn count_org_alarms(&self, org_id: &str) -> Result<HashMap<String, u64>, Error> {
        debug!(org_id, "counting org alarms");
        let result: CountResult<AlarmCount> = self
            .get_with_params(
                &format!("/api/v1/orgs/{org_id}/alarms/count"),
                &[("distinct", "type")],
            )
            .await?;

        Ok(result
            .results
            .into_iter()
            .map(|a| (a.alarm_type, a.count))
            .collect())
    }
}
