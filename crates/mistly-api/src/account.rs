// Account endpoint

use tracing::debug;

use crate::client::MistClient;
use crate::error::Error;
use crate::models::Account;

impl MistClient {
    /// "Whoami" and privileges of the account making the request.
    ///
    /// `GET /api/v1/self`
    pub async fn get_self(&self) -> Result<Account, Error> {
        debug!("fetching self");
        self.get("/api/v1/self").await
    }
}
