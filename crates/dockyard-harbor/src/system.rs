//! Reachability probe (`/ping`)

use reqwest::StatusCode;

use crate::client::HarborClient;
use crate::error::{HarborError, Result};

impl HarborClient {
    /// Unauthenticated liveness probe
    ///
    /// A 401 still proves the instance is reachable (some deployments put
    /// every endpoint behind auth), so it counts as success.
    pub async fn ping(&self) -> Result<()> {
        match self.probe("ping").await? {
            StatusCode::OK | StatusCode::UNAUTHORIZED => Ok(()),
            status => Err(HarborError::Api {
                status: status.as_u16(),
                body: format!("unexpected ping response from {}", self.base_url()),
            }),
        }
    }
}
