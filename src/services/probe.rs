use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::config::DEFAULT_PROBE_TIMEOUT_SECS;
use crate::error::{ElectrosError, Result};
use crate::interfaces::probe::Probe;

/// GET-based probe: reachable iff the response status is exactly 200.
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ElectrosError::Http(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn is_reachable(&self, url: &str) -> bool {
        match self.client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                if status != StatusCode::OK {
                    debug!(%url, %status, "probe got non-200 response");
                }
                status == StatusCode::OK
            }
            Err(err) => {
                debug!(%url, error = %err, "probe request failed");
                false
            }
        }
    }
}
