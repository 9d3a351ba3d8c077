use std::time::Duration;

use nexus_logging::{nexus_debug, nexus_warn};

use crate::{DispatchError, DispatchReport, JobSpec};

pub const HEALTH_PATH: &str = "/api/health";
pub const SCRAPE_PATH: &str = "/api/scrape";

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub health_timeout: Duration,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".to_string(),
            health_timeout: Duration::from_secs(2),
        }
    }
}

/// Remote execution service that can run a scrape job on our behalf.
#[async_trait::async_trait]
pub trait RemoteBackend: Send + Sync {
    /// True only for a 2xx health response within the configured timeout.
    async fn check_health(&self) -> bool;

    async fn dispatch(&self, job: &JobSpec) -> Result<DispatchReport, DispatchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    settings: BackendSettings,
}

impl ReqwestBackend {
    pub fn new(settings: BackendSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    fn build_client(&self) -> Result<reqwest::Client, DispatchError> {
        reqwest::Client::builder()
            .build()
            .map_err(|err| DispatchError::Network(err.to_string()))
    }
}

#[async_trait::async_trait]
impl RemoteBackend for ReqwestBackend {
    async fn check_health(&self) -> bool {
        let client = match self.build_client() {
            Ok(client) => client,
            Err(err) => {
                nexus_warn!("Cannot build health check client: {}", err);
                return false;
            }
        };

        match client
            .get(self.endpoint(HEALTH_PATH))
            .timeout(self.settings.health_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                nexus_debug!("Health check failed: {}", err);
                false
            }
        }
    }

    async fn dispatch(&self, job: &JobSpec) -> Result<DispatchReport, DispatchError> {
        let client = self.build_client()?;

        // No timeout here: a run waits for the backend as long as it takes.
        let response = client
            .post(self.endpoint(SCRAPE_PATH))
            .json(job)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::HttpStatus(status.as_u16()));
        }

        response
            .json::<DispatchReport>()
            .await
            .map_err(|err| DispatchError::InvalidResponse(err.to_string()))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> DispatchError {
    if err.is_timeout() {
        return DispatchError::Timeout;
    }
    DispatchError::Network(err.to_string())
}
