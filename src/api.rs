use anyhow::{anyhow, Context, Result};
use std::time::Duration;

use crate::models::{Ack, JobDetail, JobSummary, Outcome};

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Typed client for the tracker backend. Cheap to clone; clones share the
/// underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    pub async fn all_jobs(&self) -> Result<Vec<JobSummary>> {
        let response = self
            .client
            .get(self.url("get_all_jobs"))
            .send()
            .await
            .context("Failed to fetch job list")?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Job list request failed with status {}",
                response.status()
            ));
        }

        response
            .json()
            .await
            .context("Failed to parse job list response")
    }

    pub async fn job_details(&self, job_id: i64) -> Result<JobDetail> {
        let response = self
            .client
            .get(self.url(&format!("job_details/{}", job_id)))
            .send()
            .await
            .with_context(|| format!("Failed to fetch details for job #{}", job_id))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Detail request for job #{} failed with status {}",
                job_id,
                response.status()
            ));
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse details for job #{}", job_id))
    }

    /// One request shape for all three mark endpoints; `outcome` picks the
    /// path. Returns whether the backend accepted the change.
    pub async fn mark(&self, job_id: i64, outcome: Outcome) -> Result<bool> {
        self.post_status(&format!("{}/{}", outcome.path(), job_id))
            .await
    }

    pub async fn hide(&self, job_id: i64) -> Result<bool> {
        self.post_status(&format!("hide_job/{}", job_id)).await
    }

    async fn post_status(&self, path: &str) -> Result<bool> {
        let response = self
            .client
            .post(self.url(path))
            .send()
            .await
            .with_context(|| format!("Failed to POST /{}", path))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "POST /{} failed with status {}",
                path,
                response.status()
            ));
        }

        let ack: Ack = response
            .json()
            .await
            .with_context(|| format!("Failed to parse response from /{}", path))?;
        Ok(ack.ok())
    }
}
