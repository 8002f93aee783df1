//! Job lookups and passthrough operations

use tracing::debug;

use hoist_core::domain::item::ItemKind;
use hoist_core::domain::reference::JobLocator;
use hoist_core::dto::job::{BuildRef, RawJob};

use crate::ServerClient;
use crate::error::Result;

impl ServerClient {
    /// Fetch a job's record, verifying its type tag
    ///
    /// `Ok(None)` when the item is missing or the URL points at something
    /// that is not a job (a folder, a build).
    pub async fn job_info(&self, locator: &JobLocator) -> Result<Option<RawJob>> {
        let url = format!("{}/api/json", self.job_url(locator));
        let Some(job) = self.get_json_opt::<RawJob>(&url).await? else {
            debug!(%locator, "job not found");
            return Ok(None);
        };

        if !ItemKind::is_job(&job.class) {
            debug!(class = %job.class, "item at job URL is not a job");
            return Ok(None);
        }
        Ok(Some(job))
    }

    /// A job's last-known build number; 0 when it never built
    pub async fn last_build_number(&self, locator: &JobLocator) -> Result<Option<u32>> {
        Ok(self
            .job_info(locator)
            .await?
            .map(|job| job.last_build_number()))
    }

    /// List a job's recorded builds plus a parallel list of their URLs
    pub async fn build_list(
        &self,
        locator: &JobLocator,
    ) -> Result<(Vec<BuildRef>, Vec<String>)> {
        let Some(job) = self.job_info(locator).await? else {
            return Ok((Vec::new(), Vec::new()));
        };
        let urls = job.builds.iter().map(|build| build.url.clone()).collect();
        Ok((job.builds, urls))
    }

    // =============================================================================
    // Passthrough Controls
    // =============================================================================

    /// Enable a disabled job
    pub async fn enable_job(&self, locator: &JobLocator) -> Result<()> {
        self.control_post(&format!("{}/enable", self.job_url(locator)))
            .await
    }

    /// Disable a job so new builds cannot start
    pub async fn disable_job(&self, locator: &JobLocator) -> Result<()> {
        self.control_post(&format!("{}/disable", self.job_url(locator)))
            .await
    }

    /// Delete a job and all of its builds
    pub async fn delete_job(&self, locator: &JobLocator) -> Result<()> {
        self.control_post(&format!("{}/doDelete", self.job_url(locator)))
            .await
    }
}
