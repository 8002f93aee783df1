//! Status resolution
//!
//! The server has no single "what is this build doing" endpoint. A build's
//! state is spread across three places that shift over time: the job record
//! (last-known build number), the transient queue (entries without build
//! numbers), and the permanent build record (which only gains a `result`
//! at conclusion). Every call here recomputes from scratch; nothing is
//! cached between polls.

use chrono::Utc;
use tracing::debug;

use hoist_core::domain::build::BuildStatus;
use hoist_core::domain::item::ItemKind;
use hoist_core::domain::reference::{BuildReference, BuildSelector, JobLocator};
use hoist_core::dto::build::RawBuild;
use hoist_core::locator::{build_url_to_build_number, build_url_to_job_url, normalize_url};

use crate::ServerClient;
use crate::error::Result;
use crate::queue::queue_find;

impl ServerClient {
    // =============================================================================
    // Build Records
    // =============================================================================

    /// Fetch the raw build record a reference points at
    ///
    /// Direct URLs are fetched as-is; job references first look up the job,
    /// verify its type tag, and resolve the selector against the job's
    /// last-known build number — a caller-supplied number beyond it is
    /// rejected. Missing items and type-tag mismatches are `Ok(None)`.
    pub async fn build_info(&self, reference: &BuildReference) -> Result<Option<RawBuild>> {
        let build_url = match reference {
            BuildReference::Url(url) => normalize_url(url).to_string(),
            BuildReference::Job { locator, selector } => {
                let Some(job) = self.job_info(locator).await? else {
                    return Ok(None);
                };
                let last = job.last_build_number();

                let number = match selector {
                    BuildSelector::Number(number) => {
                        if *number > last {
                            debug!(number, last, "build number exceeds job's last build");
                            return Ok(None);
                        }
                        *number
                    }
                    BuildSelector::Latest => {
                        if last == 0 {
                            debug!("job has no builds yet");
                            return Ok(None);
                        }
                        last
                    }
                };
                format!("{}/{}", normalize_url(&job.url), number)
            }
        };

        let Some(raw) = self
            .get_json_opt::<RawBuild>(&format!("{}/api/json", build_url))
            .await?
        else {
            return Ok(None);
        };

        if !ItemKind::is_build(&raw.class) {
            debug!(class = %raw.class, "item at build URL is not a build");
            return Ok(None);
        }
        Ok(Some(raw))
    }

    /// Build URL a reference resolves to, validated against the server
    pub(crate) async fn resolved_build_url(
        &self,
        reference: &BuildReference,
    ) -> Result<Option<String>> {
        Ok(self
            .build_info(reference)
            .await?
            .map(|raw| normalize_url(&raw.url).to_string()))
    }

    // =============================================================================
    // Normalized Status
    // =============================================================================

    /// Resolve a reference to its normalized status
    ///
    /// `Ok(None)` only when the owning job itself is missing or mis-typed.
    /// A build with neither a record nor a queue entry is `NotRun` — the
    /// server atomically promotes queue entries to builds, but the client
    /// can observe the window in between, and that window must read as
    /// "not run yet", never as an error.
    pub async fn resolve(&self, reference: &BuildReference) -> Result<Option<BuildStatus>> {
        self.resolve_with_fingerprint(reference, None).await
    }

    /// Like [`resolve`](Self::resolve), narrowing queue matches to entries
    /// whose parameter block contains every supplied `key=value` pair
    pub async fn resolve_with_fingerprint(
        &self,
        reference: &BuildReference,
        fingerprint: Option<&[(String, String)]>,
    ) -> Result<Option<BuildStatus>> {
        if let Some(raw) = self.build_info(reference).await? {
            return Ok(Some(BuildStatus::from_raw(&raw, Utc::now())));
        }

        // No permanent record. Make sure the job exists at all, then look
        // for a queue entry that will become this build.
        let job_url = match reference {
            BuildReference::Url(url) => build_url_to_job_url(url),
            BuildReference::Job { locator, .. } => self.job_url(locator),
        };
        if self
            .job_info(&JobLocator::Url(job_url.clone()))
            .await?
            .is_none()
        {
            return Ok(None);
        }

        let listing = self.queue_listing().await?;
        let matches = queue_find(&listing, &job_url, fingerprint);
        debug!(
            queued = listing.items.len(),
            matched = matches.len(),
            %job_url,
            "scanned build queue"
        );

        if matches.is_empty() {
            Ok(Some(BuildStatus::not_run()))
        } else {
            Ok(Some(BuildStatus::queued()))
        }
    }

    /// Human-readable state/outcome word for a reference
    pub async fn status_text(&self, reference: &BuildReference) -> Result<String> {
        Ok(match self.resolve(reference).await? {
            Some(status) => status.display_text().to_string(),
            None => "NOT FOUND".to_string(),
        })
    }

    // =============================================================================
    // Control Operations
    // =============================================================================

    /// Abort a running build; returns the number acted on
    ///
    /// Resolves the reference first, then issues a single `/stop` POST
    /// against the resolved URL. `Ok(None)` when the build does not exist
    /// (it may still be queued — cancel the queue item instead).
    pub async fn abort_build(&self, reference: &BuildReference) -> Result<Option<u32>> {
        let Some(url) = self.resolved_build_url(reference).await? else {
            return Ok(None);
        };
        debug!(%url, "aborting build");
        self.control_post(&format!("{}/stop", url)).await?;
        Ok(build_url_to_build_number(&url))
    }

    /// Delete a build record; returns the number acted on
    pub async fn delete_build(&self, reference: &BuildReference) -> Result<Option<u32>> {
        let Some(url) = self.resolved_build_url(reference).await? else {
            return Ok(None);
        };
        debug!(%url, "deleting build");
        self.control_post(&format!("{}/doDelete", url)).await?;
        Ok(build_url_to_build_number(&url))
    }
}
