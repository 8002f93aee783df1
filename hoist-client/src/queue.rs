//! Queue correlation
//!
//! A trigger POST is fire-and-forget: the server replies with an empty body
//! and a `Location` header pointing at a transient queue item. The id
//! parsed out of that header is the only handle the caller gets until the
//! queue item is promoted to a permanent build record, so losing it means
//! losing the build. Status resolution owns the wait; nothing here retries
//! or blocks.

use chrono::Utc;
use tracing::debug;

use hoist_core::domain::build::QueueTicket;
use hoist_core::domain::reference::JobLocator;
use hoist_core::dto::queue::{QueueExecutable, QueueItem, QueueListing};
use hoist_core::locator::normalize_url;

use crate::error::{Error, Result};
use crate::{ServerClient, ok_status};

impl ServerClient {
    // =============================================================================
    // Triggering
    // =============================================================================

    /// Trigger a build of `job`, returning a ticket for its queue item
    ///
    /// With parameters the POST goes to `<job>/buildWithParameters` with the
    /// parameters URL-encoded into the query string; without, to
    /// `<job>/build`. A single attempt: transport failures and non-success
    /// statuses surface to the caller unretried.
    pub async fn trigger(
        &self,
        job: &JobLocator,
        parameters: &[(String, String)],
    ) -> Result<QueueTicket> {
        let job_url = self.job_url(job);
        let post_url = if parameters.is_empty() {
            format!("{}/build", job_url)
        } else {
            format!("{}/buildWithParameters", job_url)
        };
        debug!(%post_url, params = parameters.len(), "triggering build");

        let query = if parameters.is_empty() {
            None
        } else {
            Some(parameters)
        };
        let response = self.post_raw(&post_url, query).await?;
        let status = response.status();

        if !ok_status(status) {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::api_error(status.as_u16(), message));
        }

        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let queue_id = parse_queue_location(location.as_deref())?;
        debug!(queue_id, "build queued");

        Ok(QueueTicket::new(queue_id, Utc::now()))
    }

    // =============================================================================
    // Queue Lookups
    // =============================================================================

    /// Cancel a queued build
    ///
    /// Returns `false` when the item has already left the queue — the build
    /// started before the cancellation landed. That is a lost race, not an
    /// error; re-check through status resolution.
    pub async fn cancel_queue_item(&self, queue_id: u64) -> Result<bool> {
        let url = self.endpoint(&format!("queue/cancelItem?id={}", queue_id));
        let response = self.post_raw(&url, None).await?;
        let cancelled = ok_status(response.status());

        if !cancelled {
            debug!(queue_id, "cancel refused; item likely already started");
        }
        Ok(cancelled)
    }

    /// Fetch a single queue item
    pub async fn queue_item(&self, queue_id: u64) -> Result<Option<QueueItem>> {
        let url = self.endpoint(&format!("queue/item/{}/api/json", queue_id));
        self.get_json_opt(&url).await
    }

    /// The build a queue item was promoted to, once the server assigns one
    ///
    /// `Ok(None)` while the item still waits in the queue (or no longer
    /// exists). This is the correlation step that turns a [`QueueTicket`]
    /// into a trackable build.
    pub async fn resolved_build(&self, queue_id: u64) -> Result<Option<QueueExecutable>> {
        Ok(self
            .queue_item(queue_id)
            .await?
            .and_then(|item| item.executable))
    }

    /// Fetch the server's entire build queue
    pub(crate) async fn queue_listing(&self) -> Result<QueueListing> {
        let url = self.endpoint("queue/api/json");
        Ok(self.get_json_opt(&url).await?.unwrap_or_default())
    }
}

/// Parse the queue id from a trigger response's `Location` header
///
/// The header points at the queue item; its final path segment (after
/// stripping a trailing slash) is the numeric id.
pub(crate) fn parse_queue_location(location: Option<&str>) -> Result<u64> {
    let location = location.ok_or_else(|| {
        Error::Correlation("trigger response carries no Location header".to_string())
    })?;

    let trimmed = location.strip_suffix('/').unwrap_or(location);
    let segment = trimmed.rsplit('/').next().unwrap_or(trimmed);

    segment.parse().map_err(|_| {
        Error::Correlation(format!(
            "queue location has a non-numeric tail segment: {}",
            location
        ))
    })
}

/// Scan a queue listing for entries that will build `job_url`
///
/// Queue entries carry no build number, so matching is by normalized task
/// URL plus, when the caller supplies one, a parameter fingerprint: every
/// supplied `key=value` pair must appear in the entry's parameter block.
pub(crate) fn queue_find<'a>(
    listing: &'a QueueListing,
    job_url: &str,
    fingerprint: Option<&[(String, String)]>,
) -> Vec<&'a QueueItem> {
    let wanted = normalize_url(job_url);
    listing
        .items
        .iter()
        .filter(|item| {
            item.job_url().map(normalize_url) == Some(wanted)
                && fingerprint
                    .map(|params| params_match(item.params.as_deref(), params))
                    .unwrap_or(true)
        })
        .collect()
}

fn params_match(block: Option<&str>, wanted: &[(String, String)]) -> bool {
    let Some(block) = block else {
        return wanted.is_empty();
    };
    wanted
        .iter()
        .all(|(key, value)| block.lines().any(|line| line == format!("{}={}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_with_numeric_tail_parses() {
        assert_eq!(
            parse_queue_location(Some("http://localhost:8080/queue/item/137/")).unwrap(),
            137
        );
        assert_eq!(
            parse_queue_location(Some("http://localhost:8080/queue/item/137")).unwrap(),
            137
        );
    }

    #[test]
    fn missing_location_is_a_correlation_error() {
        match parse_queue_location(None) {
            Err(Error::Correlation(_)) => {}
            other => panic!("expected correlation error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn non_numeric_tail_is_a_correlation_error() {
        match parse_queue_location(Some("http://localhost:8080/queue/item/abc/")) {
            Err(Error::Correlation(message)) => assert!(message.contains("non-numeric")),
            other => panic!("expected correlation error, got {:?}", other.map(|_| ())),
        }
    }

    fn listing() -> QueueListing {
        serde_json::from_str(
            r#"{"items": [
                {"id": 1, "task": {"name": "demo", "url": "http://localhost:8080/job/demo/"},
                 "params": "\nTARGET=prod\nDRY_RUN=false"},
                {"id": 2, "task": {"name": "other", "url": "http://localhost:8080/job/other/"}}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn queue_find_matches_by_normalized_job_url() {
        let listing = listing();
        let found = queue_find(&listing, "http://localhost:8080/job/demo", None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);

        assert!(queue_find(&listing, "http://localhost:8080/job/missing/", None).is_empty());
    }

    #[test]
    fn queue_find_honours_parameter_fingerprint() {
        let listing = listing();
        let params = vec![("TARGET".to_string(), "prod".to_string())];
        assert_eq!(
            queue_find(&listing, "http://localhost:8080/job/demo", Some(&params)).len(),
            1
        );

        let wrong = vec![("TARGET".to_string(), "staging".to_string())];
        assert!(queue_find(&listing, "http://localhost:8080/job/demo", Some(&wrong)).is_empty());
    }
}
