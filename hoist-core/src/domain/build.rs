//! Normalized build status model
//!
//! The server reports build state through partial, time-varying payloads: a
//! queued build has no record at all, a running build has a record without a
//! `result`, and a concluded build carries a fixed result and duration. The
//! types here collapse those shapes into one status model, derived fresh on
//! every poll and never persisted. The raw wire payload is left untouched;
//! see [`BuildStatus::from_raw`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dto::build::RawBuild;

/// Lifecycle state of a referenced build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildState {
    /// Job exists but the referenced build has not run and is not queued.
    /// Re-checked on every poll: a queue entry can appear at any time.
    NotRun,
    /// A matching entry sits in the server's build queue
    Queued,
    /// The build record exists but carries no result yet
    Running,
    /// The build record carries a result; timing is fixed
    Concluded,
}

/// Outcome code of a concluded build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildOutcome {
    Success,
    Failure,
    Unstable,
    Aborted,
    NotBuilt,
    /// Result string outside the known set, preserved verbatim
    Other(String),
}

impl BuildOutcome {
    /// Parse the server's result string
    pub fn parse(code: &str) -> Self {
        match code {
            "SUCCESS" => BuildOutcome::Success,
            "FAILURE" => BuildOutcome::Failure,
            "UNSTABLE" => BuildOutcome::Unstable,
            "ABORTED" => BuildOutcome::Aborted,
            "NOT_BUILT" => BuildOutcome::NotBuilt,
            other => BuildOutcome::Other(other.to_string()),
        }
    }

    /// The server-side result string
    pub fn as_str(&self) -> &str {
        match self {
            BuildOutcome::Success => "SUCCESS",
            BuildOutcome::Failure => "FAILURE",
            BuildOutcome::Unstable => "UNSTABLE",
            BuildOutcome::Aborted => "ABORTED",
            BuildOutcome::NotBuilt => "NOT_BUILT",
            BuildOutcome::Other(code) => code,
        }
    }
}

/// Normalized view over a build's state and timing
///
/// Invariants: `result` is `Some` iff `state == Concluded`; `elapsed_ms` is
/// a live `now - started_at` delta while `Running` and the server's fixed
/// duration once `Concluded`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildStatus {
    pub state: BuildState,
    pub result: Option<BuildOutcome>,
    pub started_at: Option<DateTime<Utc>>,
    /// Elapsed time (running) or fixed duration (concluded), milliseconds
    pub elapsed_ms: Option<i64>,
    /// Node the build ran on, when the server reports one
    pub built_on: Option<String>,
    pub number: Option<u32>,
    pub url: Option<String>,
}

impl BuildStatus {
    /// Derive the normalized status from a raw build record
    ///
    /// `now` is threaded in rather than read from the clock so the
    /// derivation stays a pure function of its inputs.
    pub fn from_raw(raw: &RawBuild, now: DateTime<Utc>) -> Self {
        let started_at = DateTime::from_timestamp_millis(raw.timestamp);
        let built_on = raw
            .built_on
            .as_deref()
            .filter(|node| !node.is_empty())
            .map(str::to_string);

        match raw.result.as_deref() {
            Some(code) => BuildStatus {
                state: BuildState::Concluded,
                result: Some(BuildOutcome::parse(code)),
                started_at,
                elapsed_ms: Some(raw.duration),
                built_on,
                number: Some(raw.number),
                url: Some(raw.url.clone()),
            },
            None => BuildStatus {
                state: BuildState::Running,
                result: None,
                started_at,
                elapsed_ms: started_at
                    .map(|start| now.signed_duration_since(start).num_milliseconds()),
                built_on,
                number: Some(raw.number),
                url: Some(raw.url.clone()),
            },
        }
    }

    /// Status for a build whose queue entry was found
    pub fn queued() -> Self {
        BuildStatus {
            state: BuildState::Queued,
            result: None,
            started_at: None,
            elapsed_ms: None,
            built_on: None,
            number: None,
            url: None,
        }
    }

    /// Status for a build that has neither a record nor a queue entry
    pub fn not_run() -> Self {
        BuildStatus {
            state: BuildState::NotRun,
            ..Self::queued()
        }
    }

    /// Elapsed time or duration in seconds, millisecond precision
    pub fn elapsed_secs(&self) -> Option<f64> {
        self.elapsed_ms.map(|ms| ms as f64 / 1000.0)
    }

    /// Human-readable state/outcome word
    pub fn display_text(&self) -> &str {
        match (&self.state, &self.result) {
            (BuildState::Concluded, Some(outcome)) => outcome.as_str(),
            (BuildState::Concluded, None) => "CONCLUDED",
            (BuildState::Running, _) => "RUNNING",
            (BuildState::Queued, _) => "QUEUED",
            (BuildState::NotRun, _) => "NOT RUN",
        }
    }
}

/// Handle to a build sitting in the server's transient queue
///
/// Created the instant a trigger POST succeeds and its `Location` header
/// yields a numeric id. Owned by the caller that triggered the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueTicket {
    pub queue_id: u64,
    pub submitted_at: DateTime<Utc>,
}

impl QueueTicket {
    pub fn new(queue_id: u64, submitted_at: DateTime<Utc>) -> Self {
        QueueTicket {
            queue_id,
            submitted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn raw(result: Option<&str>, timestamp: i64, duration: i64) -> RawBuild {
        serde_json::from_value(serde_json::json!({
            "_class": "org.jenkinsci.plugins.workflow.job.WorkflowRun",
            "number": 7,
            "url": "http://localhost:8080/job/demo/7/",
            "timestamp": timestamp,
            "duration": duration,
            "result": result,
            "builtOn": "agent-1",
        }))
        .unwrap()
    }

    #[test]
    fn concluded_build_has_fixed_duration_and_result() {
        let now = Utc::now();
        let status = BuildStatus::from_raw(&raw(Some("SUCCESS"), 1_700_000_000_000, 4_250), now);

        assert_eq!(status.state, BuildState::Concluded);
        assert_eq!(status.result, Some(BuildOutcome::Success));
        assert_eq!(status.elapsed_ms, Some(4_250));
        assert_eq!(status.elapsed_secs(), Some(4.25));
        assert_eq!(status.built_on.as_deref(), Some("agent-1"));
    }

    #[test]
    fn running_build_elapsed_is_live_and_monotonic() {
        let start = 1_700_000_000_000;
        let raw = raw(None, start, 0);

        let t1 = DateTime::from_timestamp_millis(start + 2_000).unwrap();
        let t2 = t1 + TimeDelta::milliseconds(500);

        let first = BuildStatus::from_raw(&raw, t1);
        let second = BuildStatus::from_raw(&raw, t2);

        assert_eq!(first.state, BuildState::Running);
        assert!(first.result.is_none());
        assert_eq!(first.elapsed_ms, Some(2_000));
        assert_eq!(second.elapsed_ms, Some(2_500));
        assert!(second.elapsed_ms >= first.elapsed_ms);
    }

    #[test]
    fn derivation_is_idempotent_on_unchanged_state() {
        let now = Utc::now();
        let raw = raw(Some("UNSTABLE"), 1_700_000_000_000, 60_000);

        let first = BuildStatus::from_raw(&raw, now);
        let second = BuildStatus::from_raw(&raw, now + TimeDelta::seconds(10));

        // Concluded timing is fixed; a later poll changes nothing.
        assert_eq!(first, second);
    }

    #[test]
    fn result_set_iff_concluded() {
        assert!(BuildStatus::queued().result.is_none());
        assert!(BuildStatus::not_run().result.is_none());
        assert_eq!(BuildStatus::not_run().state, BuildState::NotRun);

        let running = BuildStatus::from_raw(&raw(None, 1_700_000_000_000, 0), Utc::now());
        assert!(running.result.is_none());
    }

    #[test]
    fn outcome_codes_round_trip() {
        for code in ["SUCCESS", "FAILURE", "UNSTABLE", "ABORTED", "NOT_BUILT"] {
            assert_eq!(BuildOutcome::parse(code).as_str(), code);
        }
        assert_eq!(
            BuildOutcome::parse("REGRESSION"),
            BuildOutcome::Other("REGRESSION".to_string())
        );
    }
}
