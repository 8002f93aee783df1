//! Build-queue wire shapes

use serde::{Deserialize, Serialize};

/// The full queue listing from `queue/api/json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueListing {
    #[serde(default)]
    pub items: Vec<QueueItem>,
}

/// The job a queue item will build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueTask {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// The build a queue item resolved to once it left the queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueExecutable {
    pub number: u32,
    pub url: String,
}

/// One entry of the server's transient build queue
///
/// Queue entries carry no build number; once the server starts the build
/// the entry (briefly) gains an `executable` with the assigned number
/// before vanishing from the listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    #[serde(rename = "_class", default)]
    pub class: Option<String>,
    pub id: u64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub in_queue_since: Option<i64>,
    #[serde(default)]
    pub why: Option<String>,
    #[serde(default)]
    pub cancelled: Option<bool>,
    #[serde(default)]
    pub task: Option<QueueTask>,
    /// URL-encoded parameter block, e.g. `"\nFOO=bar\nBAZ=qux"`
    #[serde(default)]
    pub params: Option<String>,
    #[serde(default)]
    pub executable: Option<QueueExecutable>,
}

impl QueueItem {
    /// URL of the job this entry will build, when the server reports one
    pub fn job_url(&self) -> Option<&str> {
        self.task.as_ref().and_then(|t| t.url.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_item_without_executable_has_no_build_yet() {
        let item: QueueItem = serde_json::from_str(
            r#"{
                "_class": "hudson.model.Queue$WaitingItem",
                "id": 42,
                "url": "queue/item/42/",
                "inQueueSince": 1700000000000,
                "why": "In the quiet period",
                "task": {"name": "demo", "url": "http://localhost:8080/job/demo/"}
            }"#,
        )
        .unwrap();

        assert_eq!(item.id, 42);
        assert!(item.executable.is_none());
        assert_eq!(item.job_url(), Some("http://localhost:8080/job/demo/"));
    }

    #[test]
    fn left_item_carries_the_resolved_build() {
        let item: QueueItem = serde_json::from_str(
            r#"{
                "_class": "hudson.model.Queue$LeftItem",
                "id": 42,
                "task": {"name": "demo", "url": "http://localhost:8080/job/demo/"},
                "executable": {"number": 13, "url": "http://localhost:8080/job/demo/13/"}
            }"#,
        )
        .unwrap();

        let executable = item.executable.unwrap();
        assert_eq!(executable.number, 13);
    }
}
