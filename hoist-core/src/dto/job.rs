//! Job and job-tree wire shapes

use serde::{Deserialize, Serialize};

/// Reference to a build inside a job payload (`lastBuild`, `builds[]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRef {
    pub number: u32,
    pub url: String,
}

/// A job (or folder) as returned by `<job>/api/json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawJob {
    #[serde(rename = "_class")]
    pub class: String,
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub url: String,
    #[serde(default)]
    pub last_build: Option<BuildRef>,
    #[serde(default)]
    pub next_build_number: Option<u32>,
    #[serde(default)]
    pub builds: Vec<BuildRef>,
    #[serde(default)]
    pub in_queue: Option<bool>,
    #[serde(default)]
    pub jobs: Vec<JobEntry>,
}

impl RawJob {
    /// Last-known build number, 0 when the job has never built
    pub fn last_build_number(&self) -> u32 {
        self.last_build.as_ref().map(|b| b.number).unwrap_or(0)
    }
}

/// One node of the server's nested job tree
///
/// Folders carry a nested `jobs` collection; leaf jobs do not. The tree can
/// alias the same item under multiple intermediate listings, which is why
/// search deduplicates by record equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobEntry {
    #[serde(rename = "_class")]
    pub class: String,
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<Vec<JobEntry>>,
}

impl JobEntry {
    /// Name used for pattern matching: the fully-qualified path when
    /// available, the bare name otherwise
    pub fn match_name(&self, full: bool) -> &str {
        if full {
            self.full_name.as_deref().unwrap_or(&self.name)
        } else {
            &self.name
        }
    }

    /// Copy of this entry without its subtree, for result accumulation
    pub fn flattened(&self) -> JobEntry {
        JobEntry {
            class: self.class.clone(),
            name: self.name.clone(),
            full_name: self.full_name.clone(),
            url: self.url.clone(),
            jobs: None,
        }
    }
}

/// Listing wrapper for `api/json?tree=jobs[...]` responses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobListing {
    #[serde(default)]
    pub jobs: Vec<JobEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_build_number_defaults_to_zero() {
        let job: RawJob = serde_json::from_str(
            r#"{
                "_class": "org.jenkinsci.plugins.workflow.job.WorkflowJob",
                "name": "fresh",
                "url": "http://localhost:8080/job/fresh/"
            }"#,
        )
        .unwrap();

        assert_eq!(job.last_build_number(), 0);
        assert!(job.builds.is_empty());
    }

    #[test]
    fn match_name_falls_back_to_bare_name() {
        let entry = JobEntry {
            class: "hudson.model.FreeStyleProject".into(),
            name: "leaf".into(),
            full_name: None,
            url: "http://localhost:8080/job/leaf/".into(),
            jobs: None,
        };

        assert_eq!(entry.match_name(true), "leaf");
        assert_eq!(entry.match_name(false), "leaf");
    }
}
