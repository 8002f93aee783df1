//! Build and job references
//!
//! A build can be addressed either by its direct URL or by a job plus a
//! build selector. Exactly one addressing mode is active at a time;
//! resolving a numeric selector requires a job lookup first, which is the
//! status resolver's job.

use serde::{Deserialize, Serialize};

/// Identifies a job on the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobLocator {
    /// Full job path, e.g. `"folder/subfolder/my-job"`
    Name(String),
    /// Direct job URL
    Url(String),
}

/// Selects a build within a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildSelector {
    /// A specific build number
    Number(u32),
    /// The job's last-known build
    Latest,
}

/// Identifies a single build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildReference {
    /// Direct build URL
    Url(String),
    /// Job identity plus build selector
    Job {
        locator: JobLocator,
        selector: BuildSelector,
    },
}

impl BuildReference {
    /// Reference a specific build number of a job
    pub fn number(locator: JobLocator, number: u32) -> Self {
        BuildReference::Job {
            locator,
            selector: BuildSelector::Number(number),
        }
    }

    /// Reference the latest build of a job
    pub fn latest(locator: JobLocator) -> Self {
        BuildReference::Job {
            locator,
            selector: BuildSelector::Latest,
        }
    }
}

impl std::fmt::Display for JobLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobLocator::Name(name) => write!(f, "{}", name),
            JobLocator::Url(url) => write!(f, "{}", url),
        }
    }
}
