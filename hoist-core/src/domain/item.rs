//! Server item classification
//!
//! Every JSON payload the server returns is tagged with a `_class` type
//! discriminator. Components must classify that tag before trusting any
//! derived field: a URL that was expected to point at a build can just as
//! well point at a folder or a job, and the payloads look deceptively alike.

/// Closed set of item kinds the server can hand back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// A buildable job (freestyle or pipeline)
    Job,
    /// A folder containing further jobs/folders
    Folder,
    /// A single build record of a job
    Build,
    /// An agent/controller node
    Node,
    /// An entry in the build queue
    Queue,
    /// Anything not covered by the allow-lists above
    Unknown,
}

const JOB_CLASSES: &[&str] = &[
    "hudson.model.FreeStyleProject",
    "org.jenkinsci.plugins.workflow.job.WorkflowJob",
    "hudson.matrix.MatrixProject",
    "hudson.model.ExternalJob",
];

const FOLDER_CLASSES: &[&str] = &[
    "com.cloudbees.hudson.plugins.folder.Folder",
    "jenkins.branch.OrganizationFolder",
    "org.jenkinsci.plugins.workflow.multibranch.WorkflowMultiBranchProject",
];

const BUILD_CLASSES: &[&str] = &[
    "hudson.model.FreeStyleBuild",
    "org.jenkinsci.plugins.workflow.job.WorkflowRun",
    "hudson.matrix.MatrixRun",
];

const NODE_CLASSES: &[&str] = &[
    "hudson.model.Hudson$MasterComputer",
    "hudson.slaves.SlaveComputer",
];

const QUEUE_CLASSES: &[&str] = &[
    "hudson.model.Queue$WaitingItem",
    "hudson.model.Queue$BlockedItem",
    "hudson.model.Queue$BuildableItem",
    "hudson.model.Queue$LeftItem",
];

impl ItemKind {
    /// Classify a `_class` discriminator string
    ///
    /// This is the single place membership in the per-kind allow-lists is
    /// checked; callers match on the returned variant instead of comparing
    /// discriminator strings themselves.
    pub fn classify(class: &str) -> Self {
        if JOB_CLASSES.contains(&class) {
            ItemKind::Job
        } else if FOLDER_CLASSES.contains(&class) {
            ItemKind::Folder
        } else if BUILD_CLASSES.contains(&class) {
            ItemKind::Build
        } else if NODE_CLASSES.contains(&class) {
            ItemKind::Node
        } else if QUEUE_CLASSES.contains(&class) {
            ItemKind::Queue
        } else {
            ItemKind::Unknown
        }
    }

    /// True when the discriminator names a buildable job
    pub fn is_job(class: &str) -> bool {
        Self::classify(class) == ItemKind::Job
    }

    /// True when the discriminator names a build record
    pub fn is_build(class: &str) -> bool {
        Self::classify(class) == ItemKind::Build
    }

    /// True when the discriminator names a folder
    pub fn is_folder(class: &str) -> bool {
        Self::classify(class) == ItemKind::Folder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_discriminators() {
        assert_eq!(
            ItemKind::classify("org.jenkinsci.plugins.workflow.job.WorkflowJob"),
            ItemKind::Job
        );
        assert_eq!(
            ItemKind::classify("com.cloudbees.hudson.plugins.folder.Folder"),
            ItemKind::Folder
        );
        assert_eq!(
            ItemKind::classify("hudson.model.FreeStyleBuild"),
            ItemKind::Build
        );
        assert_eq!(
            ItemKind::classify("hudson.model.Queue$WaitingItem"),
            ItemKind::Queue
        );
    }

    #[test]
    fn unknown_discriminator_is_not_trusted() {
        assert_eq!(ItemKind::classify("hudson.model.ListView"), ItemKind::Unknown);
        assert!(!ItemKind::is_build("com.cloudbees.hudson.plugins.folder.Folder"));
        assert!(!ItemKind::is_job(""));
    }
}
