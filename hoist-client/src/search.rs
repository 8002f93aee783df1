//! Recursive job search
//!
//! The server only exposes its job tree level by level, so a server-wide
//! search first materializes the tree to a bounded depth with a nested
//! `tree=` query, then walks it depth-first. The walk threads an explicit
//! accumulator through the recursion — one fresh accumulator per top-level
//! call, never object-level state.

use regex::{Regex, RegexBuilder};
use tracing::{debug, trace};

use hoist_core::domain::item::ItemKind;
use hoist_core::domain::reference::JobLocator;
use hoist_core::dto::job::{JobEntry, JobListing, RawJob};

use crate::ServerClient;
use crate::error::Result;

/// Where a search starts
#[derive(Debug, Clone)]
pub enum SearchScope {
    /// The whole server, materialized to the requested depth
    Server,
    /// A single folder's direct children; the depth parameter is ignored
    Folder(JobLocator),
}

/// Per-invocation accumulator for the recursive walk
#[derive(Debug, Default)]
struct SearchAccumulator {
    matches: Vec<JobEntry>,
    visited: usize,
}

impl ServerClient {
    /// Find jobs whose name matches `pattern`
    ///
    /// The pattern is a case-insensitive regular expression, searched (not
    /// anchored) against each job's fully-qualified path, or its bare name
    /// when `match_full_name` is false. A malformed pattern aborts the
    /// whole search. Returns the matching records plus a parallel list of
    /// their URLs, both empty when nothing matches or the scope is not a
    /// folder.
    pub async fn search_jobs(
        &self,
        pattern: &str,
        scope: &SearchScope,
        max_depth: u32,
        match_full_name: bool,
    ) -> Result<(Vec<JobEntry>, Vec<String>)> {
        let matcher = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        debug!(pattern, max_depth, match_full_name, "searching jobs");

        let items = match scope {
            SearchScope::Server => {
                let url = format!(
                    "{}/api/json?tree={}",
                    self.base_url(),
                    tree_query(max_depth)
                );
                self.get_json_opt::<JobListing>(&url)
                    .await?
                    .unwrap_or_default()
                    .jobs
            }
            SearchScope::Folder(locator) => {
                let url = format!(
                    "{}/api/json?tree=name,fullName,url,{}",
                    self.job_url(locator),
                    tree_query(1)
                );
                match self.get_json_opt::<RawJob>(&url).await? {
                    Some(folder) if ItemKind::is_folder(&folder.class) => folder.jobs,
                    Some(other) => {
                        debug!(class = %other.class, "search scope is not a folder");
                        return Ok((Vec::new(), Vec::new()));
                    }
                    None => return Ok((Vec::new(), Vec::new())),
                }
            }
        };

        let mut acc = SearchAccumulator::default();
        walk(&items, &matcher, match_full_name, 1, &mut acc);
        debug!(
            visited = acc.visited,
            matched = acc.matches.len(),
            "search walk finished"
        );

        let matches = dedup_matches(acc.matches);
        let urls = matches.iter().map(|entry| entry.url.clone()).collect();
        Ok((matches, urls))
    }
}

/// Nested `tree=` expression materializing `depth` levels of the job tree
fn tree_query(depth: u32) -> String {
    let mut query = String::from("jobs[name,fullName,url]");
    for _ in 1..depth.max(1) {
        query = format!("jobs[name,fullName,url,{}]", query);
    }
    query
}

/// Depth-first walk collecting pattern matches into `acc`
fn walk(
    items: &[JobEntry],
    matcher: &Regex,
    match_full_name: bool,
    depth: u32,
    acc: &mut SearchAccumulator,
) {
    for item in items {
        trace!(depth, name = %item.name, "visiting");

        if ItemKind::is_job(&item.class) && matcher.is_match(item.match_name(match_full_name)) {
            acc.matches.push(item.flattened());
        }
        acc.visited += 1;

        if let Some(children) = &item.jobs {
            walk(children, matcher, match_full_name, depth + 1, acc);
        }
    }
}

/// Collapse duplicates by full record equality, keeping first occurrences
///
/// The server's tree representation can alias the same item under multiple
/// intermediate listings.
fn dedup_matches(matches: Vec<JobEntry>) -> Vec<JobEntry> {
    let mut unique: Vec<JobEntry> = Vec::with_capacity(matches.len());
    for entry in matches {
        if !unique.contains(&entry) {
            unique.push(entry);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn tree() -> Vec<JobEntry> {
        serde_json::from_str(
            r#"[
                {"_class": "com.cloudbees.hudson.plugins.folder.Folder",
                 "name": "F1", "fullName": "F1", "url": "http://s/job/F1/",
                 "jobs": [
                    {"_class": "hudson.model.FreeStyleProject",
                     "name": "foo-job", "fullName": "F1/foo-job", "url": "http://s/job/F1/job/foo-job/"},
                    {"_class": "com.cloudbees.hudson.plugins.folder.Folder",
                     "name": "F2", "fullName": "F1/F2", "url": "http://s/job/F1/job/F2/",
                     "jobs": [
                        {"_class": "org.jenkinsci.plugins.workflow.job.WorkflowJob",
                         "name": "foo2", "fullName": "F1/F2/foo2", "url": "http://s/job/F1/job/F2/job/foo2/"}
                     ]}
                 ]},
                {"_class": "hudson.model.FreeStyleProject",
                 "name": "bar-job", "fullName": "bar-job", "url": "http://s/job/bar-job/"}
            ]"#,
        )
        .unwrap()
    }

    fn run_walk(pattern: &str, full: bool) -> (Vec<JobEntry>, usize) {
        let matcher = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .unwrap();
        let mut acc = SearchAccumulator::default();
        walk(&tree(), &matcher, full, 1, &mut acc);
        (dedup_matches(acc.matches), acc.visited)
    }

    #[test]
    fn depth_first_match_on_full_names() {
        let (matches, visited) = run_walk("^foo", true);
        let names: Vec<&str> = matches.iter().map(|m| m.match_name(true)).collect();

        // Parent folder's direct job before the nested folder's children;
        // bar-job never matches.
        assert_eq!(names, vec!["F1/foo-job", "F1/F2/foo2"]);
        assert_eq!(visited, 5);
    }

    #[test]
    fn full_name_anchor_excludes_nested_when_matching_path() {
        // Anchored at the path start, nested entries no longer match.
        let (matches, _) = run_walk("^F1/F2", true);
        let names: Vec<&str> = matches.iter().map(|m| m.match_name(true)).collect();
        assert_eq!(names, vec!["F1/F2/foo2"]);
    }

    #[test]
    fn bare_name_matching_ignores_folders_in_path() {
        let (matches, _) = run_walk("^foo", false);
        let names: Vec<&str> = matches.iter().map(|m| &*m.name).collect();
        assert_eq!(names, vec!["foo-job", "foo2"]);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let (matches, _) = run_walk("^BAR", true);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "bar-job");
    }

    #[test]
    fn folders_are_visited_but_never_matched() {
        let (matches, _) = run_walk("^F1$", true);
        assert!(matches.is_empty());
    }

    #[test]
    fn aliased_duplicates_collapse_to_first_occurrence() {
        let matcher = RegexBuilder::new("foo").case_insensitive(true).build().unwrap();
        let mut doubled = tree();
        doubled.extend(tree());

        let mut acc = SearchAccumulator::default();
        walk(&doubled, &matcher, true, 1, &mut acc);
        assert_eq!(acc.matches.len(), 4);

        let unique = dedup_matches(acc.matches);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].name, "foo-job");
    }

    #[test]
    fn malformed_pattern_aborts_the_search() {
        let result = RegexBuilder::new("foo[").case_insensitive(true).build();
        assert!(matches!(result.map_err(Error::from), Err(Error::Pattern(_))));
    }

    #[test]
    fn tree_query_nests_to_requested_depth() {
        assert_eq!(tree_query(1), "jobs[name,fullName,url]");
        assert_eq!(
            tree_query(3),
            "jobs[name,fullName,url,jobs[name,fullName,url,jobs[name,fullName,url]]]"
        );
        // Zero is treated as one level rather than an empty query.
        assert_eq!(tree_query(0), "jobs[name,fullName,url]");
    }
}
