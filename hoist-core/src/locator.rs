//! Item name/URL conversions
//!
//! The server addresses nested items with `/job/<segment>` URL paths: the
//! job named `area/team/build-all` lives at
//! `<server>/job/area/job/team/job/build-all`. These helpers convert
//! between the two forms and pick apart build URLs.

/// Trim trailing slashes from a URL
pub fn normalize_url(url: &str) -> &str {
    url.trim_end_matches('/')
}

/// Turn a full job path into a job URL under `server_url`
pub fn name_to_url(server_url: &str, name: &str) -> String {
    let path: Vec<String> = name
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| format!("job/{}", segment))
        .collect();
    format!("{}/{}", normalize_url(server_url), path.join("/"))
}

/// Recover the full job path from an item URL
///
/// Collects the segment following every `job` path component, so it works
/// without knowing the server's base URL. Returns an empty string for URLs
/// carrying no `job` components.
pub fn url_to_full_name(url: &str) -> String {
    let mut names = Vec::new();
    let mut segments = normalize_url(url).split('/');
    while let Some(segment) = segments.next() {
        if segment == "job" {
            if let Some(name) = segments.next() {
                names.push(name);
            }
        }
    }
    names.join("/")
}

/// Final name component of a full job path
pub fn full_name_to_name(full_name: &str) -> &str {
    full_name.rsplit('/').next().unwrap_or(full_name)
}

/// Build number from a build URL's trailing path segment
pub fn build_url_to_build_number(build_url: &str) -> Option<u32> {
    normalize_url(build_url)
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
}

/// Owning job URL of a build URL
///
/// Strips the trailing numeric build segment; returns the input unchanged
/// (normalized) when there is none, which covers callers holding a job URL
/// already.
pub fn build_url_to_job_url(build_url: &str) -> String {
    let trimmed = normalize_url(build_url);
    match trimmed.rsplit_once('/') {
        Some((head, tail)) if tail.parse::<u32>().is_ok() => head.to_string(),
        _ => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_round_trips_through_url() {
        let url = name_to_url("http://localhost:8080/", "area/team/build-all");
        assert_eq!(
            url,
            "http://localhost:8080/job/area/job/team/job/build-all"
        );
        assert_eq!(url_to_full_name(&url), "area/team/build-all");
    }

    #[test]
    fn full_name_extraction_ignores_non_job_segments() {
        assert_eq!(
            url_to_full_name("http://localhost:8080/job/demo/13/"),
            "demo"
        );
        assert_eq!(url_to_full_name("http://localhost:8080/computer/agent-1/"), "");
    }

    #[test]
    fn bare_name_is_last_path_component() {
        assert_eq!(full_name_to_name("area/team/build-all"), "build-all");
        assert_eq!(full_name_to_name("solo"), "solo");
    }

    #[test]
    fn build_url_parsing() {
        assert_eq!(
            build_url_to_build_number("http://localhost:8080/job/demo/13/"),
            Some(13)
        );
        assert_eq!(
            build_url_to_build_number("http://localhost:8080/job/demo/"),
            None
        );
        assert_eq!(
            build_url_to_job_url("http://localhost:8080/job/demo/13/"),
            "http://localhost:8080/job/demo"
        );
        assert_eq!(
            build_url_to_job_url("http://localhost:8080/job/demo"),
            "http://localhost:8080/job/demo"
        );
    }
}
