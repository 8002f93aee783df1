//! Hoist HTTP Client
//!
//! A type-safe client for a Jenkins-compatible build-automation server.
//!
//! The server exposes a stateless HTTP/JSON API that was not designed for
//! live progress tracking; this crate layers the interesting parts on top
//! of it: correlating a fire-and-forget trigger with a queue item and then
//! a build record, deriving a consistent status model from partial
//! responses, incrementally tailing a console log over a whole-file
//! transport, and bounded recursive job discovery.
//!
//! # Example
//!
//! ```no_run
//! use hoist_client::ServerClient;
//! use hoist_core::domain::reference::{BuildReference, JobLocator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ServerClient::new("http://localhost:8080");
//!
//!     let ticket = client
//!         .trigger(&JobLocator::Name("area/build-all".into()), &[])
//!         .await?;
//!     println!("queued as {}", ticket.queue_id);
//!
//!     let reference = BuildReference::latest(JobLocator::Name("area/build-all".into()));
//!     if let Some(status) = client.resolve(&reference).await? {
//!         println!("latest build: {}", status.display_text());
//!     }
//!     Ok(())
//! }
//! ```

pub mod console;
pub mod error;
mod jobs;
pub mod queue;
pub mod search;
mod status;

// Re-export commonly used types
pub use error::{Error, Result};
pub use search::SearchScope;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use hoist_core::locator::name_to_url;

/// Basic-auth credentials for the server's API
#[derive(Clone)]
struct Credentials {
    user: String,
    token: String,
}

/// HTTP client for a Jenkins-compatible build server
///
/// One instance per server; all operations are grouped into logical
/// modules implemented on this struct:
/// - Queue correlation (trigger, cancel, queue lookups)
/// - Status resolution (build info, normalized status, abort/delete)
/// - Console tailing (one-shot fetch, download, incremental follow)
/// - Tree search (bounded recursive job discovery)
#[derive(Clone)]
pub struct ServerClient {
    /// Base URL of the server (e.g., "http://localhost:8080")
    base_url: String,
    /// Optional basic-auth credentials
    credentials: Option<Credentials>,
    /// HTTP client instance
    http: Client,
}

/// The server signals success with 2xx and, for control posts, 3xx
pub(crate) fn ok_status(status: StatusCode) -> bool {
    status.is_success() || status.is_redirection()
}

impl ServerClient {
    /// Create a new unauthenticated client
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: None,
            http: Client::new(),
        }
    }

    /// Create a client that sends basic-auth credentials with every request
    pub fn with_credentials(
        base_url: impl Into<String>,
        user: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        let mut client = Self::new(base_url);
        client.credentials = Some(Credentials {
            user: user.into(),
            token: token.into(),
        });
        client
    }

    /// Create a client with a custom HTTP client
    ///
    /// This allows configuring timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        let mut client = Self::new(base_url);
        client.http = http;
        client
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a server-relative endpoint path
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// URL of a job given either form of locator
    pub(crate) fn job_url(&self, locator: &hoist_core::domain::reference::JobLocator) -> String {
        use hoist_core::domain::reference::JobLocator;
        match locator {
            JobLocator::Name(name) => name_to_url(&self.base_url, name),
            JobLocator::Url(url) => url.trim_end_matches('/').to_string(),
        }
    }

    pub(crate) fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(creds) => request.basic_auth(&creds.user, Some(&creds.token)),
            None => request,
        }
    }

    // =============================================================================
    // Request Primitives
    // =============================================================================

    /// GET a JSON resource
    ///
    /// Returns `Ok(None)` for any non-success status: resolution callers
    /// treat a missing item as an empty result, never as a crash.
    pub(crate) async fn get_json_opt<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        let response = self.authed(self.http.get(url)).send().await?;
        let status = response.status();

        if !ok_status(status) {
            debug!(%url, %status, "GET returned non-success, treating as not found");
            return Ok(None);
        }

        response
            .json()
            .await
            .map(Some)
            .map_err(|e| Error::Parse(format!("failed to parse JSON response: {}", e)))
    }

    /// GET a plain-text resource; `Ok(None)` for any non-success status
    pub(crate) async fn get_text_opt(&self, url: &str) -> Result<Option<String>> {
        let response = self.authed(self.http.get(url)).send().await?;
        let status = response.status();

        if !ok_status(status) {
            debug!(%url, %status, "GET returned non-success, treating as not found");
            return Ok(None);
        }

        Ok(Some(response.text().await?))
    }

    /// POST without a body; status interpretation is the caller's business
    pub(crate) async fn post_raw(
        &self,
        url: &str,
        query: Option<&[(String, String)]>,
    ) -> Result<reqwest::Response> {
        let mut request = self.authed(self.http.post(url));
        if let Some(query) = query {
            request = request.query(query);
        }
        Ok(request.send().await?)
    }

    /// POST that must succeed; non-success surfaces as an API error
    pub(crate) async fn control_post(&self, url: &str) -> Result<()> {
        let response = self.post_raw(url, None).await?;
        let status = response.status();

        if !ok_status(status) {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::api_error(status.as_u16(), message));
        }

        Ok(())
    }

    /// HEAD probe for a resource's current byte length
    ///
    /// `Ok(None)` when the response is non-success or carries no
    /// `Content-Length` header.
    pub(crate) async fn head_content_length(&self, url: &str) -> Result<Option<u64>> {
        let response = self.authed(self.http.head(url)).send().await?;

        if !ok_status(response.status()) {
            return Ok(None);
        }

        Ok(response
            .headers()
            .get(reqwest::header::CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_trims_trailing_slash() {
        let client = ServerClient::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn endpoint_joins_relative_paths() {
        let client = ServerClient::new("http://localhost:8080");
        assert_eq!(
            client.endpoint("queue/api/json"),
            "http://localhost:8080/queue/api/json"
        );
        assert_eq!(
            client.endpoint("/queue/api/json"),
            "http://localhost:8080/queue/api/json"
        );
    }

    #[test]
    fn job_url_covers_both_locator_forms() {
        use hoist_core::domain::reference::JobLocator;

        let client = ServerClient::new("http://localhost:8080");
        assert_eq!(
            client.job_url(&JobLocator::Name("area/demo".into())),
            "http://localhost:8080/job/area/job/demo"
        );
        assert_eq!(
            client.job_url(&JobLocator::Url("http://elsewhere/job/x/".into())),
            "http://elsewhere/job/x"
        );
    }

    #[test]
    fn redirects_count_as_success() {
        assert!(ok_status(StatusCode::CREATED));
        assert!(ok_status(StatusCode::FOUND));
        assert!(!ok_status(StatusCode::NOT_FOUND));
    }
}
