//! Configuration module
//!
//! Holds the server connection settings gathered from flags and
//! environment variables.

use hoist_client::ServerClient;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the build server
    pub server_url: String,
    /// API username, when the server requires auth
    pub user: Option<String>,
    /// API token or password
    pub token: Option<String>,
}

impl Config {
    /// Build a client for the configured server
    pub fn client(&self) -> ServerClient {
        match (&self.user, &self.token) {
            (Some(user), Some(token)) => {
                ServerClient::with_credentials(&self.server_url, user, token)
            }
            _ => ServerClient::new(&self.server_url),
        }
    }
}
