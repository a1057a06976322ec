//! Error types for the plugin.

use thiserror::Error;

/// Errors that can occur while fetching or parsing server status.
#[derive(Debug, Error)]
pub enum PluginError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Response body is not a JSON object.
    #[error("failed to parse status response: {0}")]
    Parse(String),

    /// Authentication failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("request timed out")]
    Timeout,
}

impl From<reqwest::Error> for PluginError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PluginError::Timeout
        } else if err.is_connect() {
            PluginError::Connection(err.to_string())
        } else {
            PluginError::Http(err.to_string())
        }
    }
}
