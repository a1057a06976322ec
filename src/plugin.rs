//! H2O status plugin - fetches the status document and exposes the schema.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::error::PluginError;
use crate::graphs::{self, GraphSpec, DEFAULT_PREFIX};
use crate::snapshot::MetricsSnapshot;
use crate::stats;

/// Plugin for collecting metrics from an H2O server's status endpoint.
///
/// # Example
///
/// ```rust,no_run
/// use mackerel_plugin_h2o::H2oPlugin;
///
/// # tokio_test::block_on(async {
/// let plugin = H2oPlugin::builder()
///     .host("h2o.internal")
///     .port(8080)
///     .build();
///
/// let snapshot = plugin.fetch_metrics().await?;
/// for (name, value) in snapshot.iter() {
///     println!("{} = {}", name, value);
/// }
/// # Ok::<(), mackerel_plugin_h2o::PluginError>(())
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct H2oPlugin {
    client: Client,
    scheme: String,
    host: String,
    port: u16,
    path: String,
    basic_auth: Option<(String, String)>,
    prefix: String,
    with_durations: bool,
}

impl H2oPlugin {
    /// Create a new builder for configuring the plugin.
    pub fn builder() -> H2oPluginBuilder {
        H2oPluginBuilder::default()
    }

    /// URL of the status endpoint. Credentials are not embedded here; they
    /// are attached to the request itself.
    pub fn status_url(&self) -> String {
        format!("{}://{}:{}{}", self.scheme, self.host, self.port, self.path)
    }

    /// Metric key prefix under which the agent namespaces this plugin's
    /// metrics. Falls back to `h2o` when configured empty.
    pub fn metric_key_prefix(&self) -> &str {
        if self.prefix.is_empty() {
            DEFAULT_PREFIX
        } else {
            &self.prefix
        }
    }

    /// Graph catalog for the configured prefix and feature set.
    pub fn graph_definition(&self) -> BTreeMap<String, GraphSpec> {
        graphs::build(self.metric_key_prefix(), self.with_durations)
    }

    /// Fetch the status document once and extract a metrics snapshot.
    pub async fn fetch_metrics(&self) -> Result<MetricsSnapshot, PluginError> {
        let url = self.status_url();
        debug!(%url, "fetching server status");

        let mut request = self.client.get(&url);
        if let Some((user, pass)) = &self.basic_auth {
            request = request.basic_auth(user, Some(pass));
        }

        let response = request.send().await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PluginError::Auth("invalid credentials".to_string()));
        }

        if !response.status().is_success() {
            return Err(PluginError::Http(format!(
                "status endpoint returned {}",
                response.status()
            )));
        }

        let body = response.bytes().await?;
        let snapshot = stats::extract(&body)?;
        debug!(metrics = snapshot.len(), "extracted snapshot");

        Ok(snapshot)
    }
}

/// Builder for [`H2oPlugin`].
#[derive(Debug, Default)]
pub struct H2oPluginBuilder {
    scheme: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    path: Option<String>,
    basic_auth: Option<(String, String)>,
    prefix: Option<String>,
    with_durations: bool,
    timeout: Option<Duration>,
}

impl H2oPluginBuilder {
    /// Set the scheme (default: "http").
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    /// Set the host to poll (default: "127.0.0.1").
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the port (default: 80).
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the status endpoint path (default: "/server-status/json").
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set basic-auth credentials for the status endpoint.
    pub fn basic_auth(mut self, user: impl Into<String>, pass: impl Into<String>) -> Self {
        self.basic_auth = Some((user.into(), pass.into()));
        self
    }

    /// Set the metric key prefix (default: "h2o").
    pub fn metric_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Include the percentile duration graphs. Requires `duration-stats: ON`
    /// in h2o.conf for the server to report them.
    pub fn with_durations(mut self, enabled: bool) -> Self {
        self.with_durations = enabled;
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the plugin.
    pub fn build(self) -> H2oPlugin {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");

        H2oPlugin {
            client,
            scheme: self.scheme.unwrap_or_else(|| "http".to_string()),
            host: self.host.unwrap_or_else(|| "127.0.0.1".to_string()),
            port: self.port.unwrap_or(80),
            path: self
                .path
                .unwrap_or_else(|| "/server-status/json".to_string()),
            basic_auth: self.basic_auth,
            prefix: self.prefix.unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            with_durations: self.with_durations,
        }
    }
}
