//! # mackerel-plugin-h2o
//!
//! A [Mackerel](https://mackerel.io) agent plugin for the
//! [H2O](https://h2o.examp1e.net) web server. It polls the server's JSON
//! status endpoint (`/server-status/json`), extracts the numeric counters
//! and latency percentiles into a flat metrics snapshot, and declares the
//! graph schema the agent renders those metrics under.
//!
//! ## Architecture
//!
//! ```text
//! HTTP fetch ──▶ stats::extract ──▶ MetricsSnapshot ──▶ output (metric lines)
//!
//! (prefix, with_durations) ──▶ graphs::build ──▶ GraphCatalog ──▶ output (meta)
//! ```
//!
//! - **[`plugin`]**: the [`H2oPlugin`] collector - endpoint configuration
//!   via a builder, one fetch per poll
//! - **[`stats`]**: turns the raw status document into a snapshot - known
//!   fields pass through when numeric, percentile buckets are renamed from
//!   wire keys (`connect-time-99`) to dotted metric keys
//!   (`connect-time.99`), everything else is dropped without error
//! - **[`graphs`]**: the static graph catalog, built once at startup from
//!   the metric key prefix and the durations flag
//! - **[`output`]**: the agent-facing protocol on stdout
//!
//! Snapshots are ephemeral; every metric here is a gauge, so the agent has
//! no differencing state to keep for this plugin.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mackerel_plugin_h2o::H2oPlugin;
//!
//! # tokio_test::block_on(async {
//! let plugin = H2oPlugin::builder()
//!     .host("127.0.0.1")
//!     .port(8080)
//!     .with_durations(true)
//!     .build();
//!
//! let snapshot = plugin.fetch_metrics().await?;
//! let catalog = plugin.graph_definition();
//! # Ok::<(), mackerel_plugin_h2o::PluginError>(())
//! # });
//! ```

pub mod error;
pub mod graphs;
pub mod output;
pub mod plugin;
pub mod snapshot;
pub mod stats;

pub use error::PluginError;
pub use graphs::{GraphSpec, MetricSpec, Unit};
pub use plugin::{H2oPlugin, H2oPluginBuilder};
pub use snapshot::MetricsSnapshot;
