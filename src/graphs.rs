//! Graph catalog - the declarative schema the agent renders metrics under.
//!
//! Built once at startup from the configured metric key prefix and the
//! durations flag, and read-only afterwards. The catalog is data-driven:
//! each graph is generated from a table of codes or field names rather than
//! spelled out entry by entry, and the percentile graphs are derived from
//! the same tables the extractor uses, so a name referenced here is always a
//! name [`crate::stats::extract`] can produce.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::stats::{DURATION_BASES, PERCENTILES};

/// Prefix used when the configured metric key prefix is empty.
pub const DEFAULT_PREFIX: &str = "h2o";

/// HTTP status codes the server counts error responses for.
const STATUS_ERROR_CODES: &[&str] = &[
    "400", "403", "404", "405", "416", "417", "500", "502", "503",
];

/// HTTP/2 protocol error kinds the server counts.
const HTTP2_ERROR_KINDS: &[&str] = &[
    "protocol",
    "internal",
    "flow-control",
    "settings-timeout",
    "stream-closed",
    "frame-size",
    "refused-stream",
    "cancel",
    "compression",
    "connect",
    "enhance-your-calm",
    "inadequate-security",
];

/// HTTP/2 stream-closure counters.
const HTTP2_STREAM_STATES: &[&str] = &["read-closed", "write-closed"];

/// Display unit for a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Integer,
    Float,
    Percentage,
    Bytes,
    #[serde(rename = "bytes/sec")]
    BytesPerSec,
    Iops,
}

/// One metric series within a graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSpec {
    /// Snapshot metric name this series is resolved against (exact match).
    pub name: String,

    /// Display label for the series.
    pub label: String,

    /// Whether the agent should diff consecutive values (cumulative
    /// counter) instead of reporting the value as a gauge.
    pub diff: bool,

    /// Whether the series is stacked on the graph.
    pub stacked: bool,
}

/// A named grouping of related metrics for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSpec {
    /// Display label, composed as `"<TitleCasedPrefix> <Graph Name>"`.
    pub label: String,

    /// Display unit for every series on the graph.
    pub unit: Unit,

    /// Series on the graph, in display order.
    pub metrics: Vec<MetricSpec>,
}

/// Build the graph catalog for a prefix and feature set.
///
/// An empty `prefix` falls back to [`DEFAULT_PREFIX`] before title-casing,
/// so the default label prefix is `"H2o"`. With `with_durations` set, one
/// graph per timing phase is added, carrying the five percentile series.
/// Deterministic: the same inputs always produce the same catalog.
pub fn build(prefix: &str, with_durations: bool) -> BTreeMap<String, GraphSpec> {
    let prefix = if prefix.is_empty() { DEFAULT_PREFIX } else { prefix };
    let label_prefix = title_case(prefix);

    let mut graphs = BTreeMap::new();

    graphs.insert(
        "status-errors".to_string(),
        GraphSpec {
            label: format!("{} Status Errors", label_prefix),
            unit: Unit::Integer,
            metrics: gauge_series("status-errors", STATUS_ERROR_CODES),
        },
    );
    graphs.insert(
        "http2-errors".to_string(),
        GraphSpec {
            label: format!("{} HTTP2 Errors", label_prefix),
            unit: Unit::Integer,
            metrics: gauge_series("http2-errors", HTTP2_ERROR_KINDS),
        },
    );
    graphs.insert(
        "http2".to_string(),
        GraphSpec {
            label: format!("{} HTTP2", label_prefix),
            unit: Unit::Integer,
            metrics: gauge_series("http2", HTTP2_STREAM_STATES),
        },
    );

    if with_durations {
        for &base in DURATION_BASES {
            graphs.insert(
                base.to_string(),
                GraphSpec {
                    label: format!("{} {}", label_prefix, title_case(&base.replace('-', " "))),
                    unit: Unit::Integer,
                    metrics: PERCENTILES
                        .iter()
                        .map(|&rank| MetricSpec {
                            name: format!("{}.{}", base, rank),
                            label: rank.to_string(),
                            diff: false,
                            stacked: false,
                        })
                        .collect(),
                },
            );
        }
    }

    graphs
}

/// Point-in-time gauge series named `<group>.<entry>`, labelled by entry.
fn gauge_series(group: &str, entries: &[&str]) -> Vec<MetricSpec> {
    entries
        .iter()
        .map(|&entry| MetricSpec {
            name: format!("{}.{}", group, entry),
            label: entry.to_string(),
            diff: false,
            stacked: false,
        })
        .collect()
}

/// Uppercase the first ASCII character of every whitespace- or
/// hyphen-delimited token. Locale-independent; every token is capitalized,
/// so `"my-h2o"` becomes `"My-H2o"`.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_boundary = true;
    for c in s.chars() {
        if c.is_whitespace() || c == '-' {
            at_boundary = true;
            out.push(c);
        } else if at_boundary {
            out.push(c.to_ascii_uppercase());
            at_boundary = false;
        } else {
            out.push(c);
        }
    }
    out
}
