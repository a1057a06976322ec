//! Mackerel agent plugin protocol on stdout.
//!
//! The agent drives a plugin in two modes. With `MACKEREL_AGENT_PLUGIN_META`
//! set it expects a `# mackerel-agent-plugin` header followed by the graph
//! schema as JSON; otherwise it expects one tab-separated line per metric.
//! Both writers take a generic sink so tests can capture the output.

use std::collections::BTreeMap;
use std::io::{self, Write};

use serde::Serialize;

use crate::graphs::GraphSpec;
use crate::snapshot::MetricsSnapshot;

/// Environment variable the agent sets when it wants the graph schema.
pub const PLUGIN_META_ENV: &str = "MACKEREL_AGENT_PLUGIN_META";

#[derive(Serialize)]
struct PluginMeta<'a> {
    graphs: BTreeMap<String, &'a GraphSpec>,
}

/// Write the plugin meta block: header line plus the graph schema, with
/// every graph key namespaced under the metric key prefix.
pub fn write_graph_definition<W: Write>(
    out: &mut W,
    prefix: &str,
    catalog: &BTreeMap<String, GraphSpec>,
) -> io::Result<()> {
    let meta = PluginMeta {
        graphs: catalog
            .iter()
            .map(|(key, graph)| (format!("{}.{}", prefix, key), graph))
            .collect(),
    };

    writeln!(out, "# mackerel-agent-plugin")?;
    serde_json::to_writer(&mut *out, &meta)?;
    writeln!(out)?;
    Ok(())
}

/// Write one `<prefix>.<name>\t<value>\t<epoch>` line per metric.
///
/// Values print in shortest form: integral values carry no fractional part.
pub fn write_metrics<W: Write>(
    out: &mut W,
    prefix: &str,
    snapshot: &MetricsSnapshot,
    epoch: u64,
) -> io::Result<()> {
    for (name, value) in snapshot.iter() {
        writeln!(out, "{}.{}\t{}\t{}", prefix, name, value, epoch)?;
    }
    Ok(())
}
