use std::io;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mackerel_plugin_h2o::{output, H2oPlugin};

#[derive(Parser, Debug)]
#[command(name = "mackerel-plugin-h2o")]
#[command(about = "Mackerel agent plugin for H2O web server status metrics")]
struct Args {
    /// Hostname of the H2O server
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Scheme to reach the status endpoint with
    #[arg(long, default_value = "http")]
    scheme: String,

    /// Port of the H2O server
    #[arg(long, default_value_t = 80)]
    port: u16,

    /// Path of the JSON status endpoint
    #[arg(long, default_value = "/server-status/json")]
    path: String,

    /// Basic auth credentials as user:pass
    #[arg(long, default_value = "")]
    basic_auth: String,

    /// Report percentile duration graphs (requires duration-stats: ON in h2o.conf)
    #[arg(long)]
    with_durations: bool,

    /// Metric key prefix
    #[arg(long, default_value = "h2o")]
    metric_key_prefix: String,

    /// Temp file name, accepted for agent compatibility (unused; every
    /// metric is a gauge, so there is no differencing state to cache)
    #[arg(long)]
    tempfile: Option<PathBuf>,
}

fn main() -> Result<()> {
    // stdout is the agent protocol; diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    if let Some(tempfile) = &args.tempfile {
        tracing::debug!(tempfile = %tempfile.display(), "tempfile accepted but unused");
    }

    let mut builder = H2oPlugin::builder()
        .scheme(&args.scheme)
        .host(&args.host)
        .port(args.port)
        .path(&args.path)
        .metric_key_prefix(&args.metric_key_prefix)
        .with_durations(args.with_durations);

    if !args.basic_auth.is_empty() {
        let Some((user, pass)) = args.basic_auth.split_once(':') else {
            bail!("--basic-auth must be user:pass");
        };
        builder = builder.basic_auth(user, pass);
    }

    let plugin = builder.build();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    // Schema mode: the agent asks for graph definitions once at startup
    if std::env::var(output::PLUGIN_META_ENV).is_ok_and(|v| !v.is_empty()) {
        output::write_graph_definition(
            &mut out,
            plugin.metric_key_prefix(),
            &plugin.graph_definition(),
        )?;
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    let snapshot = runtime
        .block_on(plugin.fetch_metrics())
        .context("failed to fetch server status")?;

    let epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    output::write_metrics(&mut out, plugin.metric_key_prefix(), &snapshot, epoch)?;

    Ok(())
}
