mod config;
mod progress;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Parser;
use config::{CliOverrides, ConfigMerger};
use dtpfix_core::adapters::FsWritePort;
use dtpfix_core::pipeline::{ToolError, run_reconcile, write_run_artifacts};
use dtpfix_types::report::ToolInfo;
use fs_err as fs;
use progress::BarProgress;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "dtpfix",
    version,
    about = "Reconcile as-planned element nodes of a digital-twin graph."
)]
struct Cli {
    /// Record graph mutations instead of applying them.
    #[arg(short = 's', long, default_value_t = false)]
    simulation: bool,

    /// Directory for run logs (created if missing).
    #[arg(short = 'l', long)]
    log_dir: Utf8PathBuf,

    /// Tool config file (default: ./dtpfix.toml when present).
    #[arg(long)]
    config: Option<Utf8PathBuf>,

    /// XML ontology config (default: DTP_API/DTP_config.xml).
    #[arg(long)]
    ontology_config: Option<Utf8PathBuf>,

    /// YAML class mapping (default: ontology_map.yaml).
    #[arg(long)]
    mapping: Option<Utf8PathBuf>,

    /// JSON graph snapshot (default: dtp_graph.json).
    #[arg(long)]
    graph: Option<Utf8PathBuf>,

    /// Element nodes per fetched page.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    page_size: Option<u64>,

    /// Hide the progress bar.
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{e}");
        return ExitCode::from(e.exit_code());
    }
    ExitCode::from(0)
}

fn real_main() -> Result<(), ToolError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    fs::create_dir_all(&cli.log_dir).with_context(|| format!("create {}", cli.log_dir))?;

    let file_config = match &cli.config {
        Some(path) => config::load_config(path),
        None => config::load_or_default(&Utf8PathBuf::from(".")),
    }
    .context("load dtpfix.toml config")?;

    let page_size = cli
        .page_size
        .map(usize::try_from)
        .transpose()
        .context("page size out of range")?;
    let overrides = CliOverrides {
        ontology_config: cli.ontology_config,
        mapping: cli.mapping,
        graph: cli.graph,
        page_size,
        simulation: cli.simulation,
    };
    let settings = ConfigMerger::new(file_config).merge_run_args(overrides, cli.log_dir);
    debug!("merged settings: {:?}", settings);

    if settings.simulation {
        println!("Running in the simulator mode.");
    }

    let progress = BarProgress::new(cli.quiet, settings.simulation);
    let outcome = run_reconcile(&settings, &progress, tool_info())?;
    if progress.failed() > 0 {
        warn!("{} node update(s) failed; see reconcile.json", progress.failed());
    }

    write_run_artifacts(&outcome, &settings.log_dir, &FsWritePort)
        .context("write run artifacts")?;
    info!("wrote run log to {}", settings.log_dir);

    println!("Number of updated element {}", outcome.updated());
    Ok(())
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "dtpfix".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}
