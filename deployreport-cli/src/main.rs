mod config;
mod replay;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use config::ConfigMerger;
use deployreport_core::{FlushOutcome, ReportLifecycle};
use deployreport_types::ArtifactKind;
use serde::Serialize;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "deployreport",
    version,
    about = "Diffable report of the artifacts a build session installed or deployed."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replay a recorded host event stream into a deployment report.
    Replay(ReplayArgs),
    /// Print the kind and content summary of one artifact file.
    Inspect(InspectArgs),
}

#[derive(Debug, Parser)]
struct ReplayArgs {
    /// JSON-lines file with one host event per line.
    #[arg(long)]
    events: Utf8PathBuf,

    /// Report file. Takes precedence over -D and deployreport.toml.
    #[arg(long, env = "DEPLOYMENT_REPORTER_OUTPUT")]
    output: Option<Utf8PathBuf>,

    /// User property in key=value form (e.g. deployment-reporter.output=out.json).
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE")]
    define: Vec<String>,

    /// Worker threads for introspecting consecutive artifact events.
    #[arg(long, default_value_t = 1)]
    jobs: usize,

    /// Directory that relative artifact paths and deployreport.toml resolve against.
    #[arg(long, default_value = ".")]
    root: Utf8PathBuf,
}

#[derive(Debug, Parser)]
struct InspectArgs {
    /// Artifact file to summarize.
    file: Utf8PathBuf,
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{:?}", e);
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    // The log sink reports at info level, so default to it.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Replay(args) => cmd_replay(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn cmd_replay(args: ReplayArgs) -> anyhow::Result<()> {
    let root = args.root;

    let file_config =
        config::load_or_default(&root).context("load deployreport.toml config")?;
    let user = config::parse_cli_params(&args.define)?;
    let settings =
        ConfigMerger::new(file_config).merge_replay_args(args.output.as_deref(), &user);
    debug!(
        "resolved settings: output={:?}, label={:?}",
        settings.output, settings.log_label
    );

    let events = replay::read_events(&args.events)?;
    let lifecycle = ReportLifecycle::new(settings);
    let summary = replay::replay(&lifecycle, events, &root, args.jobs.max(1))?;
    debug!(
        "replayed {} events, {} artifacts",
        summary.events, summary.artifacts
    );

    // The lifecycle already reports written files; an empty session stays silent.
    if matches!(summary.flushed, Some(FlushOutcome::Skipped) | None) {
        debug!("no deployments recorded");
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct Inspection {
    file: Utf8PathBuf,
    kind: ArtifactKind,
    content: Option<deployreport_types::ContentSummary>,
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let kind = ArtifactKind::from_file_name(args.file.file_name().unwrap_or_default());
    let content = deployreport_introspect::summarize(&args.file)
        .with_context(|| format!("inspect {}", args.file))?;

    let inspection = Inspection {
        file: args.file,
        kind,
        content,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&inspection).context("render inspection")?
    );
    Ok(())
}
