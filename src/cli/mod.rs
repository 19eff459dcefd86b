//! # CLI
//!
//! `petcheck run` executes the scenario suite against the configured service
//! and exits non-zero when any scenario fails, so it can gate CI jobs.
//! `petcheck list` and `petcheck history` inspect scenarios and past runs.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::environment::Settings;
use crate::storage;
use crate::testing::{Context, RunReport, Scenario, run_suite};

#[derive(Debug, Parser)]
#[command(name = "petcheck", version, about = "Black-box checks for the PetFriends API")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run scenarios against the service.
    Run(RunArgs),
    /// List available scenarios.
    List,
    /// Show stored runs.
    History(HistoryArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Settings file (defaults to ./petcheck.json when present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Named environment from the settings file.
    #[arg(long = "env")]
    pub environment: Option<String>,

    /// Run only these scenarios (repeatable); suite order is kept.
    #[arg(long = "only", value_name = "SCENARIO")]
    pub only: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also write the rendered report to this file.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Directory holding the run database.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Do not record this run in the database.
    #[arg(long)]
    pub no_store: bool,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    /// Print the full report of one stored run.
    #[arg(long, value_name = "RUN_ID")]
    pub show: Option<i64>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub async fn execute(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Run(args) => run(args).await,
        Command::List => {
            print!("{}", render_scenario_list());
            Ok(ExitCode::SUCCESS)
        }
        Command::History(args) => history(args),
    }
}

async fn run(args: RunArgs) -> anyhow::Result<ExitCode> {
    let scenarios = select_scenarios(&args.only)?;
    let settings = Settings::load(args.config.as_deref(), args.environment.as_deref())
        .context("failed to load settings")?;
    let ctx = Context::new(settings).context("failed to create API client")?;

    info!(base_url = %ctx.client.base_url(), scenarios = scenarios.len(), "starting run");
    let report = run_suite(&ctx, &scenarios).await;

    let rendered = render_report(&report, args.format)?;
    print!("{rendered}");

    if let Some(path) = &args.report {
        storage::write_report(path, &rendered)?;
    }

    if !args.no_store {
        let data_dir = args.data_dir.unwrap_or_else(storage::default_data_dir);
        let conn = storage::open_db(&data_dir)?;
        let id = storage::insert_run(&conn, &report)?;
        info!(run_id = id, data_dir = %data_dir.display(), "run stored");
    }

    Ok(if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn history(args: HistoryArgs) -> anyhow::Result<ExitCode> {
    let data_dir = args.data_dir.unwrap_or_else(storage::default_data_dir);
    let conn = storage::open_db(&data_dir)?;

    if let Some(id) = args.show {
        let Some(report) = storage::load_report(&conn, id)? else {
            bail!("no stored run with id {id}");
        };
        print!("{}", render_report(&report, args.format)?);
        return Ok(ExitCode::SUCCESS);
    }

    let runs = storage::recent_runs(&conn, args.limit)?;
    if runs.is_empty() {
        println!("no stored runs in {}", data_dir.display());
    }
    for run in runs {
        println!(
            "#{:<4} started {} env {:<8} {}/{} passed, {} ms",
            run.id,
            run.started_at,
            run.environment.as_deref().unwrap_or("-"),
            run.passed,
            run.total,
            run.duration_ms
        );
    }
    Ok(ExitCode::SUCCESS)
}

/// Resolve scenario names, keeping suite order. No names means the whole suite.
pub fn select_scenarios(names: &[String]) -> anyhow::Result<Vec<Scenario>> {
    if names.is_empty() {
        return Ok(Scenario::ALL.to_vec());
    }

    let mut selected = Vec::new();
    for name in names {
        match Scenario::from_name(name) {
            Some(scenario) => selected.push(scenario),
            None => bail!("unknown scenario `{name}` (see `petcheck list`)"),
        }
    }

    Ok(Scenario::ALL
        .into_iter()
        .filter(|scenario| selected.contains(scenario))
        .collect())
}

pub fn render_report(report: &RunReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(report.render_text()),
        OutputFormat::Json => {
            let mut json = report.to_json().context("failed to encode report")?;
            json.push('\n');
            Ok(json)
        }
    }
}

fn render_scenario_list() -> String {
    Scenario::ALL
        .iter()
        .map(|scenario| format!("{:<40} {:<9} {}\n", scenario.name(), scenario.kind(), scenario.summary()))
        .collect()
}
