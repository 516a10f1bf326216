use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use log::info;

use crate::models::{AggregateRow, ReportSummary};
use crate::reports::{
    aggregate, ensure_reports_dir, latest_report, list_reports, save_results, summarize_report,
    MalformedPolicy, DEFAULT_REPORTS_DIR,
};
use crate::runner::run_tests_seeded;
use crate::sensing::sensor::device_metadata;
use crate::settings::{RunSettings, SettingsStore};

#[derive(Debug, Parser)]
#[command(
    name = "vdats",
    about = "Run simulated sensor tests and summarise historical reports",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Execute a test run and save its report.
    Run(RunArgs),

    /// Summarise every report in the reports directory.
    Aggregate(AggregateArgs),

    /// List report files, newest first.
    List(ReportsDirArgs),

    /// Show KPIs for one report (the latest when no file is given).
    Show(ShowArgs),

    /// Write a settings file with default values.
    #[command(name = "init-config")]
    InitConfig { path: PathBuf },
}

#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// JSON settings file; flags below override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Number of test iterations.
    #[arg(short = 'n', long)]
    pub iterations: Option<usize>,
    /// RNG seed for a reproducible run.
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long)]
    pub spec_min: Option<f64>,
    #[arg(long)]
    pub spec_max: Option<f64>,
    #[arg(long)]
    pub min_temp: Option<f64>,
    #[arg(long)]
    pub max_temp: Option<f64>,
    #[arg(long)]
    pub fail_rate: Option<f64>,
    #[arg(long)]
    pub reports_dir: Option<PathBuf>,
}

impl RunArgs {
    fn resolve(&self) -> Result<RunSettings> {
        let mut settings = match &self.config {
            Some(path) => SettingsStore::load(path)?,
            None => RunSettings::default(),
        };
        if let Some(iterations) = self.iterations {
            settings.iterations = iterations;
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }
        if let Some(v) = self.spec_min {
            settings.spec_min = v;
        }
        if let Some(v) = self.spec_max {
            settings.spec_max = v;
        }
        if let Some(v) = self.min_temp {
            settings.sensor.min_temp = v;
        }
        if let Some(v) = self.max_temp {
            settings.sensor.max_temp = v;
        }
        if let Some(v) = self.fail_rate {
            settings.sensor.fail_rate = v;
        }
        if let Some(dir) = &self.reports_dir {
            settings.reports_dir = dir.clone();
        }
        Ok(settings)
    }
}

#[derive(Debug, Args)]
pub struct ReportsDirArgs {
    #[arg(long, default_value = DEFAULT_REPORTS_DIR)]
    pub reports_dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct AggregateArgs {
    #[arg(long, default_value = DEFAULT_REPORTS_DIR)]
    pub reports_dir: PathBuf,
    /// Emit JSON instead of a Markdown table.
    #[arg(long)]
    pub json: bool,
    /// Leave unreadable reports out instead of failing.
    #[arg(long)]
    pub skip_malformed: bool,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub file: Option<PathBuf>,
    #[arg(long, default_value = DEFAULT_REPORTS_DIR)]
    pub reports_dir: PathBuf,
    #[arg(long)]
    pub json: bool,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run_command(&args).map(|_| ()),
        Commands::Aggregate(args) => aggregate_command(&args),
        Commands::List(args) => {
            for path in list_reports(&args.reports_dir)? {
                println!("{}", path.display());
            }
            Ok(())
        }
        Commands::Show(args) => show_command(&args),
        Commands::InitConfig { path } => init_config(&path),
    }
}

/// Returns the saved report's path.
pub fn run_command(args: &RunArgs) -> Result<PathBuf> {
    let settings = args.resolve()?;
    let plan = settings.plan()?;

    ensure_reports_dir(&settings.reports_dir)?;

    let meta = device_metadata(Utc::now());
    info!(
        "device {} ({}) at {}, seed {:?}",
        meta.device_id, meta.model, meta.timestamp, settings.seed
    );

    let outcome = run_tests_seeded(&plan, settings.seed)?;
    let path = save_results(&settings.reports_dir, &outcome.records)?;

    println!("Saved: {}", path.display());
    println!(
        "{} tests: {} passed, {} failed",
        outcome.records.len(),
        outcome.passed(),
        outcome.failed()
    );
    Ok(path)
}

fn aggregate_command(args: &AggregateArgs) -> Result<()> {
    let policy = if args.skip_malformed {
        MalformedPolicy::Skip
    } else {
        MalformedPolicy::Abort
    };
    let rows = aggregate(&args.reports_dir, policy)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print!("{}", render_markdown(&rows));
    }
    Ok(())
}

fn show_command(args: &ShowArgs) -> Result<()> {
    let path = match &args.file {
        Some(file) => file.clone(),
        None => match latest_report(&args.reports_dir)? {
            Some(path) => path,
            None => bail!("no reports found in {}", args.reports_dir.display()),
        },
    };
    let summary = summarize_report(&path)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", render_summary(&summary));
    }
    Ok(())
}

fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("refusing to overwrite existing {}", path.display());
    }
    SettingsStore::save(path, &RunSettings::default())?;
    println!("Wrote default settings to {}", path.display());
    Ok(())
}

/// Pipe table with columns `file | ts | total | passed | failed`.
pub fn render_markdown(rows: &[AggregateRow]) -> String {
    let header = ["file", "ts", "total", "passed", "failed"];
    let cells: Vec<[String; 5]> = rows
        .iter()
        .map(|row| {
            [
                row.file.display().to_string(),
                row.ts.clone(),
                row.total.to_string(),
                row.passed.to_string(),
                row.failed.to_string(),
            ]
        })
        .collect();

    let mut widths = header.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let line = |cols: Vec<String>| format!("| {} |\n", cols.join(" | "));

    // text columns left-aligned, counts right-aligned
    out.push_str(&line(
        header
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (h, w))| {
                if i < 2 {
                    format!("{h:<w$}")
                } else {
                    format!("{h:>w$}")
                }
            })
            .collect(),
    ));
    out.push_str(&line(
        widths
            .iter()
            .enumerate()
            .map(|(i, w)| {
                if i < 2 {
                    format!(":{}", "-".repeat(w - 1))
                } else {
                    format!("{}:", "-".repeat(w - 1))
                }
            })
            .collect(),
    ));
    for row in &cells {
        out.push_str(&line(
            row.iter()
                .zip(widths)
                .enumerate()
                .map(|(i, (c, w))| {
                    if i < 2 {
                        format!("{c:<w$}")
                    } else {
                        format!("{c:>w$}")
                    }
                })
                .collect(),
        ));
    }
    out
}

pub fn render_summary(summary: &ReportSummary) -> String {
    let fmt_reading =
        |v: Option<f64>| v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string());
    format!(
        "Report:     {}\nTotal:      {}\nPass Rate:  {}\nPassed:     {}\nFailed:     {}\nReadings:   min {} / max {} / mean {}\nLast timestamp: {}\n",
        summary.file.display(),
        summary.total,
        summary.pass_rate,
        summary.passed,
        summary.failed,
        fmt_reading(summary.reading_min),
        fmt_reading(summary.reading_max),
        fmt_reading(summary.reading_mean),
        summary.last_timestamp.as_deref().unwrap_or("-"),
    )
}
