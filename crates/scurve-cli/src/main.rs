//! scurve CLI - S-curve progress reports
//!
//! Command-line interface for turning ClickUp spreadsheet exports into
//! monthly planned vs. realized progress reports.

mod batch;
mod exit;

use std::collections::HashMap;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use scurve_core::dates::display_date;
use scurve_core::{ClientData, CompiledRules, ProcessContext, Renderer, Rules};
use scurve_render::{ExcelRenderer, JsonRenderer, TextRenderer};
use scurve_solver::Hierarchy;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::batch::{process_batch, BatchOutcome};
use crate::exit::ExitCode;

#[derive(Parser)]
#[command(name = "scurve")]
#[command(author, version, long_about = None)]
#[command(about = "S-curve progress reports from ClickUp exports")]
struct Cli {
    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build progress reports from one or more exports
    Report {
        /// Exported workbooks (.xlsx, .xls, ...)
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Output file, or directory for xlsx with several reports (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// TOML file overriding the built-in rules
        #[arg(long, value_name = "FILE", env = "SCURVE_RULES")]
        rules: Option<PathBuf>,
    },

    /// Extract an export and summarize what was found
    Check {
        /// Exported workbook
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// TOML file overriding the built-in rules
        #[arg(long, value_name = "FILE", env = "SCURVE_RULES")]
        rules: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Xlsx,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Report {
            files,
            format,
            output,
            rules,
        } => cmd_report(&files, format, output.as_deref(), rules.as_deref()),
        Commands::Check { file, rules } => cmd_check(&file, rules.as_deref()),
    };

    match result {
        Ok(code) => code.into(),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::Failure.into()
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_rules(path: Option<&Path>) -> Result<CompiledRules> {
    let rules = match path {
        Some(path) => Rules::load(path)
            .with_context(|| format!("failed to load rules from {}", path.display()))?,
        None => Rules::default(),
    };
    Ok(rules.compile()?)
}

// ============================================================================
// report
// ============================================================================

fn cmd_report(
    files: &[PathBuf],
    format: OutputFormat,
    output: Option<&Path>,
    rules: Option<&Path>,
) -> Result<ExitCode> {
    let rules = load_rules(rules)?;
    let outcome = process_batch(files, &rules, ProcessContext::now().today);

    for (path, err) in &outcome.failures {
        eprintln!("error: {}: {err:#}", path.display());
    }

    if !outcome.reports.is_empty() {
        write_reports(&outcome, format, output)?;
    }
    Ok(outcome.exit_code())
}

fn write_reports(
    outcome: &BatchOutcome,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let reports: Vec<ClientData> = outcome.reports.iter().map(|(_, r)| r.clone()).collect();

    match format {
        OutputFormat::Text => {
            let renderer = TextRenderer::new();
            let rendered = reports
                .iter()
                .map(|r| renderer.render(r))
                .collect::<Result<Vec<_>, _>>()?;
            write_text(&rendered.join("\n"), output)
        }
        OutputFormat::Json => {
            let json = JsonRenderer::new().render_all(&reports)?;
            write_text(&(json + "\n"), output)
        }
        OutputFormat::Xlsx => write_workbooks(&reports, output),
    }
}

fn write_text(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes()).context("failed to write to stdout")
        }
    }
}

/// One workbook per report: into `output` when it is a directory, to
/// `output` itself for a single report, or `<name>.xlsx` in the working
/// directory.
fn write_workbooks(reports: &[ClientData], output: Option<&Path>) -> Result<()> {
    let renderer = ExcelRenderer::new();
    let targets: Vec<PathBuf> = match (output, reports) {
        (Some(dir), _) if dir.is_dir() => {
            unique_stems(reports.iter().map(|r| r.name.as_str()))
                .into_iter()
                .map(|stem| dir.join(format!("{stem}.xlsx")))
                .collect()
        }
        (Some(path), [_]) => vec![path.to_path_buf()],
        (None, [report]) => vec![PathBuf::from(format!("{}.xlsx", file_stem_for(&report.name)))],
        _ => bail!(
            "xlsx output of {} reports needs --output pointing at an existing directory",
            reports.len()
        ),
    };

    for (report, target) in reports.iter().zip(&targets) {
        let bytes = renderer.render(report)?;
        fs::write(target, bytes).with_context(|| format!("failed to write {}", target.display()))?;
        println!("{}", target.display());
    }
    Ok(())
}

/// File-system safe version of a project name
fn file_stem_for(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim().trim_matches('.');
    if stem.is_empty() {
        "relatorio".to_string()
    } else {
        stem.to_string()
    }
}

/// File stems for a batch; repeated project names get `" (2)"`, `" (3)"`, ...
fn unique_stems<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    names
        .into_iter()
        .map(|name| {
            let stem = file_stem_for(name);
            let count = seen.entry(stem.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                stem
            } else {
                format!("{stem} ({count})")
            }
        })
        .collect()
}

// ============================================================================
// check
// ============================================================================

fn cmd_check(file: &Path, rules: Option<&Path>) -> Result<ExitCode> {
    let rules = load_rules(rules)?;
    let sheet = scurve_parser::parse_file(file).with_context(|| file.display().to_string())?;
    let hierarchy = Hierarchy::build(&sheet, &rules);

    let dated = hierarchy.tasks().iter().filter(|t| t.due_date.is_some()).count();
    let go_live = hierarchy
        .go_live()
        .map_or_else(|| ClientData::UNDEFINED_GO_LIVE.to_string(), display_date);

    println!("Project: {}", sheet.project_name);
    println!("Records: {}", sheet.records.len());
    println!("Phases: {}", hierarchy.phases().len());
    println!("Tasks: {} ({dated} with due date)", hierarchy.tasks().len());
    println!("Go live: {go_live}");
    Ok(ExitCode::Success)
}
