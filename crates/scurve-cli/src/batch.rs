//! Batch processing
//!
//! Files are processed one after another, each into its own report. A file
//! that fails is recorded with its error and never stops the rest of the
//! batch. Every report is kept, even when two files carry the same project
//! name.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::NaiveDate;
use scurve_core::{ClientData, CompiledRules, ProcessContext};
use scurve_solver::build_report;
use tracing::{info, warn};

use crate::exit::ExitCode;

/// Reports and failures of one batch, in input order
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub reports: Vec<(PathBuf, ClientData)>,
    pub failures: Vec<(PathBuf, anyhow::Error)>,
}

impl BatchOutcome {
    /// Add a report, warning when its project name is already taken
    fn push_report(&mut self, path: PathBuf, report: ClientData) {
        if let Some((previous, _)) = self.reports.iter().find(|(_, r)| r.name == report.name) {
            warn!(
                project = %report.name,
                previous = %previous.display(),
                file = %path.display(),
                "duplicate project name in batch"
            );
        }
        self.reports.push((path, report));
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from_report_count(self.reports.len())
    }
}

/// Read, extract and analyze one file
pub fn process_file(
    path: &Path,
    rules: &CompiledRules,
    ctx: &ProcessContext,
) -> Result<ClientData> {
    let sheet = scurve_parser::parse_file(path)?;
    let report = build_report(&sheet, rules, ctx)?;
    Ok(report)
}

/// Process every file, isolating failures
pub fn process_batch(paths: &[PathBuf], rules: &CompiledRules, today: NaiveDate) -> BatchOutcome {
    let ctx = ProcessContext::new(today);
    let mut outcome = BatchOutcome::default();

    for path in paths {
        match process_file(path, rules, &ctx) {
            Ok(report) => outcome.push_report(path.clone(), report),
            Err(err) => {
                warn!(file = %path.display(), error = %err, "file failed");
                outcome.failures.push((path.clone(), err));
            }
        }
    }

    info!(
        succeeded = outcome.reports.len(),
        failed = outcome.failures.len(),
        "batch finished"
    );
    outcome
}
