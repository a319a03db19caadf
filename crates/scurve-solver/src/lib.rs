//! # scurve-solver
//!
//! Turns an extracted [`TaskSheet`] into a finished [`ClientData`] report.
//!
//! This crate provides:
//! - Phase/task classification and parent-chain resolution ([`hierarchy`])
//! - Go-live detection from phase names
//! - Monthly cumulative planned vs. realized curves ([`aggregate`])
//! - Go-live and final KPIs
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use scurve_core::{Analyzer, ProcessContext, TaskRecord, TaskSheet};
//! use scurve_solver::ScurveSolver;
//!
//! let date = |m, d| NaiveDate::from_ymd_opt(2026, m, d).unwrap();
//!
//! let mut sheet = TaskSheet::new("Fazenda Boa Vista");
//! sheet.records = vec![
//!     TaskRecord::new("p1", "Fase 1 - Go-Live").starts(date(2, 1)),
//!     TaskRecord::new("t1", "Instalação").parent("p1").status("CONCLUÍDO").due(date(1, 20)),
//!     TaskRecord::new("t2", "Treinamento").parent("p1").due(date(2, 10)),
//! ];
//!
//! let report = ScurveSolver::new()
//!     .analyze(&sheet, &ProcessContext::new(date(3, 1)))
//!     .unwrap();
//!
//! assert_eq!(report.s_curve_data_percent.len(), 2);
//! assert_eq!(report.go_live_index, 1);
//! assert_eq!(report.project_kpis.final_realized, 50.0);
//! ```

pub mod aggregate;
pub mod hierarchy;

pub use aggregate::{build_s_curve, compute_kpis, SCurve};
pub use hierarchy::{Hierarchy, WorkTask};

use scurve_core::dates::display_date;
use scurve_core::{
    Analyzer, ClientData, CompiledRules, ProcessContext, ReportError, Rules, TaskSheet,
};
use tracing::info;
use uuid::Uuid;

/// Report builder driven by a [`Rules`] table
#[derive(Clone, Debug, Default)]
pub struct ScurveSolver {
    pub rules: Rules,
}

impl ScurveSolver {
    /// Solver with the built-in rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Solver with custom rules
    pub fn with_rules(rules: Rules) -> Self {
        Self { rules }
    }
}

impl Analyzer for ScurveSolver {
    fn analyze(&self, sheet: &TaskSheet, ctx: &ProcessContext) -> Result<ClientData, ReportError> {
        let rules = self.rules.compile()?;
        build_report(sheet, &rules, ctx)
    }
}

/// Build the report for one sheet with already compiled rules
pub fn build_report(
    sheet: &TaskSheet,
    rules: &CompiledRules,
    ctx: &ProcessContext,
) -> Result<ClientData, ReportError> {
    let hierarchy = Hierarchy::build(sheet, rules);
    let go_live = hierarchy.go_live();

    let curve = build_s_curve(hierarchy.tasks(), go_live)?;
    let kpis = compute_kpis(hierarchy.tasks(), go_live);

    info!(
        project = %sheet.project_name,
        tasks = kpis.total_tasks,
        completed = kpis.completed_tasks,
        months = curve.points.len(),
        "built report"
    );

    Ok(ClientData {
        id: Uuid::new_v4().to_string(),
        name: sheet.project_name.clone(),
        location: ClientData::IMPORTED_LOCATION.to_string(),
        last_updated: display_date(ctx.today),
        go_live_date: go_live,
        go_live_date_formatted: go_live
            .map_or_else(|| ClientData::UNDEFINED_GO_LIVE.to_string(), display_date),
        go_live_index: curve.go_live_index,
        project_start_date: display_date(curve.start),
        project_end_date: display_date(curve.end),
        total_tasks: kpis.total_tasks,
        s_curve_data_percent: curve.points,
        project_phases: hierarchy.into_phases(),
        project_kpis: kpis,
    })
}
