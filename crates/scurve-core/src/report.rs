//! Project progress report
//!
//! The report answers "how far along is this implementation, month by month,
//! and where does it stand at go-live?". It is computed once per input file
//! and never mutated afterwards.
//!
//! # Core Concepts
//!
//! - **ClientData**: the whole report for one file
//! - **SCurveDataPoint**: one month of cumulative planned vs. realized progress
//! - **ProjectPhase**: a top-level phase with its date range and sub-processes
//! - **ProjectKpis**: scalars derived from the full task set and the go-live date
//!
//! Field names serialize in camelCase (`sCurveDataPercent`, `projectKPIs`, ...),
//! the shape the dashboard front end consumes.
//!
//! # Example
//!
//! ```rust
//! use scurve_core::report::percent;
//!
//! assert_eq!(percent(6, 10, 1), 60.0);
//! assert_eq!(percent(1, 3, 2), 33.33);
//! assert_eq!(percent(2, 3, 1), 66.7);
//! ```

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

// ============================================================================
// Percentages
// ============================================================================

/// `part / total * 100`, rounded half away from zero to `decimals` places.
///
/// Returns 0 when `total` is 0.
pub fn percent(part: usize, total: usize, decimals: u32) -> f64 {
    to_f64(percent_decimal(part, total, decimals))
}

/// Exact-decimal form of [`percent`]
pub fn percent_decimal(part: usize, total: usize, decimals: u32) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    let ratio = Decimal::from(part as u64) * Decimal::ONE_HUNDRED / Decimal::from(total as u64);
    round(ratio, decimals)
}

/// Round half away from zero
pub fn round(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
}

/// Lossy conversion for the serialized report
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

// ============================================================================
// Phases
// ============================================================================

/// Display state of a phase
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseStatus {
    #[serde(rename = "Concluído")]
    Concluido,
    #[default]
    #[serde(rename = "Em Andamento")]
    EmAndamento,
    #[serde(rename = "Nova")]
    Nova,
}

impl PhaseStatus {
    /// Get the display string for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseStatus::Concluido => "Concluído",
            PhaseStatus::EmAndamento => "Em Andamento",
            PhaseStatus::Nova => "Nova",
        }
    }
}

impl std::fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A top-level phase of the project
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPhase {
    /// Task ID of the phase row
    pub id: String,
    /// Phase name with project/site prefixes removed
    pub name: String,
    /// First month, `"YYYY-MM"`, or empty when unknown
    pub start: String,
    /// Last month, `"YYYY-MM"`, or empty when unknown
    pub end: String,
    pub status: PhaseStatus,
    /// Display names of the phase's direct children, deduplicated, in sheet order
    pub sub_processes: Vec<String>,
}

impl ProjectPhase {
    pub fn new(id: impl Into<String>, name: impl Into<String>, status: PhaseStatus) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            start: String::new(),
            end: String::new(),
            status,
            sub_processes: Vec::new(),
        }
    }

    /// Append a sub-process unless it is empty or already listed
    pub fn add_sub_process(&mut self, name: &str) -> bool {
        if name.is_empty() || self.sub_processes.iter().any(|s| s == name) {
            return false;
        }
        self.sub_processes.push(name.to_string());
        true
    }
}

// ============================================================================
// S-Curve
// ============================================================================

/// One calendar month of the S-curve
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SCurveDataPoint {
    /// `"Mon/YY"` label
    pub date: String,
    /// Same label; both names are part of the front-end contract
    pub month: String,
    /// Percentage (0-100, 1 decimal) of all tasks due by month end
    pub planned_cumulative: f64,
    /// Percentage (0-100, 1 decimal) of all tasks completed by month end
    pub realized_cumulative: f64,
    pub planned_tasks: usize,
    pub realized_tasks: usize,
    pub is_go_live_month: bool,
}

impl SCurveDataPoint {
    /// Realized minus planned, 2 decimals. Positive means ahead of plan.
    pub fn variance(&self) -> f64 {
        let realized = Decimal::try_from(self.realized_cumulative).unwrap_or_default();
        let planned = Decimal::try_from(self.planned_cumulative).unwrap_or_default();
        to_f64(round(realized - planned, 2))
    }
}

/// Position of a month relative to go-live
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonthRole {
    BeforeGoLive,
    GoLive,
    AfterGoLive,
}

// ============================================================================
// KPIs
// ============================================================================

/// Aggregate scalars of the report
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectKpis {
    /// Task rows (phases excluded)
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// `completed / total * 100`, 2 decimals
    pub completion_rate: f64,
    /// Percentage of tasks due by the go-live date, 1 decimal; 0 without go-live
    pub planned_at_go_live: f64,
    /// Percentage of tasks done by the go-live date, 1 decimal; 0 without go-live
    pub realized_at_go_live: f64,
    /// Always 100
    pub final_planned: f64,
    /// Same as `completion_rate`
    pub final_realized: f64,
    /// `final_realized - 100`, 1 decimal, never positive
    pub variance: f64,
}

// ============================================================================
// Report
// ============================================================================

/// Complete report for one processed file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientData {
    /// Random identity (UUID v4), unique per processing run
    pub id: String,
    /// Project display name
    pub name: String,
    pub location: String,
    /// Processing date, `"DD/MM/YYYY"`
    pub last_updated: String,
    pub go_live_date: Option<NaiveDate>,
    /// `"DD/MM/YYYY"`, or `"Não definido"` without go-live
    pub go_live_date_formatted: String,
    /// Index of the go-live month in `s_curve_data_percent`
    pub go_live_index: usize,
    /// Earliest due date, `"DD/MM/YYYY"`
    pub project_start_date: String,
    /// Latest due date, `"DD/MM/YYYY"`
    pub project_end_date: String,
    pub total_tasks: usize,
    pub s_curve_data_percent: Vec<SCurveDataPoint>,
    pub project_phases: Vec<ProjectPhase>,
    #[serde(rename = "projectKPIs")]
    pub project_kpis: ProjectKpis,
}

impl ClientData {
    /// Location shown for every imported project
    pub const IMPORTED_LOCATION: &'static str = "Importado via Excel";

    /// Go-live display text when no go-live phase was found
    pub const UNDEFINED_GO_LIVE: &'static str = "Não definido";

    /// Where the month at `index` sits relative to go-live
    pub fn month_role(&self, index: usize) -> MonthRole {
        match index.cmp(&self.go_live_index) {
            std::cmp::Ordering::Less => MonthRole::BeforeGoLive,
            std::cmp::Ordering::Equal => MonthRole::GoLive,
            std::cmp::Ordering::Greater => MonthRole::AfterGoLive,
        }
    }

    /// The go-live month's data point
    pub fn go_live_point(&self) -> Option<&SCurveDataPoint> {
        self.s_curve_data_percent.get(self.go_live_index)
    }
}

// ============================================================================
// Tests
// ============================================================================
