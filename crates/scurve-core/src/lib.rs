//! # scurve-core
//!
//! Core domain model and traits for the scurve progress reporter.
//!
//! This crate provides:
//! - The cell grid abstraction every spreadsheet decoder produces
//! - Domain types: `TaskRecord`, `TaskSheet`, `ClientData`, `SCurveDataPoint`
//! - Date normalization for spreadsheet serials and `DD/MM/YYYY` strings
//! - The business rule table (phase prefixes, go-live phrases, name scrubbing)
//! - Core traits: `Analyzer`, `Renderer`
//! - Error types
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use scurve_core::{TaskRecord, TaskSheet};
//!
//! let mut sheet = TaskSheet::new("Fazenda Boa Vista");
//! sheet.records.push(TaskRecord::new("p1", "Fase 1 - Planejamento"));
//! sheet.records.push(
//!     TaskRecord::new("t1", "Levantamento de requisitos")
//!         .parent("p1")
//!         .status("CONCLUÍDO")
//!         .due(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()),
//! );
//!
//! assert_eq!(sheet.phase_rows().count(), 1);
//! assert_eq!(sheet.task_rows().count(), 1);
//! ```

pub mod dates;
pub mod report;
pub mod rules;

pub use report::{ClientData, MonthRole, PhaseStatus, ProjectKpis, ProjectPhase, SCurveDataPoint};
pub use rules::{CompiledRules, Rules};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Type Aliases
// ============================================================================

/// Identifier of a row in the export (the `Task ID` column)
pub type TaskId = String;

// ============================================================================
// Cell Grid
// ============================================================================

/// A single untyped spreadsheet cell.
///
/// Date-formatted cells are surfaced as `Number` holding the day serial, which
/// is what [`dates::parse_date`] expects.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    String(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// Borrow the string content, if this is a string cell
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::String(s) => Some(s),
            _ => None,
        }
    }

    /// True for cells that carry no usable value: empty cells, whitespace-only
    /// strings and the number zero.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::String(s) => s.trim().is_empty(),
            Cell::Number(n) => *n == 0.0 || n.is_nan(),
            Cell::Bool(_) => false,
        }
    }

    /// Render the cell as text. Integral numbers drop their fractional part.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::String(s) => s.clone(),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::String(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::String(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

/// Rows × columns of untyped cells from the first sheet of a workbook.
///
/// Row 0 / column 0 is always physical cell A1.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellGrid {
    rows: Vec<Vec<Cell>>,
}

impl CellGrid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// All rows in physical order
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Physical row `index` (0-based)
    pub fn row(&self, index: usize) -> Option<&[Cell]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<Vec<Cell>> for CellGrid {
    fn from_iter<I: IntoIterator<Item = Vec<Cell>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ============================================================================
// Task Records
// ============================================================================

/// One normalized row of the export.
///
/// A record without a parent is a **phase row**; every other record is a
/// **task row**.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Row identifier (unique within one sheet)
    pub id: TaskId,
    /// Raw task name as exported
    pub name: String,
    /// Direct parent, absent for phase rows
    pub parent_id: Option<TaskId>,
    /// Raw status text
    pub status: String,
    /// Planned completion date
    pub due_date: Option<NaiveDate>,
    /// Actual completion date
    pub date_done: Option<NaiveDate>,
    /// Start date
    pub start_date: Option<NaiveDate>,
}

impl TaskRecord {
    /// Create a record with the given ID and name and no other data
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: None,
            status: String::new(),
            due_date: None,
            date_done: None,
            start_date: None,
        }
    }

    /// Set the parent ID
    pub fn parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Set the raw status text
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Set the due date
    pub fn due(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    /// Set the completion date
    pub fn done_on(mut self, date: NaiveDate) -> Self {
        self.date_done = Some(date);
        self
    }

    /// Set the start date
    pub fn starts(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    /// Phase rows have no parent
    pub fn is_phase(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Output of row extraction: the project display name plus every valid record
/// in sheet order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskSheet {
    pub project_name: String,
    pub records: Vec<TaskRecord>,
}

impl TaskSheet {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            records: Vec::new(),
        }
    }

    /// Records without a parent, in sheet order
    pub fn phase_rows(&self) -> impl Iterator<Item = &TaskRecord> {
        self.records.iter().filter(|r| r.is_phase())
    }

    /// Records with a parent, in sheet order
    pub fn task_rows(&self) -> impl Iterator<Item = &TaskRecord> {
        self.records.iter().filter(|r| !r.is_phase())
    }
}

/// Inputs owned by the caller rather than by the sheet
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessContext {
    /// Processing date, shown as the report's "last updated" value
    pub today: NaiveDate,
}

impl ProcessContext {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Context dated with the local calendar date
    pub fn now() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Turns an extracted sheet into a finished report
pub trait Analyzer {
    fn analyze(&self, sheet: &TaskSheet, ctx: &ProcessContext) -> Result<ClientData, ReportError>;
}

/// Output backend for a finished report
pub trait Renderer {
    type Output;

    fn render(&self, report: &ClientData) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Failure while turning one input file into a report.
///
/// Each variant is a hard failure for that file only.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("No tasks found: the sheet has no 'Task ID'/'Task Name' header or no valid rows")]
    NoTasksFound,

    #[error("No task has a due date, cannot build the S-curve")]
    NoDatedTasks,

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Invalid rules: {0}")]
    Rules(String),
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn blank_cells() {
        assert!(Cell::Empty.is_blank());
        assert!(Cell::from("   ").is_blank());
        assert!(Cell::from(0.0).is_blank());
        assert!(!Cell::from("x").is_blank());
        assert!(!Cell::from(3.0).is_blank());
        assert!(!Cell::from(false).is_blank());
    }

    #[test]
    fn cell_text_drops_integral_fraction() {
        assert_eq!(Cell::from(86994512.0).to_text(), "86994512");
        assert_eq!(Cell::from(1.5).to_text(), "1.5");
        assert_eq!(Cell::from("abc").to_text(), "abc");
        assert_eq!(Cell::Empty.to_text(), "");
        assert_eq!(Cell::from(true).to_text(), "true");
    }

    #[test]
    fn grid_row_access() {
        let grid: CellGrid = vec![vec![Cell::from("a")], vec![]].into_iter().collect();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.row(0), Some(&[Cell::from("a")][..]));
        assert_eq!(grid.row(1).map(<[Cell]>::len), Some(0));
        assert!(grid.row(2).is_none());
    }

    #[test]
    fn record_builder() {
        let record = TaskRecord::new("t1", "Treinamento")
            .parent("p1")
            .status("CONCLUÍDO")
            .due(date(2026, 2, 15))
            .done_on(date(2026, 2, 10))
            .starts(date(2026, 2, 1));

        assert_eq!(record.parent_id.as_deref(), Some("p1"));
        assert_eq!(record.due_date, Some(date(2026, 2, 15)));
        assert_eq!(record.date_done, Some(date(2026, 2, 10)));
        assert_eq!(record.start_date, Some(date(2026, 2, 1)));
        assert!(!record.is_phase());
        assert!(TaskRecord::new("p1", "Fase 1").is_phase());
    }

    #[test]
    fn sheet_partitions_rows() {
        let mut sheet = TaskSheet::new("Projeto");
        sheet.records = vec![
            TaskRecord::new("p1", "Fase 1"),
            TaskRecord::new("t1", "A").parent("p1"),
            TaskRecord::new("p2", "Fase 2"),
            TaskRecord::new("t2", "B").parent("t1"),
        ];

        let phases: Vec<_> = sheet.phase_rows().map(|r| r.id.as_str()).collect();
        let tasks: Vec<_> = sheet.task_rows().map(|r| r.id.as_str()).collect();
        assert_eq!(phases, ["p1", "p2"]);
        assert_eq!(tasks, ["t1", "t2"]);
    }

    #[test]
    fn error_messages() {
        assert!(ReportError::NoTasksFound.to_string().contains("No tasks found"));
        assert!(ReportError::NoDatedTasks.to_string().contains("due date"));
        assert!(ReportError::Workbook("bad zip".into()).to_string().contains("bad zip"));
        assert!(RenderError::InvalidData("empty".into()).to_string().contains("empty"));
    }
}
