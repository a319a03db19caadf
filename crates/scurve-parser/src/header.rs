//! Header row recognition and typed column access
//!
//! Exports put a preamble (project name, filters, blank lines) above the
//! table. The header row is the first row holding both `Task ID` and
//! `Task Name`; its string cells map column names to positions. Everything
//! downstream reads cells through [`HeaderMap`] instead of raw indices.

use std::collections::HashMap;

use chrono::NaiveDate;
use scurve_core::{dates, Cell};

static EMPTY_CELL: Cell = Cell::Empty;

/// Columns the extractor understands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    TaskId,
    TaskName,
    ParentId,
    Status,
    DueDate,
    DateDone,
    StartDate,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::TaskId,
        Column::TaskName,
        Column::ParentId,
        Column::Status,
        Column::DueDate,
        Column::DateDone,
        Column::StartDate,
    ];

    /// Exact header text of the column
    pub fn header(self) -> &'static str {
        match self {
            Column::TaskId => "Task ID",
            Column::TaskName => "Task Name",
            Column::ParentId => "Parent ID",
            Column::Status => "Status",
            Column::DueDate => "Due Date",
            Column::DateDone => "Date Done",
            Column::StartDate => "Start Date",
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header())
    }
}

/// Column name → position, built once from the header row
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderMap {
    positions: HashMap<String, usize>,
}

impl HeaderMap {
    /// A header row contains the exact strings `Task ID` and `Task Name`
    pub fn is_header_row(row: &[Cell]) -> bool {
        let has = |name: &str| row.iter().any(|c| c.as_str() == Some(name));
        has(Column::TaskId.header()) && has(Column::TaskName.header())
    }

    /// Map every non-empty string cell (trimmed) to its index.
    ///
    /// When a name repeats, the first occurrence wins.
    pub fn from_row(row: &[Cell]) -> Self {
        let mut positions = HashMap::new();
        for (index, cell) in row.iter().enumerate() {
            if let Some(name) = cell.as_str().map(str::trim).filter(|n| !n.is_empty()) {
                positions.entry(name.to_string()).or_insert(index);
            }
        }
        Self { positions }
    }

    /// Position of a recognized column
    pub fn position(&self, column: Column) -> Option<usize> {
        self.position_of(column.header())
    }

    /// Position of any header name
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Recognized columns missing from the header
    pub fn missing(&self) -> Vec<Column> {
        Column::ALL
            .into_iter()
            .filter(|c| self.position(*c).is_none())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Cell of `column` in `row`; missing columns and short rows read as empty
    pub fn cell<'a>(&self, row: &'a [Cell], column: Column) -> &'a Cell {
        self.position(column)
            .and_then(|i| row.get(i))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Text of the cell, `""` when absent
    pub fn text(&self, row: &[Cell], column: Column) -> String {
        self.cell(row, column).to_text()
    }

    /// Text of the cell, `None` when blank
    pub fn optional_text(&self, row: &[Cell], column: Column) -> Option<String> {
        let cell = self.cell(row, column);
        if cell.is_blank() {
            None
        } else {
            Some(cell.to_text())
        }
    }

    /// Date in the cell, `None` when absent or unparseable
    pub fn date(&self, row: &[Cell], column: Column) -> Option<NaiveDate> {
        dates::parse_date(self.cell(row, column))
    }
}
