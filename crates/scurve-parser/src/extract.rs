//! Row extraction
//!
//! Turns the raw cell grid of an export into [`TaskRecord`]s:
//!
//! 1. Rows before the header row are preamble and skipped.
//! 2. The header row builds the [`HeaderMap`] and emits nothing.
//! 3. Every later row becomes a record unless it is empty, has a blank
//!    `Task Name`, or repeats the header (`Task ID` cell equal to `"Task ID"`).
//!
//! A sheet that yields no record at all is a [`ReportError::NoTasksFound`].

use scurve_core::{Cell, CellGrid, ReportError, TaskRecord, TaskSheet};
use tracing::{debug, info};

use crate::header::{Column, HeaderMap};

/// Extract the records and project name of a sheet.
///
/// `fallback_name` is used when the sheet does not carry its own project name
/// (see [`infer_project_name`]).
pub fn extract_sheet(grid: &CellGrid, fallback_name: &str) -> Result<TaskSheet, ReportError> {
    let records = extract_records(grid)?;
    let project_name = infer_project_name(grid).unwrap_or_else(|| fallback_name.to_string());

    info!(project = %project_name, records = records.len(), "extracted sheet");
    Ok(TaskSheet {
        project_name,
        records,
    })
}

/// Extract every valid record, in sheet order
pub fn extract_records(grid: &CellGrid) -> Result<Vec<TaskRecord>, ReportError> {
    let mut header: Option<HeaderMap> = None;
    let mut records = Vec::new();

    for (index, row) in grid.rows().iter().enumerate() {
        if is_empty_row(row) {
            continue;
        }

        match header.as_ref() {
            Some(map) => records.extend(read_record(map, row)),
            None => {
                if HeaderMap::is_header_row(row) {
                    let map = HeaderMap::from_row(row);
                    debug!(
                        row = index,
                        columns = map.len(),
                        missing = ?map.missing(),
                        "found header row"
                    );
                    header = Some(map);
                }
            }
        }
    }

    if records.is_empty() {
        return Err(ReportError::NoTasksFound);
    }
    Ok(records)
}

fn read_record(header: &HeaderMap, row: &[Cell]) -> Option<TaskRecord> {
    if header.cell(row, Column::TaskName).is_blank() {
        return None;
    }

    let id = header.text(row, Column::TaskId);
    if id == Column::TaskId.header() {
        return None;
    }

    Some(TaskRecord {
        id,
        name: header.text(row, Column::TaskName),
        parent_id: header.optional_text(row, Column::ParentId),
        status: header.text(row, Column::Status),
        due_date: header.date(row, Column::DueDate),
        date_done: header.date(row, Column::DateDone),
        start_date: header.date(row, Column::StartDate),
    })
}

fn is_empty_row(row: &[Cell]) -> bool {
    row.iter().all(|c| matches!(c, Cell::Empty))
}

/// Project name carried by the sheet itself.
///
/// Exports put the list name in cell A2. It is used when it is a non-empty
/// string other than `"Task ID"` (which would mean the table starts there).
pub fn infer_project_name(grid: &CellGrid) -> Option<String> {
    let name = grid.row(1)?.first()?.as_str()?.trim();
    if name.is_empty() || name == Column::TaskId.header() {
        return None;
    }
    Some(name.to_string())
}
