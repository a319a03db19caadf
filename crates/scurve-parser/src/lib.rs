//! # scurve-parser
//!
//! Reads ClickUp spreadsheet exports into [`TaskSheet`]s.
//!
//! This crate provides:
//! - Workbook decoding (first sheet only) into a [`CellGrid`]
//! - Header row detection and typed column access
//! - Row extraction into normalized task records
//! - Project name inference
//!
//! ## Example
//!
//! ```rust
//! use scurve_core::{Cell, CellGrid};
//! use scurve_parser::extract_sheet;
//!
//! let grid = CellGrid::new(vec![
//!     vec![Cell::from("Task ID"), Cell::from("Task Name"), Cell::from("Parent ID")],
//!     vec![Cell::from("p1"), Cell::from("Fase 1 - Kickoff")],
//!     vec![Cell::from("t1"), Cell::from("Reunião inicial"), Cell::from("p1")],
//! ]);
//!
//! let sheet = extract_sheet(&grid, "cronograma").unwrap();
//! assert_eq!(sheet.project_name, "cronograma");
//! assert_eq!(sheet.records.len(), 2);
//! ```

pub mod extract;
pub mod header;
pub mod workbook;

pub use extract::{extract_records, extract_sheet, infer_project_name};
pub use header::{Column, HeaderMap};
pub use workbook::read_workbook;

use std::path::Path;

use scurve_core::{CellGrid, ReportError, TaskSheet};

/// Supported file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Spreadsheet workbook (.xlsx, .xlsm, .xls, .ods)
    Workbook,
    /// Anything else
    Unsupported,
}

/// Detect file format from extension
pub fn detect_format(path: &Path) -> FileFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("xlsx" | "xlsm" | "xls" | "ods") => FileFormat::Workbook,
        _ => FileFormat::Unsupported,
    }
}

/// Project name derived from a file path: the file name without its workbook
/// extension.
pub fn project_name_from_path(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match (detect_format(path), path.file_stem()) {
        (FileFormat::Workbook, Some(stem)) => stem.to_string_lossy().into_owned(),
        _ => file_name,
    }
}

/// Extract a sheet from an already-decoded grid, naming it after `path` when
/// the sheet carries no name of its own
pub fn parse_grid(grid: &CellGrid, path: &Path) -> Result<TaskSheet, ReportError> {
    extract_sheet(grid, &project_name_from_path(path))
}

/// Read and extract a workbook file
pub fn parse_file(path: &Path) -> Result<TaskSheet, ReportError> {
    if detect_format(path) == FileFormat::Unsupported {
        return Err(ReportError::Workbook(format!(
            "{}: not a spreadsheet (expected .xlsx, .xlsm, .xls or .ods)",
            path.display()
        )));
    }

    let grid = read_workbook(path)?;
    parse_grid(&grid, path)
}
