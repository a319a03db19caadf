//! Workbook decoding
//!
//! Reads the first worksheet of an `.xlsx`/`.xlsm`/`.xls`/`.ods` file with
//! calamine and converts it into a [`CellGrid`] positioned at A1.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use scurve_core::{dates, Cell, CellGrid, ReportError};
use tracing::debug;

/// Decode the first worksheet of a workbook file
pub fn read_workbook(path: &Path) -> Result<CellGrid, ReportError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ReportError::Workbook(format!("failed to open {}: {e}", path.display())))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ReportError::Workbook(format!("{} has no worksheets", path.display())))?
        .map_err(|e| ReportError::Workbook(format!("failed to read first sheet: {e}")))?;

    let grid = range_to_grid(&range);
    debug!(path = %path.display(), rows = grid.len(), "decoded workbook");
    Ok(grid)
}

/// Convert a calamine range, padding the area above and left of it so that
/// grid positions are physical positions.
pub fn range_to_grid(range: &Range<Data>) -> CellGrid {
    let (first_row, first_col) = range.start().unwrap_or((0, 0));

    let padding = (0..first_row).map(|_| Vec::new());
    let rows = range.rows().map(|row| {
        std::iter::repeat(Cell::Empty)
            .take(first_col as usize)
            .chain(row.iter().map(convert_cell))
            .collect::<Vec<_>>()
    });

    padding.chain(rows).collect()
}

/// Map one calamine value onto a grid cell.
///
/// Date cells keep their day serial so they follow the same normalization as
/// plain numeric dates. ISO dates (OpenDocument `office:date-value`) are
/// converted to the serial of their calendar day.
pub fn convert_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => Cell::String(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) => match dates::parse_iso(s) {
            Some(date) => Cell::Number(dates::to_serial(date)),
            None => Cell::String(s.clone()),
        },
        Data::DurationIso(s) => Cell::String(s.clone()),
    }
}
