//! Integration tests: workbook files written to disk and read back

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use scurve_core::ReportError;
use scurve_parser::parse_file;
use tempfile::TempDir;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

const HEADER: [&str; 6] = ["Task ID", "Task Name", "Parent ID", "Status", "Due Date", "Date Done"];

/// Export with a preamble, the list name in A2 and dates as date-formatted serials
fn write_export(path: &Path, list_name: Option<&str>) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("dd/mm/yyyy");
    let sheet = workbook.add_worksheet();

    sheet.write_string(0, 0, "Exportação")?;
    if let Some(name) = list_name {
        sheet.write_string(1, 0, name)?;
    }
    for (col, title) in HEADER.iter().enumerate() {
        sheet.write_string(3, col as u16, *title)?;
    }

    // Phase
    sheet.write_string(4, 0, "p1")?;
    sheet.write_string(4, 1, "Bodoquena - Fase 1 - Implantação")?;
    sheet.write_string(4, 3, "EM ANDAMENTO")?;

    // Task with serial dates (46037 = 2026-01-15, 46034 = 2026-01-12)
    sheet.write_string(5, 0, "t1")?;
    sheet.write_string(5, 1, "Configurar servidor")?;
    sheet.write_string(5, 2, "p1")?;
    sheet.write_string(5, 3, "CONCLUÍDO")?;
    sheet.write_number_with_format(5, 4, 46037.0, &date_format)?;
    sheet.write_number_with_format(5, 5, 46034.0, &date_format)?;

    // Task with DD/MM/YYYY text dates and a numeric id
    sheet.write_number(6, 0, 42.0)?;
    sheet.write_string(6, 1, "Treinar equipe")?;
    sheet.write_string(6, 2, "p1")?;
    sheet.write_string(6, 3, "A FAZER")?;
    sheet.write_string(6, 4, "20/02/2026")?;

    // Blank name, skipped
    sheet.write_string(7, 0, "t3")?;
    sheet.write_string(7, 2, "p1")?;

    workbook.save(path)
}

fn fixture(dir: &TempDir, file: &str, list_name: Option<&str>) -> PathBuf {
    let path = dir.path().join(file);
    write_export(&path, list_name).unwrap();
    path
}

#[test]
fn reads_records_from_xlsx() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "cronograma.xlsx", Some("Fazenda Bodoquena"));

    let sheet = parse_file(&path).unwrap();

    assert_eq!(sheet.project_name, "Fazenda Bodoquena");
    assert_eq!(sheet.records.len(), 3);

    let phase = &sheet.records[0];
    assert_eq!(phase.id, "p1");
    assert!(phase.is_phase());
    assert_eq!(phase.due_date, None);

    let configured = &sheet.records[1];
    assert_eq!(configured.parent_id.as_deref(), Some("p1"));
    assert_eq!(configured.status, "CONCLUÍDO");
    assert_eq!(configured.due_date, Some(date(2026, 1, 15)));
    assert_eq!(configured.date_done, Some(date(2026, 1, 12)));

    let training = &sheet.records[2];
    assert_eq!(training.id, "42");
    assert_eq!(training.due_date, Some(date(2026, 2, 20)));
    assert_eq!(training.date_done, None);
}

#[test]
fn project_name_falls_back_to_file_stem() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "Monte Cristo.xlsx", None);

    let sheet = parse_file(&path).unwrap();
    assert_eq!(sheet.project_name, "Monte Cristo");
}

#[test]
fn sheet_without_header_has_no_tasks() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("vazio.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Nada aqui").unwrap();
    workbook.save(&path).unwrap();

    assert!(matches!(parse_file(&path), Err(ReportError::NoTasksFound)));
}

#[test]
fn corrupt_file_is_a_workbook_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("quebrado.xlsx");
    std::fs::write(&path, b"not a zip archive").unwrap();

    assert!(matches!(parse_file(&path), Err(ReportError::Workbook(_))));
}
