//! Integration tests for the report renderers

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use scurve_core::{
    Analyzer, ClientData, ProcessContext, RenderError, Renderer, TaskRecord, TaskSheet,
};
use scurve_render::excel::{CURVE_SHEET, KPIS_SHEET, PHASES_SHEET};
use scurve_render::{ExcelRenderer, JsonRenderer, TextRenderer};
use scurve_solver::ScurveSolver;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Three months, go-live in February, 2 of 4 tasks done
fn create_report() -> ClientData {
    let mut sheet = TaskSheet::new("Fazenda Bodoquena");
    sheet.records = vec![
        TaskRecord::new("p1", "Bodoquena - Fase 1 - Preparação").status("CONCLUÍDO"),
        TaskRecord::new("t1", "Inventário")
            .parent("p1")
            .status("CONCLUÍDO")
            .due(date(2026, 1, 10))
            .done_on(date(2026, 1, 8)),
        TaskRecord::new("t2", "Cadastro de talhões")
            .parent("p1")
            .status("CONCLUÍDO")
            .due(date(2026, 1, 25)),
        TaskRecord::new("p2", "Fase 2 - Go-Live").status("NOVA").starts(date(2026, 2, 2)),
        TaskRecord::new("t3", "Virada do sistema").parent("p2").due(date(2026, 2, 2)),
        TaskRecord::new("t4", "Operação assistida").parent("p2").due(date(2026, 3, 15)),
    ];
    ScurveSolver::new()
        .analyze(&sheet, &ProcessContext::new(date(2026, 3, 20)))
        .unwrap()
}

fn empty_report() -> ClientData {
    let mut report = create_report();
    report.s_curve_data_percent.clear();
    report
}

#[test]
fn text_report_layout() {
    let text = TextRenderer::new().render(&create_report()).unwrap();

    assert!(text.starts_with("Fazenda Bodoquena\n"));
    assert!(text.contains("Importado via Excel | Atualizado em 20/03/2026"));
    assert!(text.contains("Go Live: 02/02/2026 | Período: 10/01/2026 a 15/03/2026"));

    assert!(text.contains("Planejado Final"));
    assert!(text.contains("100%"));
    assert!(text.contains("2 de 4 tarefas"));
    assert!(text.contains("Planejado: 75%"));
    assert!(text.contains("-50%"));

    let jan = text.lines().find(|l| l.starts_with("Jan/26")).unwrap();
    assert!(jan.contains("50.00%"));
    assert!(jan.ends_with("0.00%"));

    let feb = text.lines().find(|l| l.starts_with("Fev/26")).unwrap();
    assert!(feb.contains("GO LIVE"));
    assert!(feb.contains("75.00%"));
    assert!(feb.ends_with("-25.00%"));

    let mar = text.lines().find(|l| l.starts_with("Mar/26")).unwrap();
    assert!(mar.contains("Pós Go Live"));

    assert!(text.contains("- Fase 1 - Preparação [Concluído] 2026-01 a 2026-01"));
    assert!(text.contains("- Fase 2 - Go-Live [Nova] 2026-02 a 2026-03"));
    assert!(text.contains("    * Cadastro de talhões"));
}

#[test]
fn text_report_without_phases() {
    let text = TextRenderer::new().no_phases().render(&create_report()).unwrap();
    assert!(!text.contains("Fases"));

    let text = TextRenderer::new().no_sub_processes().render(&create_report()).unwrap();
    assert!(text.contains("Fases"));
    assert!(!text.contains("    * "));
}

#[test]
fn json_uses_front_end_field_names() {
    let json = JsonRenderer::new().render(&create_report()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["name"], "Fazenda Bodoquena");
    assert_eq!(value["goLiveIndex"], 1);
    assert_eq!(value["goLiveDateFormatted"], "02/02/2026");
    assert_eq!(value["sCurveDataPercent"][1]["isGoLiveMonth"], true);
    assert_eq!(value["sCurveDataPercent"][0]["plannedCumulative"], 50.0);
    assert_eq!(value["projectPhases"][0]["status"], "Concluído");
    assert_eq!(value["projectPhases"][1]["subProcesses"][0], "Virada do sistema");
    assert_eq!(value["projectKPIs"]["finalRealized"], 50.0);
}

#[test]
fn json_batch_is_an_array() {
    let reports = vec![create_report(), create_report()];
    let json = JsonRenderer::compact().render_all(&reports).unwrap();

    assert!(!json.contains('\n'));
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value.as_array().map(Vec::len), Some(2));
}

#[test]
fn excel_has_three_sheets() {
    let bytes = ExcelRenderer::new().render(&create_report()).unwrap();
    assert_eq!(&bytes[0..2], b"PK");

    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
    assert_eq!(workbook.sheet_names(), vec![CURVE_SHEET, PHASES_SHEET, KPIS_SHEET]);

    let curve = workbook.worksheet_range(CURVE_SHEET).unwrap();
    assert_eq!(curve.get_value((0, 0)), Some(&Data::String("Período".into())));
    assert_eq!(curve.get_value((2, 0)), Some(&Data::String("Fev/26".into())));
    assert_eq!(curve.get_value((2, 1)), Some(&Data::Float(75.0)));
    assert_eq!(curve.get_value((2, 6)), Some(&Data::String("GO LIVE".into())));
    assert_eq!(curve.get_value((3, 6)), Some(&Data::String("Pós Go Live".into())));

    let phases = workbook.worksheet_range(PHASES_SHEET).unwrap();
    assert_eq!(
        phases.get_value((1, 4)),
        Some(&Data::String("Inventário; Cadastro de talhões".into()))
    );
}

#[test]
fn excel_optional_sheets() {
    let bytes = ExcelRenderer::new().no_phases().no_kpis().render(&create_report()).unwrap();
    let workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
    assert_eq!(workbook.sheet_names(), vec![CURVE_SHEET]);
}

#[test]
fn empty_curve_is_rejected_by_every_renderer() {
    let report = empty_report();

    assert!(matches!(TextRenderer::new().render(&report), Err(RenderError::InvalidData(_))));
    assert!(matches!(JsonRenderer::new().render(&report), Err(RenderError::InvalidData(_))));
    assert!(matches!(ExcelRenderer::new().render(&report), Err(RenderError::InvalidData(_))));
}
