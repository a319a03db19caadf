//! Excel report renderer
//!
//! Generates an XLSX workbook with up to three sheets:
//! - Curva S: the monthly comparison table (planned vs. realized)
//! - Fases: phase list with status, date range and sub-processes
//! - KPIs: report metadata and the final indicators
//!
//! ## Example Output Structure
//!
//! ```text
//! Sheet: Curva S
//! | Período | Planejado (%) | Realizado (%) | Variação | Tarefas planejadas | ... | Marco
//! |---------|---------------|---------------|----------|--------------------|-----|------------
//! | Jan/26  | 30.00         | 30.00         | 0.00     | 3                  |     |
//! | Mar/26  | 80.00         | 60.00         | -20.00   | 8                  |     | GO LIVE
//! | Abr/26  | 100.00        | 60.00         | -40.00   | 10                 |     | Pós Go Live
//! ```
//!
//! `...` is the realized task count. Percentages are written as numbers so
//! the sheet can be charted directly.

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use scurve_core::{ClientData, MonthRole, RenderError, Renderer};

use crate::month_tag;

/// Sheet names, in workbook order
pub const CURVE_SHEET: &str = "Curva S";
pub const PHASES_SHEET: &str = "Fases";
pub const KPIS_SHEET: &str = "KPIs";

/// Excel report renderer
#[derive(Clone, Debug)]
pub struct ExcelRenderer {
    /// Whether to include the Fases sheet
    pub include_phases: bool,
    /// Whether to include the KPIs sheet
    pub include_kpis: bool,
    /// Separator between sub-processes in the Fases sheet
    pub sub_process_separator: String,
}

impl Default for ExcelRenderer {
    fn default() -> Self {
        Self {
            include_phases: true,
            include_kpis: true,
            sub_process_separator: "; ".into(),
        }
    }
}

struct ExcelFormats {
    header: Format,
    text: Format,
    percent: Format,
    integer: Format,
    go_live_text: Format,
    go_live_percent: Format,
    go_live_integer: Format,
    after_text: Format,
    after_percent: Format,
    after_integer: Format,
    label: Format,
}

impl ExcelRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave out the Fases sheet
    pub fn no_phases(mut self) -> Self {
        self.include_phases = false;
        self
    }

    /// Leave out the KPIs sheet
    pub fn no_kpis(mut self) -> Self {
        self.include_kpis = false;
        self
    }

    /// Set the sub-process separator
    pub fn sub_process_separator(mut self, separator: impl Into<String>) -> Self {
        self.sub_process_separator = separator.into();
        self
    }

    /// Generate Excel workbook bytes
    pub fn render_to_bytes(&self, report: &ClientData) -> Result<Vec<u8>, RenderError> {
        let mut workbook = Workbook::new();
        let formats = create_formats();

        self.add_curve_sheet(&mut workbook, report, &formats).map_err(xlsx_error)?;
        if self.include_phases {
            self.add_phases_sheet(&mut workbook, report, &formats).map_err(xlsx_error)?;
        }
        if self.include_kpis {
            add_kpis_sheet(&mut workbook, report, &formats).map_err(xlsx_error)?;
        }

        workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))
    }

    fn add_curve_sheet(
        &self,
        workbook: &mut Workbook,
        report: &ClientData,
        formats: &ExcelFormats,
    ) -> Result<(), XlsxError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name(CURVE_SHEET)?;

        let headers = [
            ("Período", 12.0),
            ("Planejado (%)", 15.0),
            ("Realizado (%)", 15.0),
            ("Variação", 12.0),
            ("Tarefas planejadas", 20.0),
            ("Tarefas realizadas", 20.0),
            ("Marco", 14.0),
        ];
        write_headers(sheet, &headers, formats)?;

        for (index, point) in report.s_curve_data_percent.iter().enumerate() {
            let row = index as u32 + 1;
            let role = report.month_role(index);
            let (text, percent, integer) = match role {
                MonthRole::BeforeGoLive => (&formats.text, &formats.percent, &formats.integer),
                MonthRole::GoLive => (
                    &formats.go_live_text,
                    &formats.go_live_percent,
                    &formats.go_live_integer,
                ),
                MonthRole::AfterGoLive => {
                    (&formats.after_text, &formats.after_percent, &formats.after_integer)
                }
            };

            sheet.write_string_with_format(row, 0, &point.month, text)?;
            sheet.write_number_with_format(row, 1, point.planned_cumulative, percent)?;
            sheet.write_number_with_format(row, 2, point.realized_cumulative, percent)?;
            sheet.write_number_with_format(row, 3, point.variance(), percent)?;
            sheet.write_number_with_format(row, 4, point.planned_tasks as f64, integer)?;
            sheet.write_number_with_format(row, 5, point.realized_tasks as f64, integer)?;
            sheet.write_string_with_format(row, 6, month_tag(role), text)?;
        }

        sheet.set_freeze_panes(1, 0)?;
        Ok(())
    }

    fn add_phases_sheet(
        &self,
        workbook: &mut Workbook,
        report: &ClientData,
        formats: &ExcelFormats,
    ) -> Result<(), XlsxError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name(PHASES_SHEET)?;

        let headers = [
            ("Fase", 40.0),
            ("Status", 15.0),
            ("Início", 10.0),
            ("Fim", 10.0),
            ("Subprocessos", 80.0),
        ];
        write_headers(sheet, &headers, formats)?;

        for (index, phase) in report.project_phases.iter().enumerate() {
            let row = index as u32 + 1;
            sheet.write_string_with_format(row, 0, &phase.name, &formats.text)?;
            sheet.write_string_with_format(row, 1, phase.status.as_str(), &formats.text)?;
            sheet.write_string_with_format(row, 2, &phase.start, &formats.text)?;
            sheet.write_string_with_format(row, 3, &phase.end, &formats.text)?;
            sheet.write_string_with_format(
                row,
                4,
                phase.sub_processes.join(&self.sub_process_separator),
                &formats.text,
            )?;
        }

        sheet.set_freeze_panes(1, 0)?;
        Ok(())
    }
}

fn add_kpis_sheet(
    workbook: &mut Workbook,
    report: &ClientData,
    formats: &ExcelFormats,
) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(KPIS_SHEET)?;
    write_headers(sheet, &[("Indicador", 28.0), ("Valor", 24.0)], formats)?;

    let kpis = &report.project_kpis;
    let texts = [
        ("Projeto", report.name.as_str()),
        ("Local", report.location.as_str()),
        ("Atualizado em", report.last_updated.as_str()),
        ("Go Live", report.go_live_date_formatted.as_str()),
        ("Início", report.project_start_date.as_str()),
        ("Fim", report.project_end_date.as_str()),
    ];
    let counts = [
        ("Total de tarefas", kpis.total_tasks),
        ("Tarefas concluídas", kpis.completed_tasks),
    ];
    let percentages = [
        ("Taxa de conclusão (%)", kpis.completion_rate),
        ("Planejado no Go Live (%)", kpis.planned_at_go_live),
        ("Realizado no Go Live (%)", kpis.realized_at_go_live),
        ("Planejado Final (%)", kpis.final_planned),
        ("Realizado Final (%)", kpis.final_realized),
        ("Variação (%)", kpis.variance),
    ];

    let mut row = 1;
    for (label, value) in texts {
        sheet.write_string_with_format(row, 0, label, &formats.label)?;
        sheet.write_string_with_format(row, 1, value, &formats.text)?;
        row += 1;
    }
    for (label, value) in counts {
        sheet.write_string_with_format(row, 0, label, &formats.label)?;
        sheet.write_number_with_format(row, 1, value as f64, &formats.integer)?;
        row += 1;
    }
    for (label, value) in percentages {
        sheet.write_string_with_format(row, 0, label, &formats.label)?;
        sheet.write_number_with_format(row, 1, value, &formats.percent)?;
        row += 1;
    }
    Ok(())
}

fn write_headers(
    sheet: &mut Worksheet,
    headers: &[(&str, f64)],
    formats: &ExcelFormats,
) -> Result<(), XlsxError> {
    for (col, (title, width)) in headers.iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, *title, &formats.header)?;
        sheet.set_column_width(col, *width)?;
    }
    Ok(())
}

fn xlsx_error(e: XlsxError) -> RenderError {
    RenderError::Format(format!("Failed to write sheet: {e}"))
}

/// Create reusable formats
fn create_formats() -> ExcelFormats {
    let header = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_background_color(0x4472C4)
        .set_font_color(0xFFFFFF)
        .set_border(FormatBorder::Thin);

    let text = Format::new().set_border(FormatBorder::Thin);
    let percent = Format::new()
        .set_num_format("0.00")
        .set_border(FormatBorder::Thin);
    let integer = Format::new()
        .set_num_format("#,##0")
        .set_border(FormatBorder::Thin);

    // Go-live month in bold gold, later months in light grey
    let go_live = |format: Format| format.set_bold().set_background_color(0xFFE699);
    let after = |format: Format| format.set_background_color(0xEDEDED);

    let label = Format::new()
        .set_bold()
        .set_background_color(0xDDEBF7)
        .set_border(FormatBorder::Thin);

    ExcelFormats {
        go_live_text: go_live(text.clone()),
        go_live_percent: go_live(percent.clone()),
        go_live_integer: go_live(integer.clone()),
        after_text: after(text.clone()),
        after_percent: after(percent.clone()),
        after_integer: after(integer.clone()),
        header,
        text,
        percent,
        integer,
        label,
    }
}

impl Renderer for ExcelRenderer {
    type Output = Vec<u8>;

    fn render(&self, report: &ClientData) -> Result<Vec<u8>, RenderError> {
        if report.s_curve_data_percent.is_empty() {
            return Err(RenderError::InvalidData("No S-curve months to render".into()));
        }
        self.render_to_bytes(report)
    }
}
