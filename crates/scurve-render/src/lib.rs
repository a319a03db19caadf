//! # scurve-render
//!
//! Output backends for finished [`ClientData`] reports.
//!
//! This crate provides:
//! - Plain-text dashboard for the console
//! - JSON output in the front-end field layout
//! - Excel workbooks (S-curve table, phases, KPIs)
//!
//! Charts and images are not produced here; every backend only serializes
//! the already computed report.
//!
//! ## Example
//!
//! ```rust,ignore
//! use scurve_core::Renderer;
//! use scurve_render::{ExcelRenderer, JsonRenderer, TextRenderer};
//!
//! let text = TextRenderer::new().render(&report)?;
//! let json = JsonRenderer::compact().render(&report)?;
//!
//! let xlsx_bytes = ExcelRenderer::new().render(&report)?;
//! std::fs::write("curva_s.xlsx", xlsx_bytes)?;
//! ```

pub mod excel;

pub use excel::ExcelRenderer;

use scurve_core::{ClientData, MonthRole, RenderError, Renderer};
use serde::Serialize;

/// Label shown next to the go-live month
pub const GO_LIVE_TAG: &str = "GO LIVE";
/// Label shown next to months after go-live
pub const AFTER_GO_LIVE_TAG: &str = "Pós Go Live";

/// Tag of a month in the comparison table
pub fn month_tag(role: MonthRole) -> &'static str {
    match role {
        MonthRole::BeforeGoLive => "",
        MonthRole::GoLive => GO_LIVE_TAG,
        MonthRole::AfterGoLive => AFTER_GO_LIVE_TAG,
    }
}

/// Two-decimal percentage with an explicit `+` when positive
pub fn signed_percent(value: f64) -> String {
    if value > 0.0 {
        format!("+{value:.2}%")
    } else if value < 0.0 {
        format!("{value:.2}%")
    } else {
        "0.00%".to_string()
    }
}

fn ensure_curve(report: &ClientData) -> Result<(), RenderError> {
    if report.s_curve_data_percent.is_empty() {
        return Err(RenderError::InvalidData(format!(
            "report '{}' has no S-curve months",
            report.name
        )));
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

// ============================================================================
// Text
// ============================================================================

/// Console dashboard: header, KPI cards, monthly comparison and phases
#[derive(Clone, Debug)]
pub struct TextRenderer {
    /// Include the phase list
    pub show_phases: bool,
    /// Include sub-processes under each phase
    pub show_sub_processes: bool,
    /// Maximum width of phase and sub-process names
    pub name_width: usize,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            show_phases: true,
            show_sub_processes: true,
            name_width: 60,
        }
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave out the phase list
    pub fn no_phases(mut self) -> Self {
        self.show_phases = false;
        self
    }

    /// List phases without their sub-processes
    pub fn no_sub_processes(mut self) -> Self {
        self.show_sub_processes = false;
        self
    }

    /// Set the maximum name width
    pub fn name_width(mut self, width: usize) -> Self {
        self.name_width = width;
        self
    }

    fn write_header(&self, out: &mut String, report: &ClientData) {
        out.push_str(&format!("{}\n", report.name));
        out.push_str(&format!(
            "{} | Atualizado em {}\n",
            report.location, report.last_updated
        ));
        out.push_str(&format!(
            "Go Live: {} | Período: {} a {}\n\n",
            report.go_live_date_formatted, report.project_start_date, report.project_end_date
        ));
    }

    fn write_kpis(&self, out: &mut String, report: &ClientData) {
        let kpis = &report.project_kpis;
        let cards = [
            ("Planejado Final", kpis.final_planned, "Meta do projeto".to_string()),
            (
                "Realizado Final",
                kpis.final_realized,
                format!("{} de {} tarefas", kpis.completed_tasks, kpis.total_tasks),
            ),
            (
                "Até o Go Live",
                kpis.realized_at_go_live,
                format!("Planejado: {}%", kpis.planned_at_go_live),
            ),
            ("Variação", kpis.variance, "Diferença Plan vs Real".to_string()),
        ];

        for (title, value, subtitle) in cards {
            out.push_str(&format!(
                "{title:<16} {:>8}  {subtitle}\n",
                format!("{value}%")
            ));
        }
        out.push('\n');
    }

    fn write_comparison(&self, out: &mut String, report: &ClientData) {
        out.push_str("Comparativo Mensal - Planejado vs Realizado\n");
        out.push_str(&format!(
            "{:<20} {:>14} {:>14} {:>10}\n",
            "Período", "Planejado (%)", "Realizado (%)", "Variação"
        ));

        for (index, point) in report.s_curve_data_percent.iter().enumerate() {
            let tag = month_tag(report.month_role(index));
            let period = if tag.is_empty() {
                point.month.clone()
            } else {
                format!("{} {tag}", point.month)
            };
            out.push_str(&format!(
                "{period:<20} {:>14} {:>14} {:>10}\n",
                format!("{:.2}%", point.planned_cumulative),
                format!("{:.2}%", point.realized_cumulative),
                signed_percent(point.variance()),
            ));
        }
    }

    fn write_phases(&self, out: &mut String, report: &ClientData) {
        if report.project_phases.is_empty() {
            return;
        }

        out.push_str("\nFases\n");
        for phase in &report.project_phases {
            let span = match (phase.start.as_str(), phase.end.as_str()) {
                ("", "") => "sem datas".to_string(),
                (start, "") => format!("desde {start}"),
                ("", end) => format!("até {end}"),
                (start, end) => format!("{start} a {end}"),
            };
            out.push_str(&format!(
                "- {} [{}] {span}\n",
                truncate(&phase.name, self.name_width),
                phase.status
            ));

            if self.show_sub_processes {
                for sub in &phase.sub_processes {
                    out.push_str(&format!("    * {}\n", truncate(sub, self.name_width)));
                }
            }
        }
    }
}

impl Renderer for TextRenderer {
    type Output = String;

    fn render(&self, report: &ClientData) -> Result<String, RenderError> {
        ensure_curve(report)?;

        let mut out = String::new();
        self.write_header(&mut out, report);
        self.write_kpis(&mut out, report);
        self.write_comparison(&mut out, report);
        if self.show_phases {
            self.write_phases(&mut out, report);
        }
        Ok(out)
    }
}

// ============================================================================
// JSON
// ============================================================================

/// JSON in the camelCase layout the dashboard front end reads
#[derive(Clone, Debug)]
pub struct JsonRenderer {
    pub pretty: bool,
}

impl Default for JsonRenderer {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl JsonRenderer {
    /// Pretty-printed output
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-line output
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    /// Render several reports as one JSON array
    pub fn render_all(&self, reports: &[ClientData]) -> Result<String, RenderError> {
        for report in reports {
            ensure_curve(report)?;
        }
        self.to_json(reports)
    }

    fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, RenderError> {
        let result = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        result.map_err(|e| RenderError::Format(format!("Failed to serialize report: {e}")))
    }
}

impl Renderer for JsonRenderer {
    type Output = String;

    fn render(&self, report: &ClientData) -> Result<String, RenderError> {
        ensure_curve(report)?;
        self.to_json(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn signed_percent_format() {
        assert_eq!(signed_percent(5.0), "+5.00%");
        assert_eq!(signed_percent(-12.345), "-12.35%");
        assert_eq!(signed_percent(0.0), "0.00%");
        assert_eq!(signed_percent(-0.0), "0.00%");
    }

    #[test]
    fn month_tags() {
        assert_eq!(month_tag(MonthRole::BeforeGoLive), "");
        assert_eq!(month_tag(MonthRole::GoLive), "GO LIVE");
        assert_eq!(month_tag(MonthRole::AfterGoLive), "Pós Go Live");
    }

    #[test]
    fn truncate_long_names() {
        assert_eq!(truncate("Curto", 20), "Curto");
        assert_eq!(truncate("Parametrização do módulo fiscal", 15), "Parametrizaç...");
    }

    #[test]
    fn text_renderer_config() {
        let renderer = TextRenderer::new().no_sub_processes().name_width(30);
        assert!(renderer.show_phases);
        assert!(!renderer.show_sub_processes);
        assert_eq!(renderer.name_width, 30);
        assert!(!TextRenderer::new().no_phases().show_phases);
    }

    #[test]
    fn json_renderer_modes() {
        assert!(JsonRenderer::new().pretty);
        assert!(!JsonRenderer::compact().pretty);
    }
}
