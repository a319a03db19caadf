//! S-curve and KPI aggregation
//!
//! Works on task rows only. Every percentage uses the count of *all* task
//! rows as its denominator, so undated tasks pull the curves down without
//! ever appearing on them.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use scurve_core::dates::{first_of_month, last_of_month, month_label, same_month};
use scurve_core::report::{percent, percent_decimal, round, to_f64};
use scurve_core::{ProjectKpis, ReportError, SCurveDataPoint};
use tracing::debug;

use crate::hierarchy::WorkTask;

/// Monthly cumulative curve over the due-date span
#[derive(Clone, Debug, PartialEq)]
pub struct SCurve {
    pub points: Vec<SCurveDataPoint>,
    /// Go-live month, or the last month when there is no go-live
    pub go_live_index: usize,
    /// Earliest due date
    pub start: NaiveDate,
    /// Latest due date
    pub end: NaiveDate,
}

/// Build one point per calendar month from the earliest to the latest due
/// date, inclusive.
///
/// Fails with [`ReportError::NoDatedTasks`] when no task has a due date.
pub fn build_s_curve(
    tasks: &[WorkTask],
    go_live: Option<NaiveDate>,
) -> Result<SCurve, ReportError> {
    let total = tasks.len();
    let mut dated: Vec<&WorkTask> = tasks.iter().filter(|t| t.due_date.is_some()).collect();
    dated.sort_by_key(|t| t.due_date);

    let (Some(start), Some(end)) = (
        dated.first().and_then(|t| t.due_date),
        dated.last().and_then(|t| t.due_date),
    ) else {
        return Err(ReportError::NoDatedTasks);
    };

    let last_day = last_of_month(end);
    let mut cursor = first_of_month(start);
    let mut points = Vec::new();
    let mut go_live_index = None;

    while cursor <= last_day {
        let month_end = last_of_month(cursor);
        let planned = dated.iter().filter(|t| t.planned_by(month_end)).count();
        let realized = dated.iter().filter(|t| t.realized_by(month_end)).count();
        let is_go_live_month = go_live.is_some_and(|g| same_month(g, cursor));

        if is_go_live_month && go_live_index.is_none() {
            go_live_index = Some(points.len());
        }

        let label = month_label(cursor);
        points.push(SCurveDataPoint {
            date: label.clone(),
            month: label,
            planned_cumulative: capped_percent(planned, total),
            realized_cumulative: capped_percent(realized, total),
            planned_tasks: planned,
            realized_tasks: realized,
            is_go_live_month,
        });

        match cursor.checked_add_months(Months::new(1)) {
            Some(next) => cursor = next,
            None => break,
        }
    }

    debug!(%start, %end, months = points.len(), go_live_index = ?go_live_index, "built s-curve");

    let go_live_index = go_live_index.unwrap_or_else(|| points.len().saturating_sub(1));
    Ok(SCurve {
        points,
        go_live_index,
        start,
        end,
    })
}

fn capped_percent(count: usize, total: usize) -> f64 {
    percent(count, total, 1).min(100.0)
}

/// Completion counts, go-live percentages and the final variance
pub fn compute_kpis(tasks: &[WorkTask], go_live: Option<NaiveDate>) -> ProjectKpis {
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.done).count();
    let rate = percent_decimal(completed, total, 2);

    let (planned_at_go_live, realized_at_go_live) = match go_live {
        Some(cutoff) => (
            percent(tasks.iter().filter(|t| t.planned_by(cutoff)).count(), total, 1),
            percent(
                tasks
                    .iter()
                    .filter(|t| t.due_date.is_some() && t.realized_by(cutoff))
                    .count(),
                total,
                1,
            ),
        ),
        None => (0.0, 0.0),
    };

    ProjectKpis {
        total_tasks: total,
        completed_tasks: completed,
        completion_rate: to_f64(rate),
        planned_at_go_live,
        realized_at_go_live,
        final_planned: 100.0,
        final_realized: to_f64(rate),
        variance: to_f64(round(rate - Decimal::ONE_HUNDRED, 1)),
    }
}
