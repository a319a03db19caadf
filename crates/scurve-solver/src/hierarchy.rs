//! Phase hierarchy
//!
//! Splits the extracted records into phases (no parent) and work tasks (with
//! a parent), then links every task to the phase at the top of its parent
//! chain.
//!
//! Key rules:
//! - Phases keep sheet order. A repeated phase ID replaces the earlier phase
//!   in place.
//! - Go-live is the first phase whose name matches the go-live rule. Later
//!   matches are never considered, even when the first one has no dates.
//! - Sub-processes are listed only on a task's *immediate* parent phase.
//!   Deeper descendants count toward the phase dates but are not listed.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use scurve_core::dates::month_key;
use scurve_core::{CompiledRules, ProjectPhase, TaskId, TaskRecord, TaskSheet};
use tracing::{debug, warn};

/// A task row prepared for aggregation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkTask {
    pub id: TaskId,
    pub parent_id: TaskId,
    /// Display name after URL and name scrubbing
    pub name: String,
    pub due_date: Option<NaiveDate>,
    pub date_done: Option<NaiveDate>,
    pub done: bool,
}

impl WorkTask {
    /// Planned to be finished by `cutoff`
    pub fn planned_by(&self, cutoff: NaiveDate) -> bool {
        self.due_date.is_some_and(|due| due <= cutoff)
    }

    /// Finished by `cutoff`. Without a completion date the due date stands in
    /// for it.
    pub fn realized_by(&self, cutoff: NaiveDate) -> bool {
        if !self.done {
            return false;
        }
        match self.date_done {
            Some(done) => done <= cutoff,
            None => self.planned_by(cutoff),
        }
    }
}

/// Phases, parent edges and work tasks of one sheet
#[derive(Clone, Debug, Default)]
pub struct Hierarchy {
    phases: Vec<ProjectPhase>,
    phase_index: HashMap<TaskId, usize>,
    parents: HashMap<TaskId, TaskId>,
    tasks: Vec<WorkTask>,
    go_live: Option<NaiveDate>,
}

impl Hierarchy {
    /// Classify every record, detect go-live and fill sub-processes and
    /// inferred phase dates
    pub fn build(sheet: &TaskSheet, rules: &CompiledRules) -> Self {
        let mut hierarchy = Self::default();
        let mut go_live_seen = false;

        for record in &sheet.records {
            match &record.parent_id {
                None => {
                    if !go_live_seen && rules.is_go_live_phase(&record.name) {
                        go_live_seen = true;
                        hierarchy.go_live = go_live_date(record);
                    }
                    hierarchy.insert_phase(phase_from_record(record, rules));
                }
                Some(parent) => {
                    hierarchy.parents.insert(record.id.clone(), parent.clone());
                    hierarchy.tasks.push(WorkTask {
                        id: record.id.clone(),
                        parent_id: parent.clone(),
                        name: rules.clean_task_name(&record.name),
                        due_date: record.due_date,
                        date_done: record.date_done,
                        done: rules.is_done(&record.status),
                    });
                }
            }
        }

        debug!(
            phases = hierarchy.phases.len(),
            tasks = hierarchy.tasks.len(),
            go_live = ?hierarchy.go_live,
            "built hierarchy"
        );

        hierarchy.attach_tasks();
        hierarchy
    }

    fn insert_phase(&mut self, phase: ProjectPhase) {
        match self.phase_index.get(&phase.id) {
            Some(&index) => self.phases[index] = phase,
            None => {
                self.phase_index.insert(phase.id.clone(), self.phases.len());
                self.phases.push(phase);
            }
        }
    }

    /// List sub-processes and infer missing phase dates from due dates
    fn attach_tasks(&mut self) {
        let mut due_dates: HashMap<usize, (NaiveDate, NaiveDate)> = HashMap::new();
        let mut orphans = 0usize;

        for task in &self.tasks {
            match self.top_level_phase_id(&task.id).and_then(|id| self.phase_index.get(id)) {
                Some(&index) => {
                    if let Some(due) = task.due_date {
                        due_dates
                            .entry(index)
                            .and_modify(|(first, last)| {
                                *first = (*first).min(due);
                                *last = (*last).max(due);
                            })
                            .or_insert((due, due));
                    }
                }
                None => orphans += 1,
            }
        }

        for task in &self.tasks {
            if let Some(&index) = self.phase_index.get(&task.parent_id) {
                self.phases[index].add_sub_process(&task.name);
            }
        }

        for (index, (first, last)) in due_dates {
            let phase = &mut self.phases[index];
            if phase.start.is_empty() {
                phase.start = month_key(first);
            }
            if phase.end.is_empty() {
                phase.end = month_key(last);
            }
        }

        if orphans > 0 {
            warn!(orphans, "tasks whose parent chain never reaches a phase");
        }
    }

    /// Phase at the top of the parent chain of `task_id`.
    ///
    /// Returns `None` when the chain ends without reaching a phase or loops
    /// back on itself.
    pub fn top_level_phase_id<'a>(&'a self, task_id: &'a str) -> Option<&'a str> {
        let mut current = task_id;
        let mut visited = HashSet::new();

        while !self.phase_index.contains_key(current) {
            if !visited.insert(current) {
                return None;
            }
            current = self.parents.get(current).map(String::as_str)?;
        }
        Some(current)
    }

    /// Phases in sheet order
    pub fn phases(&self) -> &[ProjectPhase] {
        &self.phases
    }

    pub fn into_phases(self) -> Vec<ProjectPhase> {
        self.phases
    }

    /// Task rows in sheet order
    pub fn tasks(&self) -> &[WorkTask] {
        &self.tasks
    }

    /// Detected go-live date
    pub fn go_live(&self) -> Option<NaiveDate> {
        self.go_live
    }

    /// Direct parent of a task
    pub fn parent_of(&self, task_id: &str) -> Option<&str> {
        self.parents.get(task_id).map(String::as_str)
    }
}

fn phase_from_record(record: &TaskRecord, rules: &CompiledRules) -> ProjectPhase {
    let mut phase = ProjectPhase::new(
        record.id.clone(),
        rules.clean_phase_name(&record.name),
        rules.phase_status(&record.status),
    );
    if let Some(start) = record.start_date {
        phase.start = month_key(start);
    }
    if let Some(due) = record.due_date {
        phase.end = month_key(due);
    }
    phase
}

fn go_live_date(record: &TaskRecord) -> Option<NaiveDate> {
    let date = record.start_date.or(record.due_date);
    match date {
        Some(date) => debug!(phase = %record.name, %date, "detected go-live phase"),
        None => warn!(phase = %record.name, "go-live phase has no start or due date"),
    }
    date
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scurve_core::{PhaseStatus, Rules};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn build(records: Vec<TaskRecord>) -> Hierarchy {
        let mut sheet = TaskSheet::new("Projeto");
        sheet.records = records;
        Hierarchy::build(&sheet, &Rules::default().compile().unwrap())
    }

    #[test]
    fn phases_are_cleaned_and_mapped() {
        let hierarchy = build(vec![
            TaskRecord::new("p1", "Bodoquena - Fase 1 - Planejamento").status("concluído"),
            TaskRecord::new("p2", "Fase 2 - Execução").status("NOVA FASE"),
            TaskRecord::new("p3", "Fase 3").status("EM ANDAMENTO"),
        ]);

        let phases = hierarchy.phases();
        assert_eq!(phases.len(), 3);
        assert_eq!(phases[0].name, "Fase 1 - Planejamento");
        assert_eq!(phases[0].status, PhaseStatus::Concluido);
        assert_eq!(phases[1].status, PhaseStatus::Nova);
        assert_eq!(phases[2].status, PhaseStatus::EmAndamento);
    }

    #[test]
    fn phase_dates_from_own_row() {
        let hierarchy = build(vec![TaskRecord::new("p1", "Fase 1")
            .starts(date(2026, 1, 10))
            .due(date(2026, 3, 5))]);

        assert_eq!(hierarchy.phases()[0].start, "2026-01");
        assert_eq!(hierarchy.phases()[0].end, "2026-03");
    }

    #[test]
    fn phase_dates_inferred_from_descendants() {
        let hierarchy = build(vec![
            TaskRecord::new("p1", "Fase 1").starts(date(2025, 12, 1)),
            TaskRecord::new("t1", "A").parent("p1").due(date(2026, 2, 10)),
            TaskRecord::new("t2", "B").parent("t1").due(date(2026, 4, 1)),
            TaskRecord::new("t3", "C").parent("p1").due(date(2026, 1, 20)),
            TaskRecord::new("t4", "D").parent("p1"),
            TaskRecord::new("p2", "Fase 2"),
        ]);

        let phases = hierarchy.phases();
        assert_eq!(phases[0].start, "2025-12");
        assert_eq!(phases[0].end, "2026-04");
        assert_eq!(phases[1].start, "");
        assert_eq!(phases[1].end, "");
    }

    #[test]
    fn sub_processes_only_from_immediate_children() {
        let hierarchy = build(vec![
            TaskRecord::new("p1", "Fase 1"),
            TaskRecord::new("t1", "Treinamento https://app.clickup.com/t/abc").parent("p1"),
            TaskRecord::new("t2", "Treinamento").parent("p1"),
            TaskRecord::new("t3", "Linha 1\nLinha 2").parent("p1"),
            TaskRecord::new("t4", "Neto").parent("t1"),
            TaskRecord::new("t5", "https://app.clickup.com/t/xyz").parent("p1"),
        ]);

        assert_eq!(
            hierarchy.phases()[0].sub_processes,
            vec!["Treinamento", "Linha 1 - Linha 2"]
        );
    }

    #[test]
    fn first_go_live_phase_wins() {
        let hierarchy = build(vec![
            TaskRecord::new("p1", "Fase 1 - Kickoff").starts(date(2026, 1, 1)),
            TaskRecord::new("p2", "Fase 4 - Go-Live")
                .starts(date(2026, 5, 4))
                .due(date(2026, 5, 30)),
            TaskRecord::new("p3", "Fase 5 - Produção").starts(date(2026, 6, 1)),
        ]);

        assert_eq!(hierarchy.go_live(), Some(date(2026, 5, 4)));
    }

    #[test]
    fn go_live_falls_back_to_due_date() {
        let hierarchy = build(vec![
            TaskRecord::new("p1", "FASE 3 - Início Produtivo").due(date(2026, 3, 20)),
        ]);
        assert_eq!(hierarchy.go_live(), Some(date(2026, 3, 20)));
    }

    #[test]
    fn undated_first_go_live_phase_blocks_later_matches() {
        let hierarchy = build(vec![
            TaskRecord::new("p1", "Fase 3 - Go-Live"),
            TaskRecord::new("p2", "Fase 4 - Go-Live").starts(date(2026, 5, 4)),
        ]);
        assert_eq!(hierarchy.go_live(), None);
    }

    #[test]
    fn go_live_needs_phase_marker() {
        let hierarchy = build(vec![
            TaskRecord::new("p1", "Go-Live").starts(date(2026, 5, 4)),
            TaskRecord::new("t1", "Fase de go-live").parent("p1").starts(date(2026, 5, 4)),
        ]);
        assert_eq!(hierarchy.go_live(), None);
    }

    #[test]
    fn top_level_phase_through_chain() {
        let hierarchy = build(vec![
            TaskRecord::new("p1", "Fase 1"),
            TaskRecord::new("t1", "A").parent("p1"),
            TaskRecord::new("t2", "B").parent("t1"),
            TaskRecord::new("t3", "C").parent("t2"),
            TaskRecord::new("t4", "D").parent("missing"),
        ]);

        assert_eq!(hierarchy.top_level_phase_id("t3"), Some("p1"));
        assert_eq!(hierarchy.top_level_phase_id("t1"), Some("p1"));
        assert_eq!(hierarchy.top_level_phase_id("t4"), None);
        assert_eq!(hierarchy.parent_of("t3"), Some("t2"));
    }

    #[test]
    fn parent_cycle_terminates() {
        let hierarchy = build(vec![
            TaskRecord::new("p1", "Fase 1"),
            TaskRecord::new("a", "A").parent("b").due(date(2026, 1, 5)),
            TaskRecord::new("b", "B").parent("a").due(date(2026, 2, 5)),
        ]);

        assert_eq!(hierarchy.top_level_phase_id("a"), None);
        assert_eq!(hierarchy.top_level_phase_id("b"), None);
        assert_eq!(hierarchy.tasks().len(), 2);
        assert_eq!(hierarchy.phases()[0].start, "");
    }

    #[test]
    fn repeated_phase_id_replaces_in_place() {
        let hierarchy = build(vec![
            TaskRecord::new("p1", "Fase 1"),
            TaskRecord::new("p2", "Fase 2"),
            TaskRecord::new("p1", "Fase 1 revisada"),
        ]);

        let names: Vec<_> = hierarchy.phases().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Fase 1 revisada", "Fase 2"]);
    }

    #[test]
    fn work_task_cutoffs() {
        let task = WorkTask {
            id: "t1".into(),
            parent_id: "p1".into(),
            name: "A".into(),
            due_date: Some(date(2026, 2, 15)),
            date_done: None,
            done: true,
        };
        assert!(!task.realized_by(date(2026, 2, 14)));
        assert!(task.realized_by(date(2026, 2, 15)));

        let early = WorkTask {
            date_done: Some(date(2026, 1, 3)),
            ..task.clone()
        };
        assert!(early.realized_by(date(2026, 1, 31)));
        assert!(!early.planned_by(date(2026, 1, 31)));

        let open = WorkTask { done: false, ..task };
        assert!(!open.realized_by(date(2030, 1, 1)));
    }
}
