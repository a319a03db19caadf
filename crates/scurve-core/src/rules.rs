//! Business rule table
//!
//! Every string-pattern rule the report applies lives here as an ordered list
//! of literals. Matching is purely literal: no pattern infers anything beyond
//! the text it names.
//!
//! | Rule                  | Applied to        | Effect                                      |
//! |-----------------------|-------------------|---------------------------------------------|
//! | `phase_name_prefixes` | phase names       | `"<prefix> - "` removed, case-insensitive   |
//! | `go_live_marker`      | phase names       | must be present for go-live detection       |
//! | `go_live_phrases`     | phase names       | at least one must be present                |
//! | `tracker_url_prefix`  | task names        | URLs starting with it are removed           |
//! | `scrubbed_names`      | task names        | removed verbatim                            |
//! | `done_status`         | statuses          | a task is done iff its status equals it     |
//! | `new_status_marker`   | phase statuses    | marks a phase as `Nova`                     |
//!
//! The defaults reproduce the built-in table. A TOML file may override any
//! key; keys it omits keep their defaults:
//!
//! ```toml
//! phase_name_prefixes = ["Monte Cristo", "Bodoquena"]
//! scrubbed_names = []
//! ```

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{PhaseStatus, ReportError};

/// Pattern table, as configured
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Project/site names stripped from phase names
    pub phase_name_prefixes: Vec<String>,
    /// Word every go-live phase name contains
    pub go_live_marker: String,
    /// Phrases of which a go-live phase name contains at least one
    pub go_live_phrases: Vec<String>,
    /// Start of tracker URLs embedded in task names; empty disables scrubbing
    pub tracker_url_prefix: String,
    /// Literal names removed from task display names
    pub scrubbed_names: Vec<String>,
    /// Status text of a finished task
    pub done_status: String,
    /// Status fragment of a phase that has not started
    pub new_status_marker: String,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            phase_name_prefixes: vec![
                "Monte Cristo".into(),
                "Bodoquena".into(),
                "Pomar Agrícola".into(),
            ],
            go_live_marker: "fase".into(),
            go_live_phrases: vec![
                "go-live".into(),
                "início produtivo".into(),
                "produção".into(),
            ],
            tracker_url_prefix: "https://app.clickup.com".into(),
            scrubbed_names: vec!["Yago Rocha da Luz".into()],
            done_status: "CONCLUÍDO".into(),
            new_status_marker: "NOVA".into(),
        }
    }
}

impl Rules {
    /// Parse a TOML override table
    pub fn from_toml_str(input: &str) -> Result<Self, ReportError> {
        toml::from_str(input).map_err(|e| ReportError::Rules(e.to_string()))
    }

    /// Load a TOML override file
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ReportError::Rules(format!("{}: {e}", path.display())))?;
        let rules = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "loaded rule overrides");
        Ok(rules)
    }

    /// Build the matchers for one processing pass
    pub fn compile(&self) -> Result<CompiledRules, ReportError> {
        let prefix_patterns = self
            .phase_name_prefixes
            .iter()
            .filter(|p| !p.trim().is_empty())
            .map(|p| Regex::new(&format!(r"(?i){}\s*-\s*", regex::escape(p))))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ReportError::Rules(e.to_string()))?;

        let tracker_url = if self.tracker_url_prefix.is_empty() {
            None
        } else {
            let pattern = format!(r"{}\S+", regex::escape(&self.tracker_url_prefix));
            Some(Regex::new(&pattern).map_err(|e| ReportError::Rules(e.to_string()))?)
        };

        Ok(CompiledRules {
            go_live_marker: self.go_live_marker.to_lowercase(),
            go_live_phrases: self.go_live_phrases.iter().map(|p| p.to_lowercase()).collect(),
            done_status: self.done_status.to_uppercase(),
            new_status_marker: self.new_status_marker.to_uppercase(),
            scrubbed_names: self.scrubbed_names.clone(),
            prefix_patterns,
            tracker_url,
        })
    }
}

/// Rules ready to apply
#[derive(Clone, Debug)]
pub struct CompiledRules {
    go_live_marker: String,
    go_live_phrases: Vec<String>,
    done_status: String,
    new_status_marker: String,
    scrubbed_names: Vec<String>,
    prefix_patterns: Vec<Regex>,
    tracker_url: Option<Regex>,
}

impl CompiledRules {
    /// Strip project/site prefixes from a phase name
    pub fn clean_phase_name(&self, raw: &str) -> String {
        let mut name = raw.to_string();
        for pattern in &self.prefix_patterns {
            name = pattern.replace_all(&name, "").into_owned();
        }
        name.trim().to_string()
    }

    /// Display name of a task: tracker URLs and scrubbed names removed,
    /// newlines flattened to `" - "`.
    pub fn clean_task_name(&self, raw: &str) -> String {
        let mut name = match &self.tracker_url {
            Some(url) => url.replace_all(raw, "").into_owned(),
            None => raw.to_string(),
        };
        for scrubbed in self.scrubbed_names.iter().filter(|n| !n.is_empty()) {
            name = name.replace(scrubbed.as_str(), "");
        }
        name.replace('\n', " - ").trim().to_string()
    }

    /// Whether a phase name marks the go-live phase
    pub fn is_go_live_phase(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        lower.contains(&self.go_live_marker)
            && self.go_live_phrases.iter().any(|p| lower.contains(p.as_str()))
    }

    /// Map raw phase status text onto the three display states
    pub fn phase_status(&self, raw: &str) -> PhaseStatus {
        let upper = raw.to_uppercase();
        if upper.contains(&self.done_status) {
            PhaseStatus::Concluido
        } else if upper.contains(&self.new_status_marker) {
            PhaseStatus::Nova
        } else {
            PhaseStatus::EmAndamento
        }
    }

    /// A task is done iff its status equals the done status, ignoring case
    pub fn is_done(&self, status: &str) -> bool {
        status.to_uppercase() == self.done_status
    }
}
