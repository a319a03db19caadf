//! Exit codes
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | Success: at least one file produced a report |
//! | 1 | Failure: every file failed, or a fatal error (bad rules, unwritable output) |
//! | 2 | Usage error (reported by clap before any file is read) |

use std::process;

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// At least one report was produced
    Success = 0,
    /// Nothing was produced
    Failure = 1,
}

impl ExitCode {
    /// A batch succeeds when any file in it succeeds
    pub fn from_report_count(count: usize) -> Self {
        if count > 0 {
            ExitCode::Success
        } else {
            ExitCode::Failure
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Success)
    }

    /// Get the numeric value
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code as u8)
    }
}
