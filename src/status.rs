//! Exit status codes for the CLI
//!
//! - 0: at least one input produced code
//! - 1: nothing could be generated (unparsable input, I/O or config errors)

use std::process::{ExitCode, Termination};

/// Exit status codes following standard Unix conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    /// Code was generated
    Success = 0,
    /// Nothing was generated
    Error = 1,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status as u8)
    }
}

impl Termination for ExitStatus {
    fn report(self) -> ExitCode {
        ExitCode::from(self as u8)
    }
}

impl ExitStatus {
    /// Success when at least one input unit was converted
    pub fn from_generated(count: usize) -> Self {
        if count > 0 {
            ExitStatus::Success
        } else {
            ExitStatus::Error
        }
    }
}
