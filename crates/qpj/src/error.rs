//! QPJ error taxonomy, following `ksvc_core::error::KsvcError` /
//! `gvthread_core::error::SchedError`: a plain enum with a hand-written
//! `Display`, no external error crate.
//!
//! Per `spec.md` §7, `NoGroup` is the only case that is actually surfaced
//! as a `Result::Err` — `SlotBusy`, `Inactive`, and `Contended` are encoded
//! directly in return values (a silent no-op, `PollOutcome::Done`, and
//! `PollOutcome::Keep` respectively) because forcing every caller to match
//! on an error for routine, expected outcomes is exactly what `spec.md`
//! says to avoid.

use core::fmt;

/// Result type for QPJ operations.
pub type Result<T> = core::result::Result<T, QpjError>;

/// Errors QPJ can actually return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QpjError {
    /// [`crate::group::reserve_group`] has already handed out `G_MAX` groups.
    NoGroup,
}

impl fmt::Display for QpjError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QpjError::NoGroup => write!(f, "no poll-job groups remain (G_MAX exhausted)"),
        }
    }
}

impl std::error::Error for QpjError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_human_readable() {
        assert_eq!(
            QpjError::NoGroup.to_string(),
            "no poll-job groups remain (G_MAX exhausted)"
        );
    }
}
