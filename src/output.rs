//! Per-item outcomes and their user-facing messages
//!
//! Batch operations (run, import, delete) report one outcome per rule name
//! instead of stopping at the first problem.

use std::fmt;
use std::time::Duration;

/// Result of handling one rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Rule was appended to the store
    Added,

    /// Existing rule's command was replaced
    Updated,

    /// Incoming rule was identical to the stored one
    Unchanged,

    /// Overwrite was declined, stored rule kept
    Skipped,

    /// Rule was removed from the store
    Deleted,

    /// No rule with this name
    NotFound,

    /// Entry could not be used (bad name, undecodable command, no prompt answer)
    Rejected { reason: String },

    /// Command ran and exited successfully
    Succeeded { duration: Duration },

    /// Command could not start or exited unsuccessfully
    Failed { reason: String, duration: Duration },
}

impl Outcome {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Outcome::Rejected {
            reason: reason.into(),
        }
    }

    pub fn failed(reason: impl Into<String>, duration: Duration) -> Self {
        Outcome::Failed {
            reason: reason.into(),
            duration,
        }
    }

    /// Did a command fail to execute
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }

    /// Problems that are reported but do not fail the invocation
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Outcome::NotFound | Outcome::Rejected { .. } | Outcome::Failed { .. }
        )
    }

    /// Human-readable message about rule `name`
    pub fn message(&self, name: &str) -> String {
        match self {
            Outcome::Added => format!("Rule '{}' successfully added.", name),
            Outcome::Updated => format!("Rule '{}' successfully updated.", name),
            Outcome::Unchanged => format!("Rule '{}' is already up to date.", name),
            Outcome::Skipped => format!("Skipping rule '{}'.", name),
            Outcome::Deleted => format!("Rule '{}' successfully deleted.", name),
            Outcome::NotFound => format!("Error: rule '{}' not found.", name),
            Outcome::Rejected { reason } => format!("Error: rule '{}' rejected: {}", name, reason),
            Outcome::Succeeded { duration } => {
                format!("Rule '{}' finished in {:.2?}.", name, duration)
            }
            Outcome::Failed { reason, duration } => {
                format!("Error: rule '{}' failed after {:.2?}: {}", name, duration, reason)
            }
        }
    }
}

/// Ordered outcomes of a batch operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    items: Vec<(String, Outcome)>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, outcome: Outcome) {
        self.items.push((name.into(), outcome));
    }

    pub fn items(&self) -> &[(String, Outcome)] {
        &self.items
    }

    /// Outcome recorded for `name`, if any
    pub fn outcome(&self, name: &str) -> Option<&Outcome> {
        self.items
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, outcome)| outcome)
    }

    /// Number of items matching a predicate
    pub fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.items.iter().filter(|(_, o)| predicate(o)).count()
    }

    /// Whether any command failed to execute
    pub fn has_failures(&self) -> bool {
        self.items.iter().any(|(_, o)| o.is_failure())
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, outcome) in &self.items {
            writeln!(f, "{}", outcome.message(name))?;
        }
        Ok(())
    }
}
