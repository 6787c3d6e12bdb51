//! Rule records and name validation
//!
//! A rule binds a short name to a shell command string.

pub mod reserved;

use crate::error::{Error, Result};
use serde::Serialize;

/// A named, stored shell command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    /// Name used to invoke the rule (unique within a store)
    pub name: String,

    /// Command passed to the shell, may contain placeholders
    pub command: String,
}

impl Rule {
    /// Create a new rule without validating it
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
        }
    }

    /// Check the name and command invariants required before storing
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        if self.command.trim().is_empty() {
            return Err(Error::invalid_rule(&self.name, "command is empty"));
        }
        Ok(())
    }
}

/// Check that a name can be stored and invoked from the command line
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_rule(name, "name is empty"));
    }

    if reserved::is_reserved(name) {
        return Err(Error::Reserved(name.to_string()));
    }

    if name.contains('=') {
        return Err(Error::invalid_rule(name, "name contains '='"));
    }

    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(Error::invalid_rule(
            name,
            "name contains whitespace or control characters",
        ));
    }

    if name.starts_with('-') {
        return Err(Error::invalid_rule(name, "name starts with '-'"));
    }

    Ok(())
}
