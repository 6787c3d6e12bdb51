//! JSONL audit logging for baby
//!
//! Records every store mutation and command execution to a JSONL file for
//! later review. The log is append-only; a broken log never blocks the
//! operation being recorded.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::env;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Kind of event being recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    RuleCreated,
    RuleUpdated,
    RuleDeleted,
    RulesCleared,
    RulesImported,
    RulesExported,
    CommandSucceeded,
    CommandFailed,
    RuleNotFound,
}

/// An audit log entry
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    /// When the event happened
    pub timestamp: DateTime<Utc>,

    pub event_kind: EventKind,

    /// User running the command
    pub actor: String,

    /// Client address of the SSH session, or `local`
    pub source_address: String,

    /// Event-specific fields (rule name, command, duration, ...)
    pub details: Value,
}

/// Who is acting and from where, resolved once per process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub actor: String,
    pub source_address: String,
}

impl Identity {
    /// Read the identity from the environment
    pub fn from_env() -> Self {
        let actor = env::var("USER")
            .or_else(|_| env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string());

        let source_address = env::var("SSH_CLIENT")
            .ok()
            .and_then(|client| client.split_whitespace().next().map(String::from))
            .unwrap_or_else(|| "local".to_string());

        Self {
            actor,
            source_address,
        }
    }
}

/// Audit logger
pub struct AuditLogger {
    writer: Option<BufWriter<File>>,
    identity: Identity,
}

impl AuditLogger {
    /// Create a new audit logger; `None` or an unopenable path disables it
    pub fn new(path: Option<&Path>) -> Self {
        let writer = path.and_then(|p| {
            // Ensure parent directory exists
            if let Some(parent) = p.parent() {
                let _ = std::fs::create_dir_all(parent);
            }

            match OpenOptions::new().create(true).append(true).open(p) {
                Ok(file) => Some(BufWriter::new(file)),
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "audit log unavailable");
                    None
                }
            }
        });

        Self {
            writer,
            identity: Identity::from_env(),
        }
    }

    /// Use a fixed identity instead of the environment's
    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = identity;
        self
    }

    /// Build an event stamped with the current time and this logger's identity
    pub fn event(&self, event_kind: EventKind, details: Value) -> AuditEvent {
        AuditEvent {
            timestamp: Utc::now(),
            event_kind,
            actor: self.identity.actor.clone(),
            source_address: self.identity.source_address.clone(),
            details,
        }
    }

    /// Write an audit event
    pub fn log(&mut self, event: &AuditEvent) -> Result<(), std::io::Error> {
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(event)?;
            writeln!(writer, "{}", json)?;
            writer.flush()?;
        }
        Ok(())
    }

    /// Record an event, downgrading write failures to a warning
    pub fn record(&mut self, event_kind: EventKind, details: Value) {
        let event = self.event(event_kind, details);
        if let Err(e) = self.log(&event) {
            tracing::warn!(error = %e, kind = ?event_kind, "failed to write audit log");
        }
    }

    /// Check if logging is enabled
    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }
}

/// Create a disabled logger (for when audit logging is off)
impl Default for AuditLogger {
    fn default() -> Self {
        Self {
            writer: None,
            identity: Identity::from_env(),
        }
    }
}
