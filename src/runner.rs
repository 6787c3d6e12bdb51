//! Running rules by name
//!
//! Each requested name goes through resolve, expand, execute and record
//! exactly once. A missing rule or a failing command is reported for that
//! name and the batch carries on; only an unreadable store stops it.

use crate::audit::{AuditLogger, EventKind};
use crate::error::{Error, Result};
use crate::executor::CommandExecutor;
use crate::output::{Outcome, Report};
use crate::parser::placeholder::{self, Bindings};
use crate::prompt::ValueSource;
use crate::store::RuleStore;

use serde_json::json;
use std::time::Instant;

/// Resolves, expands and executes rules in order
pub struct Runner<'a, E> {
    store: &'a RuleStore,
    executor: E,
    audit: &'a mut AuditLogger,
    announce: bool,
}

impl<'a, E: CommandExecutor> Runner<'a, E> {
    pub fn new(store: &'a RuleStore, executor: E, audit: &'a mut AuditLogger) -> Self {
        Self {
            store,
            executor,
            audit,
            announce: false,
        }
    }

    /// Print each expanded command to stderr before running it
    pub fn announce(mut self, announce: bool) -> Self {
        self.announce = announce;
        self
    }

    /// Run every name in order and report one outcome per name
    pub fn run(
        &mut self,
        names: &[String],
        bindings: &Bindings,
        values: &mut dyn ValueSource,
    ) -> Result<Report> {
        let mut report = Report::new();
        for name in names {
            let outcome = self.run_one(name, bindings, values)?;
            report.push(name.as_str(), outcome);
        }
        Ok(report)
    }

    fn run_one(
        &mut self,
        name: &str,
        bindings: &Bindings,
        values: &mut dyn ValueSource,
    ) -> Result<Outcome> {
        let rule = match self.store.get(name) {
            Ok(rule) => rule,
            Err(Error::NotFound(_)) => {
                self.audit
                    .record(EventKind::RuleNotFound, json!({ "rule": name }));
                return Ok(Outcome::NotFound);
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => return Ok(Outcome::rejected(e.to_string())),
        };

        let command = match placeholder::expand(&rule.command, bindings, values) {
            Ok(command) => command,
            Err(e) => {
                tracing::warn!(rule = %name, error = %e, "placeholder prompt failed");
                return Ok(Outcome::rejected(format!("missing placeholder value: {}", e)));
            }
        };

        if self.announce {
            println!("Executing: {}", command);
        }

        let started = Instant::now();
        let result = self.executor.execute(&command);
        let duration = started.elapsed();

        // The template is logged, not the expansion, so typed values stay out of the log
        let outcome = match result {
            Ok(exit) if exit.success => {
                self.audit.record(
                    EventKind::CommandSucceeded,
                    json!({
                        "rule": name,
                        "command": rule.command,
                        "duration_ms": duration.as_millis() as u64,
                    }),
                );
                Outcome::Succeeded { duration }
            }
            Ok(exit) => {
                self.audit.record(
                    EventKind::CommandFailed,
                    json!({
                        "rule": name,
                        "command": rule.command,
                        "duration_ms": duration.as_millis() as u64,
                        "exit_code": exit.code,
                    }),
                );
                Outcome::failed(exit.describe(), duration)
            }
            Err(e) => {
                self.audit.record(
                    EventKind::CommandFailed,
                    json!({
                        "rule": name,
                        "command": rule.command,
                        "error": e.to_string(),
                    }),
                );
                Outcome::failed(format!("could not start command: {}", e), duration)
            }
        };

        tracing::debug!(rule = %name, ?outcome, "rule finished");
        Ok(outcome)
    }
}
