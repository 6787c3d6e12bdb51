//! Import merging
//!
//! Reconciles an incoming rule set with the store: new rules are appended
//! in import order, identical ones are left alone and differing ones are
//! overwritten only when the resolver agrees.

use crate::error::Result;
use crate::output::{Outcome, Report};
use crate::parser::block::{self, Rejected};
use crate::prompt::{Conflict, ConflictResolver, Resolution};
use crate::rules::Rule;
use crate::store::{Document, Line, RuleStore};

/// What to do with one incoming rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Planned {
    pub rule: Rule,
    pub outcome: Outcome,

    /// Stored command the decision was made against, `None` if absent
    pub seen: Option<String>,
}

/// Decide the fate of each incoming rule against `existing`.
///
/// Only conflicting rules reach the resolver.
pub fn plan(incoming: &[Rule], existing: &Document, resolver: &mut dyn ConflictResolver) -> Vec<Planned> {
    incoming
        .iter()
        .map(|rule| {
            let seen = existing.find(&rule.name).and_then(Line::stored_command);
            let outcome = match seen {
                None => Outcome::Added,
                Some(stored) if stored == rule.command => Outcome::Unchanged,
                Some(stored) => {
                    let conflict = Conflict {
                        name: &rule.name,
                        existing: stored,
                        incoming: &rule.command,
                    };
                    match resolver.resolve(&conflict) {
                        Resolution::Overwrite => Outcome::Updated,
                        Resolution::Keep => Outcome::Skipped,
                    }
                }
            };
            Planned {
                rule: rule.clone(),
                outcome,
                seen: seen.map(String::from),
            }
        })
        .collect()
}

/// Apply a plan to a document. Existing rules keep their position.
///
/// Each entry is checked against `doc` again: if the stored command no
/// longer matches what the decision was made against, nothing is written
/// for that rule and it is reported as unchanged or skipped. Returns the
/// outcomes actually applied.
pub fn apply(plan: Vec<Planned>, doc: &mut Document) -> Vec<Planned> {
    plan.into_iter()
        .map(|mut planned| {
            let current = doc
                .find(&planned.rule.name)
                .and_then(Line::stored_command)
                .map(String::from);

            if current != planned.seen {
                let outcome = if current.as_deref() == Some(planned.rule.command.as_str()) {
                    Outcome::Unchanged
                } else {
                    Outcome::Skipped
                };
                tracing::warn!(
                    rule = %planned.rule.name,
                    planned = ?planned.outcome,
                    ?outcome,
                    "rule changed during import, not overwriting"
                );
                planned.outcome = outcome;
                planned.seen = current;
                return planned;
            }

            if matches!(planned.outcome, Outcome::Added | Outcome::Updated) {
                doc.upsert(planned.rule.clone());
            }
            planned
        })
        .collect()
}

/// Merge extracted rules into the store
pub struct ImportMerger<'a> {
    store: &'a RuleStore,
}

impl<'a> ImportMerger<'a> {
    pub fn new(store: &'a RuleStore) -> Self {
        Self { store }
    }

    /// Extract rules from `text` and merge them. Entries that cannot be
    /// used are reported as rejected and do not stop the import.
    pub fn import_text(&self, text: &str, resolver: &mut dyn ConflictResolver) -> Result<Report> {
        let extracted = block::extract(text);
        let mut report = self.merge(&extracted.rules, resolver)?;
        for Rejected { name, reason } in extracted.rejected {
            tracing::warn!(rule = %name, %reason, "skipping malformed import entry");
            report.push(name, Outcome::rejected(reason));
        }
        Ok(report)
    }

    /// Merge `incoming` into the store.
    ///
    /// Decisions are made against an unlocked snapshot so prompts do not
    /// hold the store lock; the plan is then applied to the locked, freshly
    /// loaded document in a single commit.
    pub fn merge(&self, incoming: &[Rule], resolver: &mut dyn ConflictResolver) -> Result<Report> {
        let snapshot = self.store.load()?;
        let planned = plan(incoming, &snapshot, resolver);

        let applied = self.store.transact(|doc| Ok(apply(planned, doc)))?;

        let mut report = Report::new();
        for Planned { rule, outcome, .. } in applied {
            report.push(rule.name, outcome);
        }
        Ok(report)
    }
}
