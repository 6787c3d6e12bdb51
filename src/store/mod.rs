//! Persistent rule store
//!
//! Rules live in a plain text file, one `<name> = <command>` per line.
//! Reads are lock-free. Every mutation runs through [`RuleStore::transact`],
//! which holds an exclusive lock on a sidecar file for the whole
//! read-modify-write and commits by atomically replacing the store file, so
//! concurrent invocations never interleave and readers never see a torn
//! line.

pub mod codec;
pub mod document;
pub mod lock;

pub use document::{Document, Line};

use crate::error::{Error, Result};
use crate::output::Outcome;
use crate::prompt::{Conflict, ConflictResolver, Resolution};
use crate::rules::Rule;

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use lock::StoreLock;

/// Rule store backed by a text file
#[derive(Debug, Clone)]
pub struct RuleStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl RuleStore {
    /// Open the store at `path`, creating an empty file (and its parent
    /// directories) if it does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                Error::io(format!("Failed to create directory {}", parent.display()), e)
            })?;
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| Error::io(format!("Failed to open {}", path.display()), e))?;

        Ok(Self {
            lock_path: lock::lock_path(&path),
            path,
        })
    }

    /// Location of the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current file contents; a missing file is an empty store
    pub fn load(&self) -> Result<Document> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Document::parse(&text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Document::default()),
            Err(e) => Err(Error::io(
                format!("Failed to read {}", self.path.display()),
                e,
            )),
        }
    }

    /// All decodable rules in file order
    pub fn list(&self) -> Result<Vec<Rule>> {
        let doc = self.load()?;

        for line in doc.lines() {
            if let Line::Broken { name, reason, .. } = line {
                tracing::warn!(rule = %name, %reason, "skipping undecodable rule line");
            }
        }

        Ok(doc.rules().cloned().collect())
    }

    /// Look up a rule by exact name
    pub fn get(&self, name: &str) -> Result<Rule> {
        match self.load()?.find(name) {
            Some(Line::Rule(rule)) => Ok(rule.clone()),
            Some(Line::Broken { reason, .. }) => Err(Error::Malformed(format!(
                "stored rule '{}' cannot be decoded: {}",
                name, reason
            ))),
            _ => Err(Error::NotFound(name.to_string())),
        }
    }

    /// Whether a rule with this name is stored. Unreadable stores have no rules.
    pub fn exists(&self, name: &str) -> bool {
        self.load().map(|doc| doc.contains(name)).unwrap_or(false)
    }

    /// Create a rule, asking `resolver` before replacing an existing one.
    ///
    /// Returns [`Outcome::Added`] or [`Outcome::Updated`]; a declined
    /// overwrite is [`Error::Conflict`] and leaves the store untouched.
    pub fn create(&self, rule: Rule, resolver: &mut dyn ConflictResolver) -> Result<Outcome> {
        rule.validate()?;

        // Ask before locking so a slow answer does not block other writers
        let snapshot = self.load()?;
        let approved = match snapshot.find(&rule.name).and_then(Line::stored_command) {
            Some(existing) => {
                let conflict = Conflict {
                    name: &rule.name,
                    existing,
                    incoming: &rule.command,
                };
                if resolver.resolve(&conflict) != Resolution::Overwrite {
                    return Err(Error::Conflict(rule.name));
                }
                true
            }
            None => false,
        };

        let name = rule.name.clone();
        let outcome = self.transact(move |doc| {
            if !doc.contains(&rule.name) {
                doc.push(rule);
                Ok(Outcome::Added)
            } else if approved {
                doc.replace(rule);
                Ok(Outcome::Updated)
            } else {
                Err(Error::Conflict(rule.name))
            }
        })?;

        tracing::debug!(rule = %name, ?outcome, "rule created");
        Ok(outcome)
    }

    /// Replace the command of an existing rule, keeping its position
    pub fn update(&self, rule: Rule) -> Result<()> {
        rule.validate()?;
        self.transact(|doc| {
            let name = rule.name.clone();
            if doc.replace(rule) {
                Ok(())
            } else {
                Err(Error::NotFound(name))
            }
        })
    }

    /// Remove a rule, keeping the order of the others
    pub fn delete(&self, name: &str) -> Result<()> {
        self.transact(|doc| {
            if doc.remove(name) {
                Ok(())
            } else {
                Err(Error::NotFound(name.to_string()))
            }
        })
    }

    /// Empty the store. Callers confirm with the user first.
    pub fn delete_all(&self) -> Result<()> {
        self.transact(|doc| {
            doc.clear();
            Ok(())
        })
    }

    /// Run `f` on the current contents under the store lock and commit the
    /// result. Nothing is written if `f` fails or leaves the document as it was.
    pub fn transact<T>(&self, f: impl FnOnce(&mut Document) -> Result<T>) -> Result<T> {
        let _lock = StoreLock::acquire(&self.lock_path).map_err(|e| {
            Error::io(format!("Failed to lock {}", self.lock_path.display()), e)
        })?;

        let mut doc = self.load()?;
        let before = doc.clone();
        let value = f(&mut doc)?;

        if doc != before {
            lock::write_atomic(&self.path, &doc.render()).map_err(|e| {
                Error::io(format!("Failed to write {}", self.path.display()), e)
            })?;
        }

        Ok(value)
    }
}
