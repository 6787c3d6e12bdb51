//! baby - personal command-alias manager
//!
//! Stores shell commands as named rules in a plain text file and runs them
//! by name, with interactive placeholders and shareable import/export blocks.
//!
//! # Features
//!
//! - **Rule store**: one `<name> = <command>` line per rule, rewritten under an exclusive lock
//! - **Placeholders**: `b%('label')%b` values bound with `-b=label:value` or prompted at run time
//! - **Import/export**: `b:<name> = <command>:b` blocks from files or URLs, merged with confirmation
//! - **Audit logging**: JSONL log of every mutation and execution
//!
//! # Example
//!
//! ```
//! use baby::{Always, Resolution, Rule, RuleStore};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let store = RuleStore::open(dir.path().join("baby.conf")).unwrap();
//!
//! store
//!     .create(Rule::new("update", "apt update -y"), &mut Always(Resolution::Keep))
//!     .unwrap();
//!
//! assert_eq!(store.get("update").unwrap().command, "apt update -y");
//! ```

pub mod audit;
pub mod config;
pub mod error;
pub mod executor;
pub mod export;
pub mod merge;
pub mod output;
pub mod parser;
pub mod prompt;
pub mod rules;
pub mod runner;
pub mod source;
pub mod store;

// Re-exports for convenience
pub use audit::{AuditLogger, EventKind};
pub use config::Config;
pub use error::{Error, Result};
pub use executor::{CommandExecutor, ExitReport, ShellExecutor};
pub use merge::ImportMerger;
pub use output::{Outcome, Report};
pub use parser::placeholder::Bindings;
pub use prompt::{Always, Conflict, ConflictResolver, Resolution, Terminal, ValueSource};
pub use rules::Rule;
pub use runner::Runner;
pub use source::ImportSource;
pub use store::RuleStore;
