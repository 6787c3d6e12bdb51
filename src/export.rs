//! Exporting rules as a shareable block file
//!
//! The file format is the one [`crate::parser::block`] reads back on import.

use crate::error::{Error, Result};
use crate::output::Outcome;
use crate::parser::block;
use crate::prompt::Terminal;
use crate::rules::Rule;
use crate::store::RuleStore;

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Rules picked for export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Found rules, in the order they were asked for
    pub rules: Vec<Rule>,

    /// Requested names with no stored rule
    pub missing: Vec<String>,
}

/// Pick rules by name; an empty list selects every rule in store order
pub fn select(store: &RuleStore, names: &[String]) -> Result<Selection> {
    let all = store.list()?;
    if names.is_empty() {
        return Ok(Selection {
            rules: all,
            missing: Vec::new(),
        });
    }

    let mut selection = Selection::default();
    for name in names {
        match all.iter().find(|r| &r.name == name) {
            Some(rule) if !selection.rules.contains(rule) => selection.rules.push(rule.clone()),
            Some(_) => {}
            None => selection.missing.push(name.clone()),
        }
    }
    Ok(selection)
}

/// Write `text` to `<dir>/<file_name>`; `dir` must already exist
pub fn write_to_dir(dir: &Path, file_name: &str, text: &str) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(Error::io(
            format!("Cannot export to {}", dir.display()),
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    let target = dir.join(file_name);
    std::fs::write(&target, text)
        .map_err(|e| Error::io(format!("Failed to write {}", target.display()), e))?;

    tracing::debug!(path = %target.display(), "rules exported");
    Ok(target)
}

/// Result of an interactive export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exported {
    pub path: PathBuf,
    pub count: usize,
}

/// Ask which rules to export, an optional comment and the target directory,
/// then write the file. Returns `None` when the store is empty.
pub fn interactive<R: BufRead, W: Write>(
    store: &RuleStore,
    terminal: &mut Terminal<R, W>,
    file_name: &str,
    home: &Path,
) -> Result<Option<Exported>> {
    let prompt_error = |e| Error::io("Export prompt failed", e);

    if store.list()?.is_empty() {
        terminal
            .say("No rules have been created in Baby yet.")
            .map_err(prompt_error)?;
        return Ok(None);
    }

    let selection = loop {
        let answer = terminal
            .ask("Which rule(s) do you want to export? Leave blank to export all: ")
            .map_err(prompt_error)?;

        let Some(names) = shlex::split(&answer) else {
            terminal
                .say("Could not read that list, check the quotes.")
                .map_err(prompt_error)?;
            continue;
        };

        let selection = select(store, &names)?;
        if selection.missing.is_empty() {
            break selection;
        }
        for name in &selection.missing {
            terminal
                .say(&Outcome::NotFound.message(name))
                .map_err(prompt_error)?;
        }
    };

    let comment = terminal
        .ask("Do you want to add a comment? Leave blank to continue: ")
        .map_err(prompt_error)?;

    let dir = loop {
        let answer = terminal
            .ask(&format!("Where do you want to store your file? Leave blank for {}: ", home.display()))
            .map_err(prompt_error)?;
        let answer = answer.trim();

        let dir = if answer.is_empty() {
            home.to_path_buf()
        } else {
            crate::config::Config::expand_path(answer)
        };
        if dir.is_dir() {
            break dir;
        }
        terminal
            .say("Location not found or not a directory.")
            .map_err(prompt_error)?;
    };

    let text = block::render(&selection.rules, Some(comment.as_str()));
    let path = write_to_dir(&dir, file_name, &text)?;

    Ok(Some(Exported {
        path,
        count: selection.rules.len(),
    }))
}
