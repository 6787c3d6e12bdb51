//! Placeholder ("bottle") expansion
//!
//! A command may contain gaps written as `b%('<label>')%b`. At run time each
//! gap is replaced by the value bound to its label on the command line, or
//! by an answer typed at the prompt when there is no binding.

use crate::error::{Error, Result};
use crate::prompt::ValueSource;

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::io;

/// Placeholder pattern; the label is capture group 1 and never contains `'`
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"b%\('([^']+)'\)%b").expect("placeholder pattern is valid"));

/// Prefix of a binding argument on the command line
pub const BINDING_PREFIX: &str = "-b=";

/// Values supplied up front for placeholder labels
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    values: HashMap<String, String>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `label` to `value`, replacing any earlier binding
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.values.insert(label.into(), value.into());
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.values.get(label).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse a `label:value` pair (the part after `-b=`).
    /// The value may be empty and may itself contain `:`.
    pub fn parse_pair(pair: &str) -> Result<(String, String)> {
        match pair.split_once(':') {
            Some((label, value)) if !label.is_empty() => {
                Ok((label.to_string(), value.to_string()))
            }
            _ => Err(Error::Malformed(format!(
                "binding '{}' must look like label:value",
                pair
            ))),
        }
    }

    /// Add a binding from a `-b=label:value` argument
    pub fn add_arg(&mut self, arg: &str) -> Result<()> {
        let pair = arg.strip_prefix(BINDING_PREFIX).unwrap_or(arg);
        let (label, value) = Self::parse_pair(pair)?;
        self.insert(label, value);
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bindings = Bindings::new();
        for (label, value) in iter {
            bindings.insert(label, value);
        }
        bindings
    }
}

/// Labels of every placeholder in `command`, in order, repeats included
pub fn labels(command: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(command)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Replace every placeholder in `command`.
///
/// Bound labels take their binding; each unbound occurrence asks `source`
/// separately. Substituted values are never scanned again.
pub fn expand(command: &str, bindings: &Bindings, source: &mut dyn ValueSource) -> io::Result<String> {
    let mut out = String::with_capacity(command.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(command) {
        let (Some(whole), Some(label)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        out.push_str(&command[last..whole.start()]);
        match bindings.get(label.as_str()) {
            Some(value) => out.push_str(value),
            None => out.push_str(&source.value_for(label.as_str())?),
        }
        last = whole.end();
    }

    out.push_str(&command[last..]);
    Ok(out)
}
