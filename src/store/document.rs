//! In-memory view of the store file
//!
//! Mutations are applied to an ordered list of lines and serialized only
//! when the store commits, so lines that are not rules (comments, blanks,
//! hand-edited junk) keep their place across rewrites.

use super::codec;
use crate::rules::Rule;

/// One line of the store file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// A well-formed rule line
    Rule(Rule),

    /// Rule-shaped line whose command fails to decode
    Broken {
        name: String,
        raw: String,
        reason: String,
    },

    /// Comment, blank or otherwise unrecognised line
    Other(String),
}

impl Line {
    /// Name of the rule this line defines, if any
    pub fn name(&self) -> Option<&str> {
        match self {
            Line::Rule(rule) => Some(&rule.name),
            Line::Broken { name, .. } => Some(name),
            Line::Other(_) => None,
        }
    }

    /// Command text of the line: decoded for rules, the raw line when broken
    pub fn stored_command(&self) -> Option<&str> {
        match self {
            Line::Rule(rule) => Some(&rule.command),
            Line::Broken { raw, .. } => Some(raw),
            Line::Other(_) => None,
        }
    }

    fn render(&self) -> String {
        match self {
            Line::Rule(rule) => codec::encode_line(rule),
            Line::Broken { raw, .. } => raw.clone(),
            Line::Other(raw) => raw.clone(),
        }
    }
}

/// Ordered contents of a store file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    lines: Vec<Line>,
}

impl Document {
    /// Parse file contents
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.lines().map(codec::decode_line).collect(),
        }
    }

    /// Serialize back to file contents
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.render());
            out.push('\n');
        }
        out
    }

    /// All lines in file order
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Well-formed rules in file order
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.lines.iter().filter_map(|line| match line {
            Line::Rule(rule) => Some(rule),
            _ => None,
        })
    }

    /// First line defining `name`
    pub fn find(&self, name: &str) -> Option<&Line> {
        self.lines.iter().find(|line| line.name() == Some(name))
    }

    /// Index of the first line defining `name`
    pub fn position(&self, name: &str) -> Option<usize> {
        self.lines.iter().position(|line| line.name() == Some(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Append a rule at the end
    pub fn push(&mut self, rule: Rule) {
        self.lines.push(Line::Rule(rule));
    }

    /// Replace the first line defining `rule.name` in place.
    /// Returns false if there is no such line.
    pub fn replace(&mut self, rule: Rule) -> bool {
        match self.position(&rule.name) {
            Some(idx) => {
                self.lines[idx] = Line::Rule(rule);
                true
            }
            None => false,
        }
    }

    /// Replace in place or append. Returns true if an existing line was replaced.
    pub fn upsert(&mut self, rule: Rule) -> bool {
        match self.position(&rule.name) {
            Some(idx) => {
                self.lines[idx] = Line::Rule(rule);
                true
            }
            None => {
                self.push(rule);
                false
            }
        }
    }

    /// Remove the first line defining `name`, keeping the order of the rest
    pub fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(idx) => {
                self.lines.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Drop every line
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
