//! Interactive decisions the core depends on
//!
//! Overwrite confirmations and placeholder values come from a human at the
//! terminal in the CLI, and from closures or fixed answers in tests.

use std::io::{self, BufRead, StdinLock, Stdout, Write};

/// An incoming rule collides with a stored one
#[derive(Debug, Clone, Copy)]
pub struct Conflict<'a> {
    pub name: &'a str,
    pub existing: &'a str,
    pub incoming: &'a str,
}

/// Answer to a [`Conflict`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Overwrite,
    Keep,
}

/// Decides whether a stored rule may be replaced
pub trait ConflictResolver {
    fn resolve(&mut self, conflict: &Conflict<'_>) -> Resolution;
}

impl<F> ConflictResolver for F
where
    F: FnMut(&Conflict<'_>) -> Resolution,
{
    fn resolve(&mut self, conflict: &Conflict<'_>) -> Resolution {
        self(conflict)
    }
}

/// Gives the same answer to every conflict
#[derive(Debug, Clone, Copy)]
pub struct Always(pub Resolution);

impl ConflictResolver for Always {
    fn resolve(&mut self, _conflict: &Conflict<'_>) -> Resolution {
        self.0
    }
}

/// Supplies values for placeholders that have no binding
pub trait ValueSource {
    fn value_for(&mut self, label: &str) -> io::Result<String>;
}

impl<F> ValueSource for F
where
    F: FnMut(&str) -> io::Result<String>,
{
    fn value_for(&mut self, label: &str) -> io::Result<String> {
        self(label)
    }
}

/// Line-based prompts over a reader/writer pair
pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl Terminal<StdinLock<'static>, Stdout> {
    /// Prompt on the process's stdin/stdout
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print a question and read one line, without its line ending
    pub fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no more input to answer the prompt",
            ));
        }

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }

    /// Ask a yes/no question; only `y` or `yes` count as yes
    pub fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let answer = self.ask(question)?;
        Ok(matches!(
            answer.trim().to_ascii_lowercase().as_str(),
            "y" | "yes"
        ))
    }

    /// Print a line of text
    pub fn say(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{}", text)
    }
}

impl<R: BufRead, W: Write> ConflictResolver for Terminal<R, W> {
    fn resolve(&mut self, conflict: &Conflict<'_>) -> Resolution {
        let question = format!(
            "Rule '{}' already exists. Do you want to overwrite it? (y/n): ",
            conflict.name
        );
        match self.confirm(&question) {
            Ok(true) => Resolution::Overwrite,
            Ok(false) => Resolution::Keep,
            Err(e) => {
                tracing::warn!(rule = conflict.name, error = %e, "no answer to overwrite prompt, keeping existing rule");
                Resolution::Keep
            }
        }
    }
}

impl<R: BufRead, W: Write> ValueSource for Terminal<R, W> {
    fn value_for(&mut self, label: &str) -> io::Result<String> {
        self.ask(&format!("The {} is?: ", label))
    }
}
