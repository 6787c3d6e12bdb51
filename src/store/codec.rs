//! Line codec for the rule store file
//!
//! Each rule occupies one line: `<name> = <command>`. Commands are escaped
//! so that any string, including newlines and backslashes, fits on a single
//! line and reads back byte-for-byte:
//!
//! | sequence | decodes to                                  |
//! |----------|---------------------------------------------|
//! | `\\`     | backslash                                   |
//! | `\n`     | line feed                                   |
//! | `\r`     | carriage return                             |
//! | `\t`     | tab                                         |
//! | `\xHH`   | other ASCII control character (00-1f, 7f)   |
//!
//! Any other backslash sequence is a decode error.

use super::document::Line;
use crate::rules::Rule;

/// Separator between name and command on a rule line
pub const SEPARATOR: &str = " = ";

/// Encode a rule as a store line
pub fn encode_line(rule: &Rule) -> String {
    format!("{}{}{}", rule.name, SEPARATOR, escape(&rule.command))
}

/// Classify and decode a single store line
pub fn decode_line(line: &str) -> Line {
    let Some((name, encoded)) = line.split_once(SEPARATOR) else {
        return Line::Other(line.to_string());
    };

    if !is_rule_name_shape(name) {
        return Line::Other(line.to_string());
    }

    match unescape(encoded) {
        Ok(command) => Line::Rule(Rule::new(name, command)),
        Err(reason) => Line::Broken {
            name: name.to_string(),
            raw: line.to_string(),
            reason,
        },
    }
}

/// Whether the text before the separator can be a rule name at all
fn is_rule_name_shape(name: &str) -> bool {
    !name.is_empty() && !name.contains('=') && !name.chars().any(char::is_whitespace)
}

/// Escape a command for storage
pub fn escape(command: &str) -> String {
    let mut out = String::with_capacity(command.len());
    for c in command.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_ascii_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Reverse [`escape`], returning a description of the first bad sequence
pub fn unescape(encoded: &str) -> Result<String, String> {
    let mut out = String::with_capacity(encoded.len());
    let mut chars = encoded.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                let well_formed = hex.len() == 2 && hex.chars().all(|c| c.is_ascii_hexdigit());
                let byte = u8::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|b| well_formed && b.is_ascii())
                    .ok_or_else(|| format!("invalid escape '\\x{}'", hex))?;
                out.push(char::from(byte));
            }
            Some(other) => return Err(format!("unknown escape '\\{}'", other)),
            None => return Err("trailing backslash".to_string()),
        }
    }

    Ok(out)
}
