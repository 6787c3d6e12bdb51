//! Import/export block format
//!
//! Rules travel between machines as `b:<name> = <command>:b` entries, one
//! per line, optionally after a `#<comment>` line. Blocks are often pasted
//! into web pages, so commands are HTML-entity escaped and everything
//! outside printable ASCII is written as `\uXXXX`.

use crate::rules::Rule;

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write as _;

/// One block entry; name is group 1, command group 2 (shortest match)
static RULE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"b:([^=]+)=(.*?):b").expect("block pattern is valid"));

/// An entry that matched the block grammar but cannot become a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    pub name: String,
    pub reason: String,
}

/// Result of scanning a block of text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    /// Valid rules in order of first appearance; a repeated name keeps
    /// the command of its last appearance
    pub rules: Vec<Rule>,

    /// Entries skipped because their name or command is unusable
    pub rejected: Vec<Rejected>,
}

/// Find every rule entry in `text`
pub fn extract(text: &str) -> Extracted {
    let mut extracted = Extracted::default();

    for line in text.lines() {
        if line.trim_start().starts_with('#') {
            continue;
        }

        for caps in RULE_BLOCK.captures_iter(line) {
            let (Some(raw_name), Some(raw_command)) = (caps.get(1), caps.get(2)) else {
                continue;
            };

            let name = html_escape::decode_html_entities(raw_name.as_str().trim())
                .trim()
                .to_string();

            let command = match decode_command(raw_command.as_str().trim()) {
                Ok(command) => command,
                Err(reason) => {
                    extracted.rejected.push(Rejected { name, reason });
                    continue;
                }
            };

            let rule = Rule::new(name, command);
            if let Err(e) = rule.validate() {
                extracted.rejected.push(Rejected {
                    name: rule.name,
                    reason: e.to_string(),
                });
                continue;
            }

            match extracted.rules.iter_mut().find(|r| r.name == rule.name) {
                Some(existing) => existing.command = rule.command,
                None => extracted.rules.push(rule),
            }
        }
    }

    extracted
}

/// Render rules as an export block
pub fn render(rules: &[Rule], comment: Option<&str>) -> String {
    let mut out = String::new();

    if let Some(comment) = comment.filter(|c| !c.trim().is_empty()) {
        let _ = writeln!(out, "#{}", comment.replace(['\r', '\n'], " "));
    }

    for rule in rules {
        let _ = writeln!(
            out,
            "b:{} = {}:b",
            html_escape::encode_text(&rule.name),
            encode_command(&rule.command)
        );
    }

    out
}

/// Escape a command so it survives inside a block entry
pub fn encode_command(command: &str) -> String {
    let escaped = encode_unicode_escapes(command);
    html_escape::encode_text(&escaped).replace(":b", "&#58;b")
}

/// Reverse of [`encode_command`]
pub fn decode_command(encoded: &str) -> Result<String, String> {
    let unescaped = html_escape::decode_html_entities(encoded);
    decode_unicode_escapes(&unescaped)
}

fn encode_unicode_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();

    // Entries are trimmed on extraction, so edge spaces are escaped
    let lead = text.len() - text.trim_start_matches(' ').len();
    let trail = text.trim_end_matches(' ').len();

    while let Some((i, c)) = chars.next() {
        if c == '\\' && matches!(chars.peek(), Some((_, 'u'))) {
            // Keep a literal "\u" from being read back as an escape
            out.push_str("\\u005c");
        } else if c == ' ' && (i < lead || i >= trail) {
            out.push_str("\\u0020");
        } else if c.is_ascii() && !c.is_ascii_control() {
            out.push(c);
        } else {
            let mut buf = [0u16; 2];
            for unit in c.encode_utf16(&mut buf).iter() {
                let _ = write!(out, "\\u{:04x}", unit);
            }
        }
    }

    out
}

/// Decode `\uXXXX` sequences, joining surrogate pairs.
/// A `\u` not followed by four hex digits is kept as written; an unpaired
/// surrogate is an error.
fn decode_unicode_escapes(text: &str) -> Result<String, String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(idx) = rest.find("\\u") {
        out.push_str(&rest[..idx]);
        let after = &rest[idx + 2..];

        let Some(unit) = parse_hex4(after) else {
            out.push_str("\\u");
            rest = after;
            continue;
        };

        let mut consumed = 4;
        let decoded = if (0xD800..0xDC00).contains(&unit) {
            match after[4..].strip_prefix("\\u").and_then(parse_hex4) {
                Some(low) if (0xDC00..0xE000).contains(&low) => {
                    consumed += 6;
                    char::from_u32(0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00))
                }
                _ => None,
            }
        } else {
            char::from_u32(unit)
        };

        let ch = decoded.ok_or_else(|| format!("invalid unicode escape '\\u{}'", &after[..4]))?;
        out.push(ch);
        rest = &after[consumed..];
    }

    out.push_str(rest);
    Ok(out)
}

fn parse_hex4(text: &str) -> Option<u32> {
    let hex = text.get(..4)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}
