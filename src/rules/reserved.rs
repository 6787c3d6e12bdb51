//! Names that collide with command-line tokens
//!
//! A rule named after an option could never be run or deleted, so these
//! are rejected in every case variant.

/// Option tokens understood by the CLI, plus the `a` argument of `-r a`
pub const RESERVED_NAMES: &[&str] = &[
    "-h",
    "--help",
    "-v",
    "--version",
    "-l",
    "-n",
    "-r",
    "-c",
    "-ln",
    "-i",
    "-e",
    "-b",
    "a",
];

/// Check if a name is reserved (ASCII case-insensitive)
pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}
