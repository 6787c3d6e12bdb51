//! Configuration loading for baby
//!
//! Supports TOML configuration with embedded defaults.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "BABY_CONFIG";

/// Environment variable overriding the store location
pub const STORE_ENV: &str = "BABY_STORE";

/// Rule store location
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the rule file
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "~/.config/baby/baby.conf".to_string(),
        }
    }
}

/// How rule commands are executed
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Shell program
    pub shell: String,

    /// Arguments placed before the command
    pub shell_args: Vec<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            shell: "bash".to_string(),
            shell_args: vec!["-c".to_string()],
        }
    }
}

/// Audit log settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Enable audit logging
    pub enabled: bool,

    /// Path to audit log file
    pub path: Option<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: Some("~/.config/baby/audit.jsonl".to_string()),
        }
    }
}

/// Import and export settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Timeout for fetching rules from a URL
    pub timeout_secs: u64,

    /// File name written by export
    pub export_file_name: String,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            export_file_name: "baby-rules.txt".to_string(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub runner: RunnerConfig,
    pub audit: AuditConfig,
    pub transfer: TransferConfig,
}

impl Config {
    /// Load configuration from the standard locations, falling back to defaults.
    ///
    /// `$BABY_CONFIG` must parse if set; the user and system files are
    /// skipped with a warning when broken.
    pub fn load() -> Result<Self> {
        if let Ok(path) = env::var(CONFIG_ENV) {
            return Self::load_from(&Self::expand_path(&path));
        }

        let config_paths = [
            // User-specific config
            dirs::home_dir().map(|p| p.join(".config/baby/config.toml")),
            // System-wide config
            Some(PathBuf::from("/etc/baby/config.toml")),
        ];

        for path in config_paths.into_iter().flatten() {
            if path.exists() {
                match Self::load_from(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "ignoring config file");
                    }
                }
            }
        }

        // Return defaults
        Ok(Config::default())
    }

    /// Load from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("Failed to read config {}", path.display()), e))?;
        Self::parse(&content)
    }

    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Expand ~ in path strings
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Get the store path (expanded); `$BABY_STORE` wins over the file setting
    pub fn store_path(&self) -> PathBuf {
        match env::var(STORE_ENV) {
            Ok(path) if !path.is_empty() => Self::expand_path(&path),
            _ => Self::expand_path(&self.store.path),
        }
    }

    /// Get the audit log path (expanded), `None` when auditing is off
    pub fn audit_path(&self) -> Option<PathBuf> {
        if !self.audit.enabled {
            return None;
        }
        self.audit.path.as_ref().map(|p| Self::expand_path(p))
    }
}

/// Embedded default configuration
pub const DEFAULT_CONFIG_TOML: &str = r#"
[store]
path = "~/.config/baby/baby.conf"

[runner]
shell = "bash"
shell_args = ["-c"]

[audit]
enabled = true
path = "~/.config/baby/audit.jsonl"

[transfer]
timeout_secs = 30
export_file_name = "baby-rules.txt"
"#;
