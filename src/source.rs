//! Where imported rule text comes from

use crate::config::TransferConfig;
use crate::error::{Error, Result};
use std::fmt;
use std::path::PathBuf;

/// A local file or a remote document holding rule blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSource {
    File(PathBuf),
    Url(String),
}

impl ImportSource {
    /// `http://` and `https://` arguments are URLs, everything else is a path
    pub fn parse(arg: &str) -> Self {
        let lower = arg.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            ImportSource::Url(arg.to_string())
        } else {
            ImportSource::File(PathBuf::from(arg))
        }
    }

    /// Read the whole document as text
    pub fn read(&self, config: &TransferConfig) -> Result<String> {
        match self {
            ImportSource::File(path) => std::fs::read_to_string(path)
                .map_err(|e| Error::io(format!("Failed to read {}", path.display()), e)),
            ImportSource::Url(url) => fetch(url, config),
        }
    }
}

impl fmt::Display for ImportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportSource::File(path) => write!(f, "{}", path.display()),
            ImportSource::Url(url) => f.write_str(url),
        }
    }
}

#[cfg(feature = "remote")]
fn fetch(url: &str, config: &TransferConfig) -> Result<String> {
    use std::time::Duration;

    let fetch_error = |reason: String| Error::Fetch {
        url: url.to_string(),
        reason,
    };

    tracing::debug!(%url, timeout_secs = config.timeout_secs, "fetching rules");

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(concat!("baby/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| fetch_error(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .map_err(|e| fetch_error(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(fetch_error(format!("server answered {}", status)));
    }

    response.text().map_err(|e| fetch_error(e.to_string()))
}

#[cfg(not(feature = "remote"))]
fn fetch(url: &str, _config: &TransferConfig) -> Result<String> {
    Err(Error::Fetch {
        url: url.to_string(),
        reason: "built without the `remote` feature".to_string(),
    })
}
