//! `superserial.toml` loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use superserial::RenderOptions;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "superserial.toml";

/// Contents of a `superserial.toml`.
///
/// ```toml
/// [render]
/// pretty = true
/// ascii_only = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuperserialConfig {
    pub render: RenderOptions,
}

impl SuperserialConfig {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load `explicit` if given, else `superserial.toml` in `dir` if it
    /// exists, else defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        let path: PathBuf = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = dir.join(DEFAULT_CONFIG_FILE);
                if !candidate.is_file() {
                    debug!("No config file found, using defaults");
                    return Ok(Self::default());
                }
                candidate
            }
        };
        debug!(path = %path.display(), "Loading config");
        Self::load(&path)
    }
}
