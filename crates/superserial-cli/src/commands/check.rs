use std::fmt;

use anyhow::{Context, Result};
use superserial::Serialized;

/// Summary of a well-formed document.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub nodes: usize,
    pub custom_types: Vec<String>,
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ok: {} nodes", self.nodes)?;
        if !self.custom_types.is_empty() {
            write!(f, ", custom types: {}", self.custom_types.join(", "))?;
        }
        Ok(())
    }
}

/// Parse and unwrap `text` without decoding it.
pub fn run_check(text: &str) -> Result<CheckReport> {
    let serialized: Serialized = text.parse().context("Document is not a valid envelope")?;
    Ok(CheckReport {
        nodes: serialized.node_count(),
        custom_types: serialized
            .custom_type_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}
