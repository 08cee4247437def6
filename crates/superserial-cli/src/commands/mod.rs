pub mod check;
pub mod fmt;
pub mod plain;
pub mod wrap;

pub use check::*;
pub use fmt::*;
pub use plain::*;
pub use wrap::*;

use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};

/// Read a whole document from `path`, or from stdin when `path` is `-`.
pub fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Write `text` plus a trailing newline to `output`, or to stdout.
pub fn write_output(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, format!("{text}\n"))
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{text}").context("Failed to write stdout")
        }
    }
}
