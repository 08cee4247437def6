use anyhow::{Context, Result};
use superserial::{RenderOptions, Serialized};

/// Re-render an envelope document with `options`.
pub fn run_fmt(text: &str, options: &RenderOptions) -> Result<String> {
    let serialized: Serialized = text.parse().context("Document is not a valid envelope")?;
    serialized
        .render_with(options)
        .context("Failed to render document")
}
