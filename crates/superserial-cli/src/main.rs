use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use superserial::RenderOptions;
use tracing::debug;

mod commands;
mod config;
mod logging;

use commands::{read_input, run_check, run_fmt, run_plain, run_wrap, write_output};
use config::SuperserialConfig;

/// sserial - inspect and convert superserial documents
#[derive(Parser)]
#[command(name = "sserial")]
#[command(about = "Inspect and convert self-describing superserial JSON", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a superserial.toml (defaults to ./superserial.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Subcommand)]
enum Commands {
    /// Parse and unwrap a document, reporting its size and custom types
    Check {
        /// Input file, or `-` for stdin
        input: PathBuf,
    },
    /// Re-render a document canonically
    Fmt {
        /// Input file, or `-` for stdin
        input: PathBuf,
        #[command(flatten)]
        render: RenderArgs,
        /// Output path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the plain JSON view of a document, without case tags
    Plain {
        /// Input file, or `-` for stdin
        input: PathBuf,
        /// Output path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Convert plain JSON into tagged envelope form
    Wrap {
        /// Input file, or `-` for stdin
        input: PathBuf,
        #[command(flatten)]
        render: RenderArgs,
        /// Output path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Render flags; each overrides the config file when given.
#[derive(Clone, Args)]
struct RenderArgs {
    /// Indent the output
    #[arg(long)]
    pretty: bool,
    /// Escape non-ASCII characters as \uXXXX
    #[arg(long, overrides_with = "no_ascii")]
    ascii: bool,
    /// Write non-ASCII characters verbatim
    #[arg(long, overrides_with = "ascii")]
    no_ascii: bool,
}

impl RenderArgs {
    fn apply(&self, mut options: RenderOptions) -> RenderOptions {
        if self.pretty {
            options.pretty = true;
        }
        if self.ascii {
            options.ascii_only = true;
        } else if self.no_ascii {
            options.ascii_only = false;
        }
        options
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let config = SuperserialConfig::discover(cli.config.as_deref(), &cwd)?;
    debug!(?config, "Configuration loaded");

    match &cli.command {
        Commands::Check { input } => {
            let report = run_check(&read_input(input)?)
                .with_context(|| format!("{} failed validation", display_input(input)))?;
            println!("{report}");
        }
        Commands::Fmt {
            input,
            render,
            output,
        } => {
            let text = run_fmt(&read_input(input)?, &render.apply(config.render))?;
            write_output(output.as_deref(), &text)?;
        }
        Commands::Plain { input, output } => {
            let text = run_plain(&read_input(input)?)?;
            write_output(output.as_deref(), &text)?;
        }
        Commands::Wrap {
            input,
            render,
            output,
        } => {
            let text = run_wrap(&read_input(input)?, &render.apply(config.render))?;
            write_output(output.as_deref(), &text)?;
        }
    }

    Ok(())
}

fn display_input(input: &Path) -> String {
    if input == Path::new("-") {
        "stdin".to_string()
    } else {
        input.display().to_string()
    }
}
