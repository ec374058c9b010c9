//! dwarf-prototypes - Main Entry Point
//!
//! Prints the C prototypes of every function described in an object file's
//! DWARF debug information.

use anyhow::Context;
use clap::Parser;
use dwarf_prototypes::{config::ExtractConfig, logging, prototypes, OutputFormat};
use std::path::PathBuf;

/// Reconstruct C function prototypes from DWARF debug information.
#[derive(Parser, Debug)]
#[command(name = "dwarf-prototypes")]
#[command(version)]
#[command(about = "Extract C function prototypes from DWARF debug info", long_about = None)]
struct Cli {
    /// Select elf file
    #[arg(short, long)]
    elf: PathBuf,

    /// Config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Skip subprograms that are only declared
    #[arg(long, default_value_t = false)]
    no_declarations: bool,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Command line flags override the config file
    fn apply(&self, config: &mut ExtractConfig) {
        if self.json {
            config.output = OutputFormat::Json;
        }
        if self.no_declarations {
            config.include_declarations = false;
        }
        if let Some(path) = &self.log_file {
            config.log.file = Some(path.clone());
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ExtractConfig::resolve(cli.config.as_deref())
        .context("Failed to load configuration")?;
    cli.apply(&mut config);

    let _guard = logging::init_logging(&config.log)?;
    tracing::debug!("Using {:?}", config);

    let result = prototypes::extract_file(&cli.elf, &config)?;

    for failure in &result.failures {
        eprintln!("{}", failure);
    }

    match config.output {
        OutputFormat::Json => println!("{}", result.to_json()?),
        OutputFormat::Text if result.is_empty() => println!("{}", result),
        OutputFormat::Text => println!("Found prototypes:\n{}", result),
    }

    Ok(())
}
