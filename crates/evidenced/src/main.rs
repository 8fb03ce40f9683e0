//! Command line front end for the `evidence` document cache.
//!
//! This crate provides a CLI tool for assembling and checking a local document cache using the
//! `evidence` library. It supports operations like:
//! - Indexing files already on disk
//! - Acquiring a single document by URL, locally or over the network
//! - Processing a reference-manager export in one batch
//! - Fingerprinting and verifying cached files
//!
//! # Usage
//!
//! ```bash
//! # Index the cache and any extra download directories
//! evidence index ~/Downloads/papers
//!
//! # Acquire one document, inferring the source from the URL
//! evidence hydrate https://arxiv.org/abs/1809.09600
//!
//! # Only look locally
//! evidence hydrate https://arxiv.org/abs/1809.09600 --offline --local-dir ~/Downloads
//!
//! # Acquire every attachment of a Zotero export
//! evidence zotero items.json --download-dir ~/Zotero/storage
//!
//! # Fingerprint a file and check it later
//! evidence hash data/docs/unknown/arxiv/1809.09600.pdf --algorithm sha256
//! evidence verify data/docs/unknown/arxiv/1809.09600.pdf d8a35627e1ddcece596dde74a6a89673
//! ```
//!
//! Settings come from `--config`, else the platform configuration file when it exists, else
//! the library defaults. Use `-v` repeatedly for more detailed logs.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::path::PathBuf;

use clap::{builder::ArgAction, Args, Parser, Subcommand};
use console::style;
use evidence::{
  error::EvidenceError, Config, Document, DocumentHandler, HashAlgorithm, HydrateOptions,
};
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

pub mod commands;
pub mod error;

use crate::{commands::*, error::*};

/// Prefix for information messages
static INFO_PREFIX: &str = "ℹ ";
/// Prefix for success messages
static SUCCESS_PREFIX: &str = "✓ ";
/// Prefix for warning messages
static WARNING_PREFIX: &str = "⚠️ ";
/// Prefix for error messages
static ERROR_PREFIX: &str = "✗ ";

/// Command line interface configuration and argument parsing
#[derive(Parser)]
#[command(author, version, about = "Acquire, cache and fingerprint research documents")]
pub struct Cli {
  /// Verbose mode (-v, -vv, -vvv) for different levels of logging detail
  #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase logging verbosity"
    )]
  verbose: u8,

  /// Path to a TOML configuration file. If not specified, uses the platform-specific
  /// configuration file when one exists.
  #[arg(long, short, global = true)]
  config: Option<PathBuf>,

  /// Cache root, overriding the configured `doc_dir`
  #[arg(long, global = true)]
  doc_dir: Option<PathBuf>,

  /// The subcommand to execute
  #[command(subcommand)]
  command: Commands,
}

impl Cli {
  /// Resolves the configuration this invocation runs with.
  fn load_config(&self) -> Result<Config> {
    let config = match &self.config {
      Some(path) => Config::load(path)?,
      None => {
        let default_path = Config::default_path();
        if default_path.exists() {
          Config::load(&default_path)?
        } else {
          trace!("No configuration at {}, using defaults", default_path.display());
          Config::default()
        }
      },
    };

    Ok(match &self.doc_dir {
      Some(doc_dir) => config.with_doc_dir(doc_dir),
      None => config,
    })
  }
}

/// Configures the logging system based on the verbosity level
///
/// # Arguments
///
/// * `verbosity` - Number of times the verbose flag was used (0-4)
///
/// The verbosity levels are:
/// - 0: error (default)
/// - 1: warn
/// - 2: info
/// - 3: debug
/// - 4+: trace
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "error",
    1 => "warn",
    2 => "info",
    3 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_file(true)
    .with_line_number(true)
    .with_thread_ids(true)
    .with_target(true)
    .init();
}

/// Entry point for the evidence CLI application
///
/// Parses arguments, sets up logging, and executes the requested command.
///
/// # Errors
///
/// Reports any [`EvidencedError`] on stderr and exits non-zero, for failures such as:
/// - Unreadable configuration
/// - Failed acquisitions
/// - Fingerprint mismatches
#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  setup_logging(cli.verbose);

  let result = match &cli.command {
    Commands::Index(args) => index(&cli, args.clone()).await,
    Commands::Hydrate(args) => hydrate(&cli, args.clone()).await,
    Commands::Zotero(args) => zotero_import(&cli, args.clone()).await,
    Commands::Hash(args) => hash_file(args.clone()),
    Commands::Verify(args) => verify(args.clone()),
  };

  if let Err(e) = result {
    eprintln!("{} {}", style(ERROR_PREFIX).red(), style(&e).red());
    std::process::exit(1);
  }
  Ok(())
}
