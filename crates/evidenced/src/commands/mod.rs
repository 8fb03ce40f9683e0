//! Subcommands of the CLI, one module each.

use super::*;

pub mod hash;
pub mod hydrate;
pub mod index;
pub mod verify;
pub mod zotero;

pub use self::{
  hash::{hash_file, HashArgs},
  hydrate::{hydrate, HydrateArgs},
  index::{index, IndexArgs},
  verify::{verify, VerifyArgs},
  zotero::{zotero_import, ZoteroArgs},
};

/// Available commands for the CLI
#[derive(Subcommand, Clone)]
pub enum Commands {
  /// Record every file under the cache and the given directories in the local store
  Index(IndexArgs),

  /// Acquire one document into the cache and print its path and fingerprint
  Hydrate(HydrateArgs),

  /// Acquire every attachment of a Zotero JSON export
  Zotero(ZoteroArgs),

  /// Print the fingerprint of a file
  Hash(HashArgs),

  /// Check a file against a previously recorded fingerprint
  Verify(VerifyArgs),
}

/// Parses an algorithm name given on the command line.
fn parse_algorithm(name: &str) -> Result<HashAlgorithm> { Ok(name.parse::<HashAlgorithm>()?) }

/// Opens a handler for the configuration resolved from `cli`.
fn open_handler(cli: &Cli) -> Result<DocumentHandler> {
  let config = cli.load_config()?;
  debug!("Using cache at {}", config.doc_dir.display());
  Ok(DocumentHandler::open(config)?)
}
