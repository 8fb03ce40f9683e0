//! Scholarly document acquisition and local cache management.
//!
//! `evidence` assembles a verifiable local cache of documents (papers, articles, wiki pages,
//! materials records) gathered from many sources, providing:
//!
//! - Per-source retrieval of metadata and files
//! - A persistent identifier→path index that keeps repeated runs idempotent
//! - Local-first acquisition with an offline mode that never touches the network
//! - Content hashing so every cached artifact carries an integrity fingerprint
//!
//! # Features
//!
//! - **Multi-source support**: built-in retrievers for:
//!   - arXiv
//!   - ACL Anthology
//!   - Wikipedia
//!   - PubMed (URL parsing and local files only)
//!   - Materials Project
//!   - Publisher sites (Springer, APS, ScienceDirect, Elsevier) defined in TOML
//! - **Extensible**: add a source by implementing [`retriever::Retriever`] and registering it
//! - **Deterministic cache layout**: `<doc_dir>/<license>/<source>/<id>.<ext>`
//!
//! # Getting Started
//!
//! ```no_run
//! use evidence::{prelude::*, Config, Document, DocumentHandler, HydrateOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!   let config = Config::default().with_doc_dir("data/docs");
//!   let mut handler = DocumentHandler::open(config)?;
//!
//!   // Index what is already on disk before processing anything
//!   handler.index::<&str>(&[])?;
//!
//!   let mut doc = Document::new("1809.09600", "https://arxiv.org/pdf/1809.09600.pdf", "arXiv");
//!   let path = handler.hydrate(&mut doc, &HydrateOptions::default()).await?;
//!   println!("{path:?} -> {:?}", doc.hash);
//!
//!   handler.close()?;
//!   Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`document`]: Document descriptors and fetched metadata
//! - [`retriever`]: The per-source retrieval capability and its registry
//! - [`store`]: The persistent identifier→path index
//! - [`handler`]: Acquisition orchestration
//! - [`hash`]: Content fingerprints
//! - [`zotero`]: Conversion of exported reference-manager items

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{
  collections::BTreeMap,
  fmt::{Debug, Display},
  fs,
  path::{Path, PathBuf},
  str::FromStr,
  sync::Arc,
};

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};
#[cfg(test)]
use {tempfile::tempdir, tracing_test::traced_test};

pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod handler;
pub mod hash;
pub mod retriever;
pub mod store;
pub mod zotero;

pub use crate::{
  config::{Config, Transfer},
  document::{Document, Metadata},
  handler::{BatchReport, DocumentHandler, HydrateOptions},
  hash::HashAlgorithm,
  store::LocalStore,
};
use crate::{client::HttpClient, error::*, retriever::*};

/// License tag used until a document's license is resolved.
pub const UNKNOWN_LICENSE: &str = "unknown";

/// Common traits and types for ergonomic imports.
///
/// ```no_run
/// use evidence::prelude::*;
///
/// fn source_of(registry: &RetrieverRegistry, url: &str) -> Result<String, EvidenceError> {
///   registry.infer_source_from_url(url)
/// }
/// ```
pub mod prelude {
  pub use crate::{
    error::EvidenceError,
    retriever::{Retriever, RetrieverRegistry},
  };
}
