//! Handler configuration.
//!
//! A [`Config`] describes where the cache lives, which extra directories hold documents that
//! were obtained out of band, how local hits are materialized, and which digest fingerprints
//! the cache. It round-trips through TOML:
//!
//! ```toml
//! doc_dir = "data/docs"
//! local_dirs = ["data/zotero"]
//! transfer = "copy"
//! walk = true
//! hash_algorithm = "md5"
//! timeout_secs = 60
//! concurrency = 4
//! ```

use std::time::Duration;

use super::*;

/// How a document found in a local directory is placed into the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transfer {
  /// Leave the original in place
  #[default]
  Copy,
  /// Remove the original after placing it in the cache
  Move,
}

/// Configuration for a [`DocumentHandler`](crate::DocumentHandler).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Root of the cache layout `<doc_dir>/<license>/<source>/<id>.<ext>`
  pub doc_dir:         PathBuf,
  /// Additional directories scanned by `index` after `doc_dir`
  pub local_dirs:      Vec<PathBuf>,
  /// Location of the local store, `<doc_dir>/.store.json` when unset
  pub store_file:      Option<PathBuf>,
  /// Copy or move local hits into the cache
  pub transfer:        Transfer,
  /// Recursively search directory hints for a matching file
  pub walk:            bool,
  /// Digest used to fingerprint cached files
  pub hash_algorithm:  HashAlgorithm,
  /// Timeout for every HTTP request, in seconds
  pub timeout_secs:    u64,
  /// Maximum number of documents `process_all` acquires at once
  pub concurrency:     usize,
  /// Directory of extra retriever definitions (`*.toml`)
  pub retrievers_path: Option<PathBuf>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      doc_dir:         PathBuf::from("data/docs"),
      local_dirs:      Vec::new(),
      store_file:      None,
      transfer:        Transfer::default(),
      walk:            true,
      hash_algorithm:  HashAlgorithm::default(),
      timeout_secs:    client::DEFAULT_TIMEOUT.as_secs(),
      concurrency:     4,
      retrievers_path: None,
    }
  }
}

impl Config {
  /// Default location of the configuration file.
  ///
  /// - On Unix: `~/.config/evidence/config.toml`
  /// - On macOS: `~/Library/Application Support/evidence/config.toml`
  /// - On Windows: `%APPDATA%\evidence\config.toml`
  /// - Fallback: `./evidence/config.toml`
  pub fn default_path() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("evidence").join("config.toml")
  }

  /// Reads a configuration from a TOML file.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    debug!("Loading configuration from {}", path.display());
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
  }

  /// Writes this configuration as TOML, creating parent directories.
  pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(path, toml::to_string_pretty(self)?)?;
    Ok(())
  }

  /// Sets the cache root.
  pub fn with_doc_dir(mut self, doc_dir: impl Into<PathBuf>) -> Self {
    self.doc_dir = doc_dir.into();
    self
  }

  /// Adds a directory scanned after `doc_dir` by `index`.
  pub fn with_local_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.local_dirs.push(dir.into());
    self
  }

  /// Sets an explicit store file location.
  pub fn with_store_file(mut self, store_file: impl Into<PathBuf>) -> Self {
    self.store_file = Some(store_file.into());
    self
  }

  /// Sets how local hits are placed into the cache.
  pub fn with_transfer(mut self, transfer: Transfer) -> Self {
    self.transfer = transfer;
    self
  }

  /// Enables or disables recursive search of directory hints.
  pub fn with_walk(mut self, walk: bool) -> Self {
    self.walk = walk;
    self
  }

  /// Sets the fingerprint digest.
  pub fn with_hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
    self.hash_algorithm = algorithm;
    self
  }

  /// Sets the HTTP timeout.
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout_secs = timeout.as_secs();
    self
  }

  /// Sets the directory of extra retriever definitions.
  pub fn with_retrievers_path(mut self, path: impl Into<PathBuf>) -> Self {
    self.retrievers_path = Some(path.into());
    self
  }

  /// The store file, defaulting to `<doc_dir>/.store.json`.
  pub fn store_path(&self) -> PathBuf {
    self.store_file.clone().unwrap_or_else(|| self.doc_dir.join(".store.json"))
  }

  /// The HTTP timeout as a [`Duration`].
  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
}
