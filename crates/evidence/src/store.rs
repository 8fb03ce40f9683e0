//! The persistent identifier→path index.
//!
//! A [`LocalStore`] remembers where each known document lives on disk so that repeated runs
//! reuse cached or previously downloaded files instead of fetching them again. It is backed by a
//! single JSON object mapping identifier to path.
//!
//! The lifecycle is explicit:
//!
//! 1. [`LocalStore::open`] loads the file, or starts empty when it is missing or unreadable.
//! 2. [`LocalStore::index`] walks directories and records every file by its stem. Entries are
//!    only ever added or overwritten, never purged, and later roots win on collision.
//! 3. [`LocalStore::close`] writes the whole map back, replacing the previous file. It consumes
//!    the store, so it happens exactly once.
//!
//! # Examples
//!
//! ```no_run
//! use evidence::LocalStore;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = LocalStore::open("data/docs/.store.json");
//! // A fresh drop directory listed last takes priority over the cache
//! store.index(&["data/docs", "data/downloads"])?;
//! if let Some(path) = store.get("1809.09600") {
//!   println!("cached at {}", path.display());
//! }
//! store.close()?;
//! # Ok(())
//! # }
//! ```

use walkdir::WalkDir;

use super::*;

/// Persistent mapping from document identifier to file path.
#[derive(Debug, Clone)]
pub struct LocalStore {
  /// File the map is loaded from and written to
  path:    PathBuf,
  /// Identifier → path
  entries: BTreeMap<String, PathBuf>,
}

/// Summary of one root scanned by [`LocalStore::index`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
  /// Files encountered under the roots
  pub found:   usize,
  /// Entries whose recorded path was added or changed
  pub updated: usize,
}

impl LocalStore {
  /// Loads the store from `path`.
  ///
  /// A missing file yields an empty store. A file that cannot be read or parsed is logged and
  /// also yields an empty store; the next [`LocalStore::close`] replaces it.
  pub fn open(path: impl Into<PathBuf>) -> Self {
    let path = path.into();
    let entries = match fs::read_to_string(&path) {
      Ok(content) => match serde_json::from_str::<BTreeMap<String, PathBuf>>(&content) {
        Ok(entries) => {
          debug!("Loaded {} entries from {}", entries.len(), path.display());
          entries
        },
        Err(e) => {
          warn!("Failed to load index from {}: {e}. Starting with an empty index.", path.display());
          BTreeMap::new()
        },
      },
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        debug!("No index at {}, starting empty", path.display());
        BTreeMap::new()
      },
      Err(e) => {
        warn!("Failed to read index {}: {e}. Starting with an empty index.", path.display());
        BTreeMap::new()
      },
    };
    Self { path, entries }
  }

  /// The backing file.
  pub fn path(&self) -> &Path { &self.path }

  /// The recorded path for `id`, if any.
  pub fn get(&self, id: &str) -> Option<&Path> { self.entries.get(id).map(PathBuf::as_path) }

  /// Records `path` for `id`, returning the previously recorded path.
  pub fn insert(&mut self, id: impl Into<String>, path: impl Into<PathBuf>) -> Option<PathBuf> {
    self.entries.insert(id.into(), path.into())
  }

  /// Number of entries.
  pub fn len(&self) -> usize { self.entries.len() }

  /// Whether the store has no entries.
  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  /// All entries, ordered by identifier.
  pub fn entries(&self) -> &BTreeMap<String, PathBuf> { &self.entries }

  /// Recursively scans `roots` in order, recording each file under its name without extension.
  ///
  /// Roots that do not exist and entries that cannot be read are skipped with a warning.
  /// Nothing is ever removed.
  pub fn index<P: AsRef<Path>>(&mut self, roots: &[P]) -> Result<IndexReport> {
    let mut total = IndexReport::default();
    for root in roots {
      let report = self.index_root(root.as_ref())?;
      total.found += report.found;
      total.updated += report.updated;
    }
    Ok(total)
  }

  /// Scans a single root into the map.
  fn index_root(&mut self, root: &Path) -> Result<IndexReport> {
    if !root.exists() {
      warn!("Skipping missing index root {}", root.display());
      return Ok(IndexReport::default());
    }

    debug!("indexing documents in {}", root.display());
    let previous = self.entries.len();
    let mut report = IndexReport::default();
    for entry in WalkDir::new(root).sort_by_file_name() {
      let entry = match entry {
        Ok(entry) => entry,
        Err(e) => {
          warn!("Skipping unreadable entry under {}: {e}", root.display());
          continue;
        },
      };
      if !entry.file_type().is_file() {
        continue;
      }
      let Some(id) = entry.path().file_stem().and_then(|stem| stem.to_str()) else {
        trace!("Skipping non UTF-8 file name {}", entry.path().display());
        continue;
      };
      // The store file itself is not a document
      if entry.path() == self.path {
        continue;
      }

      report.found += 1;
      let path = entry.path().to_path_buf();
      if self.entries.get(id) != Some(&path) {
        report.updated += 1;
        self.entries.insert(id.to_string(), path);
      }
    }
    info!(
      "Found {} files in {}. Updated {} out of {previous} provided file paths",
      report.found,
      root.display(),
      report.updated
    );
    Ok(report)
  }

  /// Writes the whole map to the backing file, replacing its previous contents.
  pub fn save(&self) -> Result<()> {
    if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent).map_err(EvidenceError::stage(parent, Stage::Index))?;
    }
    let content = serde_json::to_string_pretty(&self.entries)?;
    fs::write(&self.path, content).map_err(EvidenceError::stage(&self.path, Stage::Index))?;
    debug!("Wrote {} entries to {}", self.entries.len(), self.path.display());
    Ok(())
  }

  /// Persists the store and releases it.
  pub fn close(self) -> Result<()> { self.save() }
}
