//! Acquisition orchestration.
//!
//! A [`DocumentHandler`] owns everything one acquisition run needs: the configuration, the
//! [`LocalStore`], the [`RetrieverRegistry`] and a shared [`HttpClient`]. For each document it
//!
//! 1. computes the cache directory `<doc_dir>/<license>/<source>`,
//! 2. prefers the path recorded in the local store over any caller-supplied directory,
//! 3. lets the source's retriever search locally and, unless offline, download,
//! 4. fingerprints whatever file came out and records the digest on the document.
//!
//! The store is only read during acquisition. It changes through [`DocumentHandler::index`] and
//! [`DocumentHandler::insert`], both of which take `&mut self`, so indexing cannot overlap with
//! running acquisitions.
//!
//! # Examples
//!
//! ```no_run
//! use evidence::{Config, Document, DocumentHandler, HydrateOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut handler = DocumentHandler::open(Config::default().with_local_dir("data/zotero"))?;
//! handler.index(&["data/downloads"])?;
//!
//! let mut docs = vec![
//!   Document::new("1809.09600", "https://arxiv.org/pdf/1809.09600.pdf", "arxiv"),
//!   Document::new("N19-1423", "https://aclanthology.org/N19-1423.pdf", "ACL Anthology"),
//! ];
//! let report = handler.process_all(&mut docs, &HydrateOptions::default().offline(true)).await;
//! println!("{} of {} documents hashed", report.hashed, report.processed);
//!
//! handler.close()?;
//! # Ok(())
//! # }
//! ```

use futures::{stream, StreamExt};
use tokio_util::sync::CancellationToken;

use super::*;
use crate::{hash::compute_hash, store::IndexReport};

/// Per-call acquisition options.
#[derive(Debug, Clone, Default)]
pub struct HydrateOptions {
  /// Never touch the network
  pub offline:   bool,
  /// Directory or file to search when the local store has no entry for the document
  pub local_dir: Option<PathBuf>,
  /// Aborts the acquisition when cancelled
  pub cancel:    Option<CancellationToken>,
}

impl HydrateOptions {
  /// Forbids or allows network access.
  pub fn offline(mut self, offline: bool) -> Self {
    self.offline = offline;
    self
  }

  /// Searches `local_dir` when the store has no entry.
  pub fn with_local_dir(mut self, local_dir: impl Into<PathBuf>) -> Self {
    self.local_dir = Some(local_dir.into());
    self
  }

  /// Aborts with [`EvidenceError::Cancelled`] once `token` is cancelled.
  pub fn with_cancel(mut self, token: CancellationToken) -> Self {
    self.cancel = Some(token);
    self
  }
}

/// Outcome counts of [`DocumentHandler::process_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
  /// Documents attempted
  pub processed: usize,
  /// Documents whose file was materialized and hashed
  pub hashed:    usize,
  /// Documents for which no file could be found offline
  pub missing:   usize,
  /// Documents that failed with an error
  pub failed:    usize,
}

/// Orchestrates document acquisition against one cache.
#[derive(Debug)]
pub struct DocumentHandler {
  /// Cache layout and acquisition settings
  config:   Config,
  /// Identifier → path index
  store:    LocalStore,
  /// Source tag → retriever
  registry: RetrieverRegistry,
  /// Shared HTTP client
  client:   HttpClient,
}

impl DocumentHandler {
  /// Opens the local store and builds the default registry, extended with the definitions in
  /// `config.retrievers_path` when set.
  pub fn open(config: Config) -> Result<Self> {
    let registry = match &config.retrievers_path {
      Some(path) => RetrieverRegistry::default().with_config_dir(path)?,
      None => RetrieverRegistry::default(),
    };
    Ok(Self::with_registry(config, registry))
  }

  /// Opens the local store and uses `registry` for all lookups.
  pub fn with_registry(config: Config, registry: RetrieverRegistry) -> Self {
    let store = LocalStore::open(config.store_path());
    let client = HttpClient::new(config.timeout());
    debug!("Opened handler on {} with {} indexed documents", config.doc_dir.display(), store.len());
    Self { config, store, registry, client }
  }

  /// The active configuration.
  pub fn config(&self) -> &Config { &self.config }

  /// The local store.
  pub fn store(&self) -> &LocalStore { &self.store }

  /// The retriever registry.
  pub fn registry(&self) -> &RetrieverRegistry { &self.registry }

  /// Mutable access to the registry, to add sources after opening.
  pub fn registry_mut(&mut self) -> &mut RetrieverRegistry { &mut self.registry }

  /// The shared HTTP client.
  pub fn client(&self) -> &HttpClient { &self.client }

  /// Records a known location for `id` in the local store.
  pub fn insert(&mut self, id: impl Into<String>, path: impl Into<PathBuf>) -> Option<PathBuf> {
    self.store.insert(id, path)
  }

  /// Scans `additional`, then `doc_dir`, then the configured local directories into the store.
  ///
  /// Later roots win on collision, so configured drop directories override the cache.
  pub fn index<P: AsRef<Path>>(&mut self, additional: &[P]) -> Result<IndexReport> {
    let roots: Vec<PathBuf> = additional
      .iter()
      .map(|p| p.as_ref().to_path_buf())
      .chain(std::iter::once(self.config.doc_dir.clone()))
      .chain(self.config.local_dirs.iter().cloned())
      .collect();
    self.store.index(&roots)
  }

  /// Acquires the file for `doc` and records its digest in `doc.hash`.
  ///
  /// Any digest `doc` arrives with is cleared first, and only set again once a file was
  /// materialized and hashed. Read a recorded digest before hydrating to check it with
  /// [`DocumentHandler::verify`]. Returns `Ok(None)` when offline and no local copy exists. The
  /// local store is never modified.
  ///
  /// # Errors
  ///
  /// - [`EvidenceError::UnknownSource`] when no retriever handles `doc.source`
  /// - [`EvidenceError::RemoteFetch`] / [`EvidenceError::Transport`] when the download fails
  /// - [`EvidenceError::Cancelled`] when the options' token fires first
  pub async fn hydrate(&self, doc: &mut Document, options: &HydrateOptions) -> Result<Option<PathBuf>> {
    doc.hash = None;
    match &options.cancel {
      Some(token) => {
        let id = doc.id.clone();
        tokio::select! {
          biased;
          _ = token.cancelled() => {
            info!("Acquisition of {id} cancelled");
            Err(EvidenceError::Cancelled { id })
          },
          result = self.acquire(doc, options) => result,
        }
      },
      None => self.acquire(doc, options).await,
    }
  }

  /// [`DocumentHandler::hydrate`] without the cancellation race.
  async fn acquire(&self, doc: &mut Document, options: &HydrateOptions) -> Result<Option<PathBuf>> {
    doc.license = doc.license.to_lowercase();
    doc.source = doc.source.to_lowercase();

    let target = doc.cache_dir(&self.config.doc_dir);
    fs::create_dir_all(&target).map_err(EvidenceError::stage(&target, Stage::LocalSearch))?;

    let local = match self.store.get(&doc.id) {
      Some(indexed) => {
        trace!("Using indexed path {} for {}", indexed.display(), doc.id);
        Some(indexed.to_path_buf())
      },
      None => options.local_dir.clone(),
    };
    if let Some(local) = local.as_deref().filter(|local| !local.exists()) {
      warn!("Local path {} for {} does not exist", local.display(), doc.id);
    }

    let retriever = self.registry.resolve(&doc.source)?;
    let request = DocumentRequest::new(&doc.url, &target)
      .with_id(&doc.id)
      .with_local(local)
      .offline(options.offline)
      .walk(self.config.walk)
      .transfer(self.config.transfer);

    let path = retriever.fetch_document(&self.client, &request).await?;
    match &path {
      Some(path) => {
        let digest = compute_hash(path, self.config.hash_algorithm)?;
        debug!("{} stored at {} ({digest})", doc.id, path.display());
        doc.hash = Some(digest);
      },
      None => info!("No local file for {} and offline, hash left unset", doc.id),
    }
    Ok(path)
  }

  /// Resolves an unknown license to the source default, hydrates, then fills in a missing title
  /// or abstract from the source.
  ///
  /// Metadata failures are logged and ignored. Offline runs skip the metadata lookup.
  pub async fn process(&self, doc: &mut Document, options: &HydrateOptions) -> Result<Option<PathBuf>> {
    if doc.has_unknown_license() {
      doc.license = self.registry.license_for(&doc.source);
    }

    let path = self.hydrate(doc, options).await?;

    if doc.needs_metadata() {
      if options.offline {
        debug!("Offline, not fetching metadata for {}", doc.id);
      } else {
        match self.fetch_metadata(doc).await {
          Ok(metadata) => doc.apply_metadata(metadata),
          Err(e) => debug!("Failed to retrieve title and abstract for {}: {e}", doc.id),
        }
      }
    }
    Ok(path)
  }

  /// Asks the document's retriever for its metadata.
  async fn fetch_metadata(&self, doc: &Document) -> Result<Metadata> {
    self.registry.resolve(&doc.source)?.get(&self.client, &doc.id).await
  }

  /// Runs [`DocumentHandler::process`] over `docs` with up to `config.concurrency` documents in
  /// flight. Failures are logged per document and never abort the batch.
  pub async fn process_all(&self, docs: &mut [Document], options: &HydrateOptions) -> BatchReport {
    let concurrency = self.config.concurrency.max(1);
    let results: Vec<Result<Option<PathBuf>>> = stream::iter(docs.iter_mut())
      .map(|doc| async move {
        let result = self.process(doc, options).await;
        if let Err(e) = &result {
          warn!("Failed to process {}: {e}", doc.id);
        }
        result
      })
      .buffer_unordered(concurrency)
      .collect()
      .await;

    let mut report = BatchReport { processed: results.len(), ..Default::default() };
    for result in &results {
      match result {
        Ok(Some(_)) => report.hashed += 1,
        Ok(None) => report.missing += 1,
        Err(_) => report.failed += 1,
      }
    }
    info!(
      "Processed {} documents: {} hashed, {} missing, {} failed",
      report.processed, report.hashed, report.missing, report.failed
    );
    report
  }

  /// Where the file for `doc` currently is: the indexed path when it exists, otherwise a file
  /// named after `doc.id` in its cache directory.
  pub fn locate(&self, doc: &Document) -> Option<PathBuf> {
    if let Some(indexed) = self.store.get(&doc.id).filter(|path| path.is_file()) {
      return Some(indexed.to_path_buf());
    }
    let extension = self.registry.resolve(&doc.source).map_or_else(
      |_| "pdf".to_string(),
      |retriever| retriever.extension().to_string(),
    );
    find_local(&doc.cache_dir(&self.config.doc_dir), &doc.id, &extension, true)
  }

  /// Recomputes the digest of the file for `doc` and compares it with `expected`.
  ///
  /// # Errors
  ///
  /// - [`EvidenceError::IntegrityMismatch`] when the file changed
  /// - [`EvidenceError::Filesystem`] when there is no file for `doc`
  pub fn verify(&self, doc: &Document, expected: &str) -> Result<String> {
    let path = self.locate(doc).ok_or_else(|| EvidenceError::Filesystem {
      path:   doc.cache_dir(&self.config.doc_dir).join(&doc.id),
      stage:  Stage::Hashing,
      source: std::io::Error::new(std::io::ErrorKind::NotFound, "no file for document"),
    })?;
    hash::verify_hash(&doc.id, path, expected, self.config.hash_algorithm)
  }

  /// Persists the local store and releases the handler.
  pub fn close(self) -> Result<()> { self.store.close() }
}
