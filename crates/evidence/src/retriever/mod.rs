//! Per-source document retrieval.
//!
//! Every source a document can come from is represented by a [`Retriever`]. A retriever knows
//! three things about its source:
//!
//! - how to turn a URL into a stable identifier ([`Retriever::id_from_url`]),
//! - how to fetch metadata for an identifier ([`Retriever::get`]),
//! - how to acquire the document file ([`Retriever::fetch_document`]), first from local
//!   directories and then from the network.
//!
//! The acquisition steps have default implementations shared by all sources; a source only
//! overrides the step that behaves differently for it (the Materials Project downloads through
//! its API, publisher sites refuse remote access altogether). Orchestration code never branches
//! on which source it is talking to.
//!
//! Retrievers are looked up by source tag through a [`RetrieverRegistry`]. Adding a source means
//! implementing the trait (or writing a TOML pattern definition, see [`PatternRetriever`]) and
//! registering it.
//!
//! # Examples
//!
//! ```no_run
//! use evidence::{client::HttpClient, retriever::RetrieverRegistry};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = RetrieverRegistry::default();
//! let url = "https://arxiv.org/abs/1809.09600";
//!
//! let source = registry.infer_source_from_url(url)?;
//! let retriever = registry.resolve(&source)?;
//! let id = retriever.id_from_url(url)?;
//! let metadata = retriever.get(&HttpClient::default(), &id).await?;
//! println!("{}", metadata.title);
//! # Ok(())
//! # }
//! ```

use walkdir::WalkDir;

use super::*;

mod acl;
mod arxiv;
mod materials;
mod pattern;
mod pubmed;
mod registry;
mod wikipedia;

pub use acl::AclRetriever;
pub use arxiv::ArxivRetriever;
pub use materials::MaterialsRetriever;
pub use pattern::{PatternRetriever, Replacement};
pub use pubmed::PubmedRetriever;
pub use registry::RetrieverRegistry;
pub use wikipedia::WikipediaRetriever;

/// Everything needed to acquire one document file.
#[derive(Debug, Clone)]
pub struct DocumentRequest {
  /// URL of the document at its source
  pub url:      String,
  /// Identifier to store the file under, derived from `url` when absent
  pub id:       Option<String>,
  /// Destination directory, or a full destination file path
  pub target:   PathBuf,
  /// A file or directory that may already hold the document
  pub local:    Option<PathBuf>,
  /// Never touch the network
  pub offline:  bool,
  /// Recursively search a directory hint
  pub walk:     bool,
  /// Copy or move local hits
  pub transfer: Transfer,
}

impl DocumentRequest {
  /// A request for `url` into `target`, searching nothing locally.
  pub fn new(url: impl Into<String>, target: impl Into<PathBuf>) -> Self {
    Self {
      url:      url.into(),
      id:       None,
      target:   target.into(),
      local:    None,
      offline:  false,
      walk:     true,
      transfer: Transfer::Copy,
    }
  }

  /// Stores the file under `id` instead of the identifier parsed from the URL.
  pub fn with_id(mut self, id: impl Into<String>) -> Self {
    self.id = Some(id.into());
    self
  }

  /// Searches `local` (a file or a directory) before going to the network.
  pub fn with_local(mut self, local: Option<impl Into<PathBuf>>) -> Self {
    self.local = local.map(Into::into);
    self
  }

  /// Forbids network access.
  pub fn offline(mut self, offline: bool) -> Self {
    self.offline = offline;
    self
  }

  /// Enables or disables the recursive search of a directory hint.
  pub fn walk(mut self, walk: bool) -> Self {
    self.walk = walk;
    self
  }

  /// Copies or moves local hits.
  pub fn transfer(mut self, transfer: Transfer) -> Self {
    self.transfer = transfer;
    self
  }
}

/// The retrieval capability of one source.
///
/// # Examples
///
/// A source whose documents are plain text files served at predictable URLs:
///
/// ```no_run
/// use async_trait::async_trait;
/// use evidence::{
///   client::HttpClient,
///   error::{EvidenceError, Result},
///   retriever::{Retriever, RetrieverRegistry},
///   Metadata,
/// };
///
/// #[derive(Debug)]
/// struct Gutenberg;
///
/// #[async_trait]
/// impl Retriever for Gutenberg {
///   fn source(&self) -> &str { "gutenberg" }
///
///   fn extension(&self) -> &str { "txt" }
///
///   fn id_from_url(&self, url: &str) -> Result<String> {
///     url
///       .rsplit_once("/ebooks/")
///       .map(|(_, id)| id.to_string())
///       .ok_or_else(|| EvidenceError::InvalidUrlFormat { tag: "gutenberg".into(), url: url.into() })
///   }
///
///   fn canonical_url(&self, id: &str) -> String { format!("https://www.gutenberg.org/ebooks/{id}") }
///
///   async fn get(&self, _client: &HttpClient, id: &str) -> Result<Metadata> {
///     Err(EvidenceError::PolicyRefusal {
///       tag:       "gutenberg".into(),
///       operation: "metadata retrieval",
///       reason:    format!("no metadata for {id}"),
///     })
///   }
/// }
///
/// let registry = RetrieverRegistry::default().with_retriever(Gutenberg);
/// assert!(registry.resolve("gutenberg").is_ok());
/// ```
#[async_trait]
pub trait Retriever: Debug + Send + Sync {
  /// Lower-case tag identifying this source.
  fn source(&self) -> &str;

  /// License tag applied to documents whose license is still unknown.
  fn license(&self) -> &str { UNKNOWN_LICENSE }

  /// Extension of the files this source provides.
  fn extension(&self) -> &str { "pdf" }

  /// Extracts the document identifier from a source URL.
  ///
  /// # Errors
  ///
  /// [`EvidenceError::InvalidUrlFormat`] when the URL does not match this source's pattern.
  fn id_from_url(&self, url: &str) -> Result<String>;

  /// The document URL for an identifier; `id_from_url(canonical_url(id)) == id`.
  fn canonical_url(&self, id: &str) -> String;

  /// Fetches metadata for an identifier.
  ///
  /// # Errors
  ///
  /// - [`EvidenceError::MetadataFetch`] on a failed request or an unparsable response
  /// - [`EvidenceError::PolicyRefusal`] when the source does not permit metadata retrieval
  async fn get(&self, client: &HttpClient, id: &str) -> Result<Metadata>;

  /// Fetches metadata for the document a URL points at.
  async fn from_url(&self, client: &HttpClient, url: &str) -> Result<Metadata> {
    let id = self.id_from_url(url)?;
    self.get(client, &id).await
  }

  /// The identifier a request stores its file under.
  fn document_id(&self, request: &DocumentRequest) -> Result<String> {
    match &request.id {
      Some(id) => Ok(id.clone()),
      None => self.id_from_url(&request.url),
    }
  }

  /// Looks for the document in the request's local hint and places it into the target.
  ///
  /// Returns `Ok(None)` when there is no hint or nothing matching was found.
  fn fetch_local(&self, request: &DocumentRequest) -> Result<Option<PathBuf>> {
    let Some(local) = request.local.as_deref() else {
      return Ok(None);
    };
    let id = self.document_id(request)?;
    match find_local(local, &id, self.extension(), request.walk) {
      Some(found) =>
        place_file(&found, &request.target, &id, self.extension(), request.transfer).map(Some),
      None => Ok(None),
    }
  }

  /// Downloads the document and writes it into the target.
  async fn fetch_remote(&self, client: &HttpClient, request: &DocumentRequest) -> Result<PathBuf> {
    let id = self.document_id(request)?;
    info!("Retrieving {} from remote source", request.url);
    let bytes = client.get_bytes(&request.url).await?;
    write_document(&request.target, &id, self.extension(), &bytes).await
  }

  /// Acquires the document: local hint first, then (unless offline) the network.
  ///
  /// Returns `Ok(None)` only when nothing was found locally and the request is offline.
  async fn fetch_document(
    &self,
    client: &HttpClient,
    request: &DocumentRequest,
  ) -> Result<Option<PathBuf>> {
    if let Some(path) = self.fetch_local(request)? {
      return Ok(Some(path));
    }
    if request.offline {
      debug!("{} not found locally and offline, skipping remote fetch", request.url);
      return Ok(None);
    }
    self.fetch_remote(client, request).await.map(Some)
  }
}

/// Applies `pattern` to `url` and returns the first capture group without a `.pdf` suffix.
pub(crate) fn capture_id(pattern: &Regex, tag: &str, url: &str) -> Result<String> {
  let id = pattern
    .captures(url)
    .and_then(|cap| cap.get(1))
    .map(|m| m.as_str())
    .ok_or_else(|| EvidenceError::InvalidUrlFormat { tag: tag.to_string(), url: url.to_string() })?;
  Ok(id.strip_suffix(".pdf").unwrap_or(id).to_string())
}

/// Finds the file for `id` under a local hint.
///
/// A file hint is returned as is. A directory hint is either walked (sorted by file name, first
/// file whose stem equals `id` wins) or checked once for `<dir>/<id>.<extension>`.
pub(crate) fn find_local(local: &Path, id: &str, extension: &str, walk: bool) -> Option<PathBuf> {
  if local.is_file() {
    return Some(local.to_path_buf());
  }
  if !local.is_dir() {
    return None;
  }
  if walk {
    WalkDir::new(local)
      .sort_by_file_name()
      .into_iter()
      .filter_map(|entry| match entry {
        Ok(entry) => Some(entry),
        Err(e) => {
          debug!("Skipping unreadable entry while searching {}: {e}", local.display());
          None
        },
      })
      .filter(|entry| entry.file_type().is_file())
      .find(|entry| entry.path().file_stem().is_some_and(|stem| stem == id))
      .map(|entry| entry.into_path())
  } else {
    let candidate = local.join(format!("{id}.{extension}"));
    candidate.is_file().then_some(candidate)
  }
}

/// Copies or moves `source` into `target`.
///
/// When `target` is a directory the file is named `<id>.<ext>`, keeping the source's extension
/// when it has one. Nothing is copied when source and destination are the same file.
pub(crate) fn place_file(
  source: &Path,
  target: &Path,
  id: &str,
  extension: &str,
  transfer: Transfer,
) -> Result<PathBuf> {
  let destination = if target.is_dir() {
    let extension = source.extension().and_then(|e| e.to_str()).unwrap_or(extension);
    target.join(format!("{id}.{extension}"))
  } else {
    target.to_path_buf()
  };

  if is_same_file(source, &destination) {
    info!("{} == {} (no copy necessary)", source.display(), destination.display());
    return Ok(destination);
  }

  match transfer {
    Transfer::Copy => {
      info!("copying {} to {}", source.display(), destination.display());
      fs::copy(source, &destination).map_err(EvidenceError::stage(source, Stage::LocalSearch))?;
    },
    Transfer::Move => {
      info!("moving {} to {}", source.display(), destination.display());
      if let Err(e) = fs::rename(source, &destination) {
        // Renames fail across filesystems
        debug!("rename failed ({e}), falling back to copy and remove");
        fs::copy(source, &destination).map_err(EvidenceError::stage(source, Stage::LocalSearch))?;
        fs::remove_file(source).map_err(EvidenceError::stage(source, Stage::LocalSearch))?;
      }
    },
  }
  Ok(destination)
}

/// Writes downloaded bytes to `<target>/<id>.<extension>` (or to `target` when it is not a
/// directory), going through a `.part` file so a complete file is the only thing ever visible.
pub(crate) async fn write_document(
  target: &Path,
  id: &str,
  extension: &str,
  bytes: &[u8],
) -> Result<PathBuf> {
  let path =
    if target.is_dir() { target.join(format!("{id}.{extension}")) } else { target.to_path_buf() };
  let mut partial = path.clone().into_os_string();
  partial.push(".part");
  let partial = PathBuf::from(partial);

  tokio::fs::write(&partial, bytes).await.map_err(EvidenceError::stage(&partial, Stage::RemoteFetch))?;
  tokio::fs::rename(&partial, &path).await.map_err(EvidenceError::stage(&path, Stage::RemoteFetch))?;
  debug!("Wrote {} bytes to {}", bytes.len(), path.display());
  Ok(path)
}

/// Removes markup tags, decodes the common entities and collapses whitespace.
pub(crate) fn clean_content(s: &str) -> String {
  lazy_static! {
    /// Opening and closing tags
    static ref TAGS: Regex = Regex::new(r"</?[a-zA-Z][^>]*>").unwrap();
    /// Whitespace runs
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
  }
  let stripped = TAGS.replace_all(s, "");
  let decoded = stripped
    .replace("&lt;", "<")
    .replace("&gt;", ">")
    .replace("&quot;", "\"")
    .replace("&#39;", "'")
    .replace("&nbsp;", " ")
    .replace("&amp;", "&");
  WHITESPACE.replace_all(decoded.trim(), " ").into_owned()
}

/// Whether both paths resolve to the same existing file.
fn is_same_file(a: &Path, b: &Path) -> bool {
  match (fs::canonicalize(a), fs::canonicalize(b)) {
    (Ok(a), Ok(b)) => a == b,
    _ => false,
  }
}

/// Custom deserializer for converting string patterns into Regex objects.
fn deserialize_regex<'de, D>(deserializer: D) -> std::result::Result<Regex, D::Error>
where D: serde::Deserializer<'de> {
  let s: String = String::deserialize(deserializer)?;
  Regex::new(&s).map_err(serde::de::Error::custom)
}
