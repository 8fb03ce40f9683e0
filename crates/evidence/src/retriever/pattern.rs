//! Publisher sites described entirely by configuration.
//!
//! Many publishers share one behavior: their identifiers can be read off the URL with a single
//! regular expression, metadata must come with the dataset entry, and documents are only
//! available as local files. A [`PatternRetriever`] captures that behavior from a TOML
//! definition:
//!
//! ```toml
//! source = "aps"
//! license = "aps"
//! extension = "pdf"
//! pattern = 'doi/([a-zA-Z0-9/.]+)'
//! url_template = "https://journals.aps.org/doi/{id}"
//!
//! [[replace]]
//! from = "/"
//! to = "_"
//! ```
//!
//! `replace` rules are applied in order to the captured identifier and undone in reverse order
//! when building the canonical URL. Setting `remote = true` enables the plain HTTP download
//! shared by all retrievers.

use super::*;

/// Built-in publisher definitions.
pub(crate) const BUILTIN_CONFIGS: &[&str] = &[
  include_str!("../../config/retrievers/springer.toml"),
  include_str!("../../config/retrievers/aps.toml"),
  include_str!("../../config/retrievers/sciencedirect.toml"),
  include_str!("../../config/retrievers/elsevier.toml"),
];

/// A literal substitution applied to captured identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Replacement {
  /// Text to replace
  pub from: String,
  /// Replacement text
  pub to:   String,
}

/// A retriever defined by a URL pattern and a URL template.
#[derive(Debug, Clone, Deserialize)]
pub struct PatternRetriever {
  /// Source tag
  pub source:       String,
  /// License tag applied to documents of unknown license
  #[serde(default = "default_license")]
  pub license:      String,
  /// File extension
  #[serde(default = "default_extension")]
  pub extension:    String,
  /// Regex whose first capture group is the identifier
  #[serde(deserialize_with = "deserialize_regex")]
  pub pattern:      Regex,
  /// Canonical URL with an `{id}` placeholder
  pub url_template: String,
  /// Identifier substitutions
  #[serde(default)]
  pub replace:      Vec<Replacement>,
  /// Whether documents may be downloaded
  #[serde(default)]
  pub remote:       bool,
  /// Reason given when metadata retrieval is refused
  #[serde(default = "default_refusal")]
  pub refusal:      String,
}

impl PatternRetriever {
  /// Parses a definition from TOML, lower-casing the tags.
  pub fn from_toml(toml_str: &str) -> Result<Self> {
    let mut retriever: Self = toml::from_str(toml_str)?;
    retriever.source = retriever.source.to_lowercase();
    retriever.license = retriever.license.to_lowercase();
    if !retriever.url_template.contains("{id}") {
      return Err(EvidenceError::Config(format!(
        "url_template for {} has no {{id}} placeholder",
        retriever.source
      )));
    }
    Ok(retriever)
  }
}

#[async_trait]
impl Retriever for PatternRetriever {
  fn source(&self) -> &str { &self.source }

  fn license(&self) -> &str { &self.license }

  fn extension(&self) -> &str { &self.extension }

  fn id_from_url(&self, url: &str) -> Result<String> {
    let id = capture_id(&self.pattern, &self.source, url)?;
    Ok(self.replace.iter().fold(id, |id, rule| id.replace(&rule.from, &rule.to)))
  }

  fn canonical_url(&self, id: &str) -> String {
    let raw =
      self.replace.iter().rev().fold(id.to_string(), |id, rule| id.replace(&rule.to, &rule.from));
    self.url_template.replace("{id}", &raw)
  }

  async fn get(&self, _client: &HttpClient, id: &str) -> Result<Metadata> {
    Err(EvidenceError::PolicyRefusal {
      tag:       self.source.clone(),
      operation: "metadata retrieval",
      reason:    format!("{} ({id})", self.refusal),
    })
  }

  async fn fetch_remote(&self, client: &HttpClient, request: &DocumentRequest) -> Result<PathBuf> {
    if !self.remote {
      return Err(EvidenceError::PolicyRefusal {
        tag:       self.source.clone(),
        operation: "remote fetch",
        reason:    format!("{} documents must be supplied locally", self.source),
      });
    }
    let id = self.document_id(request)?;
    let bytes = client.get_bytes(&request.url).await?;
    write_document(&request.target, &id, &self.extension, &bytes).await
  }
}

/// License when the definition names none.
fn default_license() -> String { UNKNOWN_LICENSE.to_string() }

/// Extension when the definition names none.
fn default_extension() -> String { "pdf".to_string() }

/// Refusal reason when the definition gives none.
fn default_refusal() -> String { "metadata must be supplied with the entry".to_string() }
