//! Document descriptors and the metadata retrievers produce.
//!
//! A [`Document`] is the flat record a dataset carries for each entry. Its `source` and
//! `license` tags are always lower-cased, whether the record was built in code or deserialized,
//! so they can be used directly as cache directory names and registry keys.
//!
//! # Examples
//!
//! ```
//! use evidence::Document;
//!
//! let doc = Document::new("N19-1423", "https://aclanthology.org/N19-1423.pdf", "ACL Anthology");
//! assert_eq!(doc.source, "acl anthology");
//! assert_eq!(doc.license, "unknown");
//! assert!(doc.hash.is_none());
//! ```

use super::*;

/// One document to acquire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
  /// Source-scoped unique identifier (e.g. an arXiv id)
  pub id:            String,
  /// Where the document lives at its source
  pub url:           String,
  /// Lower-cased source tag (e.g. "arxiv")
  #[serde(deserialize_with = "deserialize_lowercase")]
  pub source:        String,
  /// Lower-cased license tag, [`UNKNOWN_LICENSE`] until resolved
  #[serde(
    default = "default_license",
    deserialize_with = "deserialize_lowercase",
    alias = "license_type"
  )]
  pub license:       String,
  /// Publication year, when known; numeric years are read as strings
  #[serde(default, deserialize_with = "deserialize_year")]
  pub year:          Option<String>,
  /// Document title
  #[serde(default)]
  pub title:         Option<String>,
  /// Abstract or summary
  #[serde(default, rename = "abs")]
  pub abstract_text: Option<String>,
  /// Hex digest of the cached file, present only once a file was materialized and hashed
  #[serde(default)]
  pub hash:          Option<String>,
}

/// Metadata a retriever fetched for a document identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
  /// Identifier the metadata was requested for
  pub id:     String,
  /// Document title
  pub title:  String,
  /// Abstract or summary, possibly empty
  pub abs:    String,
  /// Publication year, when the source has one
  pub year:   Option<String>,
  /// Canonical URL of the document
  pub url:    String,
  /// Source tag of the retriever that produced this record
  pub source: String,
}

impl Document {
  /// Creates a descriptor with an unresolved license and no metadata.
  pub fn new(id: impl Into<String>, url: impl Into<String>, source: impl AsRef<str>) -> Self {
    Self {
      id:            id.into(),
      url:           url.into(),
      source:        source.as_ref().to_lowercase(),
      license:       UNKNOWN_LICENSE.to_string(),
      year:          None,
      title:         None,
      abstract_text: None,
      hash:          None,
    }
  }

  /// Sets the license tag (lower-cased).
  pub fn with_license(mut self, license: impl AsRef<str>) -> Self {
    self.license = license.as_ref().to_lowercase();
    self
  }

  /// Sets the publication year.
  pub fn with_year(mut self, year: impl Into<String>) -> Self {
    self.year = Some(year.into());
    self
  }

  /// Builds a descriptor from fetched metadata.
  pub fn from_metadata(metadata: Metadata) -> Self {
    Self {
      id:            metadata.id,
      url:           metadata.url,
      source:        metadata.source.to_lowercase(),
      license:       UNKNOWN_LICENSE.to_string(),
      year:          metadata.year,
      title:         Some(metadata.title),
      abstract_text: Some(metadata.abs),
      hash:          None,
    }
  }

  /// Whether the license still carries the [`UNKNOWN_LICENSE`] sentinel.
  pub fn has_unknown_license(&self) -> bool { self.license == UNKNOWN_LICENSE }

  /// Whether title or abstract still need to be fetched.
  pub fn needs_metadata(&self) -> bool {
    self.title.as_deref().map_or(true, str::is_empty)
      || self.abstract_text.as_deref().map_or(true, str::is_empty)
  }

  /// Copies title, abstract and (when absent) year from fetched metadata.
  pub fn apply_metadata(&mut self, metadata: Metadata) {
    self.title = Some(metadata.title);
    self.abstract_text = Some(metadata.abs);
    if self.year.is_none() {
      self.year = metadata.year;
    }
  }

  /// The directory under `doc_dir` this document's file belongs in.
  pub fn cache_dir(&self, doc_dir: &Path) -> PathBuf {
    doc_dir.join(self.license.to_lowercase()).join(self.source.to_lowercase())
  }
}

/// License of a record that names none.
fn default_license() -> String { UNKNOWN_LICENSE.to_string() }

/// Reads a tag and lower-cases it.
fn deserialize_lowercase<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where D: serde::Deserializer<'de> {
  let s: String = String::deserialize(deserializer)?;
  Ok(s.to_lowercase())
}

/// A year written either as a string or as a bare number.
#[derive(Deserialize)]
#[serde(untagged)]
enum Year {
  /// `"2018"`
  Text(String),
  /// `2018`
  Number(i64),
}

/// Reads an optional year, turning numbers into strings.
fn deserialize_year<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where D: serde::Deserializer<'de> {
  Ok(Option::<Year>::deserialize(deserializer)?.map(|year| match year {
    Year::Text(text) => text,
    Year::Number(number) => number.to_string(),
  }))
}
