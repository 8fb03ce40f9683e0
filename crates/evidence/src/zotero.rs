//! Conversion of exported Zotero items into documents.
//!
//! A Zotero collection export is a JSON array of items. Regular items become [`Document`]s;
//! attachment items are merged into their parent as a local file hint, resolved against the
//! directory the attachments were downloaded to.
//!
//! ```
//! use evidence::zotero::{convert_items, ZoteroItem};
//!
//! let items: Vec<ZoteroItem> = serde_json::from_str(
//!   r#"[
//!     {"data": {"key": "ABCD1234", "itemType": "journalArticle", "title": "Graphene",
//!               "parsedDate": "2004-10-22", "url": "https://doi.org/10.1126/science.1102896",
//!               "publicationTitle": "Science"}},
//!     {"data": {"key": "FILE0001", "itemType": "attachment", "parentItem": "ABCD1234",
//!               "filename": "Novoselov - 2004 - Graphene.pdf"}}
//!   ]"#,
//! )?;
//!
//! let entries = convert_items(&items, Some("data/zotero".as_ref()));
//! assert_eq!(entries.len(), 1);
//! assert_eq!(entries[0].document.source, "science");
//! assert_eq!(entries[0].document.year.as_deref(), Some("2004"));
//! assert!(entries[0].document_path.as_ref().unwrap().ends_with("Novoselov - 2004 - Graphene.pdf"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::HashMap;

use super::*;

/// One exported Zotero item.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ZoteroItem {
  /// The item's fields
  #[serde(default)]
  pub data: ItemData,
}

/// The fields of a Zotero item used for conversion.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemData {
  /// Zotero item key
  pub key:               String,
  /// e.g. "journalArticle", "webpage", "attachment"
  pub item_type:         String,
  /// Title
  pub title:             String,
  /// Abstract
  pub abstract_note:     String,
  /// Normalized date, `YYYY-MM-DD`
  pub parsed_date:       Option<String>,
  /// Free-form date
  pub date:              String,
  /// Item URL
  pub url:               String,
  /// Free-form notes, may contain `Publisher: ...`
  pub extra:             String,
  /// Journal name
  pub publication_title: String,
  /// Website name
  pub website_title:     String,
  /// Parent key of an attachment
  pub parent_item:       Option<String>,
  /// File name of an attachment
  pub filename:          String,
}

/// A converted item and the file its attachment points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoteroEntry {
  /// The document descriptor
  pub document:      Document,
  /// Downloaded attachment, usable as a local hint
  pub document_path: Option<PathBuf>,
}

/// Reads a JSON array of items from a file.
pub fn load_items(path: impl AsRef<Path>) -> Result<Vec<ZoteroItem>> {
  let content = fs::read_to_string(path)?;
  Ok(serde_json::from_str(&content)?)
}

/// Converts items into documents, skipping attachments and attaching the first attachment of
/// each parent as its `document_path`.
pub fn convert_items(items: &[ZoteroItem], download_dir: Option<&Path>) -> Vec<ZoteroEntry> {
  let mut attachments: HashMap<&str, &ItemData> = HashMap::new();
  for data in items.iter().map(|item| &item.data).filter(|data| data.item_type == "attachment") {
    if let Some(parent) = data.parent_item.as_deref() {
      attachments.entry(parent).or_insert(data);
    }
  }

  items
    .iter()
    .map(|item| &item.data)
    .filter(|data| data.item_type != "attachment")
    .map(|data| {
      let mut document = Document::new(&data.key, &data.url, item_source(data));
      document.title = non_empty(&data.title);
      document.abstract_text = non_empty(&data.abstract_note);
      document.year = item_year(data);

      let document_path = attachments
        .get(data.key.as_str())
        .filter(|attachment| !attachment.filename.is_empty())
        .map(|attachment| match download_dir {
          Some(dir) => dir.join(&attachment.filename),
          None => PathBuf::from(&attachment.filename),
        });
      if document_path.is_none() {
        debug!("No attachment for Zotero item {}", data.key);
      }

      ZoteroEntry { document, document_path }
    })
    .collect()
}

/// The publisher named in `extra`, falling back to the journal or website title.
fn item_source(data: &ItemData) -> String {
  if let Some((_, publisher)) = data.extra.rsplit_once("Publisher:") {
    return publisher.trim().to_string();
  }
  match data.item_type.as_str() {
    "journalArticle" => data.publication_title.clone(),
    "webpage" => data.website_title.clone(),
    _ => String::new(),
  }
}

/// The first four characters of `parsedDate`, else of `date`.
fn item_year(data: &ItemData) -> Option<String> {
  [data.parsed_date.as_deref().unwrap_or_default(), data.date.as_str()]
    .into_iter()
    .find(|date| date.len() >= 4)
    .and_then(|date| date.get(..4))
    .map(String::from)
}

/// `None` for an empty string.
fn non_empty(s: &str) -> Option<String> { (!s.is_empty()).then(|| s.to_string()) }
