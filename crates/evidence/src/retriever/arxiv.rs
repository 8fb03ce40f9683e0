//! arXiv preprints.
//!
//! Identifiers come from `arxiv.org/abs/<id>` or `arxiv.org/pdf/<id>[.pdf]` URLs. Metadata is read
//! from the Atom feed of the export API.

use std::collections::HashMap;

use chrono::Datelike;
use quick_xml::{events::Event, Reader};

use super::*;

/// Default export API endpoint.
pub const ARXIV_API: &str = "http://export.arxiv.org/api/query";

/// Retriever for arXiv.
#[derive(Debug, Clone)]
pub struct ArxivRetriever {
  /// Export API endpoint queried with `?id_list=<id>`
  api_base: String,
}

impl Default for ArxivRetriever {
  fn default() -> Self { Self { api_base: ARXIV_API.to_string() } }
}

impl ArxivRetriever {
  /// Queries a different export API endpoint.
  pub fn with_api_base(api_base: impl Into<String>) -> Self { Self { api_base: api_base.into() } }

  /// A [`EvidenceError::MetadataFetch`] for `id`.
  fn metadata_error(&self, id: &str, reason: impl Into<String>) -> EvidenceError {
    EvidenceError::MetadataFetch { tag: self.source().into(), id: id.into(), reason: reason.into() }
  }
}

lazy_static! {
  /// Abstract and PDF URLs
  static ref ARXIV_URL: Regex = Regex::new(r"arxiv.org/(?:abs|pdf)/([a-zA-Z0-9.]+)").unwrap();
}

#[async_trait]
impl Retriever for ArxivRetriever {
  fn source(&self) -> &str { "arxiv" }

  fn id_from_url(&self, url: &str) -> Result<String> { capture_id(&ARXIV_URL, self.source(), url) }

  fn canonical_url(&self, id: &str) -> String { format!("https://arxiv.org/pdf/{id}.pdf") }

  async fn get(&self, client: &HttpClient, id: &str) -> Result<Metadata> {
    let url = format!("{}?id_list={id}", self.api_base);
    let data = client.get_bytes(&url).await.map_err(|e| self.metadata_error(id, e.to_string()))?;
    trace!("arxiv response: {}", String::from_utf8_lossy(&data));

    let content = extract_content(&String::from_utf8_lossy(&data));
    let field = |name: &str| content.get(&format!("feed/entry/{name}")).cloned();

    let title = field("title").ok_or_else(|| self.metadata_error(id, "no entry in feed"))?;
    // Unknown identifiers come back as a single entry titled "Error"
    if title == "Error" {
      return Err(self.metadata_error(id, field("summary").unwrap_or(title)));
    }

    Ok(Metadata {
      id:     id.to_string(),
      title:  clean_content(&title),
      abs:    field("summary").map(|s| clean_content(&s)).unwrap_or_default(),
      year:   field("published").and_then(|published| publication_year(&published)),
      url:    self.canonical_url(id),
      source: self.source().to_string(),
    })
  }
}

/// Flattens an XML document into `path → first text` using namespace-free element names.
fn extract_content(xml: &str) -> HashMap<String, String> {
  let mut reader = Reader::from_str(xml);
  let mut content = HashMap::new();
  let mut path_stack = Vec::new();

  loop {
    match reader.read_event() {
      Ok(Event::Start(e)) => {
        path_stack.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
      },
      Ok(Event::Text(e)) =>
        if let Ok(text) = e.unescape() {
          let text = text.trim();
          if !text.is_empty() {
            content.entry(path_stack.join("/")).or_insert_with(|| text.to_string());
          }
        },
      Ok(Event::End(_)) => {
        path_stack.pop();
      },
      Ok(Event::Eof) => break,
      Err(e) => {
        debug!("Stopped parsing arxiv feed: {e}");
        break;
      },
      _ => (),
    }
  }
  content
}

/// Year of an RFC 3339 timestamp, else its leading `YYYY-` part.
fn publication_year(published: &str) -> Option<String> {
  match chrono::DateTime::parse_from_rfc3339(published) {
    Ok(date) => Some(date.year().to_string()),
    Err(_) => published.split('-').next().filter(|y| !y.is_empty()).map(String::from),
  }
}
