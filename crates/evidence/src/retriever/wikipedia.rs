//! Wikipedia articles, stored as plain text.

use serde_json::Value;

use super::*;

/// Default page summary endpoint.
pub const WIKIPEDIA_API: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";

/// Retriever for English Wikipedia.
#[derive(Debug, Clone)]
pub struct WikipediaRetriever {
  /// Endpoint queried with `/<id>`
  api_base: String,
}

impl Default for WikipediaRetriever {
  fn default() -> Self { Self { api_base: WIKIPEDIA_API.to_string() } }
}

impl WikipediaRetriever {
  /// Queries a different summary endpoint.
  pub fn with_api_base(api_base: impl Into<String>) -> Self { Self { api_base: api_base.into() } }
}

lazy_static! {
  /// Article URLs
  static ref WIKIPEDIA_URL: Regex = Regex::new(r"wikipedia\.org/wiki/([^#?]+)").unwrap();
}

#[async_trait]
impl Retriever for WikipediaRetriever {
  fn source(&self) -> &str { "wikipedia" }

  fn extension(&self) -> &str { "txt" }

  fn id_from_url(&self, url: &str) -> Result<String> {
    WIKIPEDIA_URL
      .captures(url)
      .and_then(|cap| cap.get(1))
      .map(|m| m.as_str().to_string())
      .ok_or_else(|| EvidenceError::InvalidUrlFormat { tag: self.source().into(), url: url.into() })
  }

  fn canonical_url(&self, id: &str) -> String { format!("https://en.wikipedia.org/wiki/{id}") }

  async fn get(&self, client: &HttpClient, id: &str) -> Result<Metadata> {
    let metadata_error = |reason: String| EvidenceError::MetadataFetch {
      tag: self.source().into(),
      id: id.into(),
      reason,
    };

    let url = format!("{}/{id}", self.api_base);
    let data = client.get_bytes(&url).await.map_err(|e| metadata_error(e.to_string()))?;
    let json: Value = serde_json::from_slice(&data).map_err(|e| metadata_error(e.to_string()))?;

    let title = json["title"]
      .as_str()
      .ok_or_else(|| metadata_error("summary has no title".to_string()))?
      .to_string();
    let url = json["content_urls"]["desktop"]["page"]
      .as_str()
      .map(String::from)
      .unwrap_or_else(|| self.canonical_url(id));

    Ok(Metadata {
      id: id.to_string(),
      title,
      abs: json["extract"].as_str().unwrap_or_default().to_string(),
      year: None,
      url,
      source: self.source().to_string(),
    })
  }
}
