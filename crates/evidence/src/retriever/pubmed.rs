//! PubMed records.
//!
//! PubMed's terms of use forbid automated metadata retrieval, so [`PubmedRetriever::get`] always
//! refuses. Identifiers and local files work like any other source.

use super::*;

/// Retriever for PubMed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PubmedRetriever;

lazy_static! {
  /// Article URLs
  static ref PUBMED_URL: Regex = Regex::new(r"pubmed\.ncbi\.nlm\.nih\.gov/(\d+)").unwrap();
}

#[async_trait]
impl Retriever for PubmedRetriever {
  fn source(&self) -> &str { "pubmed" }

  fn license(&self) -> &str { "pubmed" }

  fn id_from_url(&self, url: &str) -> Result<String> { capture_id(&PUBMED_URL, self.source(), url) }

  fn canonical_url(&self, id: &str) -> String { format!("https://pubmed.ncbi.nlm.nih.gov/{id}/") }

  async fn get(&self, _client: &HttpClient, _id: &str) -> Result<Metadata> {
    Err(EvidenceError::PolicyRefusal {
      tag:       self.source().into(),
      operation: "metadata retrieval",
      reason:    "PubMed terms and conditions prevents use of this function".into(),
    })
  }
}
