//! Materials Project records.
//!
//! A material's "document" is its summary record, downloaded as JSON through the Materials
//! Project API. The API needs a key, taken from `MP_API_KEY` unless one is configured
//! explicitly. Descriptive metadata is expected to come with the dataset entry.

use super::*;

/// Default summary endpoint.
pub const MATERIALS_API: &str = "https://api.materialsproject.org/materials/summary/";

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "MP_API_KEY";

/// Retriever for the Materials Project.
#[derive(Debug, Clone)]
pub struct MaterialsRetriever {
  /// Summary endpoint queried with `?material_ids=<id>`
  api_base: String,
  /// Key overriding [`API_KEY_VAR`]
  api_key:  Option<String>,
}

impl Default for MaterialsRetriever {
  fn default() -> Self { Self { api_base: MATERIALS_API.to_string(), api_key: None } }
}

impl MaterialsRetriever {
  /// Queries a different summary endpoint.
  pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
    self.api_base = api_base.into();
    self
  }

  /// Uses `api_key` instead of reading the environment.
  pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
    self.api_key = Some(api_key.into());
    self
  }

  /// The configured key, else [`API_KEY_VAR`] from the environment.
  fn api_key(&self) -> Result<String> {
    match &self.api_key {
      Some(key) => Ok(key.clone()),
      None => std::env::var(API_KEY_VAR)
        .map_err(|_| EvidenceError::Config(format!("{API_KEY_VAR} must be set to download materials"))),
    }
  }
}

lazy_static! {
  /// Material page URLs
  static ref MATERIALS_URL: Regex =
    Regex::new(r"materialsproject.org/materials/([a-zA-Z0-9.-]+)").unwrap();
}

#[async_trait]
impl Retriever for MaterialsRetriever {
  fn source(&self) -> &str { "mp" }

  fn extension(&self) -> &str { "json" }

  fn id_from_url(&self, url: &str) -> Result<String> {
    capture_id(&MATERIALS_URL, self.source(), url)
  }

  fn canonical_url(&self, id: &str) -> String {
    format!("https://next-gen.materialsproject.org/materials/{id}")
  }

  async fn get(&self, _client: &HttpClient, id: &str) -> Result<Metadata> {
    Err(EvidenceError::PolicyRefusal {
      tag:       self.source().into(),
      operation: "metadata retrieval",
      reason:    format!("ensure metadata for {id} is included in the entry"),
    })
  }

  async fn fetch_remote(&self, client: &HttpClient, request: &DocumentRequest) -> Result<PathBuf> {
    let id = self.document_id(request)?;
    let url = format!("{}?material_ids={id}&_all_fields=true", self.api_base);
    info!("Retrieving material {id} from {}", self.api_base);
    let bytes = client.get_bytes_with_headers(&url, &[("X-API-KEY", self.api_key()?)]).await?;
    write_document(&request.target, &id, self.extension(), &bytes).await
  }
}
