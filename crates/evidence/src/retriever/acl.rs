//! ACL Anthology papers.
//!
//! The anthology has no metadata API, so the paper's landing page is scraped for its title,
//! abstract and year.

use super::*;

/// Default landing page host.
pub const ACL_BASE: &str = "https://aclanthology.org";

/// Retriever for the ACL Anthology.
#[derive(Debug, Clone)]
pub struct AclRetriever {
  /// Host serving `<base>/<id>` landing pages
  base: String,
}

impl Default for AclRetriever {
  fn default() -> Self { Self { base: ACL_BASE.to_string() } }
}

impl AclRetriever {
  /// Scrapes landing pages from a different host.
  pub fn with_base(base: impl Into<String>) -> Self { Self { base: base.into() } }
}

lazy_static! {
  /// Paper URLs
  static ref ACL_URL: Regex = Regex::new(r"aclanthology.org/([a-zA-Z0-9.\-]+)").unwrap();
  /// Landing page title heading
  static ref TITLE: Regex = Regex::new(r#"(?s)<h2[^>]*id="title"[^>]*>(.*?)</h2>"#).unwrap();
  /// Landing page abstract card
  static ref ABSTRACT: Regex =
    Regex::new(r#"(?s)<div[^>]*class="card-body acl-abstract"[^>]*>(.*?)</div>"#).unwrap();
  /// Year entry of the landing page details
  static ref YEAR: Regex = Regex::new(r"(?s)<dt>\s*Year:\s*</dt>\s*<dd>\s*(\d{4})").unwrap();
}

#[async_trait]
impl Retriever for AclRetriever {
  fn source(&self) -> &str { "acl anthology" }

  fn license(&self) -> &str { "acl" }

  fn id_from_url(&self, url: &str) -> Result<String> { capture_id(&ACL_URL, self.source(), url) }

  fn canonical_url(&self, id: &str) -> String { format!("{ACL_BASE}/{id}.pdf") }

  async fn get(&self, client: &HttpClient, id: &str) -> Result<Metadata> {
    let page_url = format!("{}/{id}", self.base);
    let data = client.get_bytes(&page_url).await.map_err(|e| EvidenceError::MetadataFetch {
      tag:    self.source().into(),
      id:     id.into(),
      reason: e.to_string(),
    })?;
    let (title, abs, year) = parse_landing_page(&String::from_utf8_lossy(&data));
    let title = title.ok_or_else(|| EvidenceError::MetadataFetch {
      tag:    self.source().into(),
      id:     id.into(),
      reason: format!("no title found at {page_url}"),
    })?;

    Ok(Metadata {
      id: id.to_string(),
      title,
      abs: abs.unwrap_or_default(),
      year,
      url: self.canonical_url(id),
      source: self.source().to_string(),
    })
  }
}

/// Title, abstract and year from an anthology landing page.
fn parse_landing_page(html: &str) -> (Option<String>, Option<String>, Option<String>) {
  let capture = |re: &Regex| re.captures(html).and_then(|cap| cap.get(1)).map(|m| m.as_str());

  let title = capture(&*TITLE).map(clean_content).filter(|t| !t.is_empty());
  let abs = capture(&*ABSTRACT).map(|raw| {
    let text = clean_content(raw);
    text.strip_prefix("Abstract").map(str::trim_start).unwrap_or(&text).to_string()
  });
  let year = capture(&*YEAR).map(String::from);
  (title, abs, year)
}
