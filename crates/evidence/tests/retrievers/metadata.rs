use super::*;

const ATOM_ENTRY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:arxiv="http://arxiv.org/schemas/atom">
  <title type="html">ArXiv Query: search_query=&amp;id_list=1809.09600</title>
  <entry>
    <id>http://arxiv.org/abs/1809.09600v1</id>
    <published>2018-09-25T17:28:07Z</published>
    <title>HotpotQA: A Dataset for Diverse, Explainable Multi-hop Question
  Answering</title>
    <summary>  Existing question answering (QA) datasets fail to train QA systems to
perform complex reasoning &amp; provide explanations for answers.
</summary>
  </entry>
</feed>"#;

const ATOM_ERROR: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/api/errors#incorrect_id_format_for_bogus</id>
    <title>Error</title>
    <summary>incorrect id format for bogus</summary>
  </entry>
</feed>"#;

const ACL_PAGE: &str = r#"<!doctype html><html><body>
<section id="main">
<h2 id="title"><a href="https://aclanthology.org/N19-1423.pdf">BERT</a>: Pre-training of Deep
Bidirectional Transformers for Language Understanding</h2>
<div class="card-body p-3 p-sm-4">
<div class="card-body acl-abstract"><h5 class="card-title">Abstract</h5><span>We introduce a new
language representation model called BERT, which stands for Bidirectional Encoder Representations
from Transformers.</span></div>
<dl>
<dt>Anthology ID:</dt><dd>N19-1423</dd>
<dt>Volume:</dt><dd>Proceedings of NAACL</dd>
<dt>Year:</dt><dd>2019</dd>
</dl></div></section></body></html>"#;

const WIKI_SUMMARY: &str = r#"{
  "type": "standard",
  "title": "Rust (programming language)",
  "extract": "Rust is a general-purpose programming language emphasizing performance.",
  "content_urls": {
    "desktop": {"page": "https://en.wikipedia.org/wiki/Rust_(programming_language)"}
  }
}"#;

#[tokio::test]
async fn test_arxiv_metadata() -> TestResult<()> {
  let server = TestServer::start(vec![(
    "/api/query?id_list=1809.09600",
    200,
    ATOM_ENTRY.as_bytes().to_vec(),
  )])
  .await;
  let arxiv = ArxivRetriever::with_api_base(server.url("/api/query"));

  let metadata = arxiv.from_url(&HttpClient::default(), "https://arxiv.org/abs/1809.09600").await?;

  assert_eq!(metadata.id, "1809.09600");
  assert_eq!(
    metadata.title,
    "HotpotQA: A Dataset for Diverse, Explainable Multi-hop Question Answering"
  );
  assert!(metadata.abs.ends_with("reasoning & provide explanations for answers."));
  assert_eq!(metadata.year.as_deref(), Some("2018"));
  assert_eq!(metadata.url, "https://arxiv.org/pdf/1809.09600.pdf");
  assert_eq!(metadata.source, "arxiv");
  Ok(())
}

#[tokio::test]
async fn test_arxiv_error_entry() -> TestResult<()> {
  let server =
    TestServer::start(vec![("/api/query?id_list=bogus", 200, ATOM_ERROR.as_bytes().to_vec())]).await;
  let arxiv = ArxivRetriever::with_api_base(server.url("/api/query"));

  match arxiv.get(&HttpClient::default(), "bogus").await {
    Err(EvidenceError::MetadataFetch { tag, id, reason }) => {
      assert_eq!(tag, "arxiv");
      assert_eq!(id, "bogus");
      assert!(reason.contains("incorrect id format"));
    },
    other => panic!("expected a metadata failure, got {other:?}"),
  }
  Ok(())
}

#[tokio::test]
async fn test_metadata_status_failure() -> TestResult<()> {
  let server = TestServer::start(vec![]).await;
  let wiki = WikipediaRetriever::with_api_base(server.url("/summary"));

  let err = wiki.get(&HttpClient::default(), "Rust").await.unwrap_err();
  assert!(matches!(err, EvidenceError::MetadataFetch { .. }));
  assert!(err.to_string().contains("404"));
  assert_eq!(server.hits(), 1);
  Ok(())
}

#[tokio::test]
async fn test_acl_metadata() -> TestResult<()> {
  let server = TestServer::start(vec![("/N19-1423", 200, ACL_PAGE.as_bytes().to_vec())]).await;
  let acl = AclRetriever::with_base(server.url(""));

  let metadata = acl.get(&HttpClient::default(), "N19-1423").await?;

  assert_eq!(
    metadata.title,
    "BERT: Pre-training of Deep Bidirectional Transformers for Language Understanding"
  );
  assert!(metadata.abs.starts_with("We introduce a new language representation model"));
  assert_eq!(metadata.year.as_deref(), Some("2019"));
  assert_eq!(metadata.url, "https://aclanthology.org/N19-1423.pdf");
  assert_eq!(metadata.source, "acl anthology");
  Ok(())
}

#[tokio::test]
async fn test_wikipedia_metadata() -> TestResult<()> {
  let server = TestServer::start(vec![(
    "/summary/Rust_(programming_language)",
    200,
    WIKI_SUMMARY.as_bytes().to_vec(),
  )])
  .await;
  let wiki = WikipediaRetriever::with_api_base(server.url("/summary"));

  let metadata = wiki
    .from_url(&HttpClient::default(), "https://en.wikipedia.org/wiki/Rust_(programming_language)")
    .await?;

  assert_eq!(metadata.title, "Rust (programming language)");
  assert!(metadata.abs.starts_with("Rust is a general-purpose"));
  assert_eq!(metadata.year, None);
  assert_eq!(metadata.url, "https://en.wikipedia.org/wiki/Rust_(programming_language)");
  Ok(())
}

#[tokio::test]
async fn test_refusing_sources_make_no_request() -> TestResult<()> {
  let registry = RetrieverRegistry::default();
  let client = HttpClient::default();

  for (source, id) in [("pubmed", "31452104"), ("mp", "mp-149"), ("springer", "10.1007_978-3")] {
    let err = registry.resolve(source)?.get(&client, id).await.unwrap_err();
    assert!(matches!(err, EvidenceError::PolicyRefusal { .. }), "{source}: {err}");
  }
  Ok(())
}
