use evidence::{handler::BatchReport, retriever::ArxivRetriever, zotero};

use super::*;

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <published>2018-09-25T17:28:07Z</published>
    <title>HotpotQA: A Dataset for Diverse, Explainable Multi-hop Question Answering</title>
    <summary>Existing question answering datasets fail to train systems to perform complex
      reasoning.</summary>
  </entry>
</feed>"#;

/// A handler whose arXiv retriever queries `server` for metadata.
fn handler_with_local_arxiv(server: &TestServer, doc_dir: &Path) -> DocumentHandler {
  let mut handler = DocumentHandler::open(Config::default().with_doc_dir(doc_dir)).unwrap();
  handler.registry_mut().register(ArxivRetriever::with_api_base(server.url("/api/query")));
  handler
}

#[traced_test]
#[tokio::test]
async fn test_failures_do_not_abort_the_batch() -> TestResult<()> {
  let server = TestServer::arxiv().await;
  let dir = tempdir()?;
  let handler = handler_with_local_arxiv(&server, &dir.path().join("docs"));
  let drop = dir.path().join("drop");
  write_file(&drop.join("31452104.pdf"), b"pubmed article");

  let mut docs = vec![
    arxiv_document(&server),
    Document::new("0000.00000", server.url("/pdf/0000.00000.pdf"), "arxiv"),
    Document::new("x", "https://nowhere.example/x", "nowhere"),
    Document::new("31452104", "https://pubmed.ncbi.nlm.nih.gov/31452104/", "pubmed"),
  ];
  let options = HydrateOptions::default().with_local_dir(&drop);
  let report = handler.process_all(&mut docs, &options).await;

  assert_eq!(report, BatchReport { processed: 4, hashed: 2, missing: 0, failed: 2 });
  assert_eq!(docs[0].hash.as_deref(), Some(PDF_MD5));
  assert!(docs[1].hash.is_none());
  assert_eq!(docs[3].license, "pubmed");
  assert!(docs[3].hash.is_some());
  assert!(logs_contain("Failed to process 0000.00000"));
  assert!(logs_contain("Failed to process x"));
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_offline_batch_reports_missing() -> TestResult<()> {
  let server = TestServer::arxiv().await;
  let dir = tempdir()?;
  let handler = handler_with_local_arxiv(&server, &dir.path().join("docs"));

  let mut docs = vec![
    arxiv_document(&server),
    Document::new("Rust", "https://en.wikipedia.org/wiki/Rust", "wikipedia"),
  ];
  let report = handler.process_all(&mut docs, &HydrateOptions::default().offline(true)).await;

  assert_eq!(report, BatchReport { processed: 2, hashed: 0, missing: 2, failed: 0 });
  assert_eq!(server.hits(), 0);
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_process_fills_missing_metadata() -> TestResult<()> {
  let server = TestServer::start(vec![
    ("/pdf/1809.09600.pdf", 200, PDF_BYTES.to_vec()),
    ("/api/query?id_list=1809.09600", 200, FEED.as_bytes().to_vec()),
  ])
  .await;
  let dir = tempdir()?;
  let handler = handler_with_local_arxiv(&server, &dir.path().join("docs"));

  let mut doc = arxiv_document(&server).with_year("2019");
  handler.process(&mut doc, &HydrateOptions::default()).await?;

  assert_eq!(
    doc.title.as_deref(),
    Some("HotpotQA: A Dataset for Diverse, Explainable Multi-hop Question Answering")
  );
  assert!(doc.abstract_text.as_deref().unwrap().starts_with("Existing question answering"));
  // A year supplied with the entry is kept
  assert_eq!(doc.year.as_deref(), Some("2019"));
  assert_eq!(server.hits(), 2);
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_metadata_failure_is_not_an_error() -> TestResult<()> {
  let server = TestServer::arxiv().await;
  let dir = tempdir()?;
  let handler = handler_with_local_arxiv(&server, &dir.path().join("docs"));

  let mut doc = arxiv_document(&server);
  let path = handler.process(&mut doc, &HydrateOptions::default()).await?;

  assert!(path.is_some());
  assert!(doc.title.is_none());
  assert!(logs_contain("Failed to retrieve title and abstract for 1809.09600"));
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_zotero_attachments_hydrate_offline() -> TestResult<()> {
  let dir = tempdir()?;
  let downloads = dir.path().join("zotero");
  write_file(&downloads.join("Novoselov - 2004 - Graphene.pdf"), PDF_BYTES);
  let items: Vec<zotero::ZoteroItem> = serde_json::from_str(
    r#"[
      {"data": {"key": "ABCD1234", "itemType": "journalArticle", "title": "Graphene",
                "abstractNote": "Electric field effect", "parsedDate": "2004-10-22",
                "url": "https://www.sciencedirect.com/science/article/pii/S0000000000000001",
                "extra": "Publisher: ScienceDirect"}},
      {"data": {"key": "FILE0001", "itemType": "attachment", "parentItem": "ABCD1234",
                "filename": "Novoselov - 2004 - Graphene.pdf"}}
    ]"#,
  )?;

  let (handler, _) = create_test_handler(|config| config.with_doc_dir(dir.path().join("docs")));
  let mut entries = zotero::convert_items(&items, Some(&downloads));
  let entry = &mut entries[0];
  let options = HydrateOptions {
    offline: true,
    local_dir: entry.document_path.clone(),
    ..Default::default()
  };
  let path = handler.process(&mut entry.document, &options).await?.unwrap();

  assert_eq!(path, dir.path().join("docs/sciencedirect/sciencedirect/ABCD1234.pdf"));
  assert_eq!(entry.document.hash.as_deref(), Some(PDF_MD5));
  assert_eq!(entry.document.title.as_deref(), Some("Graphene"));
  Ok(())
}
