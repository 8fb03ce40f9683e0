use super::*;

#[traced_test]
#[tokio::test]
async fn test_download_into_cache_layout() -> TestResult<()> {
  let server = TestServer::arxiv().await;
  let (handler, dir) = create_test_handler(|config| config);
  let mut doc = arxiv_document(&server);

  let path = handler.hydrate(&mut doc, &HydrateOptions::default()).await?;

  let expected = dir.path().join("docs/unknown/arxiv/1809.09600.pdf");
  assert_eq!(path.as_deref(), Some(expected.as_path()));
  assert_eq!(fs::read(&expected)?, PDF_BYTES);
  assert_eq!(doc.hash.as_deref(), Some(PDF_MD5));
  assert_eq!(doc.source, "arxiv");
  assert_eq!(server.hits(), 1);
  // Acquisition never records anything in the store
  assert!(handler.store().is_empty());
  Ok(())
}

#[tokio::test]
async fn test_configured_algorithm_is_used() -> TestResult<()> {
  let server = TestServer::arxiv().await;
  let (handler, _dir) =
    create_test_handler(|config| config.with_hash_algorithm(HashAlgorithm::Sha256));
  let mut doc = arxiv_document(&server);

  handler.hydrate(&mut doc, &HydrateOptions::default()).await?;
  assert_eq!(doc.hash.as_deref(), Some(PDF_SHA256));
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_second_run_is_served_locally() -> TestResult<()> {
  let server = TestServer::arxiv().await;
  let (mut handler, dir) = create_test_handler(|config| config);
  let mut first = arxiv_document(&server);
  let path = handler.hydrate(&mut first, &HydrateOptions::default()).await?;

  handler.index::<&Path>(&[])?;
  handler.close()?;

  // A new run over the same cache finds the file through the persisted store
  let handler = DocumentHandler::open(Config::default().with_doc_dir(dir.path().join("docs")))?;
  let mut second = arxiv_document(&server);
  let again = handler.hydrate(&mut second, &HydrateOptions::default()).await?;

  assert_eq!(server.hits(), 1);
  assert_eq!(again, path);
  assert_eq!(second.hash, first.hash);
  assert!(logs_contain("no copy necessary"));
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_indexed_cache_entry_is_returned() -> TestResult<()> {
  let server = TestServer::arxiv().await;
  let (mut handler, dir) = create_test_handler(|config| config);
  let cached = dir.path().join("docs/unknown/arxiv/1809.09600.pdf");
  write_file(&cached, PDF_BYTES);
  handler.index::<&Path>(&[])?;
  assert_eq!(handler.store().get("1809.09600"), Some(cached.as_path()));

  let mut doc = arxiv_document(&server);
  let path = handler.hydrate(&mut doc, &HydrateOptions::default()).await?;

  assert_eq!(server.hits(), 0);
  assert_eq!(path, Some(cached));
  assert_eq!(doc.hash.as_deref(), Some(PDF_MD5));
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_indexed_path_takes_priority_over_local_dir() -> TestResult<()> {
  let server = TestServer::arxiv().await;
  let (mut handler, dir) = create_test_handler(|config| config);
  let indexed = dir.path().join("zotero/1809.09600.pdf");
  write_file(&indexed, PDF_BYTES);
  let other = dir.path().join("other/1809.09600.pdf");
  write_file(&other, b"a different copy");
  handler.insert("1809.09600", &indexed);

  let mut doc = arxiv_document(&server);
  let options = HydrateOptions::default().with_local_dir(dir.path().join("other"));
  let path = handler.hydrate(&mut doc, &options).await?.unwrap();

  assert_eq!(path, dir.path().join("docs/unknown/arxiv/1809.09600.pdf"));
  assert_eq!(doc.hash.as_deref(), Some(PDF_MD5));
  // Copies leave the original in place
  assert!(indexed.exists());
  assert_eq!(server.hits(), 0);
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_move_transfer_removes_original() -> TestResult<()> {
  let server = TestServer::arxiv().await;
  let (handler, dir) = create_test_handler(|config| config.with_transfer(Transfer::Move));
  let download = dir.path().join("downloads/nested/1809.09600.pdf");
  write_file(&download, PDF_BYTES);

  let mut doc = arxiv_document(&server);
  let options = HydrateOptions::default().with_local_dir(dir.path().join("downloads"));
  let path = handler.hydrate(&mut doc, &options).await?.unwrap();

  assert!(path.exists());
  assert!(!download.exists());
  assert_eq!(server.hits(), 0);
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_walk_disabled_only_checks_top_level() -> TestResult<()> {
  let server = TestServer::arxiv().await;
  let (handler, dir) = create_test_handler(|config| config.with_walk(false));
  write_file(&dir.path().join("downloads/nested/1809.09600.pdf"), b"nested copy");

  let mut doc = arxiv_document(&server);
  let options = HydrateOptions::default().offline(true).with_local_dir(dir.path().join("downloads"));
  assert!(handler.hydrate(&mut doc, &options).await?.is_none());

  write_file(&dir.path().join("downloads/1809.09600.pdf"), PDF_BYTES);
  assert!(handler.hydrate(&mut doc, &options).await?.is_some());
  assert_eq!(doc.hash.as_deref(), Some(PDF_MD5));
  assert_eq!(server.hits(), 0);
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_offline_without_local_copy() -> TestResult<()> {
  let server = TestServer::arxiv().await;
  let (handler, dir) = create_test_handler(|config| config);
  let mut doc = arxiv_document(&server);
  let options = HydrateOptions::default().offline(true).with_local_dir(dir.path().join("empty"));

  assert!(handler.hydrate(&mut doc, &options).await?.is_none());
  assert!(doc.hash.is_none());
  assert_eq!(server.hits(), 0);
  assert!(logs_contain("does not exist"));
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_missing_indexed_file_falls_back_to_remote() -> TestResult<()> {
  let server = TestServer::arxiv().await;
  let (mut handler, dir) = create_test_handler(|config| config);
  handler.insert("1809.09600", dir.path().join("deleted/1809.09600.pdf"));

  let mut doc = arxiv_document(&server);
  let path = handler.hydrate(&mut doc, &HydrateOptions::default()).await?;

  assert!(path.is_some());
  assert_eq!(server.hits(), 1);
  assert!(logs_contain("does not exist"));
  Ok(())
}

#[tokio::test]
async fn test_non_success_status() -> TestResult<()> {
  let server = TestServer::start(vec![]).await;
  let (handler, dir) = create_test_handler(|config| config);
  let mut doc = Document::new("0000.00000", server.url("/pdf/0000.00000.pdf"), "arxiv");

  match handler.hydrate(&mut doc, &HydrateOptions::default()).await {
    Err(EvidenceError::RemoteFetch { url, status }) => {
      assert_eq!(status, 404);
      assert!(url.ends_with("/pdf/0000.00000.pdf"));
    },
    other => panic!("expected a remote fetch failure, got {other:?}"),
  }
  assert!(doc.hash.is_none());
  assert!(!dir.path().join("docs/unknown/arxiv/0000.00000.pdf").exists());
  Ok(())
}

#[tokio::test]
async fn test_transport_failure_is_retryable() -> TestResult<()> {
  // Bind and immediately release a port so nothing is listening on it
  let addr = TcpListener::bind("127.0.0.1:0").await?.local_addr()?;
  let (handler, _dir) = create_test_handler(|config| config);
  let mut doc = Document::new("1809.09600", format!("http://{addr}/pdf/1809.09600.pdf"), "arxiv");

  let err = handler.hydrate(&mut doc, &HydrateOptions::default()).await.unwrap_err();
  assert!(matches!(err, EvidenceError::Transport { .. }));
  assert!(err.is_retryable());
  Ok(())
}

#[tokio::test]
async fn test_license_and_source_are_normalized() -> TestResult<()> {
  let (handler, dir) = create_test_handler(|config| config);
  let drop = dir.path().join("drop");
  write_file(&drop.join("S0010482520301591.pdf"), PDF_BYTES);

  let mut doc = Document::new(
    "S0010482520301591",
    "https://www.sciencedirect.com/science/article/pii/S0010482520301591",
    "sciencedirect",
  );
  doc.license = "CC-BY".to_string();
  doc.source = "ScienceDirect".to_string();

  let options = HydrateOptions::default().with_local_dir(&drop);
  let path = handler.hydrate(&mut doc, &options).await?.unwrap();
  assert_eq!(path, dir.path().join("docs/cc-by/sciencedirect/S0010482520301591.pdf"));
  assert_eq!(doc.license, "cc-by");
  Ok(())
}

#[tokio::test]
async fn test_publisher_refuses_remote_fetch() -> TestResult<()> {
  let (handler, _dir) = create_test_handler(|config| config);
  let mut doc = Document::new(
    "10.1103_PhysRevLett.116.061102",
    "https://journals.aps.org/doi/10.1103/PhysRevLett.116.061102",
    "aps",
  );

  let result = handler.hydrate(&mut doc, &HydrateOptions::default()).await;
  assert!(matches!(result, Err(EvidenceError::PolicyRefusal { .. })));
  assert!(!result.unwrap_err().is_retryable());
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_recorded_hash_is_cleared_without_a_file() -> TestResult<()> {
  let server = TestServer::start(vec![]).await;
  let (handler, _dir) = create_test_handler(|config| config);
  let record = format!(
    r#"{{"id": "1809.09600", "url": "{}", "source": "arxiv", "hash": "deadbeef"}}"#,
    server.url("/pdf/1809.09600.pdf")
  );

  let mut offline: Document = serde_json::from_str(&record)?;
  let recorded = offline.hash.clone();
  assert_eq!(recorded.as_deref(), Some("deadbeef"));
  let path = handler.hydrate(&mut offline, &HydrateOptions::default().offline(true)).await?;
  assert!(path.is_none());
  assert!(offline.hash.is_none());

  let mut online: Document = serde_json::from_str(&record)?;
  let result = handler.hydrate(&mut online, &HydrateOptions::default()).await;
  assert!(matches!(result, Err(EvidenceError::RemoteFetch { status: 404, .. })));
  assert!(online.hash.is_none());
  assert_eq!(server.hits(), 1);
  Ok(())
}
