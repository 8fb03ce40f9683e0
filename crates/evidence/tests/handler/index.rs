use evidence::LocalStore;

use super::*;

#[traced_test]
#[test]
fn test_later_roots_win() -> TestResult<()> {
  let dir = tempdir()?;
  let a = dir.path().join("a");
  let b = dir.path().join("b");
  write_file(&a.join("1809.09600.pdf"), b"from a");
  write_file(&a.join("only-a.pdf"), b"a");
  write_file(&b.join("sub/1809.09600.pdf"), b"from b");

  let mut store = LocalStore::open(dir.path().join(".store.json"));
  let report = store.index(&[&a, &b])?;

  assert_eq!(report.found, 3);
  assert_eq!(store.get("1809.09600"), Some(b.join("sub/1809.09600.pdf").as_path()));
  assert_eq!(store.get("only-a"), Some(a.join("only-a.pdf").as_path()));
  Ok(())
}

#[test]
fn test_close_then_open_round_trips() -> TestResult<()> {
  let dir = tempdir()?;
  let root = dir.path().join("docs");
  write_file(&root.join("unknown/arxiv/1809.09600.pdf"), PDF_BYTES);
  write_file(&root.join("unknown/wikipedia/Rust_(programming_language).txt"), b"text");
  let path = dir.path().join("state/.store.json");

  let mut store = LocalStore::open(&path);
  store.index(&[&root])?;
  store.insert("manual", dir.path().join("manual.pdf"));
  let entries: Vec<(String, PathBuf)> =
    store.entries().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
  store.close()?;

  let reopened = LocalStore::open(&path);
  let reloaded: Vec<(String, PathBuf)> =
    reopened.entries().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
  assert_eq!(reloaded, entries);
  assert_eq!(reloaded.len(), 3);
  Ok(())
}

#[traced_test]
#[test]
fn test_handler_index_order() -> TestResult<()> {
  let dir = tempdir()?;
  let extra = dir.path().join("extra");
  let zotero = dir.path().join("zotero");
  let config = Config::default().with_doc_dir(dir.path().join("docs")).with_local_dir(&zotero);
  write_file(&extra.join("X1.pdf"), b"extra");
  write_file(&dir.path().join("docs/unknown/arxiv/X1.pdf"), b"cache");
  write_file(&zotero.join("X1.pdf"), b"zotero");
  write_file(&extra.join("X2.pdf"), b"extra");
  write_file(&dir.path().join("docs/unknown/arxiv/X2.pdf"), b"cache");

  let mut handler = DocumentHandler::open(config)?;
  handler.index(&[&extra])?;

  // additional, then doc_dir, then configured directories
  assert_eq!(handler.store().get("X1"), Some(zotero.join("X1.pdf").as_path()));
  assert_eq!(handler.store().get("X2"), Some(dir.path().join("docs/unknown/arxiv/X2.pdf").as_path()));
  assert!(logs_contain("Found 2 files in"));
  Ok(())
}

#[test]
fn test_config_store_file_is_used() -> TestResult<()> {
  let dir = tempdir()?;
  let store_file = dir.path().join("elsewhere/index.json");
  let config = Config::default().with_doc_dir(dir.path().join("docs")).with_store_file(&store_file);
  write_file(&dir.path().join("docs/x.pdf"), b"x");

  let mut handler = DocumentHandler::open(config)?;
  handler.index::<&Path>(&[])?;
  handler.close()?;

  let content = fs::read_to_string(&store_file)?;
  let map: HashMap<String, PathBuf> = serde_json::from_str(&content)?;
  assert_eq!(map.get("x"), Some(&dir.path().join("docs/x.pdf")));
  Ok(())
}

#[traced_test]
#[test]
fn test_corrupt_store_is_replaced_on_close() -> TestResult<()> {
  let dir = tempdir()?;
  let path = dir.path().join("docs/.store.json");
  write_file(&path, b"[1, 2");

  let handler = DocumentHandler::open(Config::default().with_doc_dir(dir.path().join("docs")))?;
  assert!(handler.store().is_empty());
  assert!(logs_contain("Failed to load index"));
  handler.close()?;

  assert_eq!(fs::read_to_string(&path)?.trim(), "{}");
  Ok(())
}
