//! Module for the "zotero" functionality.

use super::*;

/// Arguments that can be used for the [`Commands::Zotero`]
#[derive(Args, Clone)]
pub struct ZoteroArgs {
  /// JSON export of Zotero items
  pub items: PathBuf,

  /// Directory holding the exported attachment files
  #[arg(long)]
  pub download_dir: Option<PathBuf>,

  /// Never touch the network
  #[arg(long)]
  pub offline: bool,
}

/// Function for the [`Commands::Zotero`] in the CLI.
///
/// Entries are acquired one at a time since each carries its own attachment hint.
pub async fn zotero_import(cli: &Cli, args: ZoteroArgs) -> Result<()> {
  let handler = open_handler(cli)?;
  let items = evidence::zotero::load_items(&args.items)?;
  let mut entries = evidence::zotero::convert_items(&items, args.download_dir.as_deref());
  println!(
    "{} Converted {} items into {} documents",
    style(INFO_PREFIX).cyan(),
    items.len(),
    style(entries.len()).cyan()
  );

  let (mut hashed, mut missing, mut failed) = (0, 0, 0);
  for entry in &mut entries {
    let mut options = HydrateOptions::default().offline(args.offline);
    if let Some(path) = &entry.document_path {
      options = options.with_local_dir(path);
    }

    match handler.process(&mut entry.document, &options).await {
      Ok(Some(path)) => {
        hashed += 1;
        println!("{} {}", style(SUCCESS_PREFIX).green(), style(path.display()).yellow());
      },
      Ok(None) => missing += 1,
      Err(e) => {
        failed += 1;
        println!(
          "{} {}: {}",
          style(WARNING_PREFIX).yellow(),
          style(&entry.document.id).yellow(),
          e
        );
      },
    }
  }
  handler.close()?;

  println!(
    "{} {} acquired, {} missing, {} failed",
    style(INFO_PREFIX).cyan(),
    style(hashed).green(),
    style(missing).yellow(),
    style(failed).red()
  );
  if failed > 0 {
    return Err(EvidencedError::Incomplete { processed: entries.len(), failed });
  }
  Ok(())
}
