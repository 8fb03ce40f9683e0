//! Module for the "index" functionality.

use super::*;

/// Arguments that can be used for the [`Commands::Index`]
#[derive(Args, Clone)]
pub struct IndexArgs {
  /// Directories scanned before the cache and the configured local directories
  pub dirs: Vec<PathBuf>,
}

/// Function for the [`Commands::Index`] in the CLI.
pub async fn index(cli: &Cli, args: IndexArgs) -> Result<()> {
  let mut handler = open_handler(cli)?;

  for dir in args.dirs.iter().filter(|dir| !dir.is_dir()) {
    println!(
      "{} Skipping {}, not a directory",
      style(WARNING_PREFIX).yellow(),
      style(dir.display()).yellow()
    );
  }
  let dirs: Vec<&PathBuf> = args.dirs.iter().filter(|dir| dir.is_dir()).collect();

  let report = handler.index(&dirs)?;
  let entries = handler.store().len();
  let store_path = handler.store().path().to_path_buf();
  handler.close()?;

  println!(
    "{} Indexed {} files, {} entries updated",
    style(SUCCESS_PREFIX).green(),
    style(report.found).cyan(),
    style(report.updated).cyan()
  );
  println!(
    "{} {} entries recorded in {}",
    style(INFO_PREFIX).cyan(),
    entries,
    style(store_path.display()).yellow()
  );
  Ok(())
}
