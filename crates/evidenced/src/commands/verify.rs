//! Module for the "verify" functionality.

use super::*;

/// Arguments that can be used for the [`Commands::Verify`]
#[derive(Args, Clone)]
pub struct VerifyArgs {
  /// File to check
  pub path: PathBuf,

  /// Fingerprint recorded for the file
  pub expected: String,

  /// Digest algorithm (md5 or sha256)
  #[arg(long, short, default_value = "md5")]
  pub algorithm: String,
}

/// Function for the [`Commands::Verify`] in the CLI.
pub fn verify(args: VerifyArgs) -> Result<()> {
  let algorithm = parse_algorithm(&args.algorithm)?;
  let id = args
    .path
    .file_stem()
    .map(|stem| stem.to_string_lossy().into_owned())
    .unwrap_or_else(|| args.path.display().to_string());

  evidence::hash::verify_hash(&id, &args.path, &args.expected, algorithm)?;
  println!(
    "{} {} matches its {} fingerprint",
    style(SUCCESS_PREFIX).green(),
    style(args.path.display()).yellow(),
    algorithm
  );
  Ok(())
}
