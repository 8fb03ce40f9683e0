//! Module for the "hash" functionality.

use super::*;

/// Arguments that can be used for the [`Commands::Hash`]
#[derive(Args, Clone)]
pub struct HashArgs {
  /// File to fingerprint
  pub path: PathBuf,

  /// Digest algorithm (md5 or sha256)
  #[arg(long, short, default_value = "md5")]
  pub algorithm: String,
}

/// Function for the [`Commands::Hash`] in the CLI.
pub fn hash_file(args: HashArgs) -> Result<()> {
  let algorithm = parse_algorithm(&args.algorithm)?;
  let digest = evidence::hash::compute_hash(&args.path, algorithm)?;
  println!("{}  {}", digest, args.path.display());
  Ok(())
}
