//! Content fingerprints for cached documents.
//!
//! Files are read in fixed-size chunks so memory use stays bounded regardless of document
//! size. The digest is returned as lowercase hex and depends only on the file's bytes.
//!
//! # Examples
//!
//! ```no_run
//! use evidence::hash::{compute_hash, HashAlgorithm};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let algorithm: HashAlgorithm = "sha256".parse()?;
//! let digest = compute_hash("data/docs/unknown/arxiv/1809.09600.pdf", algorithm)?;
//! println!("{digest}");
//! # Ok(())
//! # }
//! ```

use std::io::{BufReader, Read};

use md5::Md5;
use sha2::{Digest, Sha256};

use super::*;

/// Size of each read from the file being hashed.
const CHUNK_SIZE: usize = 8192;

/// Digest algorithms available for fingerprinting documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
  /// MD5, fast and compatible with previously recorded fingerprints.
  #[default]
  Md5,
  /// SHA-256.
  Sha256,
}

impl Display for HashAlgorithm {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      HashAlgorithm::Md5 => write!(f, "md5"),
      HashAlgorithm::Sha256 => write!(f, "sha256"),
    }
  }
}

impl FromStr for HashAlgorithm {
  type Err = EvidenceError;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_lowercase().as_str() {
      "md5" => Ok(HashAlgorithm::Md5),
      "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
      other => Err(EvidenceError::UnsupportedAlgorithm(other.to_owned())),
    }
  }
}

/// Computes the hex digest of everything `reader` yields.
pub fn hash_reader<R: Read>(reader: R, algorithm: HashAlgorithm) -> std::io::Result<String> {
  match algorithm {
    HashAlgorithm::Md5 => digest_chunks::<Md5, _>(reader),
    HashAlgorithm::Sha256 => digest_chunks::<Sha256, _>(reader),
  }
}

/// Computes the hex digest of the file at `path`.
///
/// # Errors
///
/// Returns [`EvidenceError::Filesystem`] at the [`Stage::Hashing`] stage if the file cannot be
/// opened or read.
pub fn compute_hash(path: impl AsRef<Path>, algorithm: HashAlgorithm) -> Result<String> {
  let path = path.as_ref();
  let file = fs::File::open(path).map_err(EvidenceError::stage(path, Stage::Hashing))?;
  let digest =
    hash_reader(BufReader::new(file), algorithm).map_err(EvidenceError::stage(path, Stage::Hashing))?;
  trace!("{algorithm} of {}: {digest}", path.display());
  Ok(digest)
}

/// Recomputes the digest of `path` and compares it with a previously recorded one.
///
/// Hex case is ignored. Returns the fresh digest on success.
///
/// # Errors
///
/// [`EvidenceError::IntegrityMismatch`] naming `id` when the digests differ.
pub fn verify_hash(
  id: &str,
  path: impl AsRef<Path>,
  expected: &str,
  algorithm: HashAlgorithm,
) -> Result<String> {
  let actual = compute_hash(path, algorithm)?;
  if !actual.eq_ignore_ascii_case(expected.trim()) {
    return Err(EvidenceError::IntegrityMismatch {
      id: id.to_string(),
      expected: expected.to_string(),
      actual,
    });
  }
  Ok(actual)
}

/// Feeds `reader` to `D` in [`CHUNK_SIZE`] pieces and hex-encodes the digest.
fn digest_chunks<D: Digest, R: Read>(mut reader: R) -> std::io::Result<String> {
  let mut hasher = D::new();
  let mut buffer = [0u8; CHUNK_SIZE];
  loop {
    let n = reader.read(&mut buffer)?;
    if n == 0 {
      break;
    }
    hasher.update(&buffer[..n]);
  }
  Ok(hex::encode(hasher.finalize()))
}
