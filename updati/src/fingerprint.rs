//! Change detection for files rewritten by dependency managers.
//!
//! A [`Fingerprint`] is taken before and after an update command runs; the
//! two are compared to decide whether the command produced new state.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::Path;

/// Content fingerprint of a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "digest", rename_all = "snake_case")]
pub enum Fingerprint {
    /// The file does not exist.
    Absent,

    /// Hex-encoded SHA-256 of the full file contents.
    Digest(String),
}

/// Fingerprints the file at `path`.
///
/// A missing file yields [`Fingerprint::Absent`].
///
/// # Errors
///
/// Returns any I/O error other than "not found".
pub async fn fingerprint(path: &Path) -> std::io::Result<Fingerprint> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Fingerprint::Digest(digest(&bytes))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Fingerprint::Absent),
        Err(e) => Err(e),
    }
}

fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
