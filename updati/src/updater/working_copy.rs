//! Temporary working copies.

use std::path::Path;
use tempfile::TempDir;
use tracing::warn;

/// A uniquely named temporary directory holding one repository clone.
///
/// The directory is removed by [`WorkingCopy::release`] or, on early
/// return, when the value is dropped.
#[derive(Debug)]
pub struct WorkingCopy {
    dir: TempDir,
}

impl WorkingCopy {
    /// Creates an empty directory named `updati-<repository>-XXXX` under the system temp dir.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn create(repository: &str) -> std::io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("updati-{repository}-"))
            .tempdir()?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Removes the directory, logging rather than failing if removal fails.
    pub fn release(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!(path = %path.display(), error = %e, "Failed to remove working copy");
        }
    }
}
