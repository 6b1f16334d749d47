//! Temporary issuance artifacts.
//!
//! Rendered configuration files and signing requests only live for one
//! issuance call. Each is created under a unique `certiffix-<digits>-<role>`
//! name and removed again: explicitly on success, best-effort on drop when a
//! workflow bails out early.

use crate::error::{CertiffixError, Result};
use rand::Rng;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name prefix shared by every temporary artifact.
pub const ARTIFACT_PREFIX: &str = "certiffix-";

/// Generate the random numeric token shared by one issuance's artifacts.
pub fn random_token() -> String {
    rand::thread_rng().gen::<u64>().to_string()
}

/// A temporary file owned by a single issuance.
#[derive(Debug)]
pub struct TempArtifact {
    path: Option<PathBuf>,
}

impl TempArtifact {
    /// The path an artifact with `token` and `role` would use in `dir`.
    pub fn path_in(dir: &Path, token: &str, role: &str) -> PathBuf {
        dir.join(format!("{}{}-{}", ARTIFACT_PREFIX, token, role))
    }

    /// Create a new artifact holding `contents`.
    ///
    /// Fails instead of reusing a file that already exists.
    pub fn create(dir: &Path, token: &str, role: &str, contents: &str) -> Result<Self> {
        let path = Self::path_in(dir, token, role);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| CertiffixError::file_io(&path, e))?;
        let artifact = Self {
            path: Some(path.clone()),
        };

        file.write_all(contents.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| CertiffixError::file_io(&path, e))?;

        debug!("Wrote temporary artifact {}", path.display());
        Ok(artifact)
    }

    /// Reserve an empty artifact for an external tool to write into.
    pub fn reserve(dir: &Path, token: &str, role: &str) -> Result<Self> {
        Self::create(dir, token, role, "")
    }

    /// The artifact's path.
    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Delete the artifact, reporting any failure.
    pub fn remove(mut self) -> Result<()> {
        match self.path.take() {
            Some(path) => fs::remove_file(&path).map_err(|e| CertiffixError::file_io(&path, e)),
            None => Ok(()),
        }
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = fs::remove_file(&path) {
                warn!("Could not remove temporary artifact {}: {}", path.display(), e);
            }
        }
    }
}
