//! On-disk storage for the single delegated-access credential.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::credential::StoredCredential;
use crate::error::{GcalError, GcalResult};

/// Reads and writes `token.json` at a fixed path.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CredentialStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored credential.
    ///
    /// A missing file is `CredentialNotFound`. Anything that exists but can't be
    /// read into a complete credential is `CorruptCredential`, never half-trusted.
    pub fn load(&self) -> GcalResult<StoredCredential> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(GcalError::CredentialNotFound(self.path.clone()));
            }
            Err(e) => return Err(self.corrupt(e.to_string())),
        };

        let credential: StoredCredential =
            serde_json::from_str(&contents).map_err(|e| self.corrupt(e.to_string()))?;

        if credential.access_token.is_empty() {
            return Err(self.corrupt("access token is empty"));
        }

        debug!(path = %self.path.display(), expiry = %credential.expiry, "Loaded stored credential");

        Ok(credential)
    }

    /// Atomically replace the stored credential.
    ///
    /// The JSON goes to a temp file next to the target, is restricted to the
    /// owner, synced, then renamed over `token.json`.
    pub fn save(&self, credential: &StoredCredential) -> GcalResult<()> {
        info!("Saving credential file to: {}", self.path.display());

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| self.persistence(e))?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(dir, fs::Permissions::from_mode(0o700))
                    .map_err(|e| self.persistence(e))?;
            }
        }

        let contents = serde_json::to_string_pretty(credential)
            .map_err(|e| self.persistence(io::Error::other(e)))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.persistence(e))?;

        // Set to owner-only (0600) since file contains OAuth tokens:
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|e| self.persistence(e))?;
        }

        tmp.write_all(contents.as_bytes())
            .map_err(|e| self.persistence(e))?;
        tmp.as_file().sync_all().map_err(|e| self.persistence(e))?;

        tmp.persist(&self.path)
            .map_err(|e| self.persistence(e.error))?;

        Ok(())
    }

    fn corrupt(&self, reason: impl Into<String>) -> GcalError {
        GcalError::CorruptCredential {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }

    fn persistence(&self, source: io::Error) -> GcalError {
        GcalError::Persistence {
            path: self.path.clone(),
            source,
        }
    }
}
