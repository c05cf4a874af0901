use crate::{Error, Result};
use pairlink_core::SessionId;
use std::path::{Path, PathBuf};

/// Browser profile directory holding one session's login state
///
/// The directory is keyed on the session identifier so a restarted process
/// with the same identifier resumes without pairing again.
pub struct SessionProfile {
    path: PathBuf,
}

impl SessionProfile {
    /// Open or create the profile for `session_id` under `root`
    pub fn open(root: &Path, session_id: &SessionId) -> Result<Self> {
        let path = root.join(format!("session-{}", session_id));

        if !path.exists() {
            tracing::info!("Creating browser profile at {}", path.display());
            std::fs::create_dir_all(&path)?;
        } else {
            tracing::debug!("Reusing browser profile at {}", path.display());
        }

        Ok(Self { path })
    }

    /// Default root: `~/.pairlink/sessions`
    pub fn default_root() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Browser("Could not determine home directory".to_string()))?;

        Ok(home.join(".pairlink").join("sessions"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
