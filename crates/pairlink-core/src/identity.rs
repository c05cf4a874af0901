use crate::{Error, Result};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Default file holding the session identifier, relative to the working directory
pub const DEFAULT_SESSION_FILE: &str = "session-id.txt";

/// Length of a freshly generated identifier
const GENERATED_LEN: usize = 8;

/// Opaque identifier for one pairing session, stable across restarts
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap an existing identifier value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generate a new short identifier from a v4 UUID
    pub fn generate() -> Self {
        let uuid = Uuid::new_v4().simple().to_string();
        Self(uuid[..GENERATED_LEN].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the session identifier came from on this run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Loaded,
    Generated,
}

/// Loads or creates the persisted session identifier
pub struct IdentityStore {
    path: PathBuf,
}

impl IdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the identity file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the persisted identifier, generating and persisting one if absent
    pub fn resolve(&self) -> Result<SessionId> {
        self.resolve_with_origin().map(|(id, _)| id)
    }

    /// Like [`resolve`](Self::resolve), also reporting whether the value was generated
    pub fn resolve_with_origin(&self) -> Result<(SessionId, Origin)> {
        if let Some(id) = self.load()? {
            tracing::debug!("Loaded session ID: {}", id);
            return Ok((id, Origin::Loaded));
        }

        let id = SessionId::generate();
        match self.persist(&id) {
            Ok(()) => {
                tracing::debug!("Generated session ID: {}", id);
                Ok((id, Origin::Generated))
            }
            // Another process created the file between our read and write
            Err(Error::Io(e)) if e.kind() == ErrorKind::AlreadyExists => match self.load()? {
                Some(existing) => {
                    tracing::info!("Adopted concurrently created session ID: {}", existing);
                    Ok((existing, Origin::Loaded))
                }
                None => {
                    self.overwrite(&id)?;
                    Ok((id, Origin::Generated))
                }
            },
            Err(e) => Err(e),
        }
    }

    /// Read the stored identifier; `None` when the file is missing or blank
    fn load(&self) -> Result<Option<SessionId>> {
        tracing::debug!("Reading session ID from: {}", self.path.display());

        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Io(e)),
        };

        let content =
            String::from_utf8(bytes).map_err(|_| Error::CorruptIdentity(self.path.clone()))?;
        let trimmed = content.trim();

        if trimmed.is_empty() {
            tracing::warn!(
                "Session ID file {} is empty, a new ID will be generated",
                self.path.display()
            );
            return Ok(None);
        }

        Ok(Some(SessionId::new(trimmed)))
    }

    fn persist(&self, id: &SessionId) -> Result<()> {
        if self.path.exists() {
            // Blank file left behind by an earlier run
            return self.overwrite(id);
        }

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)?;
        write_synced(file, id)
    }

    fn overwrite(&self, id: &SessionId) -> Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;
        write_synced(file, id)
    }
}

impl Default for IdentityStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_FILE)
    }
}

fn write_synced(mut file: fs::File, id: &SessionId) -> Result<()> {
    file.write_all(id.as_str().as_bytes())?;
    file.sync_all()?;
    Ok(())
}
