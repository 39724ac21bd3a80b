//! # Session Identity
//!
//! A single opaque id (`user_` + 9 chars) that scopes server-side history.
//! Read from `~/.truss-chat/session_id`, created there on first use.
//!
//! Providers are injected into `App::new` so tests never touch the home
//! directory.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::core::config::config_dir;

/// Source of the per-user session identifier.
pub trait IdentityProvider {
    /// Returns the session id, creating and persisting one if needed.
    fn session_id(&self) -> String;
}

/// Generate a fresh `user_xxxxxxxxx` identifier.
pub fn new_session_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("user_{}", &hex[..9])
}

#[derive(Debug)]
pub enum IdentityError {
    Io(io::Error),
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityError::Io(e) => write!(f, "session id I/O error: {e}"),
        }
    }
}

impl std::error::Error for IdentityError {}

/// File-backed identity. The file holds the id and nothing else.
pub struct FileIdentity {
    path: PathBuf,
}

impl FileIdentity {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.truss-chat/session_id`, or None without a home directory.
    pub fn default_location() -> Option<Self> {
        config_dir().map(|dir| Self::new(dir.join("session_id")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored id, or generate and persist one if absent or blank.
    pub fn read_or_create(&self) -> Result<String, IdentityError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let id = contents.trim();
                if !id.is_empty() {
                    debug!("Loaded session id from {}", self.path.display());
                    return Ok(id.to_string());
                }
                warn!("Session id file is empty, regenerating: {}", self.path.display());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(IdentityError::Io(e)),
        }

        let id = new_session_id();
        self.persist(&id).map_err(IdentityError::Io)?;
        info!("Created session id at {}", self.path.display());
        Ok(id)
    }

    /// Write via `.tmp` + rename so a crash never leaves a half-written id.
    fn persist(&self, id: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, id)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl IdentityProvider for FileIdentity {
    fn session_id(&self) -> String {
        match self.read_or_create() {
            Ok(id) => id,
            Err(e) => {
                warn!("{}; using a process-lifetime session id", e);
                new_session_id()
            }
        }
    }
}

/// In-memory identity: a fixed id, or one generated once for the process.
pub struct MemoryIdentity {
    id: String,
}

impl MemoryIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn generate() -> Self {
        Self::new(new_session_id())
    }
}

impl IdentityProvider for MemoryIdentity {
    fn session_id(&self) -> String {
        self.id.clone()
    }
}
