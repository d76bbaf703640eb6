use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use portal_logging::portal_warn;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::{GatewayError, TokenPair, TokenStore};

const TOKENS_FILE: &str = "tokens.json";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("state directory missing or not writable: {0}")]
    StateDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization failed: {0}")]
    Serialize(String),
}

impl From<PersistError> for GatewayError {
    fn from(err: PersistError) -> Self {
        GatewayError::Storage(err.to_string())
    }
}

/// Ensure the state directory exists; create if missing.
pub fn ensure_state_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::StateDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::StateDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::StateDir(e.to_string()))?;
    }
    // Writability check.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::StateDir(e.to_string()))?;
    Ok(())
}

/// Atomically write content to `{dir}/{filename}` by writing a temp file then renaming.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        ensure_state_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

/// Token pair kept as JSON in `{dir}/tokens.json`.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    writer: AtomicFileWriter,
}

impl FileTokenStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.writer.dir().join(TOKENS_FILE)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<TokenPair> {
        let path = self.path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                portal_warn!("Could not read {}: {err}", path.display());
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(tokens) => Some(tokens),
            Err(err) => {
                portal_warn!(
                    "Ignoring unreadable token file {}: {err}",
                    path.display()
                );
                None
            }
        }
    }

    fn save(&self, tokens: &TokenPair) -> Result<(), GatewayError> {
        let json = serde_json::to_string(tokens)
            .map_err(|err| PersistError::Serialize(err.to_string()))?;
        self.writer.write(TOKENS_FILE, &json)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), GatewayError> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(PersistError::Io(err).into()),
        }
    }
}
