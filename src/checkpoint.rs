//! Seed checkpointing and the resume chain
//!
//! The search persists its position as plain decimal text in a primary
//! save file, with an intermittent backup save. On startup the seed is
//! recovered through an ordered fallback chain: primary, then backup,
//! then the configured initial constant. Checkpoints are best-effort by
//! design: a failed write is logged and the search keeps going with its
//! in-memory seed.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use num_bigint::BigUint;
use num_integer::Integer;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::FilesConfig;
use crate::lock::LockedFile;

/// Errors from a single checkpoint file operation
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint file not found: {0}")]
    Missing(PathBuf),

    #[error("invalid integer in checkpoint file {path}: {content:?}")]
    Malformed { path: PathBuf, content: String },

    #[error("I/O error on checkpoint file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CheckpointError {
    /// True when the file simply does not exist yet
    pub fn is_missing(&self) -> bool {
        matches!(self, CheckpointError::Missing(_))
    }
}

/// Store handling the primary/backup/timeout checkpoint files
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    primary: PathBuf,
    backup: PathBuf,
    timeout: PathBuf,
}

impl CheckpointStore {
    /// Create a store over the configured file paths
    pub fn new(files: &FilesConfig) -> Self {
        debug!(?files.primary, ?files.backup, ?files.timeout, "CheckpointStore::new: called");
        Self {
            primary: files.primary.clone(),
            backup: files.backup.clone(),
            timeout: files.timeout.clone(),
        }
    }

    /// Recover the last saved seed through the resume chain.
    ///
    /// Primary wins; the backup is consulted only when the primary is
    /// absent or malformed (detected by the seed still equalling the
    /// initial constant). Both failing falls back to `initial`. The
    /// result is forced odd. This never fails: every error in the chain
    /// is logged and absorbed.
    pub fn load_seed(&self, initial: &BigUint) -> BigUint {
        debug!(%initial, "CheckpointStore::load_seed: called");
        let mut seed = initial.clone();

        match read_seed(&self.primary) {
            Ok(s) => {
                info!(seed = %s, path = ?self.primary, "seed read from primary save file");
                seed = s;
            }
            Err(e) if e.is_missing() => {
                info!(path = ?self.primary, "no primary save file, trying backup");
            }
            Err(e) => {
                warn!(error = %e, "invalid primary save file, trying backup");
            }
        }

        // Each file's lock covers only its own read; the chain as a whole
        // is not atomic, which is fine since nothing writes across files.
        if seed == *initial {
            match read_seed(&self.backup) {
                Ok(s) => {
                    info!(seed = %s, path = ?self.backup, "seed read from backup save file");
                    seed = s;
                }
                Err(e) if e.is_missing() => {
                    info!(path = ?self.backup, "no backup save file, starting from initial seed");
                }
                Err(e) => {
                    warn!(error = %e, "invalid backup save file, starting from initial seed");
                }
            }
        }

        if seed.is_even() {
            seed += 1u32;
            info!(%seed, "seed adjusted to odd");
        }

        debug!(%seed, "CheckpointStore::load_seed: returning");
        seed
    }

    /// Read the primary checkpoint without any fallback (status display)
    pub fn read_primary(&self) -> Result<BigUint, CheckpointError> {
        debug!(path = ?self.primary, "CheckpointStore::read_primary: called");
        read_seed(&self.primary)
    }

    /// Write the seed to the primary save file under an exclusive lock
    pub fn save_primary(&self, seed: &BigUint) -> Result<(), CheckpointError> {
        debug!(%seed, path = ?self.primary, "CheckpointStore::save_primary: called");
        write_seed(&self.primary, seed)?;
        info!(path = ?self.primary, "seed saved to primary save file");
        Ok(())
    }

    /// Write the seed to the backup save file under an exclusive lock
    pub fn save_backup(&self, seed: &BigUint) -> Result<(), CheckpointError> {
        debug!(%seed, path = ?self.backup, "CheckpointStore::save_backup: called");
        write_seed(&self.backup, seed)?;
        info!(path = ?self.backup, "seed saved to backup save file");
        Ok(())
    }

    /// Write the one-shot timeout snapshot (diagnostic only, unlocked)
    pub fn save_timeout(&self, seed: &BigUint) -> Result<(), CheckpointError> {
        debug!(%seed, path = ?self.timeout, "CheckpointStore::save_timeout: called");
        fs::write(&self.timeout, seed.to_string()).map_err(|e| CheckpointError::Io {
            path: self.timeout.clone(),
            source: e,
        })?;
        info!(path = ?self.timeout, "seed saved to timeout file");
        Ok(())
    }
}

/// Read and parse one checkpoint file under an exclusive lock
fn read_seed(path: &Path) -> Result<BigUint, CheckpointError> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CheckpointError::Missing(path.to_path_buf())
        } else {
            CheckpointError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    let mut locked = LockedFile::exclusive(file).map_err(|e| CheckpointError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut contents = String::new();
    locked
        .read_to_string(&mut contents)
        .map_err(|e| CheckpointError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

    let trimmed = contents.trim();
    trimmed
        .parse::<BigUint>()
        .map_err(|_| CheckpointError::Malformed {
            path: path.to_path_buf(),
            content: truncate_for_log(trimmed),
        })
}

/// Write one seed as decimal text under an exclusive lock
fn write_seed(path: &Path, seed: &BigUint) -> Result<(), CheckpointError> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| CheckpointError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

    let mut locked = LockedFile::exclusive(file).map_err(|e| CheckpointError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    locked
        .write_all(seed.to_string().as_bytes())
        .map_err(|e| CheckpointError::Io {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Keep log lines sane when a save file holds garbage.
/// Truncates on a char boundary; the garbage may be multibyte text.
fn truncate_for_log(s: &str) -> String {
    const MAX: usize = 64;
    match s.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
