//! Exclusive file access
//!
//! Wraps an open [`File`] in an advisory exclusive lock for the duration of
//! a single read or write call. The contract is cooperative: no other
//! process that also takes the lock may touch the file while the guard is
//! held. The guard releases the lock on drop; a failed unlock is logged
//! and otherwise ignored.

use std::fs::File;
use std::io;
use std::ops::{Deref, DerefMut};

use fs2::FileExt;
use tracing::{debug, error};

/// Scoped exclusive lock over an open file.
///
/// Derefs to [`File`] so callers can read and write through the guard.
#[derive(Debug)]
pub struct LockedFile {
    file: File,
}

impl LockedFile {
    /// Take an exclusive advisory lock on `file`, blocking until acquired.
    pub fn exclusive(file: File) -> io::Result<Self> {
        debug!("LockedFile::exclusive: acquiring lock");
        file.lock_exclusive()?;
        debug!("LockedFile::exclusive: lock acquired");
        Ok(Self { file })
    }
}

impl Deref for LockedFile {
    type Target = File;

    fn deref(&self) -> &File {
        &self.file
    }
}

impl DerefMut for LockedFile {
    fn deref_mut(&mut self) -> &mut File {
        &mut self.file
    }
}

impl Drop for LockedFile {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            // Non-fatal: the lock dies with the fd when the file closes.
            error!(error = %e, "LockedFile::drop: failed to release file lock");
        } else {
            debug!("LockedFile::drop: lock released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use std::io::{Read, Seek, SeekFrom, Write};
    use tempfile::TempDir;

    #[test]
    fn test_lock_write_read_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("locked.txt");

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .unwrap();
        let mut locked = LockedFile::exclusive(file).unwrap();
        locked.write_all(b"12345").unwrap();
        locked.seek(SeekFrom::Start(0)).unwrap();

        let mut contents = String::new();
        locked.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "12345");
    }

    #[test]
    fn test_relock_after_drop() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("locked.txt");

        let file = File::create(&path).unwrap();
        let guard = LockedFile::exclusive(file).unwrap();
        drop(guard);

        // The lock must be released by drop, so taking it again succeeds.
        let file = File::open(&path).unwrap();
        let _guard = LockedFile::exclusive(file).unwrap();
    }
}
