//! File locking and atomic writes for the store file
//!
//! - Advisory exclusive locks (fs2/flock) on a sibling `<file>.lock`
//! - Bounded wait with `Error::LockFailed` on timeout
//! - Atomic replace: write a temp file in the same directory, then rename

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Default lock timeout in milliseconds
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;

/// Poll interval while waiting on a held lock
const LOCK_RETRY_INTERVAL_MS: u64 = 25;

/// One non-blocking lock attempt. `Ok(false)` means another holder has it.
fn try_lock(file: &File) -> Result<bool> {
    match file.try_lock_exclusive() {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::WouldBlock => Ok(false),
        // Windows reports sharing/lock violations as raw OS errors.
        #[cfg(windows)]
        Err(err) if matches!(err.raw_os_error(), Some(32) | Some(33)) => Ok(false),
        Err(err) => Err(Error::Io(err)),
    }
}

/// Path of the lock file guarding `path`
pub fn lock_path_for(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.lock", path.display()))
}

/// Exclusive advisory lock on a store's `.lock` sibling, released on drop.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Acquire an exclusive lock on a file, waiting up to `timeout_ms`.
    ///
    /// The lock file and its parent directory are created if missing.
    pub fn acquire(path: impl AsRef<Path>, timeout_ms: u64) -> Result<Self> {
        let path = path.as_ref();
        let file = open_lock_file(path)?;
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);

        while !try_lock(&file)? {
            if Instant::now() >= deadline {
                tracing::debug!(lock = %path.display(), timeout_ms, "lock wait timed out");
                return Err(Error::LockFailed(path.to_path_buf()));
            }
            std::thread::sleep(Duration::from_millis(LOCK_RETRY_INTERVAL_MS));
        }
        Ok(FileLock {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the locked file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

fn open_lock_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?)
}

/// Atomically replace `path` with `data`.
///
/// Readers see either the previous contents or the new ones, never a mix.
/// Does not lock; callers coordinating with other processes hold a
/// [`FileLock`] around the read-modify-write.
pub fn write_atomic(path: impl AsRef<Path>, data: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(data)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| Error::Io(err.error))?;
    Ok(())
}
