//! File-backed counter store.
//!
//! Locking discipline:
//! - `increment` holds an exclusive `fd_lock` write lock on the record for
//!   the whole read-modify-write. The lock is an OS file lock (`flock` on
//!   unix), so independent processes sharing the file serialize too.
//! - Every `increment` opens its own handle. File locks belong to the open
//!   file description, which makes two threads in one process contend the
//!   same way two processes do.
//! - `get_count` takes no lock. It may observe a value an in-flight
//!   increment is about to replace, or a truncated record that decodes to 0.
//!
//! Recovery policy (degrade-to-reset): when the record cannot be accessed
//! at increment time, it is recreated with value 1 and 1 is returned. A
//! count of `u64::MAX` also wraps to 1.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fd_lock::RwLock;

use crate::counter::parse::{encode, parse_or_default, DEFAULT_COUNT};
use crate::error::{Result, TallyError};

/// Default name of the backing record inside the data directory.
pub const DEFAULT_FILE_NAME: &str = "counter.txt";

/// Count reported by `increment` after a degrade-to-reset.
pub const RESET_COUNT: u64 = 1;

#[derive(Debug)]
pub struct CounterStore {
    data_dir: PathBuf,
    path: PathBuf,
}

impl CounterStore {
    /// Store backed by `<data_dir>/counter.txt`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self::with_file(data_dir, DEFAULT_FILE_NAME)
    }

    pub fn with_file(data_dir: impl Into<PathBuf>, file_name: &str) -> Self {
        let data_dir = data_dir.into();
        let path = data_dir.join(file_name);
        Self { data_dir, path }
    }

    /// Location of the backing record.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Create the data directory and a zeroed record if either is missing.
    /// Idempotent; an existing record is left untouched.
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| TallyError::storage(&self.data_dir, "create dir", e))?;

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(file) => {
                let mut lock = RwLock::new(file);
                let mut guard = lock
                    .write()
                    .map_err(|e| TallyError::storage(&self.path, "lock", e))?;
                // an increment may have won the lock since create_new
                let len = guard
                    .metadata()
                    .map_err(|e| TallyError::storage(&self.path, "stat", e))?
                    .len();
                if len == 0 {
                    overwrite(&mut guard, DEFAULT_COUNT)
                        .map_err(|e| TallyError::storage(&self.path, "write", e))?;
                }
                tracing::info!(path = %self.path.display(), "counter record created");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(TallyError::storage(&self.path, "create", e)),
        }
    }

    /// Current count. Missing, unreadable, or corrupt records read as 0.
    /// Never creates the record and never waits on the increment lock.
    pub fn get_count(&self) -> u64 {
        match fs::read(&self.path) {
            Ok(bytes) => parse_or_default(&bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => DEFAULT_COUNT,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "counter read failed; reporting 0");
                DEFAULT_COUNT
            }
        }
    }

    /// Atomically add one to the persisted count and return the new value.
    ///
    /// Blocks until the exclusive lock is available. Storage failures are
    /// absorbed by recreating the record with value 1, so this always
    /// yields a count.
    pub fn increment(&self) -> u64 {
        match self.try_increment() {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "counter increment failed; recreating record with value 1"
                );
                if let Err(e) = self.recreate(RESET_COUNT) {
                    tracing::error!(path = %self.path.display(), error = %e, "counter recreate failed");
                }
                RESET_COUNT
            }
        }
    }

    /// Strict variant of [`increment`](Self::increment): storage failures
    /// are returned instead of triggering the reset policy.
    pub fn try_increment(&self) -> Result<u64> {
        let file = self.open_record()?;
        // The guard releases the lock on drop, including on `?` returns.
        let mut lock = RwLock::new(file);
        let mut guard = lock
            .write()
            .map_err(|e| TallyError::storage(&self.path, "lock", e))?;

        let mut buf = Vec::new();
        guard
            .read_to_end(&mut buf)
            .map_err(|e| TallyError::storage(&self.path, "read", e))?;

        let current = parse_or_default(&buf);
        let next = current.checked_add(1).unwrap_or_else(|| {
            tracing::warn!(path = %self.path.display(), current, "counter overflowed; resetting to 1");
            RESET_COUNT
        });
        overwrite(&mut guard, next).map_err(|e| TallyError::storage(&self.path, "write", e))?;

        tracing::debug!(path = %self.path.display(), count = next, "counter incremented");
        Ok(next)
    }

    fn recreate(&self, count: u64) -> Result<()> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| TallyError::storage(&self.data_dir, "create dir", e))?;
        let file = self.open_record()?;
        let mut lock = RwLock::new(file);
        let mut guard = lock
            .write()
            .map_err(|e| TallyError::storage(&self.path, "lock", e))?;
        overwrite(&mut guard, count).map_err(|e| TallyError::storage(&self.path, "write", e))
    }

    fn open_record(&self) -> Result<File> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| TallyError::storage(&self.path, "open", e))
    }
}

/// Replace the whole record with `count`. The caller must hold the lock.
fn overwrite(file: &mut File, count: u64) -> std::io::Result<()> {
    file.seek(SeekFrom::Start(0))?;
    file.set_len(0)?;
    file.write_all(encode(count).as_bytes())?;
    file.sync_data()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_creates_dir_and_zero_record() {
        let tmp = TempDir::new().unwrap();
        let store = CounterStore::new(tmp.path().join("nested/data"));

        store.init().unwrap();

        assert_eq!(fs::read_to_string(store.path()).unwrap(), "0");
        assert_eq!(store.get_count(), 0);
    }

    #[test]
    fn init_keeps_existing_record() {
        let tmp = TempDir::new().unwrap();
        let store = CounterStore::new(tmp.path());
        fs::write(store.path(), "41").unwrap();

        store.init().unwrap();
        store.init().unwrap();

        assert_eq!(store.get_count(), 41);
    }

    #[test]
    fn get_count_does_not_create_record() {
        let tmp = TempDir::new().unwrap();
        let store = CounterStore::new(tmp.path());

        assert_eq!(store.get_count(), 0);
        assert!(!store.path().exists());
    }

    #[test]
    fn increment_replaces_whole_record() {
        let tmp = TempDir::new().unwrap();
        let store = CounterStore::new(tmp.path());
        fs::write(store.path(), "99\n").unwrap();

        assert_eq!(store.increment(), 100);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "100");

        // shorter value must not leave a tail of the old one behind
        fs::write(store.path(), "  9  ").unwrap();
        assert_eq!(store.increment(), 10);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "10");
    }

    #[test]
    fn overflow_resets_to_one() {
        let tmp = TempDir::new().unwrap();
        let store = CounterStore::new(tmp.path());
        fs::write(store.path(), u64::MAX.to_string()).unwrap();

        assert_eq!(store.try_increment().unwrap(), RESET_COUNT);
        assert_eq!(store.increment(), 2);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "2");
    }

    #[test]
    fn try_increment_reports_missing_dir() {
        let tmp = TempDir::new().unwrap();
        let store = CounterStore::new(tmp.path().join("gone"));

        let err = store.try_increment().expect_err("dir is missing");
        assert_eq!(err.client_code().as_str(), "STORAGE");
    }

    #[test]
    fn custom_file_name() {
        let tmp = TempDir::new().unwrap();
        let store = CounterStore::with_file(tmp.path(), "visits.txt");

        assert_eq!(store.increment(), 1);
        assert_eq!(fs::read_to_string(tmp.path().join("visits.txt")).unwrap(), "1");
    }
}
