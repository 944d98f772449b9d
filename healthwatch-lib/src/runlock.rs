//! Advisory run lock preventing overlapping monitor invocations.
//!
//! The scheduler is expected to space invocations out, but nothing stops an
//! operator from running the monitor by hand while a scheduled pass is in
//! flight. The lock makes that case explicit: the second invocation observes
//! `Busy` and skips its run.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Run lock acquisition errors.
#[derive(Debug, Error)]
pub enum LockError {
    #[error("another monitor run holds the lock at {path}")]
    Busy { path: PathBuf },

    #[error("lock file error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Exclusive lock held for the duration of a run; released on drop.
#[derive(Debug)]
pub struct RunLock {
    file: File,
    path: PathBuf,
}

impl RunLock {
    /// Try to acquire the lock without blocking.
    pub fn acquire(path: &Path) -> Result<Self, LockError> {
        let io_err = |source| LockError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(io_err)?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                file,
                path: path.to_path_buf(),
            }),
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => Err(LockError::Busy {
                path: path.to_path_buf(),
            }),
            Err(err) => Err(io_err(err)),
        }
    }

    /// Path of the underlying lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquisition_observes_busy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("healthwatch.lock");

        let held = RunLock::acquire(&path).unwrap();
        assert_eq!(held.path(), path);

        let err = RunLock::acquire(&path).unwrap_err();
        assert!(matches!(err, LockError::Busy { .. }));
    }

    #[test]
    fn dropping_the_lock_releases_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("healthwatch.lock");

        drop(RunLock::acquire(&path).unwrap());
        assert!(RunLock::acquire(&path).is_ok());
    }

    #[test]
    fn missing_parent_directories_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/logs/healthwatch.lock");
        assert!(RunLock::acquire(&path).is_ok());
        assert!(path.exists());
    }
}
