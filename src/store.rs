//! The chainstate key-value store as an ordered iterator over raw byte
//! pairs. This is the "thin collaborator" spec.md keeps out of the
//! decoder core's scope: the decoder never imports `rusty_leveldb`
//! directly, it only sees [`ChainstateStore`].

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use rusty_leveldb::{CompressionType, DBIterator, LdbIterator, Options, DB};

use crate::errors::{AppError, AppResult};

/// An ordered iterator over the chainstate's raw `(key, value)` pairs, in
/// ascending key order. Modeled as a trait so the decoder core and driver
/// can be exercised against an in-memory double in tests.
pub trait ChainstateStore {
    fn next_entry(&mut self) -> Option<(Vec<u8>, Vec<u8>)>;
}

/// Opens a chainstate directory, probing for a live node first.
///
/// The scan iterator is created once, on first `next_entry()` call, and
/// kept alive for the lifetime of the store so each call advances the same
/// cursor instead of restarting at the first key.
pub struct LevelDbStore {
    db: DB,
    iter: Option<DBIterator>,
}

impl LevelDbStore {
    pub fn open(path: &Path) -> AppResult<Self> {
        check_not_locked(path)?;

        let mut opts = Options::default();
        opts.compression_type = CompressionType::CompressionNone;

        let db = DB::open(path, opts).map_err(|e| AppError::StoreUnavailable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { db, iter: None })
    }
}

impl ChainstateStore for LevelDbStore {
    fn next_entry(&mut self) -> Option<(Vec<u8>, Vec<u8>)> {
        if self.iter.is_none() {
            self.iter = Some(self.db.new_iter().ok()?);
        }
        LdbIterator::next(self.iter.as_mut().expect("just populated"))
    }
}

/// Best-effort advisory-lock probe on the chainstate's `LOCK` file. A
/// currently-running node holds an exclusive lock on this file for as
/// long as it has the database open; if we can't acquire it ourselves,
/// something else has the store open.
fn check_not_locked(path: &Path) -> AppResult<()> {
    let lock_path: PathBuf = path.join("LOCK");
    if !lock_path.exists() {
        return Ok(());
    }

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(&lock_path)
        .map_err(|e| AppError::StoreUnavailable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    match file.try_lock_exclusive() {
        Ok(()) => {
            let _ = FileExt::unlock(&file);
            Ok(())
        }
        Err(_) => Err(AppError::HostNodeRunning {
            path: path.display().to_string(),
        }),
    }
}

/// An in-memory store used by driver-level tests, so decoding behaviour
/// can be exercised without touching a real LevelDB directory.
#[cfg(test)]
pub struct MemoryStore {
    entries: std::vec::IntoIter<(Vec<u8>, Vec<u8>)>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new(entries: Vec<(Vec<u8>, Vec<u8>)>) -> Self {
        Self {
            entries: entries.into_iter(),
        }
    }
}

#[cfg(test)]
impl ChainstateStore for MemoryStore {
    fn next_entry(&mut self) -> Option<(Vec<u8>, Vec<u8>)> {
        self.entries.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_lock_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_not_locked(dir.path()).is_ok());
    }

    #[test]
    fn unheld_lock_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("LOCK"), b"").unwrap();
        assert!(check_not_locked(dir.path()).is_ok());
    }

    #[test]
    fn a_lock_file_held_by_another_handle_reports_host_node_running() {
        let dir = tempfile::tempdir().unwrap();
        let lock_path = dir.path().join("LOCK");
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&lock_path)
            .unwrap();
        file.lock_exclusive().unwrap();

        let err = check_not_locked(dir.path()).unwrap_err();
        assert!(matches!(err, AppError::HostNodeRunning { .. }));

        FileExt::unlock(&file).unwrap();
    }
}
