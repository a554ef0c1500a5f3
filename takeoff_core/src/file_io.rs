//! # File I/O
//!
//! Safety layer shared by session files and the file snapshot store:
//! - **Atomic writes**: write `.tmp`, fsync, rename over the target
//! - **File locking**: fs2 advisory lock plus a `.lock` file naming the
//!   holder, so a second process gets [`TakeoffError::FileLocked`]
//! - **Version check**: sessions written by a newer schema are refused
//!
//! ## Example
//!
//! ```rust,no_run
//! use takeoff_core::file_io::{load_session, save_session, FileLock};
//! use takeoff_core::session::TakeoffSession;
//! use std::path::Path;
//!
//! let path = Path::new("site-a.json");
//! let mut session = TakeoffSession::new("Site A", "estimator@company.com");
//! let lock = FileLock::acquire(path, "estimator@company.com")?;
//! save_session(&mut session, path)?;
//! drop(lock);
//!
//! let reloaded = load_session(path)?;
//! assert_eq!(reloaded.meta.name, "Site A");
//! # Ok::<(), takeoff_core::errors::TakeoffError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::errors::{TakeoffError, TakeoffResult};
use crate::session::{validate_version, TakeoffSession};

/// Contents of a `.lock` file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    pub user_id: String,
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME").ok().or_else(|| std::env::var("HOST").ok())
    }
}

/// Exclusive lock on a file, released on drop.
pub struct FileLock {
    path: PathBuf,
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire the lock, failing with `FileLocked` while a live holder exists
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> TakeoffResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if let Some(existing) = live_lock(&lock_path) {
            return Err(TakeoffError::file_locked(
                path.display().to_string(),
                format!("{} ({})", existing.user_id, existing.machine),
                existing.locked_at.to_rfc3339(),
            ));
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| TakeoffError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            TakeoffError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json = serde_json::to_string_pretty(&info).map_err(TakeoffError::serialization)?;
        lock_file
            .write_all(lock_json.as_bytes())
            .and_then(|_| lock_file.sync_all())
            .map_err(|e| TakeoffError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;

        tracing::debug!(path = %path.display(), user = %info.user_id, "lock acquired");

        Ok(FileLock {
            path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Current live holder of a file's lock, if any
    pub fn check(path: &Path) -> Option<LockInfo> {
        live_lock(&lock_path_for(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
        tracing::debug!(path = %self.path.display(), "lock released");
    }
}

/// `takeoff.json` → `takeoff.json.lock`
fn lock_path_for(path: &Path) -> PathBuf {
    let mut lock_path = path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

fn live_lock(lock_path: &Path) -> Option<LockInfo> {
    if !lock_path.exists() {
        return None;
    }
    let contents = fs::read_to_string(lock_path).ok()?;
    let info: LockInfo = serde_json::from_str(&contents).ok()?;
    if is_lock_stale(&info) {
        tracing::warn!(lock = %lock_path.display(), holder = %info.user_id, "taking over stale lock");
        None
    } else {
        Some(info)
    }
}

/// A lock is stale when its process is gone (same machine) or it is over a day old
fn is_lock_stale(info: &LockInfo) -> bool {
    if let Some(our_machine) = hostname() {
        if info.machine == our_machine {
            #[cfg(unix)]
            {
                if fs::metadata(format!("/proc/{}", info.pid)).is_err() {
                    return true;
                }
            }
        }
    }
    (Utc::now() - info.locked_at).num_hours() > 24
}

/// Write `contents` to `path` through a synced temp file and a rename
pub fn write_atomic(path: &Path, contents: &str) -> TakeoffResult<()> {
    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path)
        .map_err(|e| TakeoffError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;

    tmp_file
        .write_all(contents.as_bytes())
        .map_err(|e| TakeoffError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;

    tmp_file
        .sync_all()
        .map_err(|e| TakeoffError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        TakeoffError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "atomic write complete");
    Ok(())
}

/// `takeoff.json` → `takeoff.json.tmp`
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let extension = tmp
        .extension()
        .map(|e| format!("{}.tmp", e.to_string_lossy()))
        .unwrap_or_else(|| "tmp".to_string());
    tmp.set_extension(extension);
    tmp
}

pub fn read_file(path: &Path) -> TakeoffResult<String> {
    let mut file =
        File::open(path).map_err(|e| TakeoffError::file_error("open", path.display().to_string(), e.to_string()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| TakeoffError::file_error("read", path.display().to_string(), e.to_string()))?;
    Ok(contents)
}

/// Save a session atomically, updating its modified timestamp
pub fn save_session(session: &mut TakeoffSession, path: &Path) -> TakeoffResult<()> {
    session.touch();
    let json = serde_json::to_string_pretty(session).map_err(TakeoffError::serialization)?;
    write_atomic(path, &json)?;
    tracing::info!(path = %path.display(), session = %session.meta.name, "session saved");
    Ok(())
}

/// Load a session, refusing files written by a newer schema
pub fn load_session(path: &Path) -> TakeoffResult<TakeoffSession> {
    let contents = read_file(path)?;
    let session: TakeoffSession = serde_json::from_str(&contents)
        .map_err(|e| TakeoffError::serialization(format!("invalid JSON in {}: {}", path.display(), e)))?;
    validate_version(&session.meta.version)?;
    session.settings.validate()?;
    tracing::info!(path = %path.display(), session = %session.meta.name, "session loaded");
    Ok(session)
}

/// Load a session together with the current lock holder, if any.
/// A locked session is still readable; callers treat it as read-only.
pub fn load_session_with_lock_check(path: &Path) -> TakeoffResult<(TakeoffSession, Option<LockInfo>)> {
    let session = load_session(path)?;
    let lock_info = FileLock::check(path);
    Ok((session, lock_info))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    fn temp_path(name: &str) -> PathBuf {
        temp_dir().join(format!("takeoff_io_test_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn test_lock_and_tmp_paths() {
        let path = Path::new("/data/site-a.json");
        assert_eq!(lock_path_for(path), Path::new("/data/site-a.json.lock"));
        assert_eq!(tmp_path_for(path), Path::new("/data/site-a.json.tmp"));
    }

    #[test]
    fn test_write_atomic_leaves_no_tmp() {
        let path = temp_path("atomic");
        write_atomic(&path, "{\"ok\":true}").unwrap();
        assert!(path.exists());
        assert!(!tmp_path_for(&path).exists());
        assert_eq!(read_file(&path).unwrap(), "{\"ok\":true}");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_lock_acquire_release() {
        let path = temp_path("lock");
        File::create(&path).unwrap();

        let lock = FileLock::acquire(&path, "estimator@example.com").unwrap();
        assert!(lock_path_for(&path).exists());
        assert_eq!(FileLock::check(&path).map(|i| i.user_id), Some("estimator@example.com".to_string()));

        let second = FileLock::acquire(&path, "someone@example.com");
        assert!(matches!(second, Err(TakeoffError::FileLocked { .. })));

        drop(lock);
        assert!(!lock_path_for(&path).exists());
        assert!(FileLock::check(&path).is_none());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_session_save_and_load() {
        let path = temp_path("session");
        let mut session = TakeoffSession::new("Site A", "estimator");
        session.brick.rows.update_row(1, "area", 12.0);
        let created = session.meta.created;

        save_session(&mut session, &path).unwrap();
        assert!(session.meta.modified >= created);

        let (loaded, lock) = load_session_with_lock_check(&path).unwrap();
        assert!(lock.is_none());
        assert_eq!(loaded, session);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_newer_session_refused() {
        let path = temp_path("newer");
        let mut session = TakeoffSession::new("Site B", "estimator");
        session.meta.version = "0.9.0".to_string();
        let json = serde_json::to_string(&session).unwrap();
        write_atomic(&path, &json).unwrap();

        let err = load_session(&path).unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_session_with_negative_wastage_refused() {
        let path = temp_path("bad_settings");
        let mut session = TakeoffSession::new("Site C", "estimator");
        session
            .settings
            .wastage_overrides
            .insert(crate::wastage::MaterialCategory::Concrete, -5.0);
        let json = serde_json::to_string(&session).unwrap();
        write_atomic(&path, &json).unwrap();

        let err = load_session(&path).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_session_json() {
        let path = temp_path("invalid");
        write_atomic(&path, "{ not json").unwrap();
        assert_eq!(load_session(&path).unwrap_err().error_code(), "SERIALIZATION_ERROR");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_file(&temp_path("missing")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }
}
