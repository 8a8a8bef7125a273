//! Exclusive lock on a planner directory.
//!
//! The `LOCK` file holds the PID of the owning process. A lock left behind by
//! a dead process is removed and acquisition is retried.

use crate::error::{PlannerError, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

/// File name of the lock inside the planner directory.
pub const LOCK_FILE: &str = "LOCK";

/// RAII guard for the planner lock. Dropping it releases the lock and removes
/// the lock file.
#[derive(Debug)]
pub(crate) struct LockGuard {
    file: Option<File>,
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            drop(file);
        }
        let _ = fs::remove_file(&self.path);
    }
}

/// Acquires the lock in `planner_dir`.
pub(crate) fn acquire(planner_dir: &Path) -> Result<LockGuard> {
    acquire_with_retry(&planner_dir.join(LOCK_FILE), 0)
}

fn acquire_with_retry(lock_path: &Path, retry_count: u32) -> Result<LockGuard> {
    if retry_count > 2 {
        return Err(PlannerError::Locked);
    }

    match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(lock_path)
    {
        Ok(mut file) => {
            writeln!(file, "{}", std::process::id())?;
            file.flush()?;
            file.try_lock_exclusive()
                .map_err(|_| PlannerError::Locked)?;
            Ok(LockGuard {
                file: Some(file),
                path: lock_path.to_path_buf(),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            handle_existing(lock_path, retry_count)
        }
        Err(e) => Err(PlannerError::Io(e)),
    }
}

fn handle_existing(lock_path: &Path, retry_count: u32) -> Result<LockGuard> {
    match fs::read_to_string(lock_path) {
        Ok(content) => {
            if let Ok(pid) = content.trim().parse::<u32>() {
                if is_process_alive(pid) {
                    return Err(PlannerError::LockHeld { pid });
                }

                warn!(pid, "removing stale planner lock left by a dead process");
                if let Err(e) = fs::remove_file(lock_path) {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        return Err(PlannerError::Io(e));
                    }
                }
                return acquire_with_retry(lock_path, retry_count + 1);
            }

            warn!("planner lock file is unreadable, removing it");
            let _ = fs::remove_file(lock_path);
            acquire_with_retry(lock_path, retry_count + 1)
        }
        // Released between the create attempt and the read.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            acquire_with_retry(lock_path, retry_count + 1)
        }
        Err(_) => Err(PlannerError::Locked),
    }
}

/// Whether a process with the given PID is running.
///
/// On Linux this checks that `/proc/{pid}/stat` exists, which also holds for
/// zombies that have not been reaped. Platforms without a cheap check assume
/// the process is alive.
#[cfg(target_os = "linux")]
fn is_process_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{}/stat", pid)).exists()
}

#[cfg(all(unix, not(target_os = "linux")))]
fn is_process_alive(pid: u32) -> bool {
    std::process::Command::new("kill")
        .args(["-0", &pid.to_string()])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(true)
}

#[cfg(not(unix))]
fn is_process_alive(_pid: u32) -> bool {
    true
}
