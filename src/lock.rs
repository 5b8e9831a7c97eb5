//! Advisory lock around the compiler cache.
//!
//! Holding the lock means owning the download/extract/install step. The lock
//! is an OS lock on an open handle to `bin/.typst.lock` (`flock` on Unix, an
//! unshared open on Windows), so it is released when the holder drops it or
//! its process dies. The file itself stays in place; only the handle matters.

use std::fs::{File, OpenOptions};
use std::io::{self, Seek, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{Error, Result};

pub const LOCK_FILE_NAME: &str = ".typst.lock";

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub struct CacheLock {
    path: PathBuf,
    // Lock lives as long as this handle.
    _file: File,
}

impl CacheLock {
    /// Waits up to `timeout` for the lock in `dir`.
    pub async fn acquire(dir: &Path, timeout: Duration) -> Result<Self> {
        let path = dir.join(LOCK_FILE_NAME);
        let deadline = Instant::now() + timeout;
        let mut contended = false;

        loop {
            if let Some(mut file) = try_lock(&path)? {
                // Owner pid is informational only.
                file.set_len(0)?;
                file.rewind()?;
                writeln!(file, "{}", std::process::id())?;
                debug!(lock = %path.display(), "Acquired cache lock");
                return Ok(Self { path, _file: file });
            }
            if !contended {
                warn!(lock = %path.display(), "Cache lock held by another run, waiting");
                contended = true;
            }
            if Instant::now() >= deadline {
                return Err(Error::CacheLocked(path));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CacheLock {
    fn drop(&mut self) {
        debug!(lock = %self.path.display(), "Released cache lock");
    }
}

/// Opens the lock file and tries to lock it without blocking.
/// `Ok(None)` means another holder has it.
#[cfg(unix)]
#[allow(unsafe_code)]
fn try_lock(path: &Path) -> io::Result<Option<File>> {
    use std::os::unix::io::AsRawFd;

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    // SAFETY: the descriptor comes from `file`, which outlives the call, and
    // `LOCK_EX | LOCK_NB` is a valid `flock` operation.
    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if rc == 0 {
        return Ok(Some(file));
    }
    let err = io::Error::last_os_error();
    if err.kind() == io::ErrorKind::WouldBlock || err.raw_os_error() == Some(libc::EWOULDBLOCK) {
        return Ok(None);
    }
    Err(err)
}

#[cfg(windows)]
fn try_lock(path: &Path) -> io::Result<Option<File>> {
    use std::os::windows::fs::OpenOptionsExt;

    const ERROR_SHARING_VIOLATION: i32 = 32;
    match OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .share_mode(0)
        .open(path)
    {
        Ok(file) => Ok(Some(file)),
        Err(e) if e.raw_os_error() == Some(ERROR_SHARING_VIOLATION) => Ok(None),
        Err(e) => Err(e),
    }
}
