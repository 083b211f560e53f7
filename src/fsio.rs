//! File access for generated sources and the style table.
//!
//! Writes go to a sibling temporary file that is then renamed over the target, so an interrupted run never
//! leaves a half-written source behind. A failed write is retried once before it is reported.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::errors::{SyncError, SyncResult};

/// Read a whole text file.
pub fn read_text(path: &Path) -> SyncResult<String> {
    fs::read_to_string(path).map_err(|source| SyncError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.kwsync.tmp"))
}

/// Keep the target's permissions on the replacement. A target that does not exist yet gets the defaults.
fn copy_permissions(from: &Path, to: &Path) -> io::Result<()> {
    match fs::metadata(from) {
        Ok(meta) => fs::set_permissions(to, meta.permissions()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

fn replace_file(path: &Path, contents: &str) -> io::Result<()> {
    let tmp = temp_path(path);
    let written = fs::write(&tmp, contents)
        .and_then(|()| copy_permissions(path, &tmp))
        .and_then(|()| fs::rename(&tmp, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

/// Atomically replace `path` with `contents`, retrying once after `retry_delay`.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn write_atomic(path: &Path, contents: &str, retry_delay: Duration) -> SyncResult<()> {
    match replace_file(path, contents) {
        Ok(()) => Ok(()),
        Err(first) => {
            tracing::warn!(error = %first, "write failed, retrying once");
            thread::sleep(retry_delay);
            replace_file(path, contents).map_err(|source| SyncError::Write {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stlDemo.c");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, "new contents\n", Duration::ZERO).unwrap();
        assert_eq!(read_text(&path).unwrap(), "new contents\n");
        // no temporary file left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("stlDemo.c");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        write_atomic(&path, "new\n", Duration::ZERO).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[test]
    fn test_write_creates_missing_target() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Fresh.c");
        write_atomic(&path, "x\n", Duration::ZERO).unwrap();
        assert_eq!(read_text(&path).unwrap(), "x\n");
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let tmp = temp_path(Path::new("out/stlRust.c"));
        assert_eq!(tmp, PathBuf::from("out/.stlRust.c.kwsync.tmp"));
    }

    #[test]
    fn test_write_failure_after_retry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("stlDemo.c");
        let err = write_atomic(&path, "x", Duration::ZERO).unwrap_err();
        assert!(matches!(err, SyncError::Write { .. }));
    }

    #[test]
    fn test_read_missing() {
        let dir = tempdir().unwrap();
        let err = read_text(&dir.path().join("nope.c")).unwrap_err();
        assert!(matches!(err, SyncError::Read { .. }));
    }
}
