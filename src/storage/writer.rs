//! Atomic whole-file replacement.
//!
//! Bytes go to a temporary sibling of the target, which is flushed,
//! optionally fsynced, and renamed over the target. A reader never sees a
//! partially written file.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Error as IoError, ErrorKind, Result as IoResult, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Writer that replaces a file atomically on [`AtomicFileWriter::commit`].
///
/// Dropping the writer without committing removes the temporary file and
/// leaves the target untouched.
pub struct AtomicFileWriter {
    temp_path: Option<PathBuf>,
    final_path: PathBuf,
    writer: Option<BufWriter<File>>,
    sync: bool,
}

impl AtomicFileWriter {
    /// Opens a temporary file next to `final_path`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the temporary file cannot be created.
    pub fn create(final_path: &Path, sync: bool) -> IoResult<Self> {
        let file_name = final_path
            .file_name()
            .ok_or_else(|| IoError::new(ErrorKind::InvalidInput, "target path has no file name"))?
            .to_string_lossy();
        let temp_path =
            final_path.with_file_name(format!(".{file_name}.tmp.{}", Uuid::new_v4().simple()));

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)?;

        Ok(Self {
            temp_path: Some(temp_path),
            final_path: final_path.to_path_buf(),
            writer: Some(BufWriter::new(file)),
            sync,
        })
    }

    /// Appends bytes to the temporary file.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from the underlying write.
    pub fn write_all(&mut self, bytes: &[u8]) -> IoResult<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| IoError::new(ErrorKind::Other, "writer already consumed"))?;
        writer.write_all(bytes)
    }

    /// Flushes, fsyncs if configured, and renames over the target.
    ///
    /// This is the commit point: once it returns `Ok`, the target holds
    /// exactly the bytes written.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from flush, sync or rename. The target is
    /// left as it was.
    pub fn commit(mut self) -> IoResult<()> {
        let mut writer = self
            .writer
            .take()
            .ok_or_else(|| IoError::new(ErrorKind::Other, "writer already consumed"))?;

        writer.flush()?;
        if self.sync {
            writer.get_ref().sync_all()?;
        }
        drop(writer);

        let temp_path = self
            .temp_path
            .take()
            .ok_or_else(|| IoError::new(ErrorKind::Other, "temp path already consumed"))?;
        if let Err(e) = fs::rename(&temp_path, &self.final_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
        Ok(())
    }
}

impl Drop for AtomicFileWriter {
    fn drop(&mut self) {
        self.writer.take();
        if let Some(ref temp_path) = self.temp_path {
            if temp_path.exists() {
                let _ = fs::remove_file(temp_path);
            }
        }
    }
}

/// Replaces `path` with `bytes` in one atomic step.
///
/// # Errors
///
/// Returns any I/O error; the previous file content survives it.
pub fn write_atomic(path: &Path, bytes: &[u8], sync: bool) -> IoResult<()> {
    let mut writer = AtomicFileWriter::create(path, sync)?;
    writer.write_all(bytes)?;
    writer.commit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_write_atomic_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("file.json");

        write_atomic(&path, b"{}", true).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"{}");
        assert_eq!(entries(dir.path()), vec!["file.json"]);
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("file.json");
        fs::write(&path, b"old content that is longer").unwrap();

        write_atomic(&path, b"new", false).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn test_drop_without_commit_keeps_target() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("file.json");
        fs::write(&path, b"original").unwrap();

        {
            let mut writer = AtomicFileWriter::create(&path, true).unwrap();
            writer.write_all(b"half written").unwrap();
        }

        assert_eq!(fs::read(&path).unwrap(), b"original");
        assert_eq!(entries(dir.path()), vec!["file.json"]);
    }

    #[test]
    fn test_create_fails_in_missing_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("file.json");
        assert!(AtomicFileWriter::create(&path, true).is_err());
    }
}
