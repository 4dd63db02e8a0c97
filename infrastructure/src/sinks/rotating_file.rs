//! Size-rotated file sink

use log4rs::append::rolling_file::policy::compound::roll::{Roll, fixed_window::FixedWindowRoller};
use logtopo_application::{Sink, SinkError};
use logtopo_domain::{FileMode, RotatingFileSpec};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

struct FileState {
    writer: Option<BufWriter<File>>,
    size: u64,
}

/// File sink that rotates by size
///
/// Before a write that would take the active file to `max_bytes` or beyond,
/// the file is shifted into a numbered backup chain (`app.log.1` is the
/// newest) holding at most `backup_count` files. With no backups the active
/// file is truncated instead. `max_bytes = 0` disables rotation.
pub struct RotatingFileSink {
    path: PathBuf,
    max_bytes: u64,
    backup_count: u32,
    roller: Option<FixedWindowRoller>,
    state: Mutex<FileState>,
}

/// `app.log` + 2 → `app.log.2`
#[cfg(test)]
pub(crate) fn backup_path(path: &Path, index: u32) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{}", index));
    PathBuf::from(name)
}

fn open_file(path: &Path, mode: FileMode) -> Result<File, SinkError> {
    let mut options = OpenOptions::new();
    options.create(true);
    match mode {
        FileMode::Append => options.append(true),
        FileMode::Write => options.write(true).truncate(true),
    };
    options.open(path).map_err(|e| SinkError::io(path, e))
}

/// Roller shifting `app.log` into `app.log.1` .. `app.log.{backup_count}`
fn backup_roller(path: &Path, backup_count: u32) -> Result<Option<FixedWindowRoller>, SinkError> {
    if backup_count == 0 {
        return Ok(None);
    }
    let active = path.to_str().ok_or_else(|| {
        SinkError::io(path, io::Error::new(io::ErrorKind::InvalidInput, "path is not valid UTF-8"))
    })?;
    FixedWindowRoller::builder()
        .base(1)
        .build(&format!("{active}.{{}}"), backup_count)
        .map(Some)
        .map_err(|e| SinkError::io(path, io::Error::other(e.to_string())))
}

impl RotatingFileSink {
    /// Open the active file; the parent directory must exist
    pub fn open(spec: &RotatingFileSpec) -> Result<Self, SinkError> {
        let roller = backup_roller(&spec.path, spec.backup_count)?;
        let file = open_file(&spec.path, spec.mode)?;
        let size = file
            .metadata()
            .map_err(|e| SinkError::io(&spec.path, e))?
            .len();

        Ok(Self {
            path: spec.path.clone(),
            max_bytes: spec.max_bytes,
            backup_count: spec.backup_count,
            roller,
            state: Mutex::new(FileState {
                writer: Some(BufWriter::new(file)),
                size,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn backup_count(&self) -> u32 {
        self.backup_count
    }

    /// Bytes currently in the active file
    pub fn size(&self) -> Result<u64, SinkError> {
        Ok(self.lock()?.size)
    }

    fn lock(&self) -> Result<MutexGuard<'_, FileState>, SinkError> {
        self.state
            .lock()
            .map_err(|_| SinkError::Poisoned(self.path.display().to_string()))
    }

    fn should_rotate(&self, size: u64, incoming: u64) -> bool {
        self.max_bytes > 0 && size > 0 && size + incoming >= self.max_bytes
    }

    fn rotate(&self, state: &mut FileState) -> Result<(), SinkError> {
        // close the active handle before renaming it
        if let Some(mut writer) = state.writer.take() {
            writer.flush().map_err(|e| SinkError::io(&self.path, e))?;
        }

        if let Some(roller) = &self.roller {
            roller
                .roll(&self.path)
                .map_err(|e| SinkError::io(&self.path, io::Error::other(e.to_string())))?;
        }
        // without backups the active file is simply truncated
        let fresh = open_file(&self.path, FileMode::Write)?;

        state.writer = Some(BufWriter::new(fresh));
        state.size = 0;
        Ok(())
    }
}

impl Sink for RotatingFileSink {
    fn write_line(&self, line: &str) -> Result<(), SinkError> {
        let mut state = self.lock()?;
        let incoming = line.len() as u64 + 1;

        if self.should_rotate(state.size, incoming) {
            self.rotate(&mut state)?;
        }

        if state.writer.is_none() {
            // a previous rotation failed after closing the file
            state.writer = Some(BufWriter::new(open_file(&self.path, FileMode::Append)?));
        }
        if let Some(writer) = state.writer.as_mut() {
            writeln!(writer, "{}", line).map_err(|e| SinkError::io(&self.path, e))?;
            writer.flush().map_err(|e| SinkError::io(&self.path, e))?;
        }
        state.size += incoming;
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        let mut state = self.lock()?;
        match state.writer.as_mut() {
            Some(writer) => writer.flush().map_err(|e| SinkError::io(&self.path, e)),
            None => Ok(()),
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock()
            && let Some(writer) = state.writer.as_mut()
        {
            let _ = writer.flush();
        }
    }
}

impl std::fmt::Debug for RotatingFileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingFileSink")
            .field("path", &self.path)
            .field("max_bytes", &self.max_bytes)
            .field("backup_count", &self.backup_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    fn spec(dir: &Path, max_bytes: u64, backup_count: u32) -> RotatingFileSpec {
        RotatingFileSpec::new(dir.join("app.log")).with_rotation(max_bytes, backup_count)
    }

    #[test]
    fn test_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let spec = spec(dir.path(), 0, 0);
        fs::write(&spec.path, "existing\n").unwrap();

        let sink = RotatingFileSink::open(&spec).unwrap();
        assert_eq!(sink.size().unwrap(), 9);
        sink.write_line("one").unwrap();
        sink.write_line("two").unwrap();
        drop(sink);

        assert_eq!(read(&spec.path), "existing\none\ntwo\n");
    }

    #[test]
    fn test_write_mode_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let spec = spec(dir.path(), 0, 0).with_mode(FileMode::Write);
        fs::write(&spec.path, "stale\n").unwrap();

        let sink = RotatingFileSink::open(&spec).unwrap();
        sink.write_line("fresh").unwrap();
        drop(sink);

        assert_eq!(read(&spec.path), "fresh\n");
    }

    #[test]
    fn test_rotation_threshold() {
        let dir = tempfile::tempdir().unwrap();
        // each line is 10 bytes including the newline
        let spec = spec(dir.path(), 30, 3);
        let sink = RotatingFileSink::open(&spec).unwrap();

        sink.write_line("line-0001").unwrap();
        sink.write_line("line-0002").unwrap();
        assert!(!backup_path(&spec.path, 1).exists());

        // 20 + 10 reaches max_bytes, so this write goes to a fresh file
        sink.write_line("line-0003").unwrap();
        drop(sink);

        assert_eq!(read(&backup_path(&spec.path, 1)), "line-0001\nline-0002\n");
        assert_eq!(read(&spec.path), "line-0003\n");
    }

    #[test]
    fn test_keeps_at_most_backup_count_files() {
        let dir = tempfile::tempdir().unwrap();
        let spec = spec(dir.path(), 10, 2);
        let sink = RotatingFileSink::open(&spec).unwrap();

        for i in 1..=5 {
            sink.write_line(&format!("line-000{i}")).unwrap();
        }
        drop(sink);

        assert_eq!(read(&spec.path), "line-0005\n");
        assert_eq!(read(&backup_path(&spec.path, 1)), "line-0004\n");
        assert_eq!(read(&backup_path(&spec.path, 2)), "line-0003\n");
        assert!(!backup_path(&spec.path, 3).exists());
    }

    #[test]
    fn test_oversized_line_in_empty_file_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let spec = spec(dir.path(), 5, 1);
        let sink = RotatingFileSink::open(&spec).unwrap();

        sink.write_line("much longer than five bytes").unwrap();
        drop(sink);

        assert!(!backup_path(&spec.path, 1).exists());
        assert_eq!(read(&spec.path), "much longer than five bytes\n");
    }

    #[test]
    fn test_zero_backups_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let spec = spec(dir.path(), 10, 0);
        let sink = RotatingFileSink::open(&spec).unwrap();

        sink.write_line("line-0001").unwrap();
        sink.write_line("line-0002").unwrap();
        drop(sink);

        assert_eq!(read(&spec.path), "line-0002\n");
        assert!(!backup_path(&spec.path, 1).exists());
    }

    #[test]
    fn test_rotation_resumes_from_existing_size() {
        let dir = tempfile::tempdir().unwrap();
        let spec = spec(dir.path(), 20, 1);
        fs::write(&spec.path, "line-0000\n").unwrap();

        let sink = RotatingFileSink::open(&spec).unwrap();
        sink.write_line("line-0001").unwrap();
        drop(sink);

        assert_eq!(read(&backup_path(&spec.path, 1)), "line-0000\n");
        assert_eq!(read(&spec.path), "line-0001\n");
    }

    #[test]
    fn test_missing_directory_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let spec = RotatingFileSpec::new(dir.path().join("missing").join("app.log"));
        let err = RotatingFileSink::open(&spec).unwrap_err();
        assert!(matches!(err, SinkError::Io { .. }));
        assert!(err.to_string().contains("app.log"));
    }
}
