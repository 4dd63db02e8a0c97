//! Filesystem-backed sink factory

use super::{ConsoleSink, RotatingFileSink};
use logtopo_application::{Sink, SinkError, SinkFactory};
use logtopo_domain::{HandlerSpec, RotatingFileSpec, SinkSpec};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Opens console and rotating-file sinks
///
/// Relative file paths resolve against `base_dir` when one is set, otherwise
/// against the working directory. Missing parent directories are created
/// unless disabled.
#[derive(Debug, Clone)]
pub struct FsSinkFactory {
    base_dir: Option<PathBuf>,
    create_dirs: bool,
}

impl Default for FsSinkFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl FsSinkFactory {
    pub fn new() -> Self {
        Self {
            base_dir: None,
            create_dirs: true,
        }
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Fail instead of creating missing log directories
    pub fn without_dir_creation(mut self) -> Self {
        self.create_dirs = false;
        self
    }

    /// Path a file sink will actually open
    pub fn resolve(&self, spec: &RotatingFileSpec) -> PathBuf {
        match &self.base_dir {
            Some(base) if spec.path.is_relative() => base.join(&spec.path),
            _ => spec.path.clone(),
        }
    }

    fn open_file(&self, handler: &HandlerSpec, spec: &RotatingFileSpec) -> Result<RotatingFileSink, SinkError> {
        if !spec.is_utf8() {
            return Err(SinkError::Unsupported {
                handler: handler.name.clone(),
                reason: format!("encoding '{}' (only utf-8 is written)", spec.encoding),
            });
        }

        let mut resolved = spec.clone();
        resolved.path = self.resolve(spec);

        if self.create_dirs
            && let Some(parent) = resolved.path.parent().filter(|p| !p.as_os_str().is_empty())
            && !parent.exists()
        {
            debug!("Creating log directory {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| SinkError::io(parent, e))?;
        }

        RotatingFileSink::open(&resolved)
    }
}

impl SinkFactory for FsSinkFactory {
    fn open(&self, handler: &HandlerSpec) -> Result<Arc<dyn Sink>, SinkError> {
        Ok(match &handler.sink {
            SinkSpec::Stdout => Arc::new(ConsoleSink::stdout()),
            SinkSpec::Stderr => Arc::new(ConsoleSink::stderr()),
            SinkSpec::RotatingFile(spec) => Arc::new(self.open_file(handler, spec)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logtopo_domain::Level;
    use logtopo_domain::topology::defaults::{
        DEFAULT_MAX_BYTES, FILE_HANDLER, default_topology,
    };
    use crate::sinks::backup_path;
    use std::fs::{self, File};

    fn file_handler(path: &str) -> HandlerSpec {
        HandlerSpec::new(
            "fileHandler",
            Level::Debug,
            "detailedFormatter",
            SinkSpec::RotatingFile(RotatingFileSpec::new(path)),
        )
    }

    #[test]
    fn test_creates_missing_log_directory() {
        let dir = tempfile::tempdir().unwrap();
        let factory = FsSinkFactory::new().with_base_dir(dir.path());

        let sink = factory.open(&file_handler("logs/app.log")).unwrap();
        sink.write_line("hello").unwrap();

        let path = dir.path().join("logs").join("app.log");
        assert_eq!(sink.describe(), path.display().to_string());
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello\n");
    }

    #[test]
    fn test_directory_creation_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let factory = FsSinkFactory::new()
            .with_base_dir(dir.path())
            .without_dir_creation();

        let err = factory.open(&file_handler("logs/app.log")).unwrap_err();
        assert!(matches!(err, SinkError::Io { .. }));
    }

    #[test]
    fn test_unwritable_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // a regular file where the directory should be
        std::fs::write(dir.path().join("logs"), "").unwrap();
        let factory = FsSinkFactory::new().with_base_dir(dir.path());

        let err = factory.open(&file_handler("logs/app.log")).unwrap_err();
        assert!(matches!(err, SinkError::Io { .. }));
    }

    #[test]
    fn test_rejects_non_utf8_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let mut handler = file_handler("app.log");
        if let SinkSpec::RotatingFile(spec) = &mut handler.sink {
            spec.encoding = "latin-1".to_string();
        }
        let err = FsSinkFactory::new()
            .with_base_dir(dir.path())
            .open(&handler)
            .unwrap_err();
        assert!(matches!(err, SinkError::Unsupported { .. }));
    }

    #[test]
    fn test_absolute_paths_ignore_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let absolute = dir.path().join("abs.log");
        let spec = RotatingFileSpec::new(&absolute);
        let factory = FsSinkFactory::new().with_base_dir("/elsewhere");
        assert_eq!(factory.resolve(&spec), absolute);
    }

    #[test]
    fn test_console_sinks() {
        let factory = FsSinkFactory::new();
        let stdout = HandlerSpec::new("c", Level::Info, "f", SinkSpec::Stdout);
        let stderr = HandlerSpec::new("e", Level::Info, "f", SinkSpec::Stderr);
        assert_eq!(factory.open(&stdout).unwrap().describe(), "stdout");
        assert_eq!(factory.open(&stderr).unwrap().describe(), "stderr");
    }

    #[test]
    fn test_default_file_handler_rotates_at_ten_mib_keeping_five_backups() {
        let dir = tempfile::tempdir().unwrap();
        let topology = default_topology();
        let handler = topology.handler(FILE_HANDLER).unwrap();
        let SinkSpec::RotatingFile(spec) = &handler.sink else {
            panic!("fileHandler is not a rotating file");
        };
        let factory = FsSinkFactory::new().with_base_dir(dir.path());

        let sink = factory.open_file(handler, spec).unwrap();
        assert_eq!(sink.max_bytes(), 10_485_760);
        assert_eq!(sink.backup_count(), 5);
        drop(sink);

        let path = dir.path().join("logs").join("app.log");
        for round in 1..=6 {
            // one byte short of the limit, so the next line triggers a rollover
            File::options()
                .write(true)
                .open(&path)
                .unwrap()
                .set_len(DEFAULT_MAX_BYTES - 1)
                .unwrap();
            let sink = factory.open(handler).unwrap();
            sink.write_line(&format!("round {round}")).unwrap();
        }

        assert_eq!(fs::read_to_string(&path).unwrap(), "round 6\n");
        for index in 1..=5 {
            let backup = backup_path(&path, index);
            assert_eq!(fs::metadata(&backup).unwrap().len(), DEFAULT_MAX_BYTES - 1);
        }
        assert!(!backup_path(&path, 6).exists());
    }
}
