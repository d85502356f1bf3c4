//! Shared logging setup for Quarry binaries.
//!
//! Events go to a size-rotated file under `$QUARRY_HOME/logs` and to stderr.
//! `RUST_LOG` overrides the default filter for both.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "quarry=info,quarry_finder=info";
const DEFAULT_MAX_LOG_FILES: usize = 5;
const DEFAULT_MAX_LOG_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Logging configuration shared by Quarry binaries.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    /// Mirror the file filter on stderr instead of warnings only.
    pub verbose: bool,
    /// Log directory; defaults to [`logs_dir`].
    pub log_dir: Option<PathBuf>,
}

/// Install the global tracing subscriber. Returns the active log file path.
pub fn init_logging(config: LogConfig<'_>) -> Result<PathBuf> {
    let log_dir = match config.log_dir {
        Some(dir) => dir,
        None => logs_dir()?,
    };
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create logs directory: {}", log_dir.display()))?;

    let writer = SharedLogWriter::open(
        &log_dir,
        config.app_name,
        DEFAULT_MAX_LOG_FILES,
        DEFAULT_MAX_LOG_FILE_SIZE,
    )
    .with_context(|| format!("Failed to open log file for {}", config.app_name))?;
    let log_path = writer.path();

    let console_filter = if config.verbose {
        env_filter()
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(env_filter()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(log_path)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Quarry home directory: `$QUARRY_HOME`, else `~/.quarry`.
pub fn quarry_home() -> Result<PathBuf> {
    if let Ok(override_path) = std::env::var("QUARRY_HOME") {
        return Ok(PathBuf::from(override_path));
    }
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".quarry"))
}

/// Logs directory: `<quarry home>/logs`
pub fn logs_dir() -> Result<PathBuf> {
    Ok(quarry_home()?.join("logs"))
}

/// Appends to `<stem>.log`, shifting it to `<stem>.log.1`, `.2`, ... when it
/// would grow past `max_size`. At most `max_files` files are kept.
struct RotatingLog {
    dir: PathBuf,
    stem: String,
    max_files: usize,
    max_size: u64,
    file: Option<File>,
    written: u64,
}

impl RotatingLog {
    fn open(dir: &Path, name: &str, max_files: usize, max_size: u64) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let mut log = Self {
            dir: dir.to_path_buf(),
            stem: sanitize_name(name),
            max_files: max_files.max(1),
            max_size,
            file: None,
            written: 0,
        };
        log.reopen()?;
        if log.written > log.max_size {
            log.rotate()?;
        }
        Ok(log)
    }

    fn reopen(&mut self) -> io::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.active_path())?;
        self.written = file.metadata()?.len();
        self.file = Some(file);
        Ok(())
    }

    fn active_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.stem))
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}.log.{}", self.stem, index))
    }

    fn rotate(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            let _ = file.flush();
        }

        let backups = self.max_files - 1;
        if backups == 0 {
            fs::remove_file(self.active_path())?;
        } else {
            let oldest = self.backup_path(backups);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for index in (1..backups).rev() {
                let from = self.backup_path(index);
                if from.exists() {
                    fs::rename(&from, self.backup_path(index + 1))?;
                }
            }
            fs::rename(self.active_path(), self.backup_path(1))?;
        }

        self.reopen()
    }
}

impl Write for RotatingLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_size {
            self.rotate()?;
        }

        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "log file unavailable"))?;
        let bytes = file.write(buf)?;
        self.written += bytes as u64;
        Ok(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// Cloneable handle to a rotating log file, usable as a tracing writer.
#[derive(Clone)]
pub struct SharedLogWriter {
    inner: Arc<Mutex<RotatingLog>>,
    path: PathBuf,
}

impl SharedLogWriter {
    pub fn open(dir: &Path, name: &str, max_files: usize, max_size: u64) -> io::Result<Self> {
        let log = RotatingLog::open(dir, name, max_files, max_size)?;
        let path = log.active_path();
        Ok(Self {
            inner: Arc::new(Mutex::new(log)),
            path,
        })
    }

    /// Path of the file currently written to.
    pub fn path(&self) -> PathBuf {
        self.path.clone()
    }
}

pub struct SharedLogWriterGuard {
    inner: Arc<Mutex<RotatingLog>>,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedLogWriter {
    type Writer = SharedLogWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedLogWriterGuard {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Write for SharedLogWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?
            .flush()
    }
}

fn sanitize_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect();
    if sanitized.is_empty() {
        "quarry".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tracing_subscriber::fmt::MakeWriter;

    #[test]
    fn sanitize_name_replaces_separators() {
        assert_eq!(sanitize_name("quarry find"), "quarry_find");
        assert_eq!(sanitize_name("../etc"), "___etc");
        assert_eq!(sanitize_name(""), "quarry");
    }

    #[test]
    fn writer_appends_to_active_file() {
        let temp = TempDir::new().unwrap();
        let writer = SharedLogWriter::open(temp.path(), "quarry", 3, 1024).unwrap();
        writer.make_writer().write_all(b"first\n").unwrap();
        writer.make_writer().write_all(b"second\n").unwrap();

        assert_eq!(writer.path(), temp.path().join("quarry.log"));
        let content = fs::read_to_string(writer.path()).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn rotation_keeps_at_most_max_files() {
        let temp = TempDir::new().unwrap();
        let writer = SharedLogWriter::open(temp.path(), "quarry", 3, 8).unwrap();
        for line in ["aaaaaa\n", "bbbbbb\n", "cccccc\n", "dddddd\n"] {
            writer.make_writer().write_all(line.as_bytes()).unwrap();
        }

        let read = |name: &str| fs::read_to_string(temp.path().join(name)).unwrap();
        assert_eq!(read("quarry.log"), "dddddd\n");
        assert_eq!(read("quarry.log.1"), "cccccc\n");
        assert_eq!(read("quarry.log.2"), "bbbbbb\n");
        assert!(!temp.path().join("quarry.log.3").exists());
    }

    #[test]
    fn oversized_existing_file_is_rotated_on_open() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("quarry.log"), "0123456789").unwrap();

        let writer = SharedLogWriter::open(temp.path(), "quarry", 2, 4).unwrap();
        assert_eq!(fs::read_to_string(writer.path()).unwrap(), "");
        assert_eq!(
            fs::read_to_string(temp.path().join("quarry.log.1")).unwrap(),
            "0123456789"
        );
    }

    #[test]
    fn single_file_mode_truncates_instead_of_shifting() {
        let temp = TempDir::new().unwrap();
        let writer = SharedLogWriter::open(temp.path(), "quarry", 1, 4).unwrap();
        writer.make_writer().write_all(b"abcd").unwrap();
        writer.make_writer().write_all(b"ef").unwrap();

        assert_eq!(fs::read_to_string(writer.path()).unwrap(), "ef");
        assert!(!temp.path().join("quarry.log.1").exists());
    }
}
