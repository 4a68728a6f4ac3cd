use crate::{
    config::Config,
    log::{log_msg::LogMsg, logger_handle::LoggerHandle},
};

use std::{
    fs::{self, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    sync::{Arc, mpsc},
    thread,
    time::{SystemTime, UNIX_EPOCH},
};

/// Flush to disk every 100 lines if debugging/tracing (to see crashes near real-time).
#[cfg(feature = "log-debug")]
const FLUSH_BATCH_SIZE: u32 = 100;

/// Flush to disk every 1000 lines in production/default (to save I/O & CPU).
#[cfg(not(feature = "log-debug"))]
const FLUSH_BATCH_SIZE: u32 = 1_000;

/// Bounded, non-blocking logger that writes to a per-process log file.
///
/// A background worker thread consumes log messages from a bounded channel
/// and writes them to a file, flushing every [`FLUSH_BATCH_SIZE`] lines.
/// Producers log through cloned [`LoggerHandle`]s; a full queue drops the
/// message instead of blocking the producer.
pub struct Logger {
    handle: LoggerHandle,
    _thread: Option<std::thread::JoinHandle<()>>,
    file_path: PathBuf,
}

impl Logger {
    /// Initializes the logger from `[Logging]` config keys
    /// (`log_filename`, `log_path`), falling back to a `logs/` directory
    /// next to the executable.
    #[must_use]
    pub fn start_app(cap: usize, config: &Arc<Config>) -> Self {
        let app_name = config.get_non_empty("Logging", "log_filename");

        if let Some(dir_str) = config.get_non_empty("Logging", "log_path") {
            let dir = expand_path(dir_str);
            Self::start_in_dir(dir, app_name, cap)
        } else {
            Self::start_default(app_name, cap)
        }
    }

    /// Creates a `logs/` directory next to the executable and starts the logger there.
    #[must_use]
    pub fn start_default(app_name: Option<&str>, cap: usize) -> Self {
        let base = exe_dir_fallback_cwd().join("logs");
        Self::start_in_dir(base, app_name, cap)
    }

    /// Starts the logger in a specific directory.
    ///
    /// Creates the target directory if it is missing, generates a unique
    /// filename from the start timestamp and process ID, and spawns the
    /// background worker thread.
    pub fn start_in_dir<D: AsRef<Path>>(dir: D, app_name: Option<&str>, cap: usize) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let _ = fs::create_dir_all(&dir);

        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let pid = std::process::id();

        let fname = if let Some(name) = app_name {
            format!("{name}-{secs}-pid{pid}.log")
        } else {
            format!("camstream-{secs}-pid{pid}.log")
        };

        let file_path = dir.join(&fname);

        let (tx, rx) = mpsc::sync_channel::<LogMsg>(cap);
        let handle_for_field = LoggerHandle { tx };

        let file_path_clone = file_path.clone();

        let _thread = thread::Builder::new()
            .name("logger-worker".into())
            .spawn(move || {
                // Try target file -> temp file -> sink (never panic).
                let writer: Box<dyn Write + Send> = if let Ok(f) = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&file_path_clone)
                {
                    Box::new(f)
                } else {
                    let fallback = std::env::temp_dir().join("camstream-fallback.log");
                    match OpenOptions::new().create(true).append(true).open(&fallback) {
                        Ok(f) => Box::new(f),
                        Err(_) => Box::new(io::sink()),
                    }
                };

                let mut out: BufWriter<Box<dyn Write + Send>> = BufWriter::new(writer);
                let mut lines_written: u32 = 0;

                while let Ok(m) = rx.recv() {
                    let _ = writeln!(&mut out, "[{:?}] {} {} | {}", m.level, m.ts_ms, m.target, m.text);
                    lines_written = lines_written.wrapping_add(1);

                    // Flush periodically to ensure data persists on crash.
                    if lines_written.is_multiple_of(FLUSH_BATCH_SIZE) {
                        let _ = out.flush();
                    }
                }

                let _ = out.flush();
            })
            .ok();

        Self {
            handle: handle_for_field,
            _thread,
            file_path,
        }
    }

    /// Returns a cloneable handle to the logger sink.
    ///
    /// Useful for passing the logging capability to other modules or threads
    /// without transferring ownership of the main `Logger` struct.
    #[must_use]
    pub fn handle(&self) -> LoggerHandle {
        self.handle.clone()
    }

    /// Returns the path of the active log file.
    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

/// Locates the directory next to the executable (target/{debug,release}),
/// or falls back to the current working directory on error.
fn exe_dir_fallback_cwd() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Expands tilde (`~`) in file paths to the user's home directory.
fn expand_path(path_str: &str) -> PathBuf {
    if path_str.starts_with('~') {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .ok()
            .map(PathBuf::from);

        if let Some(mut home_path) = home {
            if path_str == "~" {
                return home_path;
            }
            if path_str.starts_with("~/") || path_str.starts_with("~\\") {
                home_path.push(&path_str[2..]);
                return home_path;
            }
        }
    }
    PathBuf::from(path_str)
}
