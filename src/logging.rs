use crate::graffiti::GraffitiSettings;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Initialise logging. With `debug` enabled the level defaults to `debug`
/// and `RUST_LOG` may override it; otherwise `info` is forced.
///
/// When `log_file` is given, output is written to that file instead of
/// stderr. A log file that cannot be opened falls back to stderr with a
/// warning. Calling this more than once keeps the first subscriber.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let mut file_error = None;
    let appender = log_file.and_then(|path| match open_log_file(&path) {
        Ok(appender) => Some(appender),
        Err(err) => {
            file_error = Some((path, err));
            None
        }
    });

    let installed = match appender {
        Some(appender) => builder.with_ansi(false).with_writer(appender).try_init(),
        None => builder.try_init(),
    };

    if let (Ok(()), Some((path, err))) = (installed, file_error) {
        tracing::warn!(
            path = %path.display(),
            error = %format!("{err:#}"),
            "log file unavailable; logging to stderr"
        );
    }
}

/// Same as [`init`], with the level taken from `settings.debug_logging`.
pub fn init_with_settings(settings: &GraffitiSettings, log_file: Option<PathBuf>) {
    init(settings.debug_logging, log_file);
}

fn open_log_file(path: &Path) -> Result<RollingFileAppender> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("log path has no file name: {}", path.display()))?
        .to_string_lossy()
        .into_owned();
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)
        .with_context(|| format!("open log file {}", path.display()))
}
