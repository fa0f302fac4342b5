use crate::error::{Result as ServerErrorResult, ServerError};

use std::fmt::Display;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{LevelFilter, Record, info};

/// Route the daemon's own log records.
///
/// Records go to `log_file` when configured (its directory is created),
/// otherwise to stdout, colored when `colored` is set. The managed proxy
/// writes its logs elsewhere; they never pass through here.
pub fn initialize(
    log_level: rcd_config::LogLevel,
    log_file: Option<PathBuf>,
    colored: bool,
) -> ServerErrorResult<()> {
    let level_filter: LevelFilter = log_level.into();

    let output = match &log_file {
        Some(path) => Dispatch::new()
            .format(|out, message, record| write_line(out, message, record, record.level()))
            .chain(open_log_file(path)?),
        None if colored => {
            let colors = ColoredLevelConfig::new()
                .trace(Color::Magenta)
                .debug(Color::Blue)
                .info(Color::Green)
                .warn(Color::Yellow)
                .error(Color::Red);
            Dispatch::new()
                .format(move |out, message, record| {
                    write_line(out, message, record, colors.color(record.level()))
                })
                .chain(std::io::stdout())
        }
        None => Dispatch::new()
            .format(|out, message, record| write_line(out, message, record, record.level()))
            .chain(std::io::stdout()),
    };

    Dispatch::new()
        .level(level_filter)
        .chain(output)
        .apply()
        .map_err(|e| ServerError::logger(format!("a logger is already installed: {e}")))?;

    match &log_file {
        Some(path) => info!("Daemon log: level={level_filter:?}, file={}", path.display()),
        None => info!("Daemon log: level={level_filter:?}, stdout"),
    }

    Ok(())
}

/// `[date - LEVEL] message [file:line]`
fn write_line(
    out: FormatCallback,
    message: &std::fmt::Arguments,
    record: &Record,
    level: impl Display,
) {
    out.finish(format_args!(
        "[{date} - {level}] {message} [{file}:{line}]",
        date = humantime::format_rfc3339(SystemTime::now()),
        file = record.file().unwrap_or("unknown"),
        line = record.line().unwrap_or(0),
    ))
}

pub(crate) fn open_log_file(path: &Path) -> ServerErrorResult<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ServerError::logger(format!(
                "cannot create log directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ServerError::logger(format!("cannot open {}: {e}", path.display())))
}
