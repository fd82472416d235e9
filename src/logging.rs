//! Tracing subscriber setup for the binary.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use time::{OffsetDateTime, UtcOffset, format_description};
use tracing::{Level, subscriber::set_global_default};
use tracing_subscriber::{FmtSubscriber, fmt::time::OffsetTime, fmt::writer::BoxMakeWriter};

/// Installs the global subscriber. Logs go to `file` when one is given (the
/// terminal is busy drawing birds), otherwise to stderr.
pub fn init_logger(level: Level, file: Option<&Path>) -> anyhow::Result<()> {
    let (writer, ansi) = match file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(io::stderr), true),
    };

    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let timer = OffsetTime::new(
        offset,
        format_description::parse("[year]-[month]-[day] [hour]:[minute]:[second]")?,
    );

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_ansi(ansi)
        .with_timer(timer)
        .with_writer(writer)
        .finish();

    set_global_default(subscriber).context("a global tracing subscriber is already set")
}

/// `flappy-evolve_<date>_<time>.log` in the working directory.
pub fn log_file_name() -> PathBuf {
    let stamp = format_description::parse("[year]-[month]-[day]_[hour]-[minute]-[second]")
        .ok()
        .and_then(|format| {
            let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
            now.format(&format).ok()
        })
        .unwrap_or_else(|| "run".to_string());
    PathBuf::from(format!("flappy-evolve_{stamp}.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_files_are_timestamped() {
        let name = log_file_name();
        let name = name.to_string_lossy();
        assert!(name.starts_with("flappy-evolve_20"));
        assert!(name.ends_with(".log"));
    }
}
