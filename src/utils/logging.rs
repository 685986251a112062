use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{format::FmtSpan, writer::MakeWriterExt},
    EnvFilter,
};

pub const LOG_PREFIX: &str = "daytally";

const LOG_DIR: &str = "logs";
const MAX_LOG_FILES: usize = 5;

/// Installs the global subscriber. Logs always go to daily rotated files in `logs/` under the
/// application directory. Stdout belongs to the console interface, so the optional mirror goes to
/// stderr.
pub fn enable_logging(
    prefix: &str,
    application_data_path: &Path,
    log_level: Option<LevelFilter>,
    mirror_to_console: bool,
) -> Result<()> {
    let appender = log_appender(prefix, application_data_path)?;
    let console = std::io::stderr.with_filter(move |_| mirror_to_console);
    let directive = log_directive(log_level, std::env::var("RUST_LOG").ok());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(console.and(appender))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Where rotated log files are written.
pub fn log_dir(application_data_path: &Path) -> PathBuf {
    application_data_path.join(LOG_DIR)
}

fn log_appender(prefix: &str, application_data_path: &Path) -> Result<RollingFileAppender> {
    Ok(RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(log_dir(application_data_path))?)
}

/// Filter limited to this crate. An explicit level wins over `RUST_LOG`, which wins over `info`.
fn log_directive(log_level: Option<LevelFilter>, env_level: Option<String>) -> String {
    let level = log_level
        .map(|v| v.to_string().to_lowercase())
        .or(env_level.filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| "info".into());
    format!("{}={level}", env!("CARGO_PKG_NAME").replace('-', "_"))
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .init()
});
