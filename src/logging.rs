use chrono::Local;
use std::io::IsTerminal;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// File name of the daily log: `<ddmmyyyy>-<process>.log`.
pub fn log_file_name(process_name: &str) -> String {
    format!("{}-{}.log", Local::now().format("%d%m%Y"), process_name)
}

/// Installs the global subscriber: stderr always, plus a log file when both a
/// directory and a process name are given.
///
/// The returned guard flushes the file writer on drop and must outlive the run.
pub fn init(log_dir: Option<&Path>, process_name: Option<&str>) -> std::io::Result<Option<WorkerGuard>> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_filter(filter());

    let (file, guard) = match (log_dir, process_name) {
        (Some(dir), Some(name)) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::never(dir, log_file_name(name));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry().with(stderr).with(file).init();
    Ok(guard)
}
