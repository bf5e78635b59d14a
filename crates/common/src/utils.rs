use std::{
    panic,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use http::HeaderMap;
use tracing::error;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{InitError, Rotation},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use uuid::Uuid;

use crate::LoggingConfig;

/// Installs the global subscriber. The returned guard must be held for the lifetime of the
/// process or buffered lines are lost.
pub fn init_tracing_log(config: &LoggingConfig) -> Result<WorkerGuard, InitError> {
    let format = tracing_subscriber::fmt::format()
        .with_level(true)
        .with_thread_ids(false)
        .with_target(true)
        .compact();

    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| get_crate_filter(tracing::Level::INFO))
    };

    match config {
        LoggingConfig::Console => {
            let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
            let layer = tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_writer(writer)
                .with_filter(filter());

            tracing_subscriber::registry().with(layer).init();
            Ok(guard)
        }

        LoggingConfig::File { dir_path, file_name } => {
            let file_appender = tracing_appender::rolling::Builder::new()
                .filename_prefix(file_name)
                .max_log_files(14)
                .rotation(Rotation::DAILY)
                .build(dir_path)?;

            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(filter());

            tracing_subscriber::registry().with(layer).init();
            Ok(guard)
        }
    }
}

const CRATES: &[&str] =
    &["api", "beacon", "common", "database", "datastore", "housekeeper", "types"];

fn get_crate_filter(crates_level: tracing::Level) -> EnvFilter {
    let mut env_filter = EnvFilter::new("info");

    for crate_name in CRATES {
        if let Ok(directive) = format!("helix_{crate_name}={crates_level}").parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    env_filter
}

pub fn init_panic_hook() {
    panic::set_hook(Box::new(move |info| {
        let backtrace = backtrace::Backtrace::new();
        let crash_log = format!("Panic: {info}\nFull backtrace:\n{backtrace:?}\n");

        error!("{crash_log}");
        eprintln!("{crash_log}");
    }));
}

// Returns request id from header if exists otherwise returns a random one
pub fn extract_request_id(headers: &HeaderMap) -> Uuid {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
        .unwrap_or_else(Uuid::new_v4)
}

////// TIME //////

/// Duration since UNIX_EPOCH
pub fn utcnow_dur() -> Duration {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default()
}

/// Seconds
pub fn utcnow_sec() -> u64 {
    utcnow_dur().as_secs()
}
/// Millis
pub fn utcnow_ms() -> u64 {
    utcnow_dur().as_millis() as u64
}
