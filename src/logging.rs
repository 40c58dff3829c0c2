//! Tracing subscriber setup.

use crate::config::LoggingConfig;
use crate::error::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
///
/// Logs go to stderr so stdout stays free for listings. When file logging is
/// on, the returned guard must be kept alive to flush the file writer.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let (file_layer, guard) = if config.file_logging {
        let dir = match &config.log_dir {
            Some(dir) => dir.clone(),
            None => crate::config::log_dir()?,
        };
        std::fs::create_dir_all(&dir)?;

        let appender = tracing_appender::rolling::daily(dir, "botdeck.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (
            Some(fmt::layer().with_writer(writer).with_ansi(false)),
            Some(guard),
        )
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter)))
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}
