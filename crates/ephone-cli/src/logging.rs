use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Default filter for the log file. Matches every `ephone*` crate.
const FILE_FILTER: &str = "warn,ephone=info";
/// Default filter on stderr, where logs share the terminal with command output.
const STDERR_FILTER: &str = "warn";

/// Initialize tracing. The filter comes from `RUST_LOG` when set.
///
/// With a log directory, output goes to a daily rolling file and stderr stays
/// clean for command output. The returned guard must be kept alive until
/// exit so buffered lines are flushed.
pub fn init_tracing(log_dir: Option<&Path>) -> io::Result<Option<WorkerGuard>> {
    let default_filter = if log_dir.is_some() { FILE_FILTER } else { STDERR_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let (writer, guard) = tracing_appender::non_blocking(rolling::daily(dir, "ephone.log"));

            tracing_subscriber::registry()
                .with(
                    fmt::Layer::new()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(filter)
                .try_init()
                .map_err(io::Error::other)?;

            tracing::debug!(path = %dir.display(), "Tracing initialized with file output");
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::Layer::default().with_writer(io::stderr).with_target(true))
                .with(filter)
                .try_init()
                .map_err(io::Error::other)?;

            tracing::debug!("Tracing initialized with stderr output");
            Ok(None)
        }
    }
}
