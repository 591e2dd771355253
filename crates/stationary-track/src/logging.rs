/*!
Logging and profiling setup for the command line tool.

Logs always go to stderr so that stdout only carries results. The filter comes
from `RUST_LOG` when set, otherwise from the verbosity flags.

With the `profiling` feature, setting `ENABLE_PROFILING` also records a Chrome
trace (`trace-*.json` in the working directory) that is flushed when the
returned guard is dropped.
*/

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Keeps the profiling trace alive; drop it last.
#[must_use]
pub struct LoggingGuard {
    #[cfg(feature = "profiling")]
    _chrome: Option<tracing_chrome::FlushGuard>,
}

/// Build the log filter, preferring `RUST_LOG` over `default_level`
fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize the global subscriber
pub fn setup_logging(default_level: &str) -> LoggingGuard {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(env_filter(default_level));
    let registry = tracing_subscriber::registry().with(fmt_layer);

    #[cfg(feature = "profiling")]
    {
        if std::env::var_os("ENABLE_PROFILING").is_some() {
            let (chrome_layer, guard) = tracing_chrome::ChromeLayerBuilder::new().build();
            registry.with(chrome_layer).init();
            tracing::info!("ENABLE_PROFILING set - recording Chrome trace");
            return LoggingGuard {
                _chrome: Some(guard),
            };
        }
        registry.init();
        LoggingGuard { _chrome: None }
    }

    #[cfg(not(feature = "profiling"))]
    {
        registry.init();
        LoggingGuard {}
    }
}
