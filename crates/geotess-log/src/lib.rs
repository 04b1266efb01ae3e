//! Structured logging for the grid builder.
//!
//! Console output with uptime timestamps and targets, plus an optional JSON
//! log file for post-mortem analysis of long builds. `RUST_LOG` always wins
//! over the configured verbosity.

use std::path::Path;

use geotess_config::BuilderConfig;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// File written inside the log directory.
pub const LOG_FILE_NAME: &str = "geotess.log";

/// Default filter for a verbosity level: 0 warn, 1 info, 2 debug, 3+ trace.
#[must_use]
pub fn filter_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize the global tracing subscriber.
///
/// Returns `false` when a subscriber was already installed (repeated calls
/// from tests or library callers are harmless).
///
/// # Arguments
///
/// * `log_dir` - Optional directory for the JSON log file
/// * `config` - Optional configuration supplying the verbosity
///
/// # Examples
///
/// ```no_run
/// use geotess_log::init_logging;
///
/// init_logging(None, None);
/// init_logging(Some(std::path::Path::new("./logs")), None);
/// ```
pub fn init_logging(log_dir: Option<&Path>, config: Option<&BuilderConfig>) -> bool {
    let verbosity = config.map_or(1, |c| c.verbosity);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_for_verbosity(verbosity)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE_NAME))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();
        return subscriber.with(file_layer).try_init().is_ok();
    }

    subscriber.try_init().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_filters() {
        assert_eq!(filter_for_verbosity(0), "warn");
        assert_eq!(filter_for_verbosity(1), "info");
        assert_eq!(filter_for_verbosity(2), "debug");
        assert_eq!(filter_for_verbosity(9), "trace");
        for v in 0..4 {
            assert!(EnvFilter::try_new(filter_for_verbosity(v)).is_ok());
        }
    }

    #[test]
    fn test_subsystem_filter() {
        let filter = EnvFilter::new("warn,geotess_refine=debug");
        let filter_str = format!("{filter}");
        assert!(filter_str.contains("geotess_refine=debug"));
        assert!(filter_str.contains("warn"));
    }

    #[test]
    fn test_init_twice_is_harmless() {
        let dir = tempfile::tempdir().unwrap();
        let config = BuilderConfig {
            verbosity: 2,
            ..BuilderConfig::default()
        };
        let first = init_logging(Some(dir.path()), Some(&config));
        let second = init_logging(None, None);
        assert!(!second || !first);
        if first {
            assert!(dir.path().join(LOG_FILE_NAME).exists());
        }
    }
}
