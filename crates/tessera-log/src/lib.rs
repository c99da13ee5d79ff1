//! Structured logging for the Tessera tools.
//!
//! Installs a `tracing` subscriber with a human-readable console layer and,
//! in debug builds, a JSON file layer for replaying a run afterwards. The
//! level comes from `RUST_LOG` when set, otherwise from the config's
//! `debug.log_level`.

use std::fs::File;
use std::path::Path;

use tessera_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config names one.
pub const DEFAULT_FILTER: &str = "info";

/// Name of the JSON log written in debug builds.
pub const LOG_FILE_NAME: &str = "tessera.log";

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - directory for the JSON log (debug builds only)
/// * `debug_build` - enables the file layer
/// * `config` - supplies `debug.log_level`
///
/// Must be called at most once per process.
///
/// ```no_run
/// use tessera_config::Config;
///
/// let config = Config::default();
/// tessera_log::init_logging(None, false, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && let Some(log_file) = open_log_file(log_dir)
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// Create `log_dir` if needed and truncate [`LOG_FILE_NAME`] inside it.
///
/// Returns `None` when the directory or file cannot be created; logging then
/// stays console-only.
#[must_use]
pub fn open_log_file(log_dir: &Path) -> Option<File> {
    if let Err(e) = std::fs::create_dir_all(log_dir) {
        eprintln!("Cannot create log directory {}: {e}", log_dir.display());
        return None;
    }
    let path = log_dir.join(LOG_FILE_NAME);
    File::create(&path)
        .inspect_err(|e| eprintln!("Cannot create log file {}: {e}", path.display()))
        .ok()
}

/// Filter directives taken from the config, or [`DEFAULT_FILTER`].
#[must_use]
pub fn filter_directives(config: Option<&Config>) -> String {
    config
        .map(|config| config.debug.log_level.trim())
        .filter(|level| !level.is_empty())
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

/// `EnvFilter` built from [`DEFAULT_FILTER`].
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(filter_directives(None), "info");
        assert!(default_env_filter().to_string().contains("info"));
    }

    #[test]
    fn test_config_level_is_used() {
        let mut config = Config::default();
        config.debug.log_level = "info,tessera_lod=trace".to_string();
        let directives = filter_directives(Some(&config));
        assert_eq!(directives, "info,tessera_lod=trace");
        assert!(EnvFilter::try_new(&directives).is_ok());
    }

    #[test]
    fn test_blank_config_level_falls_back() {
        let mut config = Config::default();
        config.debug.log_level = "   ".to_string();
        assert_eq!(filter_directives(Some(&config)), DEFAULT_FILTER);
    }

    #[test]
    fn test_open_log_file_creates_nested_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_dir = temp_dir.path().join("tessera").join("logs");
        let mut file = open_log_file(&log_dir).expect("log file should open");
        writeln!(file, "first run").unwrap();
        drop(file);
        assert!(log_dir.join(LOG_FILE_NAME).is_file());

        // A new run starts from an empty file.
        drop(open_log_file(&log_dir).unwrap());
        assert_eq!(std::fs::read_to_string(log_dir.join(LOG_FILE_NAME)).unwrap(), "");
    }

    #[test]
    fn test_open_log_file_fails_when_dir_is_a_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let blocker = temp_dir.path().join("logs");
        std::fs::write(&blocker, "not a directory").unwrap();
        assert!(open_log_file(&blocker).is_none());
    }
}
