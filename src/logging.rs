use crate::error::{DocsError, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Initializes the application's logging system with the specified log level
///
/// Logs go to stderr. `RUST_LOG` takes precedence when set. Valid log
/// levels are: off, error, warn, info, debug, trace.
pub fn init(log_level: &str) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(parse_log_level(log_level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| DocsError::Config(format!("Failed to initialise logging: {}", e)))
}

/// Parses a log level string into a LevelFilter
///
/// Returns the corresponding LevelFilter, defaulting to Info for invalid strings
pub fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "off" => LevelFilter::OFF,
        "error" => LevelFilter::ERROR,
        "warn" => LevelFilter::WARN,
        "info" => LevelFilter::INFO,
        "debug" => LevelFilter::DEBUG,
        "trace" => LevelFilter::TRACE,
        _ => LevelFilter::INFO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("error"), LevelFilter::ERROR);
        assert_eq!(parse_log_level("WARN"), LevelFilter::WARN);
        assert_eq!(parse_log_level("info"), LevelFilter::INFO);
        assert_eq!(parse_log_level("debug"), LevelFilter::DEBUG);
        assert_eq!(parse_log_level("trace"), LevelFilter::TRACE);
        assert_eq!(parse_log_level("off"), LevelFilter::OFF);
        assert_eq!(parse_log_level("invalid"), LevelFilter::INFO);
    }
}
