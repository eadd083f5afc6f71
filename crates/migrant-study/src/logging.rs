//! Tracing subscriber setup for the binary.
//!
//! Logs go to stderr so that datasets can be written to stdout.

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging level selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogConfig {
    /// Explicit level from the command line; `None` defers to `RUST_LOG`.
    pub level: Option<Level>,
}

impl LogConfig {
    /// Maps `-v` / `-q` counts to a level.
    ///
    /// Without either flag `RUST_LOG` applies, falling back to `info`.
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        let level = match (quiet, verbose) {
            (true, _) => Some(Level::ERROR),
            (false, 0) => None,
            (false, 1) => Some(Level::DEBUG),
            (false, _) => Some(Level::TRACE),
        };
        Self { level }
    }

    /// Filter for this configuration.
    pub fn env_filter(&self) -> EnvFilter {
        match self.level {
            Some(level) => EnvFilter::new(directives(level)),
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(directives(Level::INFO))),
        }
    }
}

// Our crates at `level`, everything else at warn.
fn directives(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    format!(
        "warn,migrant_study={level},migrant_loader={level},migrant_status={level},migrant_types={level}"
    )
}

/// Installs the global subscriber. Call once at startup.
pub fn init_logging(config: &LogConfig) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(config.env_filter())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_precedence() {
        assert_eq!(LogConfig::from_flags(0, false).level, None);
        assert_eq!(LogConfig::from_flags(1, false).level, Some(Level::DEBUG));
        assert_eq!(LogConfig::from_flags(3, false).level, Some(Level::TRACE));
        assert_eq!(LogConfig::from_flags(2, true).level, Some(Level::ERROR));
    }

    #[test]
    fn test_directives_cover_workspace_crates() {
        let filter = directives(Level::DEBUG);
        assert!(filter.starts_with("warn,"));
        assert!(filter.contains("migrant_loader=debug"));
        assert!(filter.contains("migrant_study=debug"));
    }
}
