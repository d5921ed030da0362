//! Logging init helper (§5: "structured logging" ambient concern). Thin wrapper around
//! `tracing_subscriber`'s `EnvFilter`, matching the registry/fmt-layer/env-filter stack the
//! daemon binary wires up by hand.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info,lokinet=info",
            LogLevel::Debug => "info,lokinet=debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Install a global `tracing_subscriber` with `level` as the default filter, overridable via
/// `RUST_LOG`. Returns `Err` if a global subscriber is already set (e.g. a second call in tests);
/// callers should ignore that error rather than panic.
pub fn try_init(level: LogLevel) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter_str()));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_ordering_matches_verbosity() {
        assert!(LogLevel::Error < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Trace);
    }

    #[test]
    fn filter_strings_are_non_empty() {
        for level in [LogLevel::Error, LogLevel::Warn, LogLevel::Info, LogLevel::Debug, LogLevel::Trace] {
            assert!(!level.as_filter_str().is_empty());
        }
    }
}
