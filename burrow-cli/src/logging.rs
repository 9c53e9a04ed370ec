//! Structured logging bootstrap.
//!
//! The reorder pipeline reports progress through `tracing` spans and
//! events; this module installs the process-wide subscriber that receives
//! them. Diagnostics go to stderr so stdout stays reserved for the command
//! summary, the level comes from `RUST_LOG` (default `info`), and
//! `BURROW_LOG_FORMAT=json` switches the encoding from human-readable
//! lines to JSON. Crates still talking to the `log` facade are bridged
//! into the same stream.

use std::{env, sync::OnceLock};

use thiserror::Error;
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, Layer, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt,
    util::TryInitError,
};

const LOG_FORMAT_ENV: &str = "BURROW_LOG_FORMAT";

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Errors raised while reading the logging configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoggingError {
    /// The format variable held bytes that are not valid UTF-8.
    #[error("environment variable `{name}` contained invalid UTF-8: {source}")]
    InvalidUnicode {
        /// Name of the offending environment variable.
        name: &'static str,
        /// Underlying lookup failure.
        #[source]
        source: env::VarError,
    },
    /// The format variable named an encoding this binary does not emit.
    #[error("unsupported log format `{provided}`; expected `human` or `json`")]
    UnsupportedFormat {
        /// Raw value supplied by the user.
        provided: String,
    },
}

/// Output encodings selectable through `BURROW_LOG_FORMAT`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Human,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Result<Self, LoggingError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            _ => Err(LoggingError::UnsupportedFormat {
                provided: raw.trim().to_owned(),
            }),
        }
    }

    fn from_env() -> Result<Self, LoggingError> {
        match env::var(LOG_FORMAT_ENV) {
            Ok(raw) => Self::parse(&raw),
            Err(env::VarError::NotPresent) => Ok(Self::Human),
            Err(source @ env::VarError::NotUnicode(_)) => Err(LoggingError::InvalidUnicode {
                name: LOG_FORMAT_ENV,
                source,
            }),
        }
    }
}

/// Installs the global subscriber. Calling it again is a no-op, and an
/// environment that already carries a subscriber (test harnesses, notably)
/// keeps its own configuration.
///
/// # Errors
/// Returns [`LoggingError`] when the configured format is unreadable or
/// names an unsupported encoding.
pub fn init_logging() -> Result<(), LoggingError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }

    let format = LogFormat::from_env()?;
    if let Err(source) = install(format) {
        // Not fatal: whoever installed the existing subscriber wins.
        eprintln!("keeping the existing logging configuration: {source}");
    }
    let _ = INSTALLED.set(());
    Ok(())
}

fn install(format: LogFormat) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let base = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::FULL)
        .with_writer(std::io::stderr);
    let formatted = match format {
        LogFormat::Human => base.boxed(),
        LogFormat::Json => base
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
    };

    // The log bridge has its own global slot; losing the race there is as
    // harmless as losing it for the subscriber.
    let _ = LogTracer::init();

    tracing_subscriber::registry()
        .with(filter)
        .with(formatted)
        .try_init()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("human", LogFormat::Human)]
    #[case("JSON", LogFormat::Json)]
    #[case(" Human ", LogFormat::Human)]
    fn parse_accepts_either_encoding_case_insensitively(
        #[case] raw: &str,
        #[case] expected: LogFormat,
    ) {
        assert_eq!(LogFormat::parse(raw).expect("format must parse"), expected);
    }

    #[test]
    fn parse_rejects_unknown_encodings() {
        let err = LogFormat::parse(" yaml ").expect_err("yaml is not emitted");
        match err {
            LoggingError::UnsupportedFormat { provided } => assert_eq!(provided, "yaml"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn init_logging_tolerates_repeat_calls() {
        init_logging().expect("first call must succeed");
        init_logging().expect("second call must be a no-op");
    }
}
