//! Error types for SmartBuy.
//!
//! Library crates use [`SmartBuyError`] via `thiserror`.
//! Individual estimation strategies report [`StrategyError`], which the
//! cascade runner always recovers from by falling through.
//! The CLI wraps both with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all SmartBuy operations.
#[derive(Debug, thiserror::Error)]
pub enum SmartBuyError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error outside of a strategy attempt (e.g. client setup).
    #[error("network error: {0}")]
    Network(String),

    /// HTML or selector parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Model artifact could not be loaded or is inconsistent.
    #[error("model error: {message}")]
    Model { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A cascade was misconfigured: no strategies, or its terminal strategy failed.
    #[error("cascade error: {message}")]
    Cascade { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SmartBuyError>;

impl SmartBuyError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a model error from any displayable message.
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a cascade configuration error.
    pub fn cascade(msg: impl Into<String>) -> Self {
        Self::Cascade {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// ---------------------------------------------------------------------------
// StrategyError
// ---------------------------------------------------------------------------

/// Failure of a single estimation strategy.
///
/// Never escapes a cascade run: the runner logs it and moves on to the next
/// strategy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StrategyError {
    /// A dependency is absent (no model loaded) or unreachable (HTTP 403).
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// A dependency did not answer in time.
    #[error("timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The request could not be interpreted by this strategy.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The strategy ran but produced nothing usable.
    #[error("empty result: {0}")]
    EmptyResult(String),

    /// The validator refused the strategy's output.
    #[error("rejected by validator: {0}")]
    Rejected(String),
}

impl StrategyError {
    /// Short stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SourceUnavailable(_) => "source_unavailable",
            Self::Timeout { .. } => "timeout",
            Self::MalformedInput(_) => "malformed_input",
            Self::EmptyResult(_) => "empty_result",
            Self::Rejected(_) => "rejected",
        }
    }
}

/// Result alias for strategy attempts.
pub type StrategyResult<T> = std::result::Result<T, StrategyError>;
