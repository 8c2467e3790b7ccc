use std::fmt;
use thiserror::Error as ThisError;

///
/// BatchError
///
/// Top-level failure surfaced by batch construction and batch execution.
/// Configuration failures are always raised before the first batch is produced.
///

#[derive(Debug, ThisError)]
pub enum BatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BatchError {
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    #[must_use]
    pub const fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    /// Borrow the store failure, if this error came from the store.
    #[must_use]
    pub const fn as_store(&self) -> Option<&StoreError> {
        match self {
            Self::Store(err) => Some(err),
            Self::Config(_) => None,
        }
    }
}

///
/// ConfigError
///
/// Invalid option values or combinations.
/// Detected eagerly, either when options are loaded or when a batcher is built.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConfigError {
    #[error("batch_size must be greater than zero")]
    ZeroBatchSize,

    #[error("offset {offset} is past the end of the range ({to})")]
    OffsetPastEnd { offset: u64, to: u64 },

    #[error("malformed option '{option}': {message}")]
    Malformed { option: String, message: String },

    #[error("config parse error: {0}")]
    Parse(String),

    #[error("config read error ({path}): {message}")]
    Io { path: String, message: String },
}

impl ConfigError {
    pub(crate) fn malformed(option: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            option: option.into(),
            message: message.into(),
        }
    }
}

///
/// StoreError
///
/// Failure reported by the underlying store, either while counting the
/// source query or while executing one batch. Never retried here.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{message}")]
pub struct StoreError {
    pub class: StoreErrorClass,
    pub message: String,
}

impl StoreError {
    pub fn new(class: StoreErrorClass, message: impl Into<String>) -> Self {
        Self {
            class,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StoreErrorClass::Unavailable, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(StoreErrorClass::Timeout, message)
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(StoreErrorClass::AccessDenied, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StoreErrorClass::Internal, message)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("store:{}: {}", self.class, self.message)
    }
}

///
/// StoreErrorClass
/// Coarse classification of store failures.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StoreErrorClass {
    Unavailable,
    Timeout,
    AccessDenied,
    Internal,
}

impl fmt::Display for StoreErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unavailable => "unavailable",
            Self::Timeout => "timeout",
            Self::AccessDenied => "access_denied",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}
