// Lowest tier of the error taxonomy, shared by every port.
//
// Purpose
// - Classify failures by where they happened: the remote API, the local store, or malformed input.
//
// Responsibilities
// - Carry a human readable message and an optional underlying cause.
// - Stay cheap to clone so one batch level failure can be reported against many keys.

use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

pub type Cause = Arc<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Clone, Error)]
pub enum DataError {
    #[error("transport failure: {message}")]
    Transport {
        message: String,
        retryable: bool,
        #[source]
        cause: Option<Cause>,
    },

    #[error("storage failure: {message}")]
    Storage {
        message: String,
        #[source]
        cause: Option<Cause>,
    },

    #[error("invalid identifier format: {message}")]
    InvalidIdentifierFormat {
        message: String,
        #[source]
        cause: Option<Cause>,
    },
}

impl DataError {
    pub fn transport(message: impl Into<String>, retryable: bool) -> Self {
        Self::Transport {
            message: message.into(),
            retryable,
            cause: None,
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            cause: None,
        }
    }

    pub fn invalid_identifier(message: impl Into<String>) -> Self {
        Self::InvalidIdentifierFormat {
            message: message.into(),
            cause: None,
        }
    }

    /// Attaches the underlying error, replacing any previous cause.
    pub fn with_cause<E>(mut self, error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let new_cause: Cause = Arc::new(error);
        match &mut self {
            Self::Transport { cause, .. }
            | Self::Storage { cause, .. }
            | Self::InvalidIdentifierFormat { cause, .. } => *cause = Some(new_cause),
        }
        self
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { retryable: true, .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Transport { message, .. }
            | Self::Storage { message, .. }
            | Self::InvalidIdentifierFormat { message, .. } => message,
        }
    }
}
