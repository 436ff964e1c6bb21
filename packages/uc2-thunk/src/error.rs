//! Error types for the thunk.

use thiserror::Error;

use efi_collation::ConvertError;
use efi_protocol_db::Handle;

use crate::pool::PoolError;

/// Why a handle was not given a Unicode Collation 2 interface.
///
/// None of these escape the discovery listener: each one abandons the current
/// handle and the batch carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThunkError {
    /// The adapter record or the language buffer could not be allocated.
    #[error("out of resources adapting {handle}: {source}")]
    OutOfResources {
        handle: Handle,
        #[source]
        source: PoolError,
    },

    /// The legacy interface was reported on the handle but is gone on fetch.
    #[error("UnicodeCollation vanished from {handle}: {source}")]
    InterfaceVanished {
        handle: Handle,
        #[source]
        source: efi_protocol_db::Error,
    },

    /// The legacy language list could not be converted.
    #[error("cannot convert languages on {handle}: {source}")]
    LanguageConversion {
        handle: Handle,
        #[source]
        source: ConvertError,
    },

    /// Installing the new interface on the handle failed.
    #[error("cannot publish UnicodeCollation2 on {handle}: {source}")]
    PublishFailed {
        handle: Handle,
        #[source]
        source: efi_protocol_db::Error,
    },

    /// An adapter record was sealed before every field was filled in.
    #[error("adapter record sealed without {missing}")]
    Incomplete { missing: &'static str },

    /// Registering for install notifications failed.
    #[error("cannot register for UnicodeCollation installs: {0}")]
    Registration(#[source] efi_protocol_db::Error),

    /// The configuration was rejected.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl ThunkError {
    /// Whether the platform changed underneath the thunk between two calls.
    ///
    /// These abandon only the current handle; retrying the same handle in the
    /// same batch will not help.
    pub fn is_platform_race(&self) -> bool {
        matches!(
            self,
            ThunkError::InterfaceVanished { .. } | ThunkError::PublishFailed { .. }
        )
    }

    /// Whether this is a bug in the thunk rather than a platform condition.
    pub fn is_defect(&self) -> bool {
        matches!(self, ThunkError::Incomplete { .. })
    }

    /// Whether retrying the same handle could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ThunkError::OutOfResources { .. })
    }
}

/// Errors loading or validating a [`ThunkConfig`](crate::ThunkConfig).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The configuration text could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// The language buffer cannot hold even a two-letter tag.
    #[error("language buffer of {size} bytes is below the minimum of {minimum}")]
    BufferTooSmall { size: usize, minimum: usize },

    /// More allocation retries than the thunk allows.
    #[error("{retries} allocation retries requested, at most {maximum} allowed")]
    TooManyRetries { retries: u32, maximum: u32 },
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

/// Result type alias for thunk operations.
pub type Result<T> = std::result::Result<T, ThunkError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn races_are_classified() {
        let handle = Handle::new();
        let vanished = ThunkError::InterfaceVanished {
            handle,
            source: efi_protocol_db::Error::Unsupported {
                protocol: "UnicodeCollation",
            },
        };
        assert!(vanished.is_platform_race());
        assert!(!vanished.is_retryable());
        assert!(!vanished.is_defect());

        let exhausted = ThunkError::OutOfResources {
            handle,
            source: PoolError::Exhausted {
                requested: 43,
                available: 0,
            },
        };
        assert!(!exhausted.is_platform_race());
        assert!(exhausted.is_retryable());

        let incomplete = ThunkError::Incomplete {
            missing: "languages",
        };
        assert!(incomplete.is_defect());
        assert!(!incomplete.is_platform_race());
    }

    #[test]
    fn conversion_error_keeps_source() {
        let e = ThunkError::LanguageConversion {
            handle: Handle::new(),
            source: ConvertError::Empty,
        };
        assert!(StdError::source(&e).is_some());
        assert!(e.to_string().contains("legacy language list is empty"));
    }

    #[test]
    fn json_error_converts_to_parse() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let e: ConfigError = json_err.into();
        assert!(matches!(e, ConfigError::Parse(_)));
    }
}
