//! Error types for the protocol database.
//!
//! These are registry-level errors only. What a driver does about a missing
//! interface or a failed install is decided one layer up.

use thiserror::Error;

use crate::{Guid, Handle};

/// Errors reported by a [`ProtocolDatabase`](crate::ProtocolDatabase).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The registration token is not known to this database.
    #[error("registration not found")]
    NotFound,

    /// The handle does not carry the requested protocol.
    #[error("protocol {protocol} not supported on handle")]
    Unsupported {
        /// Human readable protocol name.
        protocol: &'static str,
    },

    /// The handle does not exist in this database.
    #[error("invalid handle: {0}")]
    InvalidHandle(Handle),

    /// The protocol is already installed on the handle.
    #[error("protocol {protocol} ({guid}) already installed on {handle}")]
    AlreadyStarted {
        /// Human readable protocol name.
        protocol: &'static str,
        /// Protocol identity.
        guid: Guid,
        /// Handle that already carries it.
        handle: Handle,
    },

    /// The database could not allocate bookkeeping for the request.
    #[error("out of resources")]
    OutOfResources,

    /// A notify function panicked while holding the database lock.
    #[error("protocol database lock poisoned")]
    Poisoned,
}

/// Result type alias for protocol database operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_display_names_protocol() {
        let e = Error::Unsupported {
            protocol: "UnicodeCollation2",
        };
        assert_eq!(
            e.to_string(),
            "protocol UnicodeCollation2 not supported on handle"
        );
    }

    #[test]
    fn already_started_display_names_handle() {
        let handle = Handle::new();
        let e = Error::AlreadyStarted {
            protocol: "Demo",
            guid: Guid::from_u128(1),
            handle,
        };
        let display = e.to_string();
        assert!(display.contains("Demo"));
        assert!(display.contains(&handle.to_string()));
    }
}
