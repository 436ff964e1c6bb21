//! Error types for language tag conversion.

use thiserror::Error;

/// Errors converting a legacy language list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// The legacy list has no entries.
    #[error("legacy language list is empty")]
    Empty,

    /// None of the legacy codes has an RFC 4646 equivalent.
    #[error("unsupported language code: {code}")]
    Unsupported {
        /// First code that could not be mapped.
        code: String,
    },

    /// An entry is neither an ISO 639-2 code nor an RFC 4646 tag.
    #[error("malformed language entry: {entry:?}")]
    Malformed {
        /// The offending entry.
        entry: String,
    },

    /// The first converted tag alone does not fit the destination buffer.
    #[error("language list needs {needed} bytes, buffer holds {capacity}")]
    CapacityExceeded {
        /// Bytes needed including the terminator.
        needed: usize,
        /// Buffer capacity including the terminator.
        capacity: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_display() {
        let e = ConvertError::CapacityExceeded {
            needed: 6,
            capacity: 4,
        };
        assert_eq!(e.to_string(), "language list needs 6 bytes, buffer holds 4");
    }

    #[test]
    fn malformed_display_quotes_entry() {
        let e = ConvertError::Malformed {
            entry: "en_".to_string(),
        };
        assert!(e.to_string().contains("\"en_\""));
    }
}
