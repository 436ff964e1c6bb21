//! Unicode Collation: the string services firmware file-system drivers rely on.
//!
//! Two revisions of the same service exist side by side:
//! - [`UnicodeCollation`]: the EFI 1.10 revision, languages as concatenated
//!   ISO 639-2 codes (`"engfra"`)
//! - [`UnicodeCollation2`]: the UEFI 2.x revision, languages as an RFC 4646
//!   list (`"en-US;fr"`)
//!
//! The operations are identical; only the language list format differs. The
//! [`language`] module converts between the two formats.
//!
//! # Example
//!
//! ```rust
//! use efi_collation::{Iso639ToRfc4646, LanguageBuffer, TagConverter, RFC_4646_ENTRY_SIZE};
//!
//! let mut languages = LanguageBuffer::with_capacity(RFC_4646_ENTRY_SIZE);
//! Iso639ToRfc4646.convert("engfra", &mut languages).unwrap();
//! assert_eq!(languages.as_str(), "en-US;fr");
//! ```

mod error;
pub mod language;
mod protocol;

pub use error::ConvertError;
pub use language::{
    Iso639ToRfc4646, LanguageBuffer, TagConverter, ISO_639_2_ENTRY_SIZE, RFC_4646_ENTRY_SIZE,
};
pub use protocol::{
    UnicodeCollation, UnicodeCollation2, UnicodeCollation2Protocol, UnicodeCollationProtocol,
};

// Re-export the registry types drivers need alongside the protocols
pub use efi_protocol_db::{Guid, Protocol};
