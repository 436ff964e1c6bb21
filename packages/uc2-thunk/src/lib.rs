//! Publishes Unicode Collation 2 on every handle that only offers the legacy
//! Unicode Collation interface.
//!
//! Older file-system drivers install the EFI 1.10 revision, while newer
//! consumers only look for the UEFI 2.x one. This driver watches for legacy
//! installs and places an adapter next to each of them:
//!
//! - [`Uc2ThunkDriver`] registers for installs and owns the registration
//! - [`Uc2Listener`] drains pending handles and skips those already served
//! - [`ThunkFactory`] builds a [`Uc2Thunk`] and publishes it on the handle
//!
//! The adapter forwards every collation operation unchanged and reports the
//! legacy language list converted to RFC 4646.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use efi_collation::{UnicodeCollation, UnicodeCollation2Protocol, UnicodeCollationProtocol};
//! use efi_protocol_db::{InMemoryProtocolDatabase, ProtocolDatabase};
//! use efi_uc2_thunk::{ThunkConfig, Uc2ThunkDriver};
//!
//! struct English;
//!
//! impl UnicodeCollation for English {
//!     fn stri_coll(&self, _: &[u16], _: &[u16]) -> isize { 0 }
//!     fn metai_match(&self, _: &[u16], _: &[u16]) -> bool { false }
//!     fn str_lwr(&self, _: &mut [u16]) {}
//!     fn str_upr(&self, _: &mut [u16]) {}
//!     fn fat_to_str(&self, _: &[u8], _: &mut [u16]) {}
//!     fn str_to_fat(&self, _: &[u16], _: &mut [u8]) -> bool { false }
//!     fn supported_languages(&self) -> &str { "eng" }
//! }
//!
//! let db = InMemoryProtocolDatabase::new();
//! let _driver = Uc2ThunkDriver::initialize(&db, &ThunkConfig::default()).unwrap();
//!
//! let handle = db
//!     .install_protocol::<UnicodeCollationProtocol>(None, Arc::new(English))
//!     .unwrap();
//! let uc2 = db.handle_protocol::<UnicodeCollation2Protocol>(handle).unwrap();
//! assert_eq!(uc2.supported_languages(), "en-US");
//! ```

mod config;
mod driver;
mod error;
mod factory;
mod listener;
mod pool;
mod thunk;

pub use config::{ThunkConfig, MAX_ALLOCATION_RETRIES, MIN_LANGUAGE_BUFFER_SIZE};
pub use driver::Uc2ThunkDriver;
pub use error::{ConfigError, Result, ThunkError};
pub use factory::ThunkFactory;
pub use listener::{BatchReport, Outcome, Uc2Listener};
pub use pool::{BoundedPool, MemoryPool, PoolError, SystemPool};
pub use thunk::{signature_32, PendingThunk, Uc2Thunk, UC2_THUNK_SIGNATURE, UC2_THUNK_TEMPLATE};
