//! Builds and publishes one adapter record per legacy handle.

use std::sync::Arc;

use tracing::debug;

use efi_collation::{
    TagConverter, UnicodeCollation, UnicodeCollation2, UnicodeCollation2Protocol,
    UnicodeCollationProtocol,
};
use efi_protocol_db::{Handle, ProtocolDatabase};

use crate::pool::MemoryPool;
use crate::thunk::{Uc2Thunk, UC2_THUNK_TEMPLATE};
use crate::{Result, ThunkError};

/// Produces [`Uc2Thunk`] records and installs them next to the legacy
/// interface they wrap.
pub struct ThunkFactory<P, C> {
    pool: P,
    converter: C,
    language_buffer_size: usize,
}

impl<P: MemoryPool, C: TagConverter> ThunkFactory<P, C> {
    /// Create a factory drawing memory from `pool` and converting language
    /// lists into buffers of `language_buffer_size` bytes.
    pub fn new(pool: P, converter: C, language_buffer_size: usize) -> Self {
        Self {
            pool,
            converter,
            language_buffer_size,
        }
    }

    /// The pool records are drawn from.
    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// Adapt the legacy interface on `handle` and publish the result on the
    /// same handle.
    ///
    /// The caller has already checked that `handle` carries
    /// `UnicodeCollation` and not `UnicodeCollation2`. Nothing is published
    /// unless every step succeeds.
    pub fn adapt<D: ProtocolDatabase>(&self, db: &D, handle: Handle) -> Result<Arc<Uc2Thunk>> {
        let mut pending = self
            .pool
            .allocate_copy(&UC2_THUNK_TEMPLATE)
            .map_err(|source| ThunkError::OutOfResources { handle, source })?;

        let legacy: Arc<dyn UnicodeCollation> = db
            .handle_protocol::<UnicodeCollationProtocol>(handle)
            .map_err(|source| ThunkError::InterfaceVanished { handle, source })?;

        let mut languages = self
            .pool
            .allocate_zero(self.language_buffer_size)
            .map_err(|source| ThunkError::OutOfResources { handle, source })?;
        self.converter
            .convert(legacy.supported_languages(), &mut languages)
            .map_err(|source| ThunkError::LanguageConversion { handle, source })?;
        debug!(
            %handle,
            legacy = legacy.supported_languages(),
            converted = languages.as_str(),
            "converted supported languages"
        );

        pending.attach_legacy(legacy);
        pending.attach_languages(languages);
        let thunk = Arc::new((*pending).seal()?);

        let interface: Arc<dyn UnicodeCollation2> = thunk.clone();
        db.install_protocol::<UnicodeCollation2Protocol>(Some(handle), interface)
            .map_err(|source| ThunkError::PublishFailed { handle, source })?;

        Ok(thunk)
    }
}
