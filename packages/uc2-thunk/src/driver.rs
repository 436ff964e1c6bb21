//! Driver entry point.

use std::sync::Arc;

use tracing::info;

use efi_collation::{Iso639ToRfc4646, TagConverter, UnicodeCollationProtocol};
use efi_protocol_db::{ProtocolDatabase, Registration};

use crate::config::ThunkConfig;
use crate::factory::ThunkFactory;
use crate::listener::{BatchReport, Uc2Listener};
use crate::pool::{MemoryPool, SystemPool};
use crate::{Result, ThunkError};

/// A loaded thunk driver.
///
/// Holds the install registration for as long as the driver lives. The
/// database keeps its own reference to the listener, so dropping the driver
/// does not stop adapters from being published.
pub struct Uc2ThunkDriver<P, C> {
    listener: Arc<Uc2Listener<P, C>>,
    registration: Registration,
}

impl Uc2ThunkDriver<SystemPool, Iso639ToRfc4646> {
    /// Load the driver with the global allocator and the standard converter.
    ///
    /// Handles installed before this call are adapted before it returns, as
    /// are any installed later.
    ///
    /// # Errors
    ///
    /// * [`ThunkError::Config`] - `config` failed validation.
    /// * [`ThunkError::Registration`] - The database refused the notify.
    pub fn initialize<D>(db: &D, config: &ThunkConfig) -> Result<Self>
    where
        D: ProtocolDatabase + 'static,
    {
        config.validate()?;
        let factory =
            ThunkFactory::new(SystemPool, Iso639ToRfc4646, config.language_buffer_size);
        let listener = Uc2Listener::new(factory, config.allocation_retries);
        Self::with_listener(db, config, listener)
    }
}

impl<P, C> Uc2ThunkDriver<P, C>
where
    P: MemoryPool + 'static,
    C: TagConverter + 'static,
{
    /// Load the driver around a caller-built listener.
    ///
    /// Only `config.notify_tpl` is read here; the listener carries the rest.
    pub fn with_listener<D>(
        db: &D,
        config: &ThunkConfig,
        listener: Uc2Listener<P, C>,
    ) -> Result<Self>
    where
        D: ProtocolDatabase + 'static,
    {
        let listener = Arc::new(listener);
        let notify_listener = Arc::clone(&listener);
        let registration = db
            .create_protocol_notify::<UnicodeCollationProtocol>(
                config.notify_tpl,
                Arc::new(move |db: &D, registration: &Registration| {
                    notify_listener.on_notify(db, registration);
                }),
            )
            .map_err(ThunkError::Registration)?;

        info!(
            registration = registration.id(),
            tpl = ?config.notify_tpl,
            "UnicodeCollation2 thunk loaded"
        );
        Ok(Self {
            listener,
            registration,
        })
    }

    /// The install registration.
    pub fn registration(&self) -> &Registration {
        &self.registration
    }

    /// The listener registered for installs.
    pub fn listener(&self) -> &Uc2Listener<P, C> {
        &self.listener
    }

    /// Report of the most recent listener run.
    pub fn last_report(&self) -> Option<BatchReport> {
        self.listener.last_report()
    }
}
