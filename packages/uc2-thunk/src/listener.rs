//! Discovery listener: reacts to new Unicode Collation installs.

use std::sync::{Arc, Mutex};

use tracing::{debug, error, info, warn};

use efi_collation::{TagConverter, UnicodeCollation2, UnicodeCollation2Protocol};
use efi_protocol_db::{Handle, ProtocolDatabase, Registration};

use crate::factory::ThunkFactory;
use crate::pool::MemoryPool;
use crate::thunk::Uc2Thunk;
use crate::{Result, ThunkError};

/// What happened to one handle during a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A new adapter was published on the handle.
    Adapted,
    /// The handle already had Unicode Collation 2, native or adapted.
    AlreadyPresent,
    /// The handle was abandoned.
    Failed(ThunkError),
}

/// Result of one listener run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Handles in the order they were reported.
    pub handles: Vec<(Handle, Outcome)>,
    /// Set when enumeration itself failed and the batch stopped early.
    pub enumeration_error: Option<efi_protocol_db::Error>,
}

impl BatchReport {
    /// Handles that received a new adapter.
    pub fn adapted(&self) -> impl Iterator<Item = Handle> + '_ {
        self.handles
            .iter()
            .filter(|(_, outcome)| *outcome == Outcome::Adapted)
            .map(|(handle, _)| *handle)
    }

    /// Handles skipped because they already had the new interface.
    pub fn already_present(&self) -> impl Iterator<Item = Handle> + '_ {
        self.handles
            .iter()
            .filter(|(_, outcome)| *outcome == Outcome::AlreadyPresent)
            .map(|(handle, _)| *handle)
    }

    /// Handles that were abandoned, with the reason.
    pub fn failed(&self) -> impl Iterator<Item = (Handle, &ThunkError)> + '_ {
        self.handles.iter().filter_map(|(handle, outcome)| match outcome {
            Outcome::Failed(e) => Some((*handle, e)),
            _ => None,
        })
    }

    /// Whether the run saw no handles at all.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Drains newly installed Unicode Collation handles and adapts each one.
///
/// Each run is independent: handles that already carry Unicode Collation 2
/// are skipped, so running twice never produces a second adapter.
pub struct Uc2Listener<P, C> {
    factory: ThunkFactory<P, C>,
    allocation_retries: u32,
    last_report: Mutex<Option<BatchReport>>,
}

impl<P: MemoryPool, C: TagConverter> Uc2Listener<P, C> {
    /// Create a listener. Out-of-resources failures are retried
    /// `allocation_retries` times per handle.
    pub fn new(factory: ThunkFactory<P, C>, allocation_retries: u32) -> Self {
        Self {
            factory,
            allocation_retries,
            last_report: Mutex::new(None),
        }
    }

    /// The factory adapters are built with.
    pub fn factory(&self) -> &ThunkFactory<P, C> {
        &self.factory
    }

    /// Report of the most recent run, if any.
    pub fn last_report(&self) -> Option<BatchReport> {
        self.last_report
            .lock()
            .ok()
            .and_then(|report| report.clone())
    }

    /// Handle one notification: adapt every handle `registration` has not
    /// reported yet. Never fails; problems are logged and recorded.
    pub fn on_notify<D: ProtocolDatabase>(
        &self,
        db: &D,
        registration: &Registration,
    ) -> BatchReport {
        let mut report = BatchReport::default();

        loop {
            let handle = match db.locate_next_registered(registration) {
                Ok(Some(handle)) => handle,
                Ok(None) => break,
                Err(e) => {
                    error!(error = %e, "cannot enumerate UnicodeCollation handles");
                    report.enumeration_error = Some(e);
                    break;
                }
            };

            if db.handle_protocol::<UnicodeCollation2Protocol>(handle).is_ok() {
                debug!(%handle, "UnicodeCollation2 already present");
                report.handles.push((handle, Outcome::AlreadyPresent));
                continue;
            }

            let outcome = match self.adapt(db, handle) {
                Ok(thunk) => {
                    info!(
                        %handle,
                        languages = thunk.supported_languages(),
                        "published UnicodeCollation2"
                    );
                    Outcome::Adapted
                }
                Err(e) => {
                    log_abandoned(handle, &e);
                    Outcome::Failed(e)
                }
            };
            report.handles.push((handle, outcome));
        }

        if let Ok(mut last) = self.last_report.lock() {
            *last = Some(report.clone());
        }
        report
    }

    fn adapt<D: ProtocolDatabase>(&self, db: &D, handle: Handle) -> Result<Arc<Uc2Thunk>> {
        let mut attempt = 0;
        loop {
            match self.factory.adapt(db, handle) {
                Err(e) if e.is_retryable() && attempt < self.allocation_retries => {
                    attempt += 1;
                    debug!(%handle, attempt, error = %e, "retrying after allocation failure");
                }
                result => return result,
            }
        }
    }
}

fn log_abandoned(handle: Handle, e: &ThunkError) {
    if e.is_platform_race() || e.is_defect() {
        error!(%handle, error = %e, "abandoned UnicodeCollation handle");
    } else if e.is_retryable() {
        debug!(%handle, error = %e, "skipped UnicodeCollation handle");
    } else {
        warn!(%handle, error = %e, "UnicodeCollation handle left without UnicodeCollation2");
    }
}
