//! Core traits for the protocol database.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Guid, Handle, Result};

/// Names one interface type that can be published on a handle.
///
/// Implementors are zero-sized markers. The interface itself is usually a
/// trait object, e.g. `type Interface = dyn UnicodeCollation;`, and instances
/// are always published as `Arc<Self::Interface>`.
pub trait Protocol: 'static {
    /// Identity used as the registry key.
    const GUID: Guid;

    /// Short name used in logs and errors.
    const NAME: &'static str;

    /// The published interface type.
    type Interface: ?Sized + Send + Sync + 'static;
}

/// Task priority level a notify function runs at.
///
/// Higher levels are dispatched first. A notify function is never interrupted
/// by another one at the same or lower level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tpl {
    /// Ordinary driver callbacks.
    Callback,
    /// Notification-level work that must preempt callbacks.
    Notify,
}

/// Token returned when registering for install notifications of one protocol.
///
/// The database keeps a cursor per registration; see
/// [`ProtocolDatabase::locate_next_registered`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Registration {
    id: u64,
    protocol: Guid,
}

impl Registration {
    /// Create a token. Only databases should need this.
    pub fn new(id: u64, protocol: Guid) -> Self {
        Self { id, protocol }
    }

    /// Database-assigned identifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Protocol this registration watches.
    pub fn protocol(&self) -> Guid {
        self.protocol
    }
}

/// A notify function. Receives the database it was registered with and the
/// registration that was signalled.
pub type NotifyFn<D> = Arc<dyn Fn(&D, &Registration) + Send + Sync>;

/// The handle/protocol registry.
///
/// Drivers are pure clients of this trait. Interfaces are stored and returned
/// as `Arc<P::Interface>`, so a fetched interface stays valid even if the
/// caller outlives the lookup.
pub trait ProtocolDatabase {
    /// Register `notify` to run whenever an instance of `P` is installed.
    ///
    /// The notify function is signalled once right away, so instances that
    /// were installed before the registration are observed as well.
    fn create_protocol_notify<P: Protocol>(
        &self,
        tpl: Tpl,
        notify: NotifyFn<Self>,
    ) -> Result<Registration>;

    /// Return the next handle with the registration's protocol that this
    /// registration has not seen yet.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(handle))` - The next handle, in install order.
    /// * `Ok(None)` - Nothing pending. This is the normal end of a batch.
    /// * `Err(Error)` - The registration is unknown or the database failed.
    fn locate_next_registered(&self, registration: &Registration) -> Result<Option<Handle>>;

    /// Fetch the instance of `P` published on `handle`.
    fn handle_protocol<P: Protocol>(&self, handle: Handle) -> Result<Arc<P::Interface>>;

    /// Publish `interface` as `P` on `handle`, or on a new handle when `None`.
    ///
    /// Returns the handle the interface was installed on.
    fn install_protocol<P: Protocol>(
        &self,
        handle: Option<Handle>,
        interface: Arc<P::Interface>,
    ) -> Result<Handle>;
}
