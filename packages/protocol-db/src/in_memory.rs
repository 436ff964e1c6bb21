//! In-memory protocol database.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, trace};

use crate::{Error, Guid, Handle, NotifyFn, Protocol, ProtocolDatabase, Registration, Result, Tpl};

type Interface = Box<dyn Any + Send + Sync>;

struct RegistrationState {
    protocol: Guid,
    tpl: Tpl,
    /// Index into the protocol's install history of the next handle to report.
    position: usize,
    notify: NotifyFn<InMemoryProtocolDatabase>,
}

#[derive(Default)]
struct Inner {
    handles: HashMap<Handle, HashMap<Guid, Interface>>,
    history: HashMap<Guid, Vec<Handle>>,
    registrations: HashMap<u64, RegistrationState>,
    next_registration: u64,
    signaled: Vec<u64>,
    dispatching: bool,
}

impl Inner {
    fn signal(&mut self, id: u64) {
        if !self.signaled.contains(&id) {
            self.signaled.push(id);
        }
    }

    /// Highest TPL first, then signal order.
    fn next_signaled(&mut self) -> Option<(Registration, NotifyFn<InMemoryProtocolDatabase>)> {
        let registrations = &self.registrations;
        let (index, _) = self
            .signaled
            .iter()
            .enumerate()
            .filter_map(|(index, id)| registrations.get(id).map(|state| (index, state.tpl)))
            .min_by_key(|(index, tpl)| (std::cmp::Reverse(*tpl), *index))?;
        let id = self.signaled.remove(index);
        let state = self.registrations.get(&id)?;
        Some((Registration::new(id, state.protocol), Arc::clone(&state.notify)))
    }
}

/// A protocol database held entirely in memory.
///
/// Notify functions are dispatched synchronously: `install_protocol` and
/// `create_protocol_notify` run every signalled notify function before they
/// return, unless they are themselves called from inside a notify function,
/// in which case the work is queued behind the running one.
///
/// # Example
///
/// ```rust
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use efi_protocol_db::{
///     Guid, InMemoryProtocolDatabase, Protocol, ProtocolDatabase, Registration, Tpl,
/// };
///
/// struct Marker;
///
/// impl Protocol for Marker {
///     const GUID: Guid = Guid::from_u128(0x42);
///     const NAME: &'static str = "Marker";
///     type Interface = u32;
/// }
///
/// let db = InMemoryProtocolDatabase::new();
/// let seen = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&seen);
/// db.create_protocol_notify::<Marker>(
///     Tpl::Callback,
///     Arc::new(move |db: &InMemoryProtocolDatabase, registration: &Registration| {
///         while let Ok(Some(_)) = db.locate_next_registered(registration) {
///             counter.fetch_add(1, Ordering::SeqCst);
///         }
///     }),
/// )
/// .unwrap();
///
/// db.install_protocol::<Marker>(None, Arc::new(7)).unwrap();
/// assert_eq!(seen.load(Ordering::SeqCst), 1);
/// ```
#[derive(Default)]
pub struct InMemoryProtocolDatabase {
    inner: Mutex<Inner>,
}

impl InMemoryProtocolDatabase {
    /// Create an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| Error::Poisoned)
    }

    /// Mark a registration as signalled. Its notify function runs on the next
    /// [`dispatch`](Self::dispatch).
    pub fn signal(&self, registration: &Registration) -> Result<()> {
        let mut inner = self.lock()?;
        if !inner.registrations.contains_key(&registration.id()) {
            return Err(Error::NotFound);
        }
        inner.signal(registration.id());
        Ok(())
    }

    /// Run every signalled notify function until none are left.
    ///
    /// Calls made while a notify function is running return immediately; the
    /// outer dispatch picks up whatever they queued.
    pub fn dispatch(&self) -> Result<()> {
        {
            let mut inner = self.lock()?;
            if inner.dispatching {
                return Ok(());
            }
            inner.dispatching = true;
        }
        let _dispatching = DispatchGuard(self);

        loop {
            let next = self.lock()?.next_signaled();
            let Some((registration, notify)) = next else {
                break;
            };
            trace!(registration = registration.id(), protocol = %registration.protocol(), "dispatching notify");
            notify(self, &registration);
        }
        Ok(())
    }

    /// Protocols currently installed on `handle`.
    pub fn protocols_on(&self, handle: Handle) -> Result<Vec<Guid>> {
        let inner = self.lock()?;
        let protocols = inner
            .handles
            .get(&handle)
            .ok_or(Error::InvalidHandle(handle))?;
        let mut guids: Vec<Guid> = protocols.keys().copied().collect();
        guids.sort();
        Ok(guids)
    }

    /// Every handle carrying `P`, in install order.
    pub fn handles_with<P: Protocol>(&self) -> Result<Vec<Handle>> {
        let inner = self.lock()?;
        Ok(inner
            .history
            .get(&P::GUID)
            .map(|handles| {
                handles
                    .iter()
                    .filter(|handle| {
                        inner
                            .handles
                            .get(*handle)
                            .is_some_and(|protocols| protocols.contains_key(&P::GUID))
                    })
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Clears the dispatching flag however the dispatch loop is left, including
/// by a panicking notify function.
struct DispatchGuard<'a>(&'a InMemoryProtocolDatabase);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.0.inner.lock() {
            inner.dispatching = false;
        }
    }
}

impl ProtocolDatabase for InMemoryProtocolDatabase {
    fn create_protocol_notify<P: Protocol>(
        &self,
        tpl: Tpl,
        notify: NotifyFn<Self>,
    ) -> Result<Registration> {
        let (registration, dispatch) = {
            let mut inner = self.lock()?;
            let id = inner.next_registration;
            inner.next_registration = id.checked_add(1).ok_or(Error::OutOfResources)?;
            inner.registrations.insert(
                id,
                RegistrationState {
                    protocol: P::GUID,
                    tpl,
                    position: 0,
                    notify,
                },
            );
            inner.signal(id);
            (Registration::new(id, P::GUID), !inner.dispatching)
        };

        debug!(protocol = P::NAME, registration = registration.id(), ?tpl, "registered protocol notify");
        if dispatch {
            self.dispatch()?;
        }
        Ok(registration)
    }

    fn locate_next_registered(&self, registration: &Registration) -> Result<Option<Handle>> {
        let mut inner = self.lock()?;
        let Inner {
            handles,
            history,
            registrations,
            ..
        } = &mut *inner;

        let state = registrations
            .get_mut(&registration.id())
            .ok_or(Error::NotFound)?;
        let Some(installed) = history.get(&state.protocol) else {
            return Ok(None);
        };

        while let Some(handle) = installed.get(state.position).copied() {
            state.position += 1;
            let still_installed = handles
                .get(&handle)
                .is_some_and(|protocols| protocols.contains_key(&state.protocol));
            if still_installed {
                return Ok(Some(handle));
            }
        }
        Ok(None)
    }

    fn handle_protocol<P: Protocol>(&self, handle: Handle) -> Result<Arc<P::Interface>> {
        let inner = self.lock()?;
        let protocols = inner
            .handles
            .get(&handle)
            .ok_or(Error::InvalidHandle(handle))?;
        protocols
            .get(&P::GUID)
            .and_then(|interface| interface.downcast_ref::<Arc<P::Interface>>())
            .map(Arc::clone)
            .ok_or(Error::Unsupported { protocol: P::NAME })
    }

    fn install_protocol<P: Protocol>(
        &self,
        handle: Option<Handle>,
        interface: Arc<P::Interface>,
    ) -> Result<Handle> {
        let (handle, dispatch) = {
            let mut inner = self.lock()?;
            let handle = match handle {
                Some(handle) if !inner.handles.contains_key(&handle) => {
                    return Err(Error::InvalidHandle(handle));
                }
                Some(handle) => handle,
                None => {
                    let handle = Handle::new();
                    inner.handles.insert(handle, HashMap::new());
                    handle
                }
            };

            let protocols = inner
                .handles
                .get_mut(&handle)
                .ok_or(Error::InvalidHandle(handle))?;
            if protocols.contains_key(&P::GUID) {
                return Err(Error::AlreadyStarted {
                    protocol: P::NAME,
                    guid: P::GUID,
                    handle,
                });
            }
            protocols.insert(P::GUID, Box::new(interface));
            inner.history.entry(P::GUID).or_default().push(handle);

            let watching: Vec<u64> = inner
                .registrations
                .iter()
                .filter(|(_, state)| state.protocol == P::GUID)
                .map(|(id, _)| *id)
                .collect();
            for id in watching {
                inner.signal(id);
            }
            (handle, !inner.dispatching)
        };

        debug!(protocol = P::NAME, %handle, "installed protocol interface");
        if dispatch {
            self.dispatch()?;
        }
        Ok(handle)
    }
}
