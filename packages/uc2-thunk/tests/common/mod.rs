//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use efi_collation::{
    LanguageBuffer, UnicodeCollation, UnicodeCollation2, UnicodeCollation2Protocol,
    UnicodeCollationProtocol,
};
use efi_protocol_db::{
    Error, Handle, InMemoryProtocolDatabase, NotifyFn, Protocol, ProtocolDatabase, Registration,
    Result, Tpl,
};
use efi_uc2_thunk::{MemoryPool, PoolError, SystemPool};

/// ASCII collation that records every call it receives.
pub struct AsciiCollation {
    languages: &'static str,
    calls: Mutex<Vec<&'static str>>,
}

impl AsciiCollation {
    pub fn new(languages: &'static str) -> Self {
        Self {
            languages,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

fn lower(c: u16) -> u16 {
    if (u16::from(b'A')..=u16::from(b'Z')).contains(&c) {
        c + 32
    } else {
        c
    }
}

fn upper(c: u16) -> u16 {
    if (u16::from(b'a')..=u16::from(b'z')).contains(&c) {
        c - 32
    } else {
        c
    }
}

fn glob(string: &[u16], pattern: &[u16]) -> bool {
    match pattern.split_first() {
        None => string.is_empty(),
        Some((&p, rest)) if p == u16::from(b'*') => {
            (0..=string.len()).any(|skip| glob(&string[skip..], rest))
        }
        Some((&p, rest)) => match string.split_first() {
            Some((&c, tail)) => {
                (p == u16::from(b'?') || lower(p) == lower(c)) && glob(tail, rest)
            }
            None => false,
        },
    }
}

impl UnicodeCollation for AsciiCollation {
    fn stri_coll(&self, s1: &[u16], s2: &[u16]) -> isize {
        self.record("stri_coll");
        let a = s1.iter().map(|c| lower(*c));
        let b = s2.iter().map(|c| lower(*c));
        match a.cmp(b) {
            std::cmp::Ordering::Less => -1,
            std::cmp::Ordering::Equal => 0,
            std::cmp::Ordering::Greater => 1,
        }
    }

    fn metai_match(&self, string: &[u16], pattern: &[u16]) -> bool {
        self.record("metai_match");
        glob(string, pattern)
    }

    fn str_lwr(&self, string: &mut [u16]) {
        self.record("str_lwr");
        string.iter_mut().for_each(|c| *c = lower(*c));
    }

    fn str_upr(&self, string: &mut [u16]) {
        self.record("str_upr");
        string.iter_mut().for_each(|c| *c = upper(*c));
    }

    fn fat_to_str(&self, fat: &[u8], string: &mut [u16]) {
        self.record("fat_to_str");
        for (out, byte) in string.iter_mut().zip(fat) {
            *out = u16::from(*byte);
        }
    }

    fn str_to_fat(&self, string: &[u16], fat: &mut [u8]) -> bool {
        self.record("str_to_fat");
        let mut substituted = false;
        for (out, c) in fat.iter_mut().zip(string) {
            *out = match u8::try_from(upper(*c)) {
                Ok(byte) if byte.is_ascii_graphic() => byte,
                _ => {
                    substituted = true;
                    b'_'
                }
            };
        }
        substituted
    }

    fn supported_languages(&self) -> &str {
        self.record("supported_languages");
        self.languages
    }
}

/// A native Unicode Collation 2 implementation.
pub struct Native(pub &'static str);

impl UnicodeCollation2 for Native {
    fn stri_coll(&self, _s1: &[u16], _s2: &[u16]) -> isize {
        0
    }

    fn metai_match(&self, _string: &[u16], _pattern: &[u16]) -> bool {
        false
    }

    fn str_lwr(&self, _string: &mut [u16]) {}

    fn str_upr(&self, _string: &mut [u16]) {}

    fn fat_to_str(&self, _fat: &[u8], _string: &mut [u16]) {}

    fn str_to_fat(&self, _string: &[u16], _fat: &mut [u8]) -> bool {
        false
    }

    fn supported_languages(&self) -> &str {
        self.0
    }
}

pub fn utf16(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

pub fn install_legacy(db: &impl ProtocolDatabase, collation: Arc<AsciiCollation>) -> Handle {
    db.install_protocol::<UnicodeCollationProtocol>(None, collation)
        .unwrap()
}

pub fn silent() -> NotifyFn<InMemoryProtocolDatabase> {
    Arc::new(|_: &InMemoryProtocolDatabase, _: &Registration| {})
}

/// Pool whose first `failures` buffer allocations fail.
pub struct FlakyPool {
    failures: AtomicUsize,
}

impl FlakyPool {
    pub fn new(failures: usize) -> Self {
        Self {
            failures: AtomicUsize::new(failures),
        }
    }
}

impl MemoryPool for FlakyPool {
    fn allocate_copy<T: Clone>(&self, template: &T) -> std::result::Result<Box<T>, PoolError> {
        SystemPool.allocate_copy(template)
    }

    fn allocate_zero(&self, size: usize) -> std::result::Result<LanguageBuffer, PoolError> {
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(PoolError::Exhausted {
                requested: size,
                available: 0,
            });
        }
        SystemPool.allocate_zero(size)
    }
}

/// Database that misbehaves on chosen handles.
///
/// Notify registration is refused outright; tests drive the listener by hand
/// with a registration taken from [`FaultyDatabase::inner`].
#[derive(Default)]
pub struct FaultyDatabase {
    pub inner: InMemoryProtocolDatabase,
    vanished: Mutex<Vec<Handle>>,
    refuse_publish: Mutex<Vec<Handle>>,
}

impl FaultyDatabase {
    /// Make the legacy interface on `handle` unreadable.
    pub fn vanish(&self, handle: Handle) {
        self.vanished.lock().unwrap().push(handle);
    }

    /// Refuse Unicode Collation 2 installs on `handle`.
    pub fn refuse_publish(&self, handle: Handle) {
        self.refuse_publish.lock().unwrap().push(handle);
    }

    pub fn registration(&self) -> Registration {
        self.inner
            .create_protocol_notify::<UnicodeCollationProtocol>(Tpl::Callback, silent())
            .unwrap()
    }
}

impl ProtocolDatabase for FaultyDatabase {
    fn create_protocol_notify<P: Protocol>(
        &self,
        _tpl: Tpl,
        _notify: NotifyFn<Self>,
    ) -> Result<Registration> {
        Err(Error::OutOfResources)
    }

    fn locate_next_registered(&self, registration: &Registration) -> Result<Option<Handle>> {
        self.inner.locate_next_registered(registration)
    }

    fn handle_protocol<P: Protocol>(&self, handle: Handle) -> Result<Arc<P::Interface>> {
        if P::GUID == UnicodeCollationProtocol::GUID
            && self.vanished.lock().unwrap().contains(&handle)
        {
            return Err(Error::Unsupported { protocol: P::NAME });
        }
        self.inner.handle_protocol::<P>(handle)
    }

    fn install_protocol<P: Protocol>(
        &self,
        handle: Option<Handle>,
        interface: Arc<P::Interface>,
    ) -> Result<Handle> {
        let refused = handle.is_some_and(|h| self.refuse_publish.lock().unwrap().contains(&h));
        if P::GUID == UnicodeCollation2Protocol::GUID && refused {
            return Err(Error::OutOfResources);
        }
        self.inner.install_protocol::<P>(handle, interface)
    }
}
