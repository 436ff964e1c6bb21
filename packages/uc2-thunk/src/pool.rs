//! Memory pools the adapter records and language buffers are drawn from.
//!
//! Nothing allocated here is handed back: adapter records live for the rest
//! of the platform session.

use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;

use efi_collation::LanguageBuffer;

/// Allocation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// Not enough memory left for the request.
    #[error("pool exhausted: requested {requested} bytes, {available} available")]
    Exhausted { requested: usize, available: usize },
}

/// Source of memory for the thunk.
pub trait MemoryPool: Send + Sync {
    /// Allocate a copy of `template`.
    fn allocate_copy<T: Clone>(&self, template: &T) -> Result<Box<T>, PoolError>;

    /// Allocate a zero-filled language buffer of `size` bytes.
    fn allocate_zero(&self, size: usize) -> Result<LanguageBuffer, PoolError>;
}

/// The global allocator.
///
/// Record allocation goes through `Box::new`, which aborts on exhaustion in
/// stable Rust; buffer allocation uses `try_reserve_exact` and reports it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPool;

impl MemoryPool for SystemPool {
    fn allocate_copy<T: Clone>(&self, template: &T) -> Result<Box<T>, PoolError> {
        Ok(Box::new(template.clone()))
    }

    fn allocate_zero(&self, size: usize) -> Result<LanguageBuffer, PoolError> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(size)
            .map_err(|_| PoolError::Exhausted {
                requested: size,
                available: 0,
            })?;
        bytes.resize(size, 0);
        Ok(LanguageBuffer::from_zeroed(bytes))
    }
}

/// A pool with a fixed byte budget, for constrained platforms and tests.
///
/// Each allocation is charged against the budget and never refunded.
#[derive(Debug)]
pub struct BoundedPool {
    remaining: AtomicUsize,
}

impl BoundedPool {
    /// Create a pool holding `budget` bytes.
    pub fn new(budget: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(budget),
        }
    }

    /// Bytes still available.
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::SeqCst)
    }

    fn charge(&self, requested: usize) -> Result<(), PoolError> {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |available| {
                available.checked_sub(requested)
            })
            .map(|_| ())
            .map_err(|available| PoolError::Exhausted {
                requested,
                available,
            })
    }
}

impl MemoryPool for BoundedPool {
    fn allocate_copy<T: Clone>(&self, template: &T) -> Result<Box<T>, PoolError> {
        self.charge(std::mem::size_of::<T>())?;
        SystemPool.allocate_copy(template)
    }

    fn allocate_zero(&self, size: usize) -> Result<LanguageBuffer, PoolError> {
        self.charge(size)?;
        SystemPool.allocate_zero(size)
    }
}
