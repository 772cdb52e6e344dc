//! Host capabilities: the allocator and math routines the core runs on
//!
//! Embedded hosts often bring their own heap accounting and their own
//! floating point routines. Instead of swapping those in at build time, every
//! font and rasterizer receives a [`Host`] when it is constructed and draws
//! on nothing else. The defaults ([`SystemAllocator`] and
//! [`StdMath`]) simply forward to the Rust standard library.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{Result, TtError};

/// A size-parameterized allocate/free pair
///
/// The core still stores its working data in ordinary `Vec`s; the host
/// decides whether a request of `bytes` may proceed and is told when that
/// memory is given back. Every successful `allocate` is matched by exactly
/// one `free` of the same size.
///
/// Charges cover the working set of a single call. Results handed back to
/// the caller, such as a decoded outline or a finished coverage bitmap, are
/// freed from the host's point of view when that call returns.
pub trait HostAllocator: Send + Sync {
    /// Reserve `bytes`, or refuse with [`TtError::AllocationFailed`]
    fn allocate(&self, bytes: usize) -> Result<()>;

    /// Return `bytes` previously reserved with [`HostAllocator::allocate`]
    fn free(&self, bytes: usize);
}

/// Unlimited allocator backed by the global heap
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAllocator;

impl HostAllocator for SystemAllocator {
    fn allocate(&self, _bytes: usize) -> Result<()> {
        Ok(())
    }

    fn free(&self, _bytes: usize) {}
}

/// Allocator with a fixed byte budget
///
/// Useful for constrained environments: a rasterization whose working set
/// would exceed the budget fails with [`TtError::AllocationFailed`] instead
/// of growing the heap.
#[derive(Debug)]
pub struct BudgetAllocator {
    budget: usize,
    in_use: AtomicUsize,
}

impl BudgetAllocator {
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            in_use: AtomicUsize::new(0),
        }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Bytes currently reserved
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Acquire)
    }
}

impl HostAllocator for BudgetAllocator {
    fn allocate(&self, bytes: usize) -> Result<()> {
        self.in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(bytes).filter(|&total| total <= self.budget)
            })
            .map(|_| ())
            .map_err(|_| TtError::AllocationFailed { bytes })
    }

    fn free(&self, bytes: usize) {
        let _ = self
            .in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                Some(used.saturating_sub(bytes))
            });
    }
}

/// Floating point primitives the core relies on
///
/// Only the operations the core actually performs are listed. String
/// length and memory copy/fill are plain slice operations in Rust and need
/// no indirection.
pub trait HostMath: Send + Sync {
    fn floor(&self, x: f32) -> f32;
    fn ceil(&self, x: f32) -> f32;
    fn sqrt(&self, x: f32) -> f32;
    fn pow(&self, x: f32, y: f32) -> f32;
    fn fmod(&self, x: f32, y: f32) -> f32;
    fn fabs(&self, x: f32) -> f32;

    /// Round to the nearest integer, ties to even
    ///
    /// Built on `floor` and `fmod` so hosts only have to supply the
    /// primitives.
    fn round_half_even(&self, x: f32) -> f32 {
        let lower = self.floor(x);
        let diff = x - lower;
        if diff > 0.5 {
            lower + 1.0
        } else if diff < 0.5 {
            lower
        } else if self.fmod(lower, 2.0) == 0.0 {
            lower
        } else {
            lower + 1.0
        }
    }
}

/// [`HostMath`] backed by the `f32` inherent methods
#[derive(Debug, Default, Clone, Copy)]
pub struct StdMath;

impl HostMath for StdMath {
    #[inline]
    fn floor(&self, x: f32) -> f32 {
        x.floor()
    }

    #[inline]
    fn ceil(&self, x: f32) -> f32 {
        x.ceil()
    }

    #[inline]
    fn sqrt(&self, x: f32) -> f32 {
        x.sqrt()
    }

    #[inline]
    fn pow(&self, x: f32, y: f32) -> f32 {
        x.powf(y)
    }

    #[inline]
    fn fmod(&self, x: f32, y: f32) -> f32 {
        x % y
    }

    #[inline]
    fn fabs(&self, x: f32) -> f32 {
        x.abs()
    }
}

/// The capability set handed to fonts and rasterizers
#[derive(Clone)]
pub struct Host {
    allocator: Arc<dyn HostAllocator>,
    math: Arc<dyn HostMath>,
}

impl Host {
    pub fn new(allocator: Arc<dyn HostAllocator>, math: Arc<dyn HostMath>) -> Self {
        Self { allocator, math }
    }

    /// Default math with a custom allocator
    pub fn with_allocator(allocator: Arc<dyn HostAllocator>) -> Self {
        Self {
            allocator,
            math: Arc::new(StdMath),
        }
    }

    pub fn math(&self) -> &dyn HostMath {
        self.math.as_ref()
    }

    pub fn allocator(&self) -> &dyn HostAllocator {
        self.allocator.as_ref()
    }

    /// Reserve `bytes`, released again when the returned guard drops
    pub fn charge(&self, bytes: usize) -> Result<Allocation> {
        self.allocator.allocate(bytes)?;
        Ok(Allocation {
            allocator: Arc::clone(&self.allocator),
            bytes,
        })
    }

    /// Reserve room for `count` values of `T`
    pub fn charge_for<T>(&self, count: usize) -> Result<Allocation> {
        let bytes = count
            .checked_mul(std::mem::size_of::<T>())
            .ok_or(TtError::AllocationFailed { bytes: usize::MAX })?;
        self.charge(bytes)
    }
}

impl Default for Host {
    fn default() -> Self {
        Self {
            allocator: Arc::new(SystemAllocator),
            math: Arc::new(StdMath),
        }
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host").finish_non_exhaustive()
    }
}

/// RAII guard for memory reserved through a [`Host`]
#[must_use = "dropping the guard releases the reservation immediately"]
pub struct Allocation {
    allocator: Arc<dyn HostAllocator>,
    bytes: usize,
}

impl Allocation {
    pub fn bytes(&self) -> usize {
        self.bytes
    }
}

impl Drop for Allocation {
    fn drop(&mut self) {
        self.allocator.free(self.bytes);
    }
}

impl fmt::Debug for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Allocation")
            .field("bytes", &self.bytes)
            .finish()
    }
}
