// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 amp-core contributors
//
// Counting semaphore via compare-and-swap on a shared count word. Not a
// mutex: nothing binds count to an owner, and post without a prior wait is
// the normal way to signal.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::arena::{barrier, Handle, SharedArena};
use crate::error::{AmpError, Result};
use crate::platform::Platform;
use crate::timed_wait::wait_bounded;

#[repr(C)]
struct Control {
    count: AtomicU32,
    max_count: u32,
}

/// Counting semaphore allocated from a [`SharedArena`].
pub struct Semaphore<'p, P: Platform> {
    platform: &'p P,
    handle: Handle,
}

impl<'p, P: Platform> Semaphore<'p, P> {
    /// Allocate and initialize a semaphore with `initial <= max` and
    /// `max != 0`.
    pub fn create(arena: &SharedArena, platform: &'p P, initial: u32, max: u32) -> Result<Self> {
        if max == 0 || initial > max {
            return Err(AmpError::InvalidArgument);
        }
        let handle = arena.alloc(core::mem::size_of::<Control>())?;
        unsafe {
            core::ptr::write(
                handle.addr() as *mut Control,
                Control {
                    count: AtomicU32::new(initial),
                    max_count: max,
                },
            );
        }
        Ok(Self { platform, handle })
    }

    /// No-op: the arena never reclaims (see [`SharedArena::free`]).
    pub fn destroy(self) {}

    fn ctrl(&self) -> &Control {
        unsafe { &*(self.handle.addr() as *const Control) }
    }

    /// Decrement if `count > 0`, else return `Unavailable`.
    pub fn try_wait(&self) -> Result<()> {
        let ctrl = self.ctrl();
        loop {
            let current = ctrl.count.load(Ordering::Acquire);
            if current == 0 {
                return Err(AmpError::Unavailable);
            }
            if ctrl
                .count
                .compare_exchange_weak(
                    current,
                    current - 1,
                    Ordering::Release,
                    Ordering::Relaxed,
                )
                .is_ok()
            {
                barrier(self.platform);
                return Ok(());
            }
        }
    }

    /// Bounded wait: retries [`Self::try_wait`] against the tick source.
    /// `timeout_ms == 0` waits forever.
    pub fn wait(&self, timeout_ms: u32) -> Result<()> {
        wait_bounded(self.platform, timeout_ms, || self.try_wait())
    }

    /// Increment if `count < max_count`, else return `Overflow`. This is a
    /// legitimate backpressure signal, not a bug — a re-implementation must
    /// preserve it (see `DESIGN.md`).
    pub fn post(&self) -> Result<()> {
        let ctrl = self.ctrl();
        loop {
            let current = ctrl.count.load(Ordering::Acquire);
            if current >= ctrl.max_count {
                return Err(AmpError::Overflow);
            }
            if ctrl
                .count
                .compare_exchange_weak(
                    current,
                    current + 1,
                    Ordering::Release,
                    Ordering::Relaxed,
                )
                .is_ok()
            {
                barrier(self.platform);
                return Ok(());
            }
        }
    }

    /// Plain load. Diagnostics only — not a synchronization primitive.
    pub fn get_count(&self) -> u32 {
        self.ctrl().count.load(Ordering::Relaxed)
    }
}
