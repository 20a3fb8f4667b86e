// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 amp-core contributors
//
// Boot handshake: a one-word ready bitmap gates every cross-core operation
// that follows. The primary sets its own bit during init; each secondary
// signals once its own setup is complete. The bitmap lives in the arena,
// like every other control block — a stack or static word would not be
// visible to both cores.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::arena::{Handle, SharedArena};
use crate::error::{AmpError, Result};
use crate::platform::{CoreId, Platform, CORE_COUNT};
use crate::timed_wait::wait_bounded;

/// Per-core stack and entry-point description, validated but not acted on
/// here — actually programming a core's stack/MMU region is platform
/// bring-up and out of scope for this crate.
#[derive(Debug, Clone, Copy)]
pub struct DomainConfig {
    pub core_id: CoreId,
    pub stack_base: usize,
    pub stack_size: usize,
    pub entry_point: usize,
}

/// Boot handshake state: one bit per core in `ready_flags`, allocated from
/// the arena so both cores observe the same word.
pub struct Boot<'p, P: Platform> {
    platform: &'p P,
    handle: Handle,
}

const _: () = assert!(CORE_COUNT <= 32, "ready_flags is a single u32 bitmap");

impl<'p, P: Platform> Boot<'p, P> {
    /// Initialize the handshake and set the primary's own ready bit.
    /// Must run on the primary core.
    pub fn init(arena: &SharedArena, platform: &'p P) -> Result<Self> {
        if platform.current_core_id() != CoreId::PRIMARY {
            return Err(AmpError::NotReady);
        }
        let handle = arena.alloc(core::mem::size_of::<AtomicU32>())?;
        unsafe {
            core::ptr::write(
                handle.addr() as *mut AtomicU32,
                AtomicU32::new(CoreId::PRIMARY.bit()),
            );
        }
        let boot = Self { platform, handle };
        platform.memory_barrier();
        Ok(boot)
    }

    fn flags(&self) -> &AtomicU32 {
        unsafe { &*(self.handle.addr() as *const AtomicU32) }
    }

    /// Release a secondary core. Thin facade over the platform hook; a
    /// platform that does not implement bring-up returns `Ok(())` without
    /// effect (see [`Platform::launch_secondary_core`]).
    pub fn launch(&self, id: CoreId, entry: usize, sp: usize) -> Result<()> {
        if id == CoreId::PRIMARY {
            return Err(AmpError::InvalidArgument);
        }
        self.platform.launch_secondary_core(id, entry, sp)
    }

    /// Validate (but do not act on) a per-core domain description.
    pub fn configure_domain(&self, cfg: DomainConfig) -> Result<()> {
        if cfg.core_id == CoreId::PRIMARY {
            return Err(AmpError::InvalidArgument);
        }
        if cfg.stack_size == 0 || cfg.entry_point == 0 {
            return Err(AmpError::InvalidArgument);
        }
        Ok(())
    }

    /// Called by a core once its own setup is complete. Sets the calling
    /// core's bit and follows it with a barrier so a waiter that observes
    /// the bit also observes every write that preceded this call.
    pub fn signal_ready(&self) {
        let id = self.platform.current_core_id();
        self.flags().fetch_or(id.bit(), Ordering::Release);
        self.platform.memory_barrier();
    }

    /// Poll `id`'s ready bit until set or `timeout_ms` elapses.
    /// `timeout_ms == 0` waits forever.
    pub fn wait_ready(&self, id: CoreId, timeout_ms: u32) -> Result<()> {
        wait_bounded(self.platform, timeout_ms, || {
            if self.flags().load(Ordering::Acquire) & id.bit() != 0 {
                Ok(())
            } else {
                Err(AmpError::Unavailable)
            }
        })
    }

    /// `true` once `id` has signaled ready. Once set, stays set.
    pub fn is_ready(&self, id: CoreId) -> bool {
        self.flags().load(Ordering::Acquire) & id.bit() != 0
    }

    pub fn ready_flags(&self) -> u32 {
        self.flags().load(Ordering::Acquire)
    }
}
