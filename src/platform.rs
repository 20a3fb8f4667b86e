// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 amp-core contributors
//
// Platform hooks consumed by the core. Everything hardware-specific —
// obtaining the current core id, releasing a secondary core's reset line,
// the memory barrier instruction itself, the wall-clock tick source — is
// injected through this trait rather than resolved via weak symbols.

use crate::error::{AmpError, Result};

/// Number of cores this runtime addresses. Fixed at two: this is an AMP
/// runtime for dual-core microcontrollers, not an N-way SMP scheduler.
pub const CORE_COUNT: usize = 2;

/// A core identifier in `[0, CORE_COUNT)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoreId(u8);

impl CoreId {
    pub const PRIMARY: CoreId = CoreId(0);
    pub const SECONDARY: CoreId = CoreId(1);

    /// Construct a `CoreId`, failing if `id >= CORE_COUNT`.
    pub fn new(id: u8) -> Result<Self> {
        if (id as usize) >= CORE_COUNT {
            return Err(AmpError::InvalidArgument);
        }
        Ok(CoreId(id))
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub const fn bit(self) -> u32 {
        1u32 << self.0
    }
}

/// Hardware and environment hooks the core depends on but does not implement.
///
/// Implementations are expected to be cheap and side-effect-free beyond
/// their stated purpose: `current_core_id` is called on every boot
/// operation and must not block.
pub trait Platform {
    /// The id of the core this call executes on.
    fn current_core_id(&self) -> CoreId;

    /// Release a secondary core to start executing at `entry` with stack
    /// pointer `sp`. Platform-specific core bring-up (writing to a hardware
    /// FIFO, programming a reset vector) is out of scope for this crate;
    /// a platform that does not override this returns `Ok(())` without
    /// effect, matching the reference runtime's weak-symbol default.
    fn launch_secondary_core(&self, _id: CoreId, _entry: usize, _sp: usize) -> Result<()> {
        Ok(())
    }

    /// Full data-memory barrier with compiler fence. Issued at every
    /// publication point between a payload write and the index/flag that
    /// makes it visible to the other core.
    fn memory_barrier(&self);

    /// Opaque monotonic tick, unit documented by `ticks_per_ms`.
    fn monotonic_tick(&self) -> u64;

    /// Ticks per millisecond for this platform's `monotonic_tick`. Bounded
    /// waits compute their deadline from this rather than assuming a fixed
    /// cycle rate.
    fn ticks_per_ms(&self) -> u64;
}
