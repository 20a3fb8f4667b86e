// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 amp-core contributors
//
// std-backed Platform for integration tests and demo binaries. Real
// secondary-core bring-up is platform-specific and out of this crate's
// scope; callers simulate the second core with an OS thread directly and
// use this only for the memory barrier / tick source / core-id hooks.

extern crate std;

use std::sync::atomic::{fence, Ordering};
use std::time::Instant;

use crate::platform::{CoreId, Platform};

/// One instance per simulated core. `current_core_id` returns whatever id
/// the instance was constructed with — there is no real per-thread core
/// affinity on a host OS, so the demos hand each thread its own instance.
pub struct ThreadPlatform {
    core_id: CoreId,
    epoch: Instant,
}

impl ThreadPlatform {
    pub fn new(core_id: CoreId) -> Self {
        Self {
            core_id,
            epoch: Instant::now(),
        }
    }
}

impl Platform for ThreadPlatform {
    fn current_core_id(&self) -> CoreId {
        self.core_id
    }

    fn memory_barrier(&self) {
        fence(Ordering::SeqCst);
    }

    fn monotonic_tick(&self) -> u64 {
        self.epoch.elapsed().as_micros() as u64
    }

    fn ticks_per_ms(&self) -> u64 {
        1_000 // monotonic_tick is in microseconds
    }
}
