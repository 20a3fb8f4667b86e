// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 amp-core contributors
//
// A deterministic, no_std Platform for unit tests. The tick source is
// advanced manually rather than reading a real clock, so timeout tests run
// in zero wall-clock time and are not flaky under load.

use core::sync::atomic::{fence, AtomicU64, AtomicU8, Ordering};

use crate::platform::{CoreId, Platform};

/// Single simulated core with a hand-advanced tick counter.
pub struct MockPlatform {
    core_id: AtomicU8,
    ticks: AtomicU64,
    ticks_per_ms: AtomicU64,
}

impl MockPlatform {
    pub const fn new() -> Self {
        Self {
            core_id: AtomicU8::new(0),
            ticks: AtomicU64::new(0),
            ticks_per_ms: AtomicU64::new(1),
        }
    }

    /// Report as a different core for the next call. Used to exercise
    /// `boot_init`'s primary-only check from a "secondary" perspective.
    pub fn set_core_id(&self, id: CoreId) {
        self.core_id.store(id.get(), Ordering::Relaxed);
    }

    pub fn set_ticks_per_ms(&self, tpm: u64) {
        self.ticks_per_ms.store(tpm, Ordering::Relaxed);
    }

    /// Move the fake clock forward by `n` ticks.
    pub fn advance_ticks(&self, n: u64) {
        self.ticks.fetch_add(n, Ordering::Relaxed);
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for MockPlatform {
    fn current_core_id(&self) -> CoreId {
        CoreId::new(self.core_id.load(Ordering::Relaxed)).unwrap_or(CoreId::PRIMARY)
    }

    fn memory_barrier(&self) {
        fence(Ordering::SeqCst);
    }

    fn monotonic_tick(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    fn ticks_per_ms(&self) -> u64 {
        self.ticks_per_ms.load(Ordering::Relaxed)
    }
}
