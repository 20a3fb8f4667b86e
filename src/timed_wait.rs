// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 amp-core contributors
//
// Single compositional pattern shared by mailbox send/recv, semaphore wait,
// and boot wait_core_ready: turn a try_* into a bounded-wait call against a
// monotonic tick source. `timeout_ms == 0` waits forever.

use crate::error::{AmpError, Result};
use crate::platform::Platform;

/// Spin on `attempt` until it returns `Ok(())`, `timeout_ms` elapses, or
/// `attempt` returns an error other than [`AmpError::Unavailable`] (which
/// is propagated immediately — only "not ready yet" is retried).
///
/// `timeout_ms == 0` means wait forever, matching the reference runtime's
/// convention (Design Notes, "Open questions").
pub fn wait_bounded<P, F>(platform: &P, timeout_ms: u32, mut attempt: F) -> Result<()>
where
    P: Platform + ?Sized,
    F: FnMut() -> Result<()>,
{
    if timeout_ms == 0 {
        loop {
            match attempt() {
                Err(AmpError::Unavailable) => backoff_spin(),
                other => return other,
            }
        }
    }

    let deadline = platform
        .monotonic_tick()
        .saturating_add(platform.ticks_per_ms().saturating_mul(timeout_ms as u64));

    loop {
        match attempt() {
            Err(AmpError::Unavailable) => {
                if platform.monotonic_tick() >= deadline {
                    return Err(AmpError::Timeout);
                }
                backoff_spin();
            }
            other => return other,
        }
    }
}

/// A single spin iteration. No_std has no thread to yield to and no sleep;
/// the only portable backoff is the CPU's own pause/wait-for-event hint.
#[inline]
fn backoff_spin() {
    core::hint::spin_loop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockPlatform;
    use core::cell::Cell;

    #[test]
    fn succeeds_immediately() {
        let p = MockPlatform::new();
        let r = wait_bounded(&p, 0, || Ok(()));
        assert!(r.is_ok());
    }

    #[test]
    fn retries_until_success_with_infinite_timeout() {
        let p = MockPlatform::new();
        let calls = Cell::new(0);
        let r = wait_bounded(&p, 0, || {
            let n = calls.get() + 1;
            calls.set(n);
            if n < 5 {
                Err(AmpError::Unavailable)
            } else {
                Ok(())
            }
        });
        assert!(r.is_ok());
        assert_eq!(calls.get(), 5);
    }

    #[test]
    fn times_out_against_fake_tick_source() {
        let p = MockPlatform::new();
        p.set_ticks_per_ms(10);
        // Never succeeds; advance the fake clock past the deadline inside
        // the attempt closure itself, simulating elapsed wall-clock time.
        let r = wait_bounded(&p, 5, || {
            p.advance_ticks(60); // past the 5ms * 10 ticks/ms deadline
            Err(AmpError::Unavailable)
        });
        assert_eq!(r, Err(AmpError::Timeout));
    }

    #[test]
    fn propagates_non_unavailable_errors_immediately() {
        let p = MockPlatform::new();
        let r = wait_bounded(&p, 1000, || Err(AmpError::InvalidArgument));
        assert_eq!(r, Err(AmpError::InvalidArgument));
    }
}
