// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 amp-core contributors
//
// Error taxonomy shared by every fallible operation in the crate.

use snafu::Snafu;

/// Abstract error kinds returned by every fallible operation.
///
/// No operation recovers on behalf of the caller and none of these carry a
/// backtrace or logging side effect — the caller inspects the kind and
/// retries or propagates it.
#[derive(Debug, Snafu, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AmpError {
    /// Null handle, zero size, non-power-of-two where required, `initial >
    /// max`, or an invalid core id.
    #[snafu(display("invalid argument"))]
    InvalidArgument,

    /// Full / empty / count-zero; recoverable by retry.
    #[snafu(display("unavailable"))]
    Unavailable,

    /// Semaphore post above `max_count`; caller's contract violation.
    #[snafu(display("overflow"))]
    Overflow,

    /// Bounded wait expired.
    #[snafu(display("timeout"))]
    Timeout,

    /// Arena out of space.
    #[snafu(display("resource exhausted"))]
    ResourceExhausted,

    /// `boot_init` called on a non-primary core.
    #[snafu(display("not ready"))]
    NotReady,
}

pub type Result<T> = core::result::Result<T, AmpError>;
