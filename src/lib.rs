// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 amp-core contributors
//
// Lock-free inter-core communication primitives for dual-core AMP
// microcontrollers: a bump-allocated shared-memory arena, a boot handshake,
// a counting semaphore, an SPSC mailbox, and an SPSC byte ring buffer, all
// built on a single data-memory-barrier discipline rather than mutexes.

#![no_std]

pub mod arena;
pub mod boot;
pub mod error;
pub mod mailbox;
pub mod platform;
pub mod ringbuf;
pub mod semaphore;
pub mod timed_wait;

pub mod mock;

#[cfg(feature = "std")]
pub mod host;

pub use arena::{Handle, Region, SharedArena};
pub use boot::{Boot, DomainConfig};
pub use error::{AmpError, Result};
pub use mailbox::Mailbox;
pub use platform::{CoreId, Platform, CORE_COUNT};
pub use ringbuf::RingBuf;
pub use semaphore::Semaphore;
