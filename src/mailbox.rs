// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 amp-core contributors
//
// Lock-free single-producer single-consumer ring of fixed-size message
// slots over shared memory. write_idx is written only by the producer,
// read_idx only by the consumer; both are read by both sides. No CAS is
// needed — a single data-memory barrier per side orders payload vs index.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::arena::{barrier, Handle, SharedArena};
use crate::error::{AmpError, Result};
use crate::platform::Platform;
use crate::timed_wait::wait_bounded;

#[repr(C)]
struct Header {
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    msg_size: u32,
    msg_slots: u32,
    mask: u32,
}

/// SPSC mailbox of fixed-size framed messages, allocated from a
/// [`SharedArena`]. Exactly one producer core calls `send`/`try_send`;
/// exactly one consumer core calls `recv`/`try_recv`.
pub struct Mailbox<'p, P: Platform> {
    platform: &'p P,
    handle: Handle,
    msg_size: usize,
    msg_slots: usize,
}

fn next_power_of_two(n: u32) -> u32 {
    if n <= 1 {
        1
    } else {
        n.next_power_of_two()
    }
}

impl<'p, P: Platform> Mailbox<'p, P> {
    /// Allocate a mailbox with room for `slots` messages of `msg_size`
    /// bytes each. `slots` is rounded up to the next power of two.
    ///
    /// `slots` must be at most `2^31`: the capacity bound above which the
    /// unsigned-subtraction index arithmetic (`write_idx - read_idx`) can
    /// no longer be trusted, and past which rounding up to a power of two
    /// would itself overflow `u32`.
    pub fn create(
        arena: &SharedArena,
        platform: &'p P,
        msg_size: u32,
        slots: u32,
    ) -> Result<Self> {
        if msg_size == 0 || slots == 0 || slots > (1 << 31) {
            return Err(AmpError::InvalidArgument);
        }
        let msg_slots = next_power_of_two(slots);
        let mask = msg_slots - 1;

        let header_size = core::mem::size_of::<Header>();
        let data_size = (msg_size as usize)
            .checked_mul(msg_slots as usize)
            .ok_or(AmpError::ResourceExhausted)?;
        let total = header_size
            .checked_add(data_size)
            .ok_or(AmpError::ResourceExhausted)?;

        let handle = arena.alloc(total)?;
        unsafe {
            core::ptr::write(
                handle.addr() as *mut Header,
                Header {
                    write_idx: AtomicU32::new(0),
                    read_idx: AtomicU32::new(0),
                    msg_size,
                    msg_slots,
                    mask,
                },
            );
        }
        Ok(Self {
            platform,
            handle,
            msg_size: msg_size as usize,
            msg_slots: msg_slots as usize,
        })
    }

    /// No-op: the arena never reclaims (see [`SharedArena::free`]).
    pub fn destroy(self) {}

    fn header(&self) -> &Header {
        unsafe { &*(self.handle.addr() as *const Header) }
    }

    fn data_ptr(&self) -> *mut u8 {
        unsafe { (self.handle.addr() as *mut u8).add(core::mem::size_of::<Header>()) }
    }

    fn slot_ptr(&self, idx: u32) -> *mut u8 {
        let slot = (idx & self.header().mask) as usize;
        unsafe { self.data_ptr().add(slot * self.msg_size) }
    }

    pub fn msg_size(&self) -> usize {
        self.msg_size
    }

    pub fn slots(&self) -> usize {
        self.msg_slots
    }

    /// `write_idx - read_idx` (unsigned, wraps correctly through `2^32`).
    pub fn len(&self) -> u32 {
        let hdr = self.header();
        hdr.write_idx
            .load(Ordering::Acquire)
            .wrapping_sub(hdr.read_idx.load(Ordering::Acquire))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() as usize >= self.msg_slots
    }

    /// Copy `msg` into the next free slot. `msg.len()` must equal
    /// `msg_size`. Returns `Unavailable` if the mailbox is full.
    pub fn try_send(&self, msg: &[u8]) -> Result<()> {
        if msg.len() != self.msg_size {
            return Err(AmpError::InvalidArgument);
        }
        let hdr = self.header();
        let w = hdr.write_idx.load(Ordering::Relaxed);
        let r = hdr.read_idx.load(Ordering::Acquire);
        if w.wrapping_sub(r) >= self.msg_slots as u32 {
            return Err(AmpError::Unavailable);
        }
        let slot = self.slot_ptr(w);
        unsafe {
            core::ptr::copy_nonoverlapping(msg.as_ptr(), slot, self.msg_size);
        }
        barrier(self.platform);
        hdr.write_idx.store(w.wrapping_add(1), Ordering::Release);
        Ok(())
    }

    /// Bounded-wait variant of [`Self::try_send`]. `timeout_ms == 0` waits
    /// forever.
    pub fn send(&self, msg: &[u8], timeout_ms: u32) -> Result<()> {
        wait_bounded(self.platform, timeout_ms, || self.try_send(msg))
    }

    /// Copy the next pending message into `out`. `out.len()` must equal
    /// `msg_size`. Returns `Unavailable` if the mailbox is empty.
    pub fn try_recv(&self, out: &mut [u8]) -> Result<()> {
        if out.len() != self.msg_size {
            return Err(AmpError::InvalidArgument);
        }
        let hdr = self.header();
        let w = hdr.write_idx.load(Ordering::Acquire);
        let r = hdr.read_idx.load(Ordering::Relaxed);
        if r == w {
            return Err(AmpError::Unavailable);
        }
        let slot = self.slot_ptr(r);
        unsafe {
            core::ptr::copy_nonoverlapping(slot, out.as_mut_ptr(), self.msg_size);
        }
        barrier(self.platform);
        hdr.read_idx.store(r.wrapping_add(1), Ordering::Release);
        Ok(())
    }

    /// Bounded-wait variant of [`Self::try_recv`]. `timeout_ms == 0` waits
    /// forever.
    pub fn recv(&self, out: &mut [u8], timeout_ms: u32) -> Result<()> {
        wait_bounded(self.platform, timeout_ms, || self.try_recv(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockPlatform;
    extern crate std;
    use std::alloc::{alloc_zeroed, dealloc, Layout};

    struct Backing {
        ptr: *mut u8,
        layout: Layout,
    }
    impl Backing {
        fn new(size: usize) -> Self {
            let layout = Layout::from_size_align(size, 64).unwrap();
            let ptr = unsafe { alloc_zeroed(layout) };
            Self { ptr, layout }
        }
    }
    impl Drop for Backing {
        fn drop(&mut self) {
            unsafe { dealloc(self.ptr, self.layout) };
        }
    }

    fn setup(size: usize) -> (Backing, SharedArena, MockPlatform) {
        let b = Backing::new(size);
        let arena = unsafe { SharedArena::init(b.ptr as usize, size).unwrap() };
        (b, arena, MockPlatform::new())
    }

    #[test]
    fn create_rejects_zero_msg_size_or_slots() {
        let (_b, arena, p) = setup(4096);
        assert_eq!(
            Mailbox::create(&arena, &p, 0, 4).err(),
            Some(AmpError::InvalidArgument)
        );
        assert_eq!(
            Mailbox::create(&arena, &p, 8, 0).err(),
            Some(AmpError::InvalidArgument)
        );
    }

    #[test]
    fn create_rejects_slots_above_bound_without_overflow_or_panic() {
        let (_b, arena, p) = setup(4096);
        assert_eq!(
            Mailbox::create(&arena, &p, 8, (1u32 << 31) + 1).err(),
            Some(AmpError::InvalidArgument)
        );
        assert_eq!(
            Mailbox::create(&arena, &p, 8, u32::MAX).err(),
            Some(AmpError::InvalidArgument)
        );
    }

    #[test]
    fn create_rounds_slots_up_to_power_of_two() {
        let (_b, arena, p) = setup(4096);
        let mbox = Mailbox::create(&arena, &p, 8, 3).unwrap();
        assert_eq!(mbox.slots(), 4);
    }

    #[test]
    fn fifo_order_preserved() {
        let (_b, arena, p) = setup(4096);
        let mbox = Mailbox::create(&arena, &p, 4, 4).unwrap();

        for i in 0u32..3 {
            mbox.try_send(&i.to_le_bytes()).unwrap();
        }
        let mut out = [0u8; 4];
        for expected in 0u32..3 {
            mbox.try_recv(&mut out).unwrap();
            assert_eq!(u32::from_le_bytes(out), expected);
        }
    }

    #[test]
    fn full_mailbox_non_blocking() {
        let (_b, arena, p) = setup(4096);
        let mbox = Mailbox::create(&arena, &p, 4, 2).unwrap();
        let msg = 0u32.to_le_bytes();

        assert!(mbox.try_send(&msg).is_ok());
        assert!(mbox.try_send(&msg).is_ok());
        assert_eq!(mbox.try_send(&msg), Err(AmpError::Unavailable));
        assert_eq!(mbox.len(), 2);
    }

    #[test]
    fn empty_recv_is_unavailable() {
        let (_b, arena, p) = setup(4096);
        let mbox = Mailbox::create(&arena, &p, 4, 2).unwrap();
        let mut out = [0u8; 4];
        assert_eq!(mbox.try_recv(&mut out), Err(AmpError::Unavailable));
    }

    #[test]
    fn recv_times_out_and_leaves_indices_unchanged() {
        let (_b, arena, p) = setup(4096);
        p.set_ticks_per_ms(1);
        let mbox = Mailbox::create(&arena, &p, 4, 2).unwrap();
        let mut out = [0u8; 4];

        let r = wait_bounded(&p, 10, || {
            p.advance_ticks(20);
            mbox.try_recv(&mut out)
        });
        assert_eq!(r, Err(AmpError::Timeout));
        assert_eq!(mbox.header().write_idx.load(Ordering::Relaxed), 0);
        assert_eq!(mbox.header().read_idx.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn hello_scenario_byte_exact() {
        let (_b, arena, p) = setup(16 * 1024);
        let mbox = Mailbox::create(&arena, &p, 60, 4).unwrap();

        let mut msg = [0u8; 60];
        msg[0] = 1; // core_id
        msg[1..6].copy_from_slice(b"Hello");

        mbox.try_send(&msg).unwrap();
        let mut out = [0u8; 60];
        mbox.try_recv(&mut out).unwrap();

        assert_eq!(msg, out);
        assert_eq!(mbox.header().write_idx.load(Ordering::Relaxed), 1);
        assert_eq!(mbox.header().read_idx.load(Ordering::Relaxed), 1);
    }
}
