// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 amp-core contributors
//
// Lock-free single-producer single-consumer byte stream. Same write_idx /
// read_idx discipline as the mailbox, but byte-granular: short writes and
// reads are normal, callers must treat this as a Unix pipe, not a datagram
// channel.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::arena::{barrier, Handle, SharedArena};
use crate::error::{AmpError, Result};
use crate::platform::Platform;

#[repr(C)]
struct Header {
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    size: u32,
    mask: u32,
}

/// SPSC byte ring buffer allocated from a [`SharedArena`]. Capacity must be
/// a power of two — bytes are not rounded, creation rejects otherwise.
pub struct RingBuf<'p, P: Platform> {
    platform: &'p P,
    handle: Handle,
    size: usize,
}

impl<'p, P: Platform> RingBuf<'p, P> {
    /// Allocate a ring buffer of exactly `size` bytes. `size` must be a
    /// power of two.
    pub fn create(arena: &SharedArena, platform: &'p P, size: u32) -> Result<Self> {
        if size == 0 || !size.is_power_of_two() {
            return Err(AmpError::InvalidArgument);
        }
        let header_size = core::mem::size_of::<Header>();
        let total = header_size
            .checked_add(size as usize)
            .ok_or(AmpError::ResourceExhausted)?;
        let handle = arena.alloc(total)?;
        unsafe {
            core::ptr::write(
                handle.addr() as *mut Header,
                Header {
                    write_idx: AtomicU32::new(0),
                    read_idx: AtomicU32::new(0),
                    size,
                    mask: size - 1,
                },
            );
        }
        Ok(Self {
            platform,
            handle,
            size: size as usize,
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

    pub fn capacity(&self) -> usize {
        self.size
    }

    /// Bytes currently available to read. Racy against the opposite side —
    /// advisory only, for flow-control heuristics.
    pub fn available(&self) -> usize {
        let hdr = self.header();
        hdr.write_idx
            .load(Ordering::Acquire)
            .wrapping_sub(hdr.read_idx.load(Ordering::Acquire)) as usize
    }

    /// Bytes currently free to write. Same raciness caveat as `available`.
    pub fn free_space(&self) -> usize {
        self.size - self.available()
    }

    /// Write `min(data.len(), free_space())` bytes, returning the count
    /// actually written. Never blocks.
    pub fn write(&self, data: &[u8]) -> usize {
        if data.is_empty() {
            return 0;
        }
        let hdr = self.header();
        let w = hdr.write_idx.load(Ordering::Relaxed);
        let r = hdr.read_idx.load(Ordering::Acquire);
        let free = self.size - w.wrapping_sub(r) as usize;
        let n = data.len().min(free);
        if n == 0 {
            return 0;
        }
        let base = self.data_ptr();
        let mask = hdr.mask;
        for (i, &byte) in data[..n].iter().enumerate() {
            let pos = (w.wrapping_add(i as u32)) & mask;
            unsafe { *base.add(pos as usize) = byte };
        }
        barrier(self.platform);
        hdr.write_idx
            .store(w.wrapping_add(n as u32), Ordering::Release);
        n
    }

    /// Read up to `out.len()` pending bytes into `out`, returning the count
    /// actually read. Never blocks.
    pub fn read(&self, out: &mut [u8]) -> usize {
        if out.is_empty() {
            return 0;
        }
        let hdr = self.header();
        let r = hdr.read_idx.load(Ordering::Relaxed);
        let w = hdr.write_idx.load(Ordering::Acquire);
        let avail = w.wrapping_sub(r) as usize;
        let n = out.len().min(avail);
        if n == 0 {
            return 0;
        }
        let base = self.data_ptr();
        let mask = hdr.mask;
        for i in 0..n {
            let pos = (r.wrapping_add(i as u32)) & mask;
            out[i] = unsafe { *base.add(pos as usize) };
        }
        barrier(self.platform);
        hdr.read_idx
            .store(r.wrapping_add(n as u32), Ordering::Release);
        n
    }

    /// Consumer-side only: `read_idx = write_idx`. Calling this from the
    /// producer is racy and loses in-flight data — undefined per spec.
    pub fn clear(&self) {
        let hdr = self.header();
        let w = hdr.write_idx.load(Ordering::Acquire);
        hdr.read_idx.store(w, Ordering::Release);
        barrier(self.platform);
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
    fn create_rejects_non_power_of_two() {
        let (_b, arena, p) = setup(4096);
        assert_eq!(
            RingBuf::create(&arena, &p, 10).err(),
            Some(AmpError::InvalidArgument)
        );
    }

    #[test]
    fn round_trip_within_capacity() {
        let (_b, arena, p) = setup(4096);
        let rb = RingBuf::create(&arena, &p, 16).unwrap();
        let data = b"0123456789";
        assert_eq!(rb.write(data), 10);
        let mut out = [0u8; 10];
        assert_eq!(rb.read(&mut out), 10);
        assert_eq!(&out, data);
    }

    #[test]
    fn wrap_scenario() {
        // capacity 16; write 10, read 6, write 10 more.
        let (_b, arena, p) = setup(4096);
        let rb = RingBuf::create(&arena, &p, 16).unwrap();

        assert_eq!(rb.write(&[1u8; 10]), 10);
        let mut tmp = [0u8; 6];
        assert_eq!(rb.read(&mut tmp), 6);
        assert_eq!(rb.write(&[2u8; 10]), 10);

        let mut first = [0u8; 7];
        let mut second = [0u8; 7];
        assert_eq!(rb.read(&mut first), 7);
        assert_eq!(rb.read(&mut second), 7);
        assert_eq!(first, [1, 1, 1, 1, 2, 2, 2]);
        assert_eq!(second, [2; 7]);
    }

    #[test]
    fn short_write_when_nearly_full() {
        let (_b, arena, p) = setup(4096);
        let rb = RingBuf::create(&arena, &p, 8).unwrap();
        assert_eq!(rb.write(&[0u8; 6]), 6);
        assert_eq!(rb.write(&[0u8; 6]), 2); // only 2 bytes free
    }

    #[test]
    fn clear_resets_to_empty() {
        let (_b, arena, p) = setup(4096);
        let rb = RingBuf::create(&arena, &p, 16).unwrap();
        rb.write(&[1, 2, 3]);
        rb.clear();
        assert_eq!(rb.available(), 0);
        assert_eq!(rb.free_space(), 16);
    }

    #[test]
    fn clear_on_empty_buffer_is_idempotent() {
        let (_b, arena, p) = setup(4096);
        let rb = RingBuf::create(&arena, &p, 16).unwrap();
        rb.clear();
        rb.clear();
        assert_eq!(rb.available(), 0);
    }

    #[test]
    fn zero_length_write_read_return_zero() {
        let (_b, arena, p) = setup(4096);
        let rb = RingBuf::create(&arena, &p, 16).unwrap();
        assert_eq!(rb.write(&[]), 0);
        assert_eq!(rb.read(&mut []), 0);
    }
}
