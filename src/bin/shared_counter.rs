// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 amp-core contributors
//
// A binary semaphore guards a plain word incremented 100 times by each of
// two simulated cores. Final counter must be exactly 200.

use std::alloc::{alloc_zeroed, Layout};
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;

use amp_core::host::ThreadPlatform;
use amp_core::{CoreId, SharedArena, Semaphore, Platform};

const SHMEM_SIZE: usize = 4 * 1024;
const INCREMENT_COUNT: u32 = 100;

fn main() {
    let layout = Layout::from_size_align(SHMEM_SIZE, 64).unwrap();
    let base = unsafe { alloc_zeroed(layout) } as usize;

    let platform = ThreadPlatform::new(CoreId::PRIMARY);
    let arena = unsafe { SharedArena::init(base, SHMEM_SIZE).expect("arena init") };
    let sem: Semaphore<ThreadPlatform> =
        Semaphore::create(&arena, &platform, 1, 1).expect("semaphore");

    let counter = AtomicU32::new(0);
    let core0_increments = AtomicU32::new(0);
    let core1_increments = AtomicU32::new(0);

    let increment = |which: &AtomicU32| {
        sem.wait(1000).expect("sem wait");
        counter.fetch_add(1, Ordering::Relaxed);
        which.fetch_add(1, Ordering::Relaxed);
        platform.memory_barrier();
        sem.post().expect("sem post");
    };

    thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..INCREMENT_COUNT {
                increment(&core1_increments);
            }
        });
        for _ in 0..INCREMENT_COUNT {
            increment(&core0_increments);
        }
    });

    let total = counter.load(Ordering::Relaxed);
    assert_eq!(total, 2 * INCREMENT_COUNT);
    assert_eq!(
        core0_increments.load(Ordering::Relaxed) + core1_increments.load(Ordering::Relaxed),
        total
    );
    assert_eq!(sem.get_count(), 1);
    println!("shared_counter: final counter = {total}");
}
