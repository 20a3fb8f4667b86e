// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 amp-core contributors
//
// Core0 greets core1 over a mailbox and gets a response back. Two OS
// threads stand in for the two hardware cores; both share the same
// ThreadPlatform instance since this is a host simulation, not real
// per-core clock hardware.

use std::alloc::{alloc_zeroed, Layout};
use std::thread;

use amp_core::host::ThreadPlatform;
use amp_core::{Boot, CoreId, Mailbox, SharedArena};

const SHMEM_SIZE: usize = 16 * 1024;
const MSG_SIZE: usize = 60;

fn main() {
    let layout = Layout::from_size_align(SHMEM_SIZE, 64).unwrap();
    let base = unsafe { alloc_zeroed(layout) } as usize;

    let platform = ThreadPlatform::new(CoreId::PRIMARY);
    let arena = unsafe { SharedArena::init(base, SHMEM_SIZE).expect("arena init") };
    let _boot = Boot::init(&arena, &platform).expect("boot init");

    let to_core1: Mailbox<ThreadPlatform> =
        Mailbox::create(&arena, &platform, MSG_SIZE as u32, 4).expect("mailbox");
    let to_core0: Mailbox<ThreadPlatform> =
        Mailbox::create(&arena, &platform, MSG_SIZE as u32, 4).expect("mailbox");

    thread::scope(|s| {
        s.spawn(|| {
            // core1 thread
            let mut greeting = [0u8; MSG_SIZE];
            greeting[0] = 1;
            greeting[1..6].copy_from_slice(b"Hello");
            to_core0.send(&greeting, 1000).expect("core1 send greeting");

            let mut reply = [0u8; MSG_SIZE];
            to_core1.recv(&mut reply, 1000).expect("core1 recv reply");
            println!("core1: got reply {:?}", &reply[1..6]);
        });

        // core0 (main) thread
        let mut greeting = [0u8; MSG_SIZE];
        to_core0
            .recv(&mut greeting, 1000)
            .expect("core0 recv greeting");
        println!(
            "core0: got greeting from core {}: {:?}",
            greeting[0],
            &greeting[1..6]
        );

        let mut reply = [0u8; MSG_SIZE];
        reply[0] = 0;
        reply[1..6].copy_from_slice(b"World");
        to_core1.send(&reply, 1000).expect("core0 send reply");
    });

    assert_eq!(to_core0.len(), 0);
    assert_eq!(to_core1.len(), 0);
}
