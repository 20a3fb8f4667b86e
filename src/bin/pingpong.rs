// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 amp-core contributors
//
// Ten PING/PONG round trips over two mailboxes, followed by one DONE.

use std::alloc::{alloc_zeroed, Layout};
use std::thread;

use amp_core::host::ThreadPlatform;
use amp_core::{CoreId, Mailbox, SharedArena};

const SHMEM_SIZE: usize = 16 * 1024;
const PING_PONG_COUNT: u32 = 10;

#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum MsgType {
    Ping = 0,
    Pong = 1,
    Done = 2,
}

fn encode(ty: MsgType, sequence: u32, core_id: u8) -> [u8; 9] {
    let mut buf = [0u8; 9];
    buf[0] = ty as u8;
    buf[1..5].copy_from_slice(&sequence.to_le_bytes());
    buf[5] = core_id;
    buf
}

fn decode(buf: &[u8; 9]) -> (MsgType, u32, u8) {
    let ty = match buf[0] {
        0 => MsgType::Ping,
        1 => MsgType::Pong,
        _ => MsgType::Done,
    };
    let sequence = u32::from_le_bytes(buf[1..5].try_into().unwrap());
    (ty, sequence, buf[5])
}

fn main() {
    let layout = Layout::from_size_align(SHMEM_SIZE, 64).unwrap();
    let base = unsafe { alloc_zeroed(layout) } as usize;

    let platform = ThreadPlatform::new(CoreId::PRIMARY);
    let arena = unsafe { SharedArena::init(base, SHMEM_SIZE).expect("arena init") };

    let to_core1: Mailbox<ThreadPlatform> =
        Mailbox::create(&arena, &platform, 9, 4).expect("mailbox");
    let to_core0: Mailbox<ThreadPlatform> =
        Mailbox::create(&arena, &platform, 9, 4).expect("mailbox");

    thread::scope(|s| {
        s.spawn(|| {
            // core1: receives PING, replies PONG, then sends DONE.
            let mut buf = [0u8; 9];
            for expected in 0..PING_PONG_COUNT {
                to_core1.recv(&mut buf, 2000).expect("core1 recv ping");
                let (ty, seq, _) = decode(&buf);
                assert_eq!(ty, MsgType::Ping);
                assert_eq!(seq, expected);
                to_core0
                    .send(&encode(MsgType::Pong, seq, 1), 2000)
                    .expect("core1 send pong");
            }
            to_core0
                .send(&encode(MsgType::Done, PING_PONG_COUNT, 1), 2000)
                .expect("core1 send done");
        });

        // core0: sends PING, waits for matching PONG, then waits for DONE.
        let mut buf = [0u8; 9];
        for i in 0..PING_PONG_COUNT {
            to_core1
                .send(&encode(MsgType::Ping, i, 0), 2000)
                .expect("core0 send ping");
            to_core0.recv(&mut buf, 2000).expect("core0 recv pong");
            let (ty, seq, _) = decode(&buf);
            assert_eq!(ty, MsgType::Pong);
            assert_eq!(seq, i);
        }
        to_core0.recv(&mut buf, 2000).expect("core0 recv done");
        let (ty, ..) = decode(&buf);
        assert_eq!(ty, MsgType::Done);
    });

    assert_eq!(to_core0.len(), 0);
    assert_eq!(to_core1.len(), 0);
    println!("pingpong: {PING_PONG_COUNT} round trips completed, indices drained on both sides");
}
