// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Property: if job A's rename into the queue happens-before job B's, A is
//! dequeued before B (§8 "FIFO").

use proptest::prelude::*;

use super::EncodeQueue;
use twr_core::test_support::fake_encode_job;

proptest! {
    #[test]
    fn enqueue_order_is_preserved_through_dequeue(count in 2usize..8) {
        let dir = tempfile::tempdir().expect("tempdir");
        let queue = EncodeQueue::new(dir.path()).expect("new");

        let mut expected_ids = Vec::with_capacity(count);
        for i in 0..count {
            let job = fake_encode_job(&format!("user{i}"), &format!("/rec/user{i}.mp4"));
            expected_ids.push(job.id.clone());
            queue.enqueue(&job).expect("enqueue");
            // Enqueue's order key is a nanosecond timestamp: force a visible
            // happens-before ordering between successive jobs.
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        let mut observed_ids = Vec::with_capacity(count);
        while let Some(inflight) = queue.dequeue().expect("dequeue") {
            observed_ids.push(inflight.job().id.clone());
        }

        prop_assert_eq!(observed_ids, expected_ids);
    }
}
