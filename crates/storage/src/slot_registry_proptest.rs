// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Property: for `record_limit = N` and any interleaving of recorder
//! starts, the number of concurrently-held slots never exceeds `N` (§8
//! invariant). Modeled directly on the held-guard count rather than by
//! polling `enumerate()`, since sampling a point-in-time read would itself
//! race with the thing being measured.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;

use super::SlotRegistry;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]
    #[test]
    fn concurrent_acquires_never_exceed_max_slots(max_slots in 1usize..4, contenders in 1usize..8) {
        let dir = tempfile::tempdir().expect("tempdir");
        let registry = Arc::new(SlotRegistry::new(dir.path().to_path_buf(), max_slots));
        let held = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .expect("build runtime");

        runtime.block_on(async {
            let mut tasks = Vec::with_capacity(contenders);
            for i in 0..contenders {
                let registry = Arc::clone(&registry);
                let held = Arc::clone(&held);
                let peak = Arc::clone(&peak);
                tasks.push(tokio::spawn(async move {
                    let guard = registry
                        .acquire(&format!("user{i}"), false, Duration::from_millis(5))
                        .await
                        .expect("acquire");

                    let now_held = held.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now_held, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(3)).await;
                    held.fetch_sub(1, Ordering::SeqCst);

                    registry.release(guard).expect("release");
                }));
            }
            for task in tasks {
                task.await.expect("join");
            }
        });

        prop_assert!(peak.load(Ordering::SeqCst) <= max_slots);
        prop_assert_eq!(held.load(Ordering::SeqCst), 0);
    }
}
