// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use twr_core::test_support::fake_encode_job;

#[test]
fn enqueue_then_dequeue_round_trips_the_job() {
    let dir = tempfile::tempdir().expect("tempdir");
    let queue = EncodeQueue::new(dir.path()).expect("new");
    let job = fake_encode_job("alice", "/rec/alice-1.mp4");
    queue.enqueue(&job).expect("enqueue");

    let inflight = queue.dequeue().expect("dequeue").expect("some job");
    assert_eq!(inflight.job(), &job);
}

#[test]
fn dequeue_on_an_empty_queue_returns_none() {
    let dir = tempfile::tempdir().expect("tempdir");
    let queue = EncodeQueue::new(dir.path()).expect("new");
    assert!(queue.dequeue().expect("dequeue").is_none());
}

#[test]
fn dequeue_is_fifo_by_enqueue_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let queue = EncodeQueue::new(dir.path()).expect("new");

    let first = fake_encode_job("alice", "/rec/alice-1.mp4");
    queue.enqueue(&first).expect("enqueue first");
    std::thread::sleep(std::time::Duration::from_millis(2));
    let second = fake_encode_job("bob", "/rec/bob-1.mp4");
    queue.enqueue(&second).expect("enqueue second");

    let popped_first = queue.dequeue().expect("dequeue").expect("some job");
    assert_eq!(popped_first.job(), &first);
    let popped_second = queue.dequeue().expect("dequeue").expect("some job");
    assert_eq!(popped_second.job(), &second);
}

#[test]
fn enqueue_leaves_no_tmp_file_behind() {
    let dir = tempfile::tempdir().expect("tempdir");
    let queue = EncodeQueue::new(dir.path()).expect("new");
    queue
        .enqueue(&fake_encode_job("alice", "/rec/alice-1.mp4"))
        .expect("enqueue");

    let tmp_entries: Vec<_> = std::fs::read_dir(&queue.layout.tmp_dir)
        .expect("read tmp dir")
        .collect();
    assert!(tmp_entries.is_empty());
}

#[test]
fn mark_done_removes_the_inflight_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let queue = EncodeQueue::new(dir.path()).expect("new");
    queue
        .enqueue(&fake_encode_job("alice", "/rec/alice-1.mp4"))
        .expect("enqueue");
    let inflight = queue.dequeue().expect("dequeue").expect("some job");
    let inflight_path = inflight.path.clone();
    queue.mark_done(inflight).expect("mark_done");
    assert!(!inflight_path.exists());
}

#[test]
fn mark_failed_renames_into_failed_dir_with_a_reason_sidecar() {
    let dir = tempfile::tempdir().expect("tempdir");
    let queue = EncodeQueue::new(dir.path()).expect("new");
    queue
        .enqueue(&fake_encode_job("alice", "/rec/alice-1.mp4"))
        .expect("enqueue");
    let inflight = queue.dequeue().expect("dequeue").expect("some job");
    let stem = inflight
        .path
        .file_stem()
        .unwrap()
        .to_string_lossy()
        .into_owned();

    queue.mark_failed(inflight, "ffmpeg exited with status 1").expect("mark_failed");

    let failed_path = queue.layout.failed_dir.join(format!("{stem}.failed"));
    let reason_path = queue.layout.failed_dir.join(format!("{stem}.failed.reason"));
    assert!(failed_path.exists());
    assert_eq!(
        std::fs::read_to_string(reason_path).expect("read reason"),
        "ffmpeg exited with status 1"
    );
}

#[test]
fn recover_inflight_moves_orphaned_jobs_back_to_the_queue() {
    let dir = tempfile::tempdir().expect("tempdir");
    let queue = EncodeQueue::new(dir.path()).expect("new");
    queue
        .enqueue(&fake_encode_job("alice", "/rec/alice-1.mp4"))
        .expect("enqueue");
    let inflight = queue.dequeue().expect("dequeue").expect("some job");
    // Simulate a crash: the inflight file is left behind, `inflight` itself
    // (and its Drop, if any) is discarded without calling mark_done/failed.
    std::mem::forget(inflight);

    let recovered = queue.recover_inflight().expect("recover_inflight");
    assert_eq!(recovered, 1);

    let requeued = queue.dequeue().expect("dequeue").expect("some job");
    assert_eq!(requeued.job().username, "alice");
}

#[test]
fn two_consumers_racing_the_same_job_file_only_one_wins() {
    let dir = tempfile::tempdir().expect("tempdir");
    let queue = EncodeQueue::new(dir.path()).expect("new");
    queue
        .enqueue(&fake_encode_job("alice", "/rec/alice-1.mp4"))
        .expect("enqueue");

    let first = queue.dequeue().expect("dequeue");
    let second = queue.dequeue().expect("dequeue");
    assert!(first.is_some());
    assert!(second.is_none());
}
