use std::time::Duration;

use twr_adapters::test_support::{
    fake_capture_failure, fake_capture_fail_n_then_succeed, fake_capture_produce_then_fail_forever,
    fake_capture_success, fake_mux_tool,
};
use twr_core::schema::{AutoMarker, FpsValue};
use twr_core::SystemClock;

use super::*;

fn encode_params() -> EncodeParams {
    EncodeParams {
        height: 1080,
        fps: FpsValue::Auto(AutoMarker),
        crf: 23,
        preset: "medium".into(),
        threads: 0,
        loglevel: "warning".into(),
        audio_bitrate_kbps: 160,
    }
}

struct Harness {
    _dir: tempfile::TempDir,
    config: RecorderConfig,
    tools_dir: std::path::PathBuf,
}

fn harness(username: &str) -> Harness {
    let dir = tempfile::tempdir().expect("tempdir");
    let tools_dir = dir.path().join("tools");
    std::fs::create_dir_all(&tools_dir).expect("mkdir tools");

    let config = RecorderConfig {
        username: username.to_string(),
        quality: "best".into(),
        fail_fast: true,
        retry_delay: Duration::from_millis(5),
        retry_window: Duration::from_secs(2),
        record_dir: dir.path().join("recordings"),
        active_users_dir: dir.path().join("active-users"),
        slots_dir: dir.path().join("slots"),
        record_limit: 2,
        disk_free_min_bytes: 0,
        enable_remux: true,
        delete_ts_after_remux: true,
        queue_dir: dir.path().join("queue"),
        encode_params: encode_params(),
        auto_enqueue: true,
    };

    Harness {
        _dir: dir,
        config,
        tools_dir,
    }
}

#[tokio::test]
async fn successful_recording_finalizes_and_enqueues() {
    let h = harness("alice");
    let capture = CaptureTool::new(fake_capture_success(&h.tools_dir));
    let mux = MuxTool::new(fake_mux_tool(&h.tools_dir));

    let recorder = Recorder::new(h.config.clone(), capture, mux, SystemClock);
    let outcome = recorder.run().await.expect("run");

    let RecorderOutcome::Recorded { base_name, .. } = outcome else {
        panic!("expected Recorded outcome");
    };
    assert!(base_name.starts_with("alice-"));

    let mp4 = h.config.record_dir.join(format!("{base_name}.mp4"));
    assert!(mp4.exists(), "finalized mp4 should exist at {mp4:?}");

    let temp_dir = twr_core::paths::record_temp_dir(&h.config.record_dir);
    let leftovers: Vec<_> = std::fs::read_dir(&temp_dir)
        .expect("read temp dir")
        .filter_map(|e| e.ok())
        .collect();
    assert!(leftovers.is_empty(), "temp/ should be empty after finalize");

    let queue = twr_storage::EncodeQueue::new(&h.config.queue_dir).expect("queue");
    let job = queue.dequeue().expect("dequeue").expect("job present");
    assert_eq!(job.job().username, "alice");
    assert_eq!(job.job().input_path, mp4);
}

#[tokio::test]
async fn auto_enqueue_disabled_finalizes_without_a_job() {
    let mut h = harness("gina");
    h.config.auto_enqueue = false;
    let capture = CaptureTool::new(fake_capture_success(&h.tools_dir));
    let mux = MuxTool::new(fake_mux_tool(&h.tools_dir));

    let recorder = Recorder::new(h.config.clone(), capture, mux, SystemClock);
    let outcome = recorder.run().await.expect("run");

    let RecorderOutcome::Recorded { base_name, job_id } = outcome else {
        panic!("expected Recorded outcome");
    };
    assert_eq!(job_id, None);

    let mp4 = h.config.record_dir.join(format!("{base_name}.mp4"));
    assert!(mp4.exists(), "finalized mp4 should exist even without enqueuing");

    let queue = twr_storage::EncodeQueue::new(&h.config.queue_dir).expect("queue");
    assert!(queue.dequeue().expect("dequeue").is_none(), "nothing should be enqueued");
}

#[tokio::test]
async fn not_live_user_produces_no_artifact() {
    let mut h = harness("bob");
    h.config.retry_window = Duration::from_millis(60);
    let capture = CaptureTool::new(fake_capture_failure(&h.tools_dir));
    let mux = MuxTool::new(fake_mux_tool(&h.tools_dir));

    let recorder = Recorder::new(h.config.clone(), capture, mux, SystemClock);
    let outcome = recorder.run().await.expect("run");

    assert_eq!(outcome, RecorderOutcome::NotLive);
    assert!(!h.config.record_dir.join("bob").exists());
}

#[tokio::test]
async fn retry_window_recovers_after_transient_failures() {
    let h = harness("carol");
    let capture = CaptureTool::new(fake_capture_fail_n_then_succeed(&h.tools_dir, 3));
    let mux = MuxTool::new(fake_mux_tool(&h.tools_dir));

    let recorder = Recorder::new(h.config.clone(), capture, mux, SystemClock);
    let outcome = recorder.run().await.expect("run");

    assert!(matches!(outcome, RecorderOutcome::Recorded { .. }));
}

#[tokio::test]
async fn retry_window_gives_up_despite_repeated_partial_segments() {
    // A capture tool that writes a few bytes before crashing, every single
    // time, must not reset the retry window forever just because `produced`
    // is true on each attempt: the window should only reset on a capture
    // that actually ran for a full retry_window, so this still gives up.
    let mut h = harness("hank");
    h.config.retry_window = Duration::from_millis(150);
    h.config.retry_delay = Duration::from_millis(5);
    let capture = CaptureTool::new(fake_capture_produce_then_fail_forever(&h.tools_dir));
    let mux = MuxTool::new(fake_mux_tool(&h.tools_dir));

    let recorder = Recorder::new(h.config.clone(), capture, mux, SystemClock);
    let outcome = tokio::time::timeout(Duration::from_secs(5), recorder.run())
        .await
        .expect("capture loop should give up instead of looping forever")
        .expect("run");

    assert!(matches!(outcome, RecorderOutcome::Recorded { .. }));
}

#[tokio::test]
async fn second_recorder_for_same_user_is_user_busy() {
    let h = harness("dave");
    let capture = CaptureTool::new(fake_capture_success(&h.tools_dir));
    let mux = MuxTool::new(fake_mux_tool(&h.tools_dir));

    let _hold = twr_storage::acquire_user_lock(&h.config.active_users_dir, "dave")
        .expect("acquire user lock");

    let recorder = Recorder::new(h.config.clone(), capture, mux, SystemClock);
    let err = recorder.run().await.expect_err("expected UserBusy");
    assert!(matches!(err, RecorderError::UserBusy(_)));
}

#[tokio::test]
async fn busy_when_all_slots_held_and_fail_fast() {
    let mut h = harness("erin");
    h.config.record_limit = 1;
    std::fs::create_dir_all(&h.config.slots_dir).expect("mkdir slots");
    let registry = twr_storage::SlotRegistry::new(h.config.slots_dir.clone(), 1);
    let _held = registry
        .acquire("someone-else", true, Duration::from_millis(10))
        .await
        .expect("hold the only slot");

    let capture = CaptureTool::new(fake_capture_success(&h.tools_dir));
    let mux = MuxTool::new(fake_mux_tool(&h.tools_dir));
    let recorder = Recorder::new(h.config.clone(), capture, mux, SystemClock);

    let err = recorder.run().await.expect_err("expected Busy");
    assert!(matches!(err, RecorderError::Busy(_)));
}

#[tokio::test]
async fn disk_low_aborts_before_any_lock_is_taken() {
    let mut h = harness("frank");
    h.config.disk_free_min_bytes = u64::MAX;

    let capture = CaptureTool::new(fake_capture_success(&h.tools_dir));
    let mux = MuxTool::new(fake_mux_tool(&h.tools_dir));
    let recorder = Recorder::new(h.config.clone(), capture, mux, SystemClock);

    let err = recorder.run().await.expect_err("expected DiskLow");
    assert!(matches!(err, RecorderError::DiskLow { .. }));
    assert!(!h.config.active_users_dir.join("frank.lock").exists());
}
