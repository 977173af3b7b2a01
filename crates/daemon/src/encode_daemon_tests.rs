// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use twr_core::schema::AutoMarker;
use twr_storage::EncodeQueue;
use yare::parameterized;

use super::*;

fn sample_params() -> EncodeParams {
    EncodeParams {
        height: 1080,
        fps: FpsValue::Auto(AutoMarker),
        crf: 23,
        preset: "medium".into(),
        threads: 4,
        loglevel: "warning".into(),
        audio_bitrate_kbps: 160,
    }
}

fn sample_job(input_path: PathBuf) -> EncodeJob {
    EncodeJob {
        id: "job1".into(),
        input_path,
        base_name: "alice-20260101T000000Z".into(),
        username: "alice".into(),
        params: sample_params(),
        enqueued_at: "2026-01-01T00:00:00Z".into(),
    }
}

fn daemon_with(overrides: PartialEncodeDaemon) -> EncodeDaemon {
    EncodeDaemon::new(
        "/tmp/queue".into(),
        "/tmp/slots".into(),
        2,
        "/tmp/status.json".into(),
        TranscodeTool::new("/bin/true"),
        overrides,
        false,
    )
}

#[test]
fn effective_params_falls_through_to_job_snapshot_when_no_override_set() {
    let daemon = daemon_with(PartialEncodeDaemon::default());
    let params = daemon.effective_params(&sample_params());
    assert_eq!(params, sample_params());
}

#[parameterized(
    crf = { PartialEncodeDaemon { crf: Some(18), ..Default::default() } },
    preset = { PartialEncodeDaemon { preset: Some("veryslow".into()), ..Default::default() } },
    height = { PartialEncodeDaemon { height: Some(720), ..Default::default() } },
)]
fn effective_params_prefers_override_over_job_snapshot(overrides: PartialEncodeDaemon) {
    let daemon = daemon_with(overrides.clone());
    let params = daemon.effective_params(&sample_params());
    if let Some(crf) = overrides.crf {
        assert_eq!(params.crf, crf);
    }
    if let Some(preset) = &overrides.preset {
        assert_eq!(&params.preset, preset);
    }
    if let Some(height) = overrides.height {
        assert_eq!(params.height, height);
    }
}

#[test]
fn effective_params_parses_fps_override_string() {
    let daemon = daemon_with(PartialEncodeDaemon {
        fps: Some("30000/1001".into()),
        ..Default::default()
    });
    let params = daemon.effective_params(&sample_params());
    assert_eq!(params.fps, FpsValue::Ratio("30000/1001".into()));
}

#[test]
fn compressed_path_is_sibling_of_input_with_compressed_suffix() {
    let daemon = daemon_with(PartialEncodeDaemon::default());
    let job = sample_job(PathBuf::from("/rec/out/alice-20260101T000000Z.mp4"));
    assert_eq!(
        daemon.compressed_path(&job),
        PathBuf::from("/rec/out/alice-20260101T000000Z-compressed.mp4")
    );
}

#[tokio::test]
async fn successful_job_is_removed_from_queue_and_produces_compressed_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let queue_dir = dir.path().join("queue");
    let slots_dir = dir.path().join("slots");
    let status_path = dir.path().join("encoder").join("status.json");
    let input = dir.path().join("alice-20260101T000000Z.mp4");
    std::fs::write(&input, b"raw").expect("write input");

    let queue = EncodeQueue::new(&queue_dir).expect("queue");
    let job = sample_job(input.clone());
    queue.enqueue(&job).expect("enqueue");

    let transcode = TranscodeTool::new(twr_adapters::test_support::fake_transcode_tool(dir.path()));
    let daemon = EncodeDaemon::new(
        queue_dir.clone(),
        slots_dir,
        2,
        status_path,
        transcode,
        PartialEncodeDaemon::default(),
        false,
    )
    .with_intervals(Duration::from_millis(50), Duration::from_millis(50), Duration::from_secs(2));

    let (tx, rx) = watch::channel(false);
    let run_handle = tokio::spawn(async move { daemon.run(rx).await });

    tokio::time::sleep(Duration::from_millis(2500)).await;
    tx.send(true).expect("send shutdown");
    run_handle.await.expect("join").expect("run ok");

    let compressed = dir.path().join("alice-20260101T000000Z-compressed.mp4");
    assert!(compressed.exists());
    let remaining: Vec<_> = std::fs::read_dir(queue_dir.join("jobs"))
        .expect("read jobs dir")
        .collect();
    assert!(remaining.is_empty());
    assert!(input.exists(), "input kept unless delete_input_on_success");
}

#[tokio::test]
async fn failed_transcode_renames_job_to_failed_with_reason() {
    let dir = tempfile::tempdir().expect("tempdir");
    let queue_dir = dir.path().join("queue");
    let slots_dir = dir.path().join("slots");
    let status_path = dir.path().join("encoder").join("status.json");
    let input = dir.path().join("alice-20260101T000000Z.mp4");
    std::fs::write(&input, b"raw").expect("write input");

    let queue = EncodeQueue::new(&queue_dir).expect("queue");
    let job = sample_job(input.clone());
    queue.enqueue(&job).expect("enqueue");

    let transcode = TranscodeTool::new(fake_transcode_failure(dir.path()));
    let daemon = EncodeDaemon::new(
        queue_dir.clone(),
        slots_dir,
        2,
        status_path,
        transcode,
        PartialEncodeDaemon::default(),
        true,
    )
    .with_intervals(Duration::from_millis(50), Duration::from_millis(50), Duration::from_secs(2));

    let (tx, rx) = watch::channel(false);
    let run_handle = tokio::spawn(async move { daemon.run(rx).await });

    tokio::time::sleep(Duration::from_millis(500)).await;
    tx.send(true).expect("send shutdown");
    run_handle.await.expect("join").expect("run ok");

    let failed_dir = queue_dir.join("failed");
    let entries: Vec<_> = std::fs::read_dir(&failed_dir)
        .expect("read failed dir")
        .map(|e| e.expect("entry").file_name())
        .collect();
    assert!(entries.iter().any(|n| n.to_string_lossy().ends_with(".failed")));
    assert!(entries.iter().any(|n| n.to_string_lossy().ends_with(".failed.reason")));
    assert!(input.exists(), "input is never deleted on a failed transcode");
}

fn fake_transcode_failure(dir: &std::path::Path) -> PathBuf {
    let path = dir.join("fake-transcode-failure");
    std::fs::write(&path, "#!/bin/sh\nexit 1\n").expect("write fake failing tool");
    let mut perms = std::fs::metadata(&path).expect("stat").permissions();
    std::os::unix::fs::PermissionsExt::set_mode(&mut perms, 0o755);
    std::fs::set_permissions(&path, perms).expect("chmod");
    path
}
