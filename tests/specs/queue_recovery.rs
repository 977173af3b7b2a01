//! Recovering a job a crashed Encode Daemon left in `inflight/`, via
//! `twr clean` and `twr doctor`. Manipulates the queue directory layout
//! directly rather than going through `twr-storage`, since the integration
//! test binary only talks to the crate through its CLI surface.

use crate::prelude::*;

fn stash_inflight_job(project: &Project) -> std::path::PathBuf {
    let inflight_dir = project.queue_dir().join("inflight");
    std::fs::create_dir_all(&inflight_dir).expect("mkdir inflight");
    let job_path = inflight_dir.join("00000000000000000001-abcd1234.json");
    std::fs::write(
        &job_path,
        r#"{
            "id": "abcd1234",
            "input_path": "/tmp/does-not-matter.mp4",
            "base_name": "alice-20260101T000000Z",
            "username": "alice",
            "params": {
                "height": 1080,
                "fps": "auto",
                "crf": 23,
                "preset": "medium",
                "threads": 0,
                "loglevel": "warning",
                "audio_bitrate_kbps": 160
            },
            "enqueued_at": "2026-01-01T00:00:00Z"
        }"#,
    )
    .expect("write stranded job");
    job_path
}

#[test]
fn clean_recovers_a_job_stranded_in_inflight() {
    let project = Project::empty();
    let stranded = stash_inflight_job(&project);

    project
        .twr()
        .args(["clean"])
        .passes()
        .stdout_has("recovered 1 job(s)");

    assert!(!stranded.exists(), "job must be moved out of inflight/");
    let restored = project.queue_dir().join("jobs").join(stranded.file_name().unwrap());
    assert!(restored.exists(), "job must be restored to jobs/");

    project.twr().args(["clean"]).passes().stdout_has("nothing to clean");
}

#[test]
fn doctor_also_recovers_stranded_jobs() {
    let project = Project::empty();
    stash_inflight_job(&project);

    // Tools are still missing from PATH, so doctor exits nonzero overall,
    // but the queue recovery check itself must still run and succeed.
    project
        .twr()
        .args(["doctor"])
        .fails()
        .stdout_has("recovered 1 job(s)");
}
