//! `twr record` end to end against fake capture/mux tools.

use crate::prelude::*;
use twr_adapters::test_support::{fake_capture_failure, fake_capture_success, fake_mux_tool};

#[test]
fn records_a_live_user_and_finalizes_an_mp4() {
    let project = Project::empty();
    let capture = fake_capture_success(project.path());
    let mux = fake_mux_tool(project.path());

    project
        .twr()
        .args([
            "record",
            "alice",
            "--capture-bin",
            capture.to_str().unwrap(),
            "--mux-bin",
            mux.to_str().unwrap(),
        ])
        .passes()
        .stdout_has("recorded alice-");

    let finalized: Vec<_> = std::fs::read_dir(project.record_dir())
        .expect("read record dir")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert!(
        finalized.iter().any(|name| name.starts_with("alice-")),
        "expected a finalized alice-* artifact, found {finalized:?}"
    );
}

#[test]
fn not_live_user_exits_with_not_live_code() {
    let project = Project::empty();
    let capture = fake_capture_failure(project.path());
    let mux = fake_mux_tool(project.path());

    project
        .twr()
        .args([
            "record",
            "bob",
            "--capture-bin",
            capture.to_str().unwrap(),
            "--mux-bin",
            mux.to_str().unwrap(),
        ])
        .code_is(4);
}

#[test]
fn recorded_user_with_encode_mode_off_is_not_enqueued() {
    let project = Project::empty();
    let capture = fake_capture_success(project.path());
    let mux = fake_mux_tool(project.path());

    project.twr().args(["encode-mode", "off"]).passes();

    project
        .twr()
        .args([
            "record",
            "carol",
            "--capture-bin",
            capture.to_str().unwrap(),
            "--mux-bin",
            mux.to_str().unwrap(),
        ])
        .passes()
        .stdout_has("recorded carol-");

    let jobs_dir = project.queue_dir().join("jobs");
    let queued = std::fs::read_dir(&jobs_dir).map(|d| d.count()).unwrap_or(0);
    assert_eq!(queued, 0, "encode-mode off must not enqueue a job");
}

#[test]
fn invalid_username_is_rejected_before_touching_the_filesystem() {
    let project = Project::empty();
    project
        .twr()
        .args(["record", "../escape"])
        .code_is(2)
        .stderr_has("not a valid username");
}
