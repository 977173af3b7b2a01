//! `twr clean` and `twr doctor`: stale-state recovery and host diagnostics.

use crate::prelude::*;

#[test]
fn clean_on_a_fresh_project_finds_nothing() {
    let project = Project::empty();
    project.twr().args(["clean"]).passes().stdout_has("nothing to clean");
}

#[test]
fn clean_is_idempotent_after_finding_something() {
    let project = Project::empty();
    // A stale owner record for a pid that cannot possibly be alive.
    let slots_dir = project.runtime_dir().join("twitch-record-slots");
    std::fs::create_dir_all(&slots_dir).expect("mkdir slots dir");
    std::fs::write(
        slots_dir.join("slot1.owner"),
        r#"{"pid":4294967294,"username":"ghost","started_at":"2020-01-01T00:00:00Z"}"#,
    )
    .expect("write stale owner");

    project
        .twr()
        .args(["clean"])
        .passes()
        .stdout_has("swept 1 stale slot owner");

    project.twr().args(["clean"]).passes().stdout_has("nothing to clean");
}

#[test]
fn doctor_reports_missing_tools_and_exits_nonzero() {
    let project = Project::empty();
    project
        .twr()
        .args(["doctor"])
        .fails()
        .stdout_has("not found on PATH");
}

#[test]
fn doctor_reports_writable_directories() {
    let project = Project::empty();
    // Even with tools missing, the writability checks should still run and
    // report success for directories under our own tempdir.
    project
        .twr()
        .args(["doctor"])
        .fails()
        .stdout_has("record dir writable");
}
