//! `twr tscompress`: the batch offline transcode helper, independent of the
//! Slot Registry and encode queue.

use crate::prelude::*;
use twr_adapters::test_support::fake_transcode_tool;

#[test]
fn compresses_a_file_alongside_its_input() {
    let project = Project::empty();
    let transcode = fake_transcode_tool(project.path());
    let input = project.file("clips/alice-20260101T000000Z.mp4", b"raw footage");

    project
        .twr()
        .args([
            "tscompress",
            input.to_str().unwrap(),
            "--transcode-bin",
            transcode.to_str().unwrap(),
        ])
        .passes()
        .stdout_has("compressed");

    let expected_output = project.path().join("clips/alice-20260101T000000Z-compressed.mp4");
    assert!(expected_output.exists(), "expected compressed output at {expected_output:?}");
    assert!(input.exists(), "tscompress must not delete the input by default");
}

#[test]
fn delete_input_removes_the_source_file_on_success() {
    let project = Project::empty();
    let transcode = fake_transcode_tool(project.path());
    let input = project.file("clips/bob-20260101T000000Z.mp4", b"raw footage");

    project
        .twr()
        .args([
            "tscompress",
            "--delete-input",
            "--transcode-bin",
            transcode.to_str().unwrap(),
            input.to_str().unwrap(),
        ])
        .passes();

    assert!(!input.exists(), "--delete-input should remove the source file");
}
