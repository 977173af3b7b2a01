//! `twr encode-mode on|off|status`.

use crate::prelude::*;

#[test]
fn defaults_to_on() {
    let project = Project::empty();
    project
        .twr()
        .args(["encode-mode", "status"])
        .passes()
        .stdout_has("encode-mode: on");
}

#[test]
fn toggling_off_then_on_round_trips() {
    let project = Project::empty();
    project.twr().args(["encode-mode", "off"]).passes().stdout_has("encode-mode: off");
    project
        .twr()
        .args(["encode-mode", "status"])
        .passes()
        .stdout_has("encode-mode: off");

    project.twr().args(["encode-mode", "on"]).passes().stdout_has("encode-mode: on");
    project
        .twr()
        .args(["encode-mode", "status"])
        .passes()
        .stdout_has("encode-mode: on");
}
