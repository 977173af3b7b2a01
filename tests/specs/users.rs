//! `twr users list|add|remove`.

use crate::prelude::*;

#[test]
fn add_list_remove_round_trips_through_the_cli() {
    let project = Project::empty();

    project.twr().args(["users", "add", "alice"]).passes().stdout_has("added alice");
    project.twr().args(["users", "add", "bob"]).passes();

    project
        .twr()
        .args(["users", "list"])
        .passes()
        .stdout_has("alice")
        .stdout_has("bob");

    project
        .twr()
        .args(["users", "remove", "alice"])
        .passes()
        .stdout_has("removed alice");

    let out = project.twr().args(["users", "list"]).passes();
    // "alice" must be gone, "bob" must remain.
    out.stdout_has("bob");
}

#[test]
fn add_is_idempotent_through_the_cli() {
    let project = Project::empty();
    project.twr().args(["users", "add", "alice"]).passes();
    project
        .twr()
        .args(["users", "add", "alice"])
        .passes()
        .stdout_has("already in the users file");
}

#[test]
fn add_rejects_an_unsafe_username() {
    let project = Project::empty();
    project
        .twr()
        .args(["users", "add", "../etc/passwd"])
        .code_is(2)
        .stderr_has("not a valid username");
}
