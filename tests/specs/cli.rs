//! Top-level CLI surface: help text, version, and the usage-error exit code.

use crate::prelude::*;

#[test]
fn no_args_shows_usage_and_exits_with_usage_code() {
    let project = Project::empty();
    // clap's own "missing subcommand" error exits 2, matching the usage
    // bucket of the process exit-code contract.
    project.twr().code_is(2).stderr_has("Usage:");
}

#[test]
fn help_flag_shows_usage() {
    let project = Project::empty();
    project.twr().args(["--help"]).passes().stdout_has("Usage:");
}

#[test]
fn record_help_lists_its_flags() {
    let project = Project::empty();
    project
        .twr()
        .args(["record", "--help"])
        .passes()
        .stdout_has("--capture-bin")
        .stdout_has("--fail-fast");
}

#[test]
fn poller_help_lists_subcommands() {
    let project = Project::empty();
    project
        .twr()
        .args(["poller", "--help"])
        .passes()
        .stdout_has("run")
        .stdout_has("stop")
        .stdout_has("status");
}

#[test]
fn unknown_subcommand_exits_with_usage_code() {
    let project = Project::empty();
    project.twr().args(["not-a-real-command"]).code_is(2);
}
