// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;
use std::time::Duration;

use super::*;

fn fake_probe_selective(dir: &Path, live_users: &[&str]) -> PathBuf {
    let path = dir.join("fake-probe-selective");
    let allow = live_users.join(" ");
    let body = format!(
        "#!/bin/sh\nuser=\"$1\"\nfor u in {allow}; do\n  if [ \"$u\" = \"$user\" ]; then\n    echo \"https://example.test/$user\"\n    exit 0\n  fi\ndone\nexit 1\n"
    );
    std::fs::write(&path, &body).expect("write fake probe");
    let mut perms = std::fs::metadata(&path).expect("stat").permissions();
    std::os::unix::fs::PermissionsExt::set_mode(&mut perms, 0o755);
    std::fs::set_permissions(&path, perms).expect("chmod");
    path
}

fn make_poller(dir: &Path, live_users: &[&str], record_limit: usize) -> Poller {
    Poller::new(
        dir.join("users.txt"),
        dir.join("active-users"),
        dir.join("slots"),
        record_limit,
        dir.join("poller").join("status.json"),
        ProbeTool::new(fake_probe_selective(dir, live_users)),
        Duration::from_secs(5),
        4,
        Duration::from_millis(50),
        OsString::from("echo"),
        Vec::new(),
        dir.join("logs"),
    )
}

#[test]
fn parse_users_file_ignores_comments_and_blanks() {
    let text = "alice\n# a comment\n\n  bob  \n#another\ncarol\n";
    assert_eq!(
        parse_users_file(text),
        vec!["alice".to_string(), "bob".to_string(), "carol".to_string()]
    );
}

#[test]
fn parse_users_file_on_empty_input_yields_no_users() {
    assert!(parse_users_file("").is_empty());
    assert!(parse_users_file("# only comments\n\n").is_empty());
}

#[tokio::test]
async fn missing_users_file_is_treated_as_an_empty_list() {
    let dir = tempfile::tempdir().expect("tempdir");
    let poller = make_poller(dir.path(), &[], 2);
    assert!(poller.read_users_file().expect("read").is_empty());
}

#[tokio::test]
async fn locked_user_is_excluded_from_candidates() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("users.txt"), "alice\nbob\n").expect("write users");
    let poller = make_poller(dir.path(), &["alice", "bob"], 2);

    let _guard = acquire_user_lock(&dir.path().join("active-users"), "alice").expect("lock alice");

    assert!(!poller.is_user_free("alice"));
    assert!(poller.is_user_free("bob"));
}

#[tokio::test]
async fn cycle_spawns_live_users_up_to_free_slot_count() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("users.txt"), "alice\nbob\ncarol\n").expect("write users");
    let poller = make_poller(dir.path(), &["alice", "carol"], 2);

    poller.cycle(1).await.expect("cycle");

    let status_text = std::fs::read_to_string(dir.path().join("poller").join("status.json")).expect("read status");
    let status: PollerStatus = serde_json::from_str(&status_text).expect("parse status");
    assert_eq!(status.live_now, vec!["alice".to_string(), "carol".to_string()]);
    assert_eq!(status.spawned_now, vec!["alice".to_string(), "carol".to_string()]);
    assert_eq!(status.cycle_count, 1);
}

#[tokio::test]
async fn cycle_still_probes_but_does_not_spawn_when_no_slots_are_free() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("users.txt"), "alice\n").expect("write users");
    let poller = make_poller(dir.path(), &["alice"], 1);

    let registry = SlotRegistry::new(dir.path().join("slots"), 1);
    let _slot = registry
        .acquire("someone-already-recording", true, Duration::from_millis(10))
        .await
        .expect("occupy the only slot");

    poller.cycle(1).await.expect("cycle");

    let status_text = std::fs::read_to_string(dir.path().join("poller").join("status.json")).expect("read status");
    let status: PollerStatus = serde_json::from_str(&status_text).expect("parse status");
    assert_eq!(status.live_now, vec!["alice".to_string()]);
    assert!(status.spawned_now.is_empty());
}

#[tokio::test]
async fn run_exits_promptly_on_shutdown_and_removes_the_status_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("users.txt"), "alice\n").expect("write users");
    let poller = make_poller(dir.path(), &[], 2);

    let (tx, rx) = watch::channel(false);
    let handle = tokio::spawn(async move { poller.run(rx).await });

    tokio::time::sleep(Duration::from_millis(150)).await;
    tx.send(true).expect("send shutdown");
    handle.await.expect("join").expect("run ok");

    assert!(!dir.path().join("poller").join("status.json").exists());
}
