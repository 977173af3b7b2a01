// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `twr users list|add|remove` - maintain the Poller's plain-text users
//! file. One name per line; blank lines and `#`-prefixed comments are
//! preserved as-is so operators can annotate the file by hand between
//! `twr users` invocations.

use clap::{Args, Subcommand};
use twr_core::config::Config;
use twr_core::{paths, ErrorKind};

use crate::exit_error::exit_error;

#[derive(Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Subcommand)]
pub enum UsersCommand {
    /// Print the usernames the Poller currently watches
    List,
    /// Add a username to the users file (no-op if already present)
    Add { username: String },
    /// Remove a username from the users file
    Remove { username: String },
}

pub async fn run(args: UsersArgs, config: &Config) -> anyhow::Result<()> {
    let path = &config.poller.users_file;
    match args.command {
        UsersCommand::List => {
            for username in active_usernames(path)? {
                println!("{username}");
            }
            Ok(())
        }
        UsersCommand::Add { username } => add(path, &username),
        UsersCommand::Remove { username } => remove(path, &username),
    }
}

/// The usernames the Poller would actually read: comments and blanks
/// stripped, matching `twr_daemon::poller`'s own parsing.
fn active_usernames(path: &std::path::Path) -> anyhow::Result<Vec<String>> {
    let text = read_or_empty(path)?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

fn add(path: &std::path::Path, username: &str) -> anyhow::Result<()> {
    if !paths::is_filename_safe_username(username) {
        return Err(exit_error(ErrorKind::Config, format!("'{username}' is not a valid username")));
    }
    if active_usernames(path)?.iter().any(|u| u == username) {
        println!("{username} is already in the users file");
        return Ok(());
    }

    let mut text = read_or_empty(path)?;
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(username);
    text.push('\n');
    write(path, &text)?;
    println!("added {username}");
    Ok(())
}

fn remove(path: &std::path::Path, username: &str) -> anyhow::Result<()> {
    let text = read_or_empty(path)?;
    let kept: Vec<&str> = text
        .lines()
        .filter(|line| line.trim() != username)
        .collect();

    if kept.len() == text.lines().count() {
        println!("{username} was not in the users file");
        return Ok(());
    }

    let mut new_text = kept.join("\n");
    if !new_text.is_empty() {
        new_text.push('\n');
    }
    write(path, &new_text)?;
    println!("removed {username}");
    Ok(())
}

fn read_or_empty(path: &std::path::Path) -> anyhow::Result<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(exit_error(ErrorKind::Internal, format!("{}: {e}", path.display()))),
    }
}

fn write(path: &std::path::Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| exit_error(ErrorKind::Internal, format!("{}: {e}", parent.display())))?;
    }
    twr_core::fsutil::atomic_write(path, text.as_bytes())
        .map_err(|e| exit_error(ErrorKind::Internal, format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_list_then_remove_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("users.txt");

        add(&path, "alice").expect("add alice");
        add(&path, "bob").expect("add bob");
        assert_eq!(active_usernames(&path).expect("list"), vec!["alice", "bob"]);

        remove(&path, "alice").expect("remove alice");
        assert_eq!(active_usernames(&path).expect("list"), vec!["bob"]);
    }

    #[test]
    fn add_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("users.txt");
        add(&path, "alice").expect("add 1");
        add(&path, "alice").expect("add 2");
        assert_eq!(active_usernames(&path).expect("list"), vec!["alice"]);
    }

    #[test]
    fn comments_and_blanks_are_ignored_by_list() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("users.txt");
        std::fs::write(&path, "# comment\n\nalice\n").expect("write");
        assert_eq!(active_usernames(&path).expect("list"), vec!["alice"]);
    }

    #[test]
    fn add_rejects_unsafe_username() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("users.txt");
        assert!(add(&path, "../etc/passwd").is_err());
    }
}
