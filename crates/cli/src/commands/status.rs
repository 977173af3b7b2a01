// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `twr status` - one-shot overview: live recording slots plus whatever the
//! two daemons last wrote to their status heartbeats.

use clap::Args;
use twr_core::config::Config;
use twr_core::paths;
use twr_core::schema::{EncoderStatus, PollerStatus};
use twr_storage::SlotRegistry;

#[derive(Args)]
pub struct StatusArgs {
    /// Print as JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: StatusArgs, config: &Config) -> anyhow::Result<()> {
    let registry = SlotRegistry::new(paths::slot_registry_dir(), config.limits.record_limit);
    let owners = registry.enumerate().unwrap_or_default();

    let poller = read_status::<PollerStatus>(&paths::poller_status_path(&config.paths.logs_dir));
    let encoder = read_status::<EncoderStatus>(&paths::encoder_status_path(&config.paths.logs_dir));

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "slots": {
                    "used": owners.len(),
                    "limit": config.limits.record_limit,
                    "owners": owners,
                },
                "poller": poller,
                "encoder": encoder,
            })
        );
        return Ok(());
    }

    println!("slots: {}/{} in use", owners.len(), config.limits.record_limit);
    for owner in &owners {
        println!("  slot holder: user={} pid={} since={}", owner.username, owner.pid, owner.started_at);
    }

    match poller {
        Some(p) => println!(
            "poller: running (pid {}), cycle {}, live now: {}",
            p.pid,
            p.cycle_count,
            if p.live_now.is_empty() { "<none>".to_string() } else { p.live_now.join(", ") }
        ),
        None => println!("poller: not running"),
    }

    match encoder {
        Some(e) => println!(
            "encode daemon: running (pid {}), state {:?}, job {}",
            e.pid,
            e.state,
            e.current_job.as_deref().unwrap_or("<none>")
        ),
        None => println!("encode daemon: not running"),
    }

    Ok(())
}

fn read_status<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Option<T> {
    let text = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&text).ok()
}
