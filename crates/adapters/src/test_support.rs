// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake shell-script external tools for other crates' tests: small,
//! deterministic stand-ins for the capture/probe/mux/transcode binaries
//! this crate wraps.

use std::path::{Path, PathBuf};

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).expect("write fake tool script");
    let mut perms = std::fs::metadata(&path)
        .expect("stat fake tool script")
        .permissions();
    std::os::unix::fs::PermissionsExt::set_mode(&mut perms, 0o755);
    std::fs::set_permissions(&path, perms).expect("chmod fake tool script");
    path
}

/// A capture tool that always writes a nonempty segment and exits 0.
pub fn fake_capture_success(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "fake-capture-success",
        "#!/bin/sh\nout=\"\"\nfor arg; do out=\"$arg\"; done\necho segment > \"$out\"\nexit 0\n",
    )
}

/// A capture tool that always fails without producing output.
pub fn fake_capture_failure(dir: &Path) -> PathBuf {
    write_script(dir, "fake-capture-failure", "#!/bin/sh\nexit 1\n")
}

/// A capture tool that fails `n` times (no output, exit 1), then on the
/// `n`-th plus first invocation writes a segment and exits 0. State is
/// tracked in a counter file colocated with the script.
pub fn fake_capture_fail_n_then_succeed(dir: &Path, n: u32) -> PathBuf {
    let counter = dir.join("fake-capture-counter");
    std::fs::write(&counter, "0").expect("init fake capture counter");
    let body = format!(
        "#!/bin/sh\n\
         counter=\"{counter}\"\n\
         count=$(cat \"$counter\")\n\
         count=$((count + 1))\n\
         echo \"$count\" > \"$counter\"\n\
         out=\"\"\n\
         for arg; do out=\"$arg\"; done\n\
         if [ \"$count\" -le {n} ]; then\n\
         exit 1\n\
         fi\n\
         echo segment > \"$out\"\n\
         exit 0\n",
        counter = counter.display(),
        n = n,
    );
    write_script(dir, "fake-capture-fail-n", &body)
}

/// A capture tool that writes a nonempty segment on every invocation but
/// always exits 1 — simulating a stream that crashes shortly after writing
/// a few bytes, over and over, rather than ever completing cleanly.
pub fn fake_capture_produce_then_fail_forever(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "fake-capture-produce-then-fail",
        "#!/bin/sh\nout=\"\"\nfor arg; do out=\"$arg\"; done\necho partial > \"$out\"\nexit 1\n",
    )
}

/// A probe tool that reports `user` as live, printing `url` on stdout.
pub fn fake_probe_live(dir: &Path, url: &str) -> PathBuf {
    write_script(
        dir,
        "fake-probe-live",
        &format!("#!/bin/sh\necho '{url}'\nexit 0\n"),
    )
}

/// A probe tool that reports every user as not live.
pub fn fake_probe_not_live(dir: &Path) -> PathBuf {
    write_script(dir, "fake-probe-not-live", "#!/bin/sh\nexit 1\n")
}

/// A mux tool implementing both the `merge` and `remux` subcommands used
/// by [`crate::mux::MuxTool`]: `merge` concatenates its input files into
/// the `--output` path; `remux` copies its (single) input to `--output`.
pub fn fake_mux_tool(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "fake-mux",
        "#!/bin/sh\n\
         mode=\"$1\"\n\
         shift\n\
         inputs=\"\"\n\
         out=\"\"\n\
         while [ $# -gt 0 ]; do\n\
         case \"$1\" in\n\
         --output) out=\"$2\"; shift 2 ;;\n\
         --faststart) shift ;;\n\
         *) inputs=\"$inputs $1\"; shift ;;\n\
         esac\n\
         done\n\
         cat $inputs > \"$out\"\n\
         exit 0\n",
    )
}

/// A transcode tool that sleeps briefly (so tests can pause/resume it),
/// then writes its `--output` path and exits 0. Honors `SIGTERM` via the
/// default shell signal handling (no trap needed); `SIGSTOP`/`SIGCONT`
/// are handled by the kernel without the script's involvement.
pub fn fake_transcode_tool(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "fake-transcode",
        "#!/bin/sh\n\
         out=\"\"\n\
         prev=\"\"\n\
         for arg; do\n\
         if [ \"$prev\" = \"--output\" ]; then out=\"$arg\"; fi\n\
         prev=\"$arg\"\n\
         done\n\
         sleep 2\n\
         echo transcoded > \"$out\"\n\
         exit 0\n",
    )
}
