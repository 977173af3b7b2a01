// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wraps the external transcode tool as a [`Pausable`] handle, so the
//! Encode Daemon can `SIGSTOP`/`SIGCONT` it mid-run in response to an
//! active recording slot rather than waiting for it to finish.

use std::path::Path;

use tokio::process::Command;
use tracing::debug;
use twr_core::schema::{EncodeParams, FpsValue};
use twr_shell::Pausable;

use crate::error::AdapterError;

#[derive(Debug, Clone)]
pub struct TranscodeTool {
    pub binary: std::path::PathBuf,
}

impl TranscodeTool {
    pub fn new(binary: impl Into<std::path::PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Spawn the transcode tool against `input`, writing `output`. The
    /// tool need not know it is being paused: suspension happens entirely
    /// at the OS level via the returned handle.
    pub fn spawn(
        &self,
        input: &Path,
        output: &Path,
        params: &EncodeParams,
    ) -> Result<Pausable, AdapterError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("transcode")
            .arg(input)
            .arg("--output")
            .arg(output)
            .arg("--height")
            .arg(params.height.to_string())
            .arg("--fps")
            .arg(fps_arg(&params.fps))
            .arg("--crf")
            .arg(params.crf.to_string())
            .arg("--preset")
            .arg(&params.preset)
            .arg("--threads")
            .arg(params.threads.to_string())
            .arg("--loglevel")
            .arg(&params.loglevel)
            .arg("--audio-bitrate")
            .arg(format!("{}k", params.audio_bitrate_kbps));

        debug!(input = %input.display(), output = %output.display(), height = params.height, crf = params.crf, "spawning transcode");

        Pausable::spawn(cmd).map_err(AdapterError::Transcode)
    }
}

fn fps_arg(fps: &FpsValue) -> String {
    match fps {
        FpsValue::Auto(_) => "auto".to_string(),
        FpsValue::Number(n) => n.to_string(),
        FpsValue::Ratio(r) => r.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twr_core::schema::AutoMarker;

    fn params() -> EncodeParams {
        EncodeParams {
            height: 1080,
            fps: FpsValue::Auto(AutoMarker),
            crf: 23,
            preset: "medium".into(),
            threads: 4,
            loglevel: "warning".into(),
            audio_bitrate_kbps: 160,
        }
    }

    #[tokio::test]
    async fn spawn_pauses_resumes_and_completes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tool = TranscodeTool::new(crate::test_support::fake_transcode_tool(dir.path()));
        let input = dir.path().join("in.mp4");
        std::fs::write(&input, b"data").expect("write input");
        let output = dir.path().join("out.mp4");

        let mut handle = tool.spawn(&input, &output, &params()).expect("spawn");
        handle.pause().expect("pause");
        handle.resume().expect("resume");

        let status = handle.wait().await.expect("wait");
        assert!(status.success());
        assert!(output.exists());
    }
}
