use crate::error::Error;
use crate::process;
use crate::progress::{StageBar, StageCounter};
use crate::tools::Tools;
use crate::video::VideoMetadata;
use crate::workspace::Workspace;

use std::path::Path;

/// Zero-padded name shared by extraction and reassembly.
pub const FRAME_PATTERN: &str = "frame-%08d.png";

pub struct Extract;

impl Extract {
    pub fn execute(
        input: &Path,
        tools: &Tools,
        workspace: &Workspace,
        metadata: &VideoMetadata,
    ) -> Result<(), Error> {
        let bar = StageBar::new("Extracting Frames", metadata.frame_count);
        let mut counter = StageCounter::new(metadata.frame_count);

        let args = Self::build_args(input, &workspace.source_frames);
        process::run(&tools.ffmpeg, &args, |line| {
            if let Some(frames) = parse_progress_frames(line) {
                bar.update(&counter.set_completed(frames));
            }
        })?;

        bar.finish(&counter.finish());
        Ok(())
    }

    fn build_args(input: &Path, frames_dir: &Path) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-nostats".to_string(),
            "-progress".to_string(),
            "pipe:1".to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-qscale:v".to_string(),
            "1".to_string(),
            "-qmin".to_string(),
            "1".to_string(),
            "-qmax".to_string(),
            "1".to_string(),
            "-vsync".to_string(),
            "0".to_string(),
            "-y".to_string(),
            frames_dir.join(FRAME_PATTERN).display().to_string(),
        ]
    }
}

/// `frame=N` lines from ffmpeg's machine progress channel.
pub fn parse_progress_frames(line: &str) -> Option<u64> {
    line.strip_prefix("frame=")?.trim().parse().ok()
}
