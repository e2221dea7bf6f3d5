use super::extract::{parse_progress_frames, FRAME_PATTERN};
use crate::error::Error;
use crate::process;
use crate::progress::{StageBar, StageCounter};
use crate::tools::Tools;
use crate::video::VideoMetadata;
use crate::workspace::Workspace;

use std::path::Path;

pub struct Import;

impl Import {
    pub fn execute(
        tools: &Tools,
        workspace: &Workspace,
        metadata: &VideoMetadata,
    ) -> Result<(), Error> {
        let bar = StageBar::new("Importing Frames", metadata.frame_count);
        let mut counter = StageCounter::new(metadata.frame_count);

        let args = Self::build_args(
            &workspace.scaled_frames,
            &workspace.merged_file,
            &metadata.frame_rate,
        );
        process::run(&tools.ffmpeg, &args, |line| {
            if let Some(frames) = parse_progress_frames(line) {
                bar.update(&counter.set_completed(frames));
            }
        })?;

        bar.finish(&counter.finish());
        Ok(())
    }

    fn build_args(frames_dir: &Path, output: &Path, frame_rate: &str) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-nostats".to_string(),
            "-progress".to_string(),
            "pipe:1".to_string(),
            "-framerate".to_string(),
            frame_rate.to_string(),
            "-i".to_string(),
            frames_dir.join(FRAME_PATTERN).display().to_string(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-y".to_string(),
            output.display().to_string(),
        ]
    }
}
