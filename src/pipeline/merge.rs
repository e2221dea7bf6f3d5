use crate::error::Error;
use crate::process;
use crate::progress::{StageBar, StageCounter};
use crate::tools::Tools;
use crate::workspace::Workspace;

use std::path::Path;

/// Muxes the reassembled video together with the original file's audio and
/// subtitle tracks into the final output.
pub struct Merge;

impl Merge {
    pub fn execute(
        original: &Path,
        tools: &Tools,
        workspace: &Workspace,
        output: &Path,
    ) -> Result<(), Error> {
        let bar = StageBar::new("Rebuilding Video", Some(100));
        let mut counter = StageCounter::new(Some(100));

        let args = Self::build_args(original, &workspace.merged_file, output);
        process::run(&tools.mkvmerge, &args, |line| {
            if let Some(percent) = parse_gui_progress(line) {
                bar.update(&counter.set_completed(percent.min(100)));
            }
        })?;

        bar.finish(&counter.finish());
        Ok(())
    }

    fn build_args(original: &Path, merged: &Path, output: &Path) -> Vec<String> {
        vec![
            "--output".to_string(),
            output.display().to_string(),
            "--no-video".to_string(),
            "--language".to_string(),
            "1:en".to_string(),
            "--track-name".to_string(),
            "1:Stereo".to_string(),
            "--sub-charset".to_string(),
            "2:UTF-8".to_string(),
            "--language".to_string(),
            "2:en".to_string(),
            "--track-name".to_string(),
            "2:English".to_string(),
            original.display().to_string(),
            "--no-track-tags".to_string(),
            "--no-global-tags".to_string(),
            "--language".to_string(),
            "0:und".to_string(),
            merged.display().to_string(),
            "--track-order".to_string(),
            "1:0,0:1,0:2".to_string(),
            "--gui-mode".to_string(),
        ]
    }
}

/// `#GUI#progress N%` lines from mkvmerge's machine-readable mode.
pub fn parse_gui_progress(line: &str) -> Option<u64> {
    line.trim()
        .strip_prefix("#GUI#progress")?
        .trim()
        .strip_suffix('%')?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mux_argv_matches_the_tool_contract() {
        let args = Merge::build_args(
            Path::new("/videos/episode.mkv"),
            Path::new("/tmp/scaled-abc123/tmp_episode.mkv"),
            Path::new("/videos/out/episode.mkv"),
        );
        assert_eq!(
            args,
            [
                "--output",
                "/videos/out/episode.mkv",
                "--no-video",
                "--language",
                "1:en",
                "--track-name",
                "1:Stereo",
                "--sub-charset",
                "2:UTF-8",
                "--language",
                "2:en",
                "--track-name",
                "2:English",
                "/videos/episode.mkv",
                "--no-track-tags",
                "--no-global-tags",
                "--language",
                "0:und",
                "/tmp/scaled-abc123/tmp_episode.mkv",
                "--track-order",
                "1:0,0:1,0:2",
                "--gui-mode",
            ]
        );
    }

    #[test]
    fn gui_progress_lines_yield_percentages() {
        assert_eq!(parse_gui_progress("#GUI#progress 0%"), Some(0));
        assert_eq!(parse_gui_progress("#GUI#progress 42%"), Some(42));
        assert_eq!(parse_gui_progress("#GUI#progress 100%"), Some(100));
        assert_eq!(parse_gui_progress("#GUI#begin_scanning"), None);
        assert_eq!(parse_gui_progress("Progress: 42%"), None);
    }
}
