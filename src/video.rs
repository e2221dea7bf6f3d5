use crate::error::Error;
use crate::process;
use crate::tools::Tools;

use std::path::Path;
use std::process::Command;

use tracing::warn;

/// Frame rate and frame count of the first video stream, probed once per
/// run and read-only afterward. The frame rate keeps ffprobe's rational
/// form so it can be handed back to ffmpeg unchanged.
pub struct VideoMetadata {
    pub frame_rate: String,
    pub frame_count: Option<u64>,
}

impl VideoMetadata {
    pub const DEFAULT_FRAME_RATE: &'static str = "23.97";

    pub fn probe(tools: &Tools, input: &Path) -> Result<Self, Error> {
        let name = process::program_name(&tools.ffprobe);
        let output = Command::new(&tools.ffprobe)
            .args([
                "-hide_banner",
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-count_frames",
                "-show_entries",
                "stream=nb_read_frames,r_frame_rate",
                "-of",
                "default=noprint_wrappers=1",
            ])
            .arg(input)
            .output()
            .map_err(|e| process::spawn_error(&name, e))?;
        process::check_status(&name, output.status)?;

        let metadata = Self::parse(&String::from_utf8_lossy(&output.stdout));
        if metadata.frame_count.is_none() {
            warn!("Total frame count unavailable; progress totals will be unknown");
        }
        Ok(metadata)
    }

    fn parse(data: &str) -> Self {
        let mut frame_rate = None;
        let mut frame_count = None;
        for line in data.lines() {
            if let Some((key, value)) = line.split_once('=') {
                let value = value.trim();
                match key {
                    "nb_read_frames" => frame_count = value.parse().ok(),
                    "r_frame_rate" => {
                        frame_rate =
                            parse_frame_rate(value).map(|_| value.to_string())
                    }
                    _ => {}
                }
            }
        }
        let frame_rate = frame_rate.unwrap_or_else(|| {
            warn!(
                "Frame rate unavailable; assuming {} fps",
                Self::DEFAULT_FRAME_RATE
            );
            Self::DEFAULT_FRAME_RATE.to_string()
        });
        Self {
            frame_rate,
            frame_count,
        }
    }
}

/// Evaluates an ffprobe rational like `24000/1001`; plain decimals are
/// accepted too. Rejects rates that are not positive finite numbers.
pub fn parse_frame_rate(value: &str) -> Option<f64> {
    let rate = if let Some((num, den)) = value.split_once('/') {
        num.parse::<f64>().ok()? / den.parse::<f64>().ok()?
    } else {
        value.parse::<f64>().ok()?
    };
    (rate.is_finite() && rate > 0.0).then_some(rate)
}
