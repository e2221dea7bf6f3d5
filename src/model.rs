use crate::error::Error;
use crate::process;
use crate::tools::Tools;

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use tracing::trace;

/// The fixed set of models shipped with the upscaler binary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Model {
    AnimeVideoV3,
    GanX4Plus,
    GanX4PlusAnime,
    NetX4Plus,
}

impl Model {
    pub fn name(&self) -> &'static str {
        match self {
            Model::AnimeVideoV3 => "realesr-animevideov3",
            Model::GanX4Plus => "realesrgan-x4plus",
            Model::GanX4PlusAnime => "realesrgan-x4plus-anime",
            Model::NetX4Plus => "realesrnet-x4plus",
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::AnimeVideoV3
    }
}

impl FromStr for Model {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Error> {
        match value {
            "realesr-animevideov3" => Ok(Model::AnimeVideoV3),
            "realesrgan-x4plus" => Ok(Model::GanX4Plus),
            "realesrgan-x4plus-anime" => Ok(Model::GanX4PlusAnime),
            "realesrnet-x4plus" => Ok(Model::NetX4Plus),
            _ => Err(Error::InvalidArgument(format!("model: {}", value))),
        }
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One frame in, one frame out. Implementations are interchangeable and
/// selected once per run.
pub trait FrameUpscaler: Send + Sync {
    fn upscale(&self, input: &Path, output: &Path) -> Result<(), Error>;
}

pub fn create_upscaler(
    tools: &Tools,
    model: Model,
    scale: usize,
    pretend: bool,
) -> Arc<dyn FrameUpscaler> {
    if pretend {
        Arc::new(Passthrough)
    } else {
        Arc::new(RealEsrgan::new(tools, model, scale))
    }
}

/// Shells out to realesrgan-ncnn-vulkan, one invocation per frame.
pub struct RealEsrgan {
    binary: PathBuf,
    models: PathBuf,
    model: Model,
    scale: usize,
}

impl RealEsrgan {
    pub fn new(tools: &Tools, model: Model, scale: usize) -> Self {
        Self {
            binary: tools.upscaler.clone(),
            models: tools.models.clone(),
            model,
            scale,
        }
    }

    fn build_args(&self, input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-i".to_string(),
            input.display().to_string(),
            "-o".to_string(),
            output.display().to_string(),
            "-s".to_string(),
            self.scale.to_string(),
            "-m".to_string(),
            self.models.display().to_string(),
            "-n".to_string(),
            self.model.name().to_string(),
            "-v".to_string(),
        ]
    }
}

impl FrameUpscaler for RealEsrgan {
    fn upscale(&self, input: &Path, output: &Path) -> Result<(), Error> {
        let args = self.build_args(input, output);
        process::run(&self.binary, &args, |line| {
            // the verbose stream prints one "done" line per finished frame
            if line.trim_end().ends_with("done") {
                trace!("{}", line);
            }
        })
    }
}

/// Pretend-mode worker: a byte-identical copy instead of a real upscale.
pub struct Passthrough;

impl FrameUpscaler for Passthrough {
    fn upscale(&self, input: &Path, output: &Path) -> Result<(), Error> {
        fs::copy(input, output)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace;

    #[test]
    fn model_names_round_trip() {
        for model in [
            Model::AnimeVideoV3,
            Model::GanX4Plus,
            Model::GanX4PlusAnime,
            Model::NetX4Plus,
        ] {
            assert_eq!(model.name().parse::<Model>().unwrap(), model);
        }
        assert!("waifu2x".parse::<Model>().is_err());
    }

    #[test]
    fn upscaler_argv_matches_the_binary_contract() {
        let upscaler = RealEsrgan {
            binary: PathBuf::from("/opt/bin/realesrgan-ncnn-vulkan"),
            models: PathBuf::from("/opt/bin/models"),
            model: Model::GanX4PlusAnime,
            scale: 2,
        };
        let args = upscaler.build_args(
            Path::new("/tmp/source/frame-00000001.png"),
            Path::new("/tmp/scaled/frame-00000001.png"),
        );
        assert_eq!(
            args,
            [
                "-i",
                "/tmp/source/frame-00000001.png",
                "-o",
                "/tmp/scaled/frame-00000001.png",
                "-s",
                "2",
                "-m",
                "/opt/bin/models",
                "-n",
                "realesrgan-x4plus-anime",
                "-v",
            ]
        );
    }

    #[test]
    fn passthrough_copies_bytes_unchanged() {
        let dir = workspace::create_temp_dir("source").unwrap();
        let input = dir.join("frame-00000001.png");
        let output = dir.join("copy.png");
        fs::write(&input, b"not really a png").unwrap();

        Passthrough.upscale(&input, &output).unwrap();
        assert_eq!(fs::read(&output).unwrap(), b"not really a png");
        workspace::remove_dir(&dir);
    }
}
