use crate::error::Error;

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Locations of every external binary the pipeline shells out to, resolved
/// once at startup and passed down.
pub struct Tools {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    pub mkvmerge: PathBuf,
    pub upscaler: PathBuf,
    pub models: PathBuf,
}

impl Tools {
    pub fn resolve() -> Result<Self, Error> {
        let base = Self::base_bin_dir()?;
        Ok(Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            mkvmerge: PathBuf::from("mkvmerge"),
            upscaler: Self::upscaler_binary(&base)?,
            models: base.join("models"),
        })
    }

    /// Checks that every tool can actually be launched. The upscaler is only
    /// required when frames are really upscaled.
    pub fn validate(&self, pretend: bool) -> Result<(), Error> {
        Self::check_binary(&self.ffmpeg)?;
        Self::check_binary(&self.ffprobe)?;
        Self::check_binary(&self.mkvmerge)?;
        if !pretend && !self.upscaler.is_file() {
            return Err(Error::BinaryNotFound(
                self.upscaler.display().to_string(),
            ));
        }
        Ok(())
    }

    fn base_bin_dir() -> Result<PathBuf, Error> {
        let exe = env::current_exe()?;
        Ok(exe
            .parent()
            .map(|dir| dir.join("bin"))
            .unwrap_or_else(|| PathBuf::from("bin")))
    }

    fn upscaler_binary(base: &Path) -> Result<PathBuf, Error> {
        let platform = if cfg!(target_os = "macos") {
            "mac"
        } else if cfg!(target_os = "linux") {
            "linux"
        } else if cfg!(target_os = "windows") {
            "win"
        } else {
            return Err(Error::UnsupportedPlatform(env::consts::OS));
        };
        let binary = if cfg!(target_os = "windows") {
            "realesrgan-ncnn-vulkan.exe"
        } else {
            "realesrgan-ncnn-vulkan"
        };
        Ok(base.join("realesrgan").join(platform).join(binary))
    }

    fn check_binary(program: &Path) -> Result<(), Error> {
        Command::new(program)
            .arg("--version")
            .output()
            .map(|_| ())
            .map_err(|_| Error::BinaryNotFound(program.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upscaler_binary_is_platform_specific() {
        let path = Tools::upscaler_binary(Path::new("/opt/app/bin")).unwrap();
        let path = path.to_string_lossy();
        assert!(path.starts_with("/opt/app/bin"));
        assert!(path.contains("realesrgan"));
        assert!(path.contains("realesrgan-ncnn-vulkan"));
    }

    #[test]
    fn check_binary_reports_missing_tool() {
        let result = Tools::check_binary(Path::new("definitely-not-a-real-binary"));
        assert!(matches!(result, Err(Error::BinaryNotFound(_))));
    }
}
