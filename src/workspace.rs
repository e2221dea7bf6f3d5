use crate::error::Error;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Scratch space for one pipeline run: the extracted frames, the upscaled
/// frames, and the reassembled video written next to them before muxing.
pub struct Workspace {
    pub source_frames: PathBuf,
    pub scaled_frames: PathBuf,
    pub merged_file: PathBuf,
}

impl Workspace {
    pub fn create(input: &Path) -> Result<Self, Error> {
        let file_name = input.file_name().ok_or(Error::InvalidInputPath)?;
        let source_frames = create_temp_dir("source")?;
        let scaled_frames = create_temp_dir("scaled")?;
        let merged_file =
            scaled_frames.join(format!("tmp_{}", file_name.to_string_lossy()));
        Ok(Self {
            source_frames,
            scaled_frames,
            merged_file,
        })
    }

    /// Removes only the extracted-frames directory. Used when the scaled
    /// directory was never populated.
    pub fn remove_source(&self) {
        remove_dir(&self.source_frames);
    }

    pub fn remove(&self) {
        remove_dir(&self.source_frames);
        remove_dir(&self.scaled_frames);
    }

    pub fn frames(&self) -> Result<Vec<PathBuf>, Error> {
        list_frames(&self.source_frames)
    }
}

pub fn create_temp_dir(prefix: &str) -> Result<PathBuf, Error> {
    let dir = tempfile::Builder::new()
        .prefix(&format!("{}-", prefix))
        .tempdir()?;
    Ok(dir.keep())
}

pub fn ensure_dir(path: &Path) -> Result<(), Error> {
    fs::create_dir_all(path).map_err(Error::Io)
}

/// Recursive removal that is safe to repeat: an already-absent path is not
/// an error.
pub fn remove_dir(path: &Path) {
    match fs::remove_dir_all(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove {}: {}", path.display(), e),
    }
}

pub fn list_frames(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut frames: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().map_or(false, |ext| ext == "png"))
        .collect();
    frames.sort();
    Ok(frames)
}
