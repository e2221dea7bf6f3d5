mod extract;
mod import;
mod merge;
mod upscale;

use extract::Extract;
use import::Import;
use merge::Merge;
use upscale::Upscale;

use crate::arguments::Arguments;
use crate::error::Error;
use crate::tools::Tools;
use crate::video::VideoMetadata;
use crate::workspace::{self, Workspace};

use std::path::{Path, PathBuf};

use tracing::info;

/// Sequences the five stages over one workspace. Stages never overlap; any
/// failure tears the scratch space down and surfaces the stage it happened
/// in.
pub struct Pipeline;

impl Pipeline {
    pub fn execute(arguments: &Arguments, tools: &Tools) -> Result<(), Error> {
        let input = arguments
            .input
            .canonicalize()
            .map_err(|_| Error::InvalidInputPath)?;
        workspace::ensure_dir(&arguments.output)?;
        let output_dir = arguments
            .output
            .canonicalize()
            .map_err(|_| Error::InvalidOutputPath)?;
        let output_file = Self::output_file(&output_dir, &input)?;

        let workspace = Workspace::create(&input)?;

        info!("Generating metadata...");
        let metadata = match VideoMetadata::probe(tools, &input) {
            Ok(metadata) => metadata,
            Err(e) => {
                workspace.remove();
                return Err(Error::stage("metadata", e));
            }
        };

        if let Err(e) = Extract::execute(&input, tools, &workspace, &metadata) {
            // the scaled directory was never populated
            workspace.remove_source();
            return Err(Error::stage("extract", e));
        }

        if let Err(e) = Upscale::execute(arguments, tools, &workspace) {
            workspace.remove();
            return Err(Error::stage("upscale", e));
        }

        if let Err(e) = Import::execute(tools, &workspace, &metadata) {
            workspace.remove();
            return Err(Error::stage("import", e));
        }

        if let Err(e) = Merge::execute(&input, tools, &workspace, &output_file) {
            workspace.remove();
            return Err(Error::stage("merge", e));
        }

        info!("Cleaning up folders...");
        workspace.remove();
        Ok(())
    }

    fn output_file(output_dir: &Path, input: &Path) -> Result<PathBuf, Error> {
        let file_name = input.file_name().ok_or(Error::InvalidInputPath)?;
        Ok(output_dir.join(file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_artifact_keeps_the_input_basename() {
        let output =
            Pipeline::output_file(Path::new("/out"), Path::new("/videos/episode.mkv"))
                .unwrap();
        assert_eq!(output, PathBuf::from("/out/episode.mkv"));
    }
}
