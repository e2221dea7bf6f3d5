use crate::error::Error;
use crate::model::Model;

use std::path::PathBuf;

/// Everything one run needs, parsed from the command line once and never
/// mutated afterward.
pub struct Arguments {
    pub input: PathBuf,
    pub output: PathBuf,
    pub scale: usize,
    pub model: Model,
    pub pretend: bool,
    pub debug: bool,
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: PathBuf::new(),
            scale: 2,
            model: Model::default(),
            pretend: false,
            debug: false,
        }
    }
}

impl Arguments {
    pub fn parse() -> Result<Self, Error> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let arguments = Self::parse_from(&args)?;
        arguments.validate()?;
        Ok(arguments)
    }

    fn parse_from(args: &[String]) -> Result<Self, Error> {
        let mut arguments = Self::default();
        let mut input = None;
        let mut output = None;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "-i" | "--input" => {
                    input = Some(Self::next_arg(args, &mut i, "input")?)
                }
                "-o" | "--output" => {
                    output = Some(Self::next_arg(args, &mut i, "output")?)
                }
                "-s" | "--scale" => {
                    arguments.scale = Self::next_numeric(args, &mut i, "scale")?
                }
                "-m" | "--model" => {
                    arguments.model =
                        Self::next_arg(args, &mut i, "model")?.parse()?
                }
                "-p" | "--pretend" => arguments.pretend = true,
                "-d" | "--debug-mode" => arguments.debug = true,
                "-h" | "--help" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                _ => return Err(Error::UnknownArgument(args[i].clone())),
            }
            i += 1;
        }

        arguments.input = PathBuf::from(
            input.ok_or_else(|| Error::MissingArgument("input".to_string()))?,
        );
        arguments.output = PathBuf::from(
            output.ok_or_else(|| Error::MissingArgument("output".to_string()))?,
        );
        Ok(arguments)
    }

    fn next_arg(args: &[String], index: &mut usize, name: &str) -> Result<String, Error> {
        *index += 1;
        args.get(*index)
            .cloned()
            .ok_or_else(|| Error::EmptyArgument(name.to_string()))
    }

    fn next_numeric(args: &[String], index: &mut usize, name: &str) -> Result<usize, Error> {
        let value = Self::next_arg(args, index, name)?;
        value
            .parse()
            .map_err(|_| Error::InvalidArgument(name.to_string()))
    }

    fn validate(&self) -> Result<(), Error> {
        if !self.input.is_file() {
            return Err(Error::InvalidInputPath);
        }
        if self.scale < 1 {
            return Err(Error::InvalidArgument(format!(
                "scale must be at least 1, got {}",
                self.scale
            )));
        }
        Ok(())
    }

    pub fn print_options(&self) {
        println!("Input:   {}", self.input.display());
        println!("Output:  {}", self.output.display());
        println!("Scale:   {}x", self.scale);
        println!("Model:   {}", self.model);
        if self.pretend {
            println!("Pretend: frames will be copied, not upscaled");
        }
    }

    fn print_help() {
        println!("Usage: video_upscaler [OPTIONS]");
        println!("Options:");
        println!("  -i, --input FILE    The source video to upscale");
        println!("  -o, --output DIR    The directory to write the upscaled video to");
        println!("  -s, --scale SCALE   How much to upscale the video (default: 2)");
        println!("  -m, --model MODEL   Upscaler model: realesr-animevideov3, realesrgan-x4plus,");
        println!("                      realesrgan-x4plus-anime or realesrnet-x4plus");
        println!("  -p, --pretend       Copy frames instead of upscaling them");
        println!("  -d, --debug-mode    Log the underlying tool command lines");
        println!("  -h, --help          Show this help message");
    }
}
