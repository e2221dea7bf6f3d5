mod arguments;
mod error;
mod model;
mod pipeline;
mod process;
mod progress;
mod tools;
mod video;
mod workspace;

use arguments::Arguments;
use error::Error;
use pipeline::Pipeline;
use tools::Tools;

use std::time::Instant;

use indicatif::HumanDuration;
use tracing_subscriber::EnvFilter;

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run_pipeline() -> Result<(), Error> {
    let arguments = Arguments::parse()?;
    init_logging(arguments.debug);
    let tools = Tools::resolve()?;
    tools.validate(arguments.pretend)?;
    arguments.print_options();
    Pipeline::execute(&arguments, &tools)
}

fn main() {
    let started = Instant::now();
    if let Err(error) = run_pipeline() {
        eprintln!("Error: {}", error);
        std::process::exit(1);
    }
    println!("Completed in {}", HumanDuration(started.elapsed()));
}
