use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0} is not available on this system")]
    BinaryNotFound(String),
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("{program} exited with status code {code}")]
    ExitCode { program: String, code: i32 },
    #[error("{program} was terminated by a signal")]
    Terminated { program: String },
    #[error("Error sending data across channels")]
    SendError,
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: &'static str,
        source: Box<Error>,
    },
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(&'static str),
    #[error("The specified input path is invalid")]
    InvalidInputPath,
    #[error("The specified output path is invalid")]
    InvalidOutputPath,
    #[error("Argument cannot be empty: {0}")]
    EmptyArgument(String),
    #[error("Invalid argument provided: {0}")]
    InvalidArgument(String),
    #[error("Required argument is missing: {0}")]
    MissingArgument(String),
    #[error("Unknown argument: {0}")]
    UnknownArgument(String),
}

impl Error {
    pub fn stage(stage: &'static str, source: Error) -> Self {
        Error::Stage {
            stage,
            source: Box::new(source),
        }
    }
}
