use crate::error::Error;

use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

use crossbeam_channel::{unbounded, Sender};
use tracing::debug;

/// Runs an external tool to completion, forwarding every line of its output
/// streams to `on_line`. Fails when the binary cannot be spawned or exits
/// non-zero; no retries.
pub fn run<F>(program: &Path, args: &[String], mut on_line: F) -> Result<(), Error>
where
    F: FnMut(&str),
{
    let name = program_name(program);
    debug!("{} cmd: {} {}", name, program.display(), args.join(" "));

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| spawn_error(&name, e))?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let (sender, receiver) = unbounded::<String>();

    thread::scope(|scope| {
        if let Some(stdout) = stdout {
            let sender = sender.clone();
            scope.spawn(move || forward_lines(stdout, sender));
        }
        if let Some(stderr) = stderr {
            let sender = sender.clone();
            scope.spawn(move || forward_lines(stderr, sender));
        }
        drop(sender);
        for line in receiver.iter() {
            on_line(&line);
        }
    });

    let status = child.wait().map_err(|e| spawn_error(&name, e))?;
    check_status(&name, status)
}

fn forward_lines(stream: impl Read, sender: Sender<String>) {
    for line in BufReader::new(stream).lines() {
        match line {
            Ok(line) => {
                if sender.send(line).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    }
}

pub fn check_status(program: &str, status: ExitStatus) -> Result<(), Error> {
    if status.success() {
        return Ok(());
    }
    match status.code() {
        Some(code) => Err(Error::ExitCode {
            program: program.to_string(),
            code,
        }),
        None => Err(Error::Terminated {
            program: program.to_string(),
        }),
    }
}

pub fn spawn_error(program: &str, source: std::io::Error) -> Error {
    if source.kind() == std::io::ErrorKind::NotFound {
        Error::BinaryNotFound(program.to_string())
    } else {
        Error::Spawn {
            program: program.to_string(),
            source,
        }
    }
}

pub fn program_name(program: &Path) -> String {
    program
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string())
}
