use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The parameter file could not be opened or read.
    #[error("unable to read parameter file {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Compiling one function failed. Functions built before it are left in place.
    #[error("failed to build function {function}")]
    Compilation { function: String, output: String },

    /// An external tool exited with a non-zero status.
    #[error("`{program} {}` exited with {}", args.join(" "), describe_code(*code))]
    ExternalCommand {
        program: String,
        args: Vec<String>,
        code: Option<i32>,
        output: String,
    },

    /// The external tool could not be started at all.
    #[error("unable to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// Filesystem work on the build output failed.
    #[error(transparent)]
    Shell(#[from] xshell::Error),

    #[error("invalid function '{0}', expected <name>=<path>")]
    InvalidFunction(String),

    #[error("unknown operation '{0}', expected one of build, clean, package, deploy")]
    UnknownStage(String),

    #[error("pipeline already failed at the {0} stage")]
    Halted(&'static str),
}

impl Error {
    /// Combined stdout/stderr of the subprocess that caused this error, if any.
    pub fn captured_output(&self) -> Option<&str> {
        match self {
            Error::Compilation { output, .. } | Error::ExternalCommand { output, .. } => {
                Some(output.as_str())
            }
            _ => None,
        }
    }
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
