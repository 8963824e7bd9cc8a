use crate::error::{Error, Result};
use log::debug;
use std::path::PathBuf;
#[cfg(any(test, feature = "test-util"))]
use std::{cell::RefCell, collections::VecDeque, path::Path};
#[cfg(any(test, feature = "test-util"))]
use xshell::Shell;

/// One external command: program, arguments and the directory it runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub dir: PathBuf,
}

impl Invocation {
    pub fn new(program: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Invocation {
            program: program.into(),
            args: vec![],
            dir: dir.into(),
        }
    }

    pub fn args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Value following `flag`, e.g. `--target` in `cargo build --target <triple>`.
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|idx| self.args.get(idx + 1))
            .map(String::as_str)
    }
}

/// Exit code plus stdout and stderr captured through one pipe, in the order
/// the tool wrote them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub output: String,
}

impl CommandOutput {
    pub fn success(output: impl Into<String>) -> Self {
        CommandOutput {
            code: Some(0),
            output: output.into(),
        }
    }

    pub fn failure(code: i32, output: impl Into<String>) -> Self {
        CommandOutput {
            code: Some(code),
            output: output.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs external tools. A non-zero exit is reported through `CommandOutput`,
/// not as an `Err`; `Err` means the program could not be run at all.
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput>;
}

/// Runs commands for real. Stderr is redirected into the stdout pipe so the
/// captured text keeps the tool's own interleaving.
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        debug!("running {} {}", invocation.program, invocation.args.join(" "));

        let output = duct::cmd(invocation.program.as_str(), &invocation.args)
            .dir(&invocation.dir)
            .stderr_to_stdout()
            .stdout_capture()
            .unchecked()
            .run()
            .map_err(|source| Error::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        Ok(CommandOutput {
            code: output.status.code(),
            output: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

/// Records invocations and replays queued outputs instead of running anything.
/// Once the queue is empty every command succeeds with no output.
///
/// With `with_cargo_artifacts`, each successful `cargo build` writes a stub
/// binary where cargo would have put the real one.
///
/// Only built for tests, or with the `test-util` feature.
#[cfg(any(test, feature = "test-util"))]
#[derive(Default)]
pub struct FakeRunner {
    responses: RefCell<VecDeque<CommandOutput>>,
    invocations: RefCell<Vec<Invocation>>,
    cargo_artifacts: bool,
}

#[cfg(any(test, feature = "test-util"))]
impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cargo_artifacts(mut self) -> Self {
        self.cargo_artifacts = true;
        self
    }

    pub fn respond(&self, output: CommandOutput) -> &Self {
        self.responses.borrow_mut().push_back(output);
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.borrow().clone()
    }

    pub fn programs(&self) -> Vec<String> {
        self.invocations
            .borrow()
            .iter()
            .map(|invocation| invocation.program.clone())
            .collect()
    }

    fn write_cargo_artifact(&self, invocation: &Invocation) -> Result<()> {
        let (target_dir, target, bin) = match (
            invocation.flag_value("--target-dir"),
            invocation.flag_value("--target"),
            invocation.flag_value("--bin"),
        ) {
            (Some(target_dir), Some(target), Some(bin)) => (target_dir, target, bin),
            _ => return Ok(()),
        };

        let sh = Shell::new()?;
        let release = sh.create_dir(
            invocation
                .dir
                .join(Path::new(target_dir))
                .join(target)
                .join("release"),
        )?;
        sh.write_file(release.join(bin), bin)?;

        Ok(())
    }
}

#[cfg(any(test, feature = "test-util"))]
impl CommandRunner for FakeRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        self.invocations.borrow_mut().push(invocation.clone());

        let output = self
            .responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| CommandOutput::success(""));

        if self.cargo_artifacts && output.is_success() && invocation.program == "cargo" {
            self.write_cargo_artifact(invocation)?;
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_value_reads_following_argument() {
        let invocation = Invocation::new("cargo", ".")
            .args(["build", "--release", "--target", "x86_64-unknown-linux-musl"]);

        assert_eq!(invocation.flag_value("--target"), Some("x86_64-unknown-linux-musl"));
        assert_eq!(invocation.flag_value("--bin"), None);
    }

    #[test]
    fn fake_replays_responses_then_succeeds() {
        let runner = FakeRunner::new();
        runner.respond(CommandOutput::failure(2, "no such bucket"));

        let first = runner.run(&Invocation::new("aws", ".")).unwrap();
        let second = runner.run(&Invocation::new("aws", ".")).unwrap();

        assert_eq!(first, CommandOutput::failure(2, "no such bucket"));
        assert!(second.is_success());
        assert_eq!(runner.programs(), vec!["aws", "aws"]);
    }

    #[test]
    fn fake_writes_cargo_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new().with_cargo_artifacts();

        let invocation = Invocation::new("cargo", dir.path()).args([
            "build",
            "--target",
            "x86_64-unknown-linux-musl",
            "--target-dir",
            "target",
            "--bin",
            "reader",
        ]);
        runner.run(&invocation).unwrap();

        assert!(dir
            .path()
            .join("target/x86_64-unknown-linux-musl/release/reader")
            .exists());
    }

    #[test]
    fn process_runner_captures_output_and_status() {
        let dir = tempfile::tempdir().unwrap();

        let ok = ProcessRunner
            .run(&Invocation::new("sh", dir.path()).args(["-c", "echo out; echo err >&2"]))
            .unwrap();
        assert!(ok.is_success());
        assert_eq!(ok.output, "out\nerr\n");

        let failed = ProcessRunner
            .run(&Invocation::new("sh", dir.path()).args(["-c", "echo nope; exit 3"]))
            .unwrap();
        assert_eq!(failed.code, Some(3));
        assert_eq!(failed.output, "nope\n");
    }

    #[test]
    fn process_runner_keeps_stderr_and_stdout_interleaved() {
        let dir = tempfile::tempdir().unwrap();

        let output = ProcessRunner
            .run(&Invocation::new("sh", dir.path()).args([
                "-c",
                "echo first-stderr >&2; echo second-stdout; echo third-stderr >&2; exit 1",
            ]))
            .unwrap();

        assert_eq!(output.code, Some(1));
        assert_eq!(output.output, "first-stderr\nsecond-stdout\nthird-stderr\n");
    }

    #[test]
    fn process_runner_runs_in_invocation_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("param.cfg"), "StackName=app\n").unwrap();

        let output = ProcessRunner
            .run(&Invocation::new("cat", dir.path()).args(["param.cfg"]))
            .unwrap();

        assert_eq!(output.output, "StackName=app\n");
    }

    #[test]
    fn process_runner_reports_missing_program() {
        let dir = tempfile::tempdir().unwrap();

        let err = ProcessRunner
            .run(&Invocation::new("sam-deployer-no-such-tool", dir.path()))
            .unwrap_err();

        assert!(matches!(err, Error::Spawn { ref program, .. } if program == "sam-deployer-no-such-tool"));
    }
}
