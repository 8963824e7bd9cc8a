use crate::error::{Error, Result};
use crate::runner::CommandRunner;
use crate::settings::Settings;
use crate::steps;
use log::{error, info};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Build,
    Clean,
    Package,
    Deploy,
}

impl Stage {
    /// The stages `self` expands to, prerequisites first.
    pub fn plan(self) -> &'static [Stage] {
        match self {
            Stage::Build => &[Stage::Build],
            Stage::Clean => &[Stage::Clean],
            Stage::Package => &[Stage::Build, Stage::Package],
            Stage::Deploy => &[Stage::Build, Stage::Package, Stage::Deploy],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Build => "build",
            Stage::Clean => "clean",
            Stage::Package => "package",
            Stage::Deploy => "deploy",
        }
    }

    fn running(self) -> State {
        match self {
            Stage::Build => State::Building,
            Stage::Clean => State::Cleaning,
            Stage::Package => State::Packaging,
            Stage::Deploy => State::Deploying,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "build" => Ok(Stage::Build),
            "clean" => Ok(Stage::Clean),
            "package" => Ok(Stage::Package),
            "deploy" => Ok(Stage::Deploy),
            _ => Err(Error::UnknownStage(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Building,
    Cleaning,
    Packaging,
    Deploying,
    Done,
    Failed(Stage),
}

/// Runs stages in order against one set of settings. Each stage runs at most
/// once per pipeline, and the first failure is terminal.
///
/// The binary runs one operation per process. Reusing a pipeline for several
/// `run` calls is library API: stages already completed are skipped, and after
/// a failure every later call returns `Error::Halted`.
pub struct Pipeline<'a> {
    settings: &'a Settings,
    runner: &'a dyn CommandRunner,
    state: State,
    completed: Vec<Stage>,
}

impl<'a> Pipeline<'a> {
    pub fn new(settings: &'a Settings, runner: &'a dyn CommandRunner) -> Self {
        Pipeline {
            settings,
            runner,
            state: State::Idle,
            completed: vec![],
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn completed(&self) -> &[Stage] {
        &self.completed
    }

    pub fn run(&mut self, target: Stage) -> Result<()> {
        if let State::Failed(stage) = self.state {
            return Err(Error::Halted(stage.name()));
        }

        for &stage in target.plan() {
            if self.completed.contains(&stage) {
                continue;
            }

            self.state = stage.running();

            if let Err(err) = self.run_stage(stage) {
                error!("{stage} failed: {err}");
                self.state = State::Failed(stage);
                return Err(err);
            }

            self.completed.push(stage);
        }

        info!("{target} finished");
        self.state = State::Done;

        Ok(())
    }

    fn run_stage(&self, stage: Stage) -> Result<()> {
        match stage {
            Stage::Build => steps::build(self.settings, self.runner),
            Stage::Clean => steps::clean(self.settings),
            Stage::Package => steps::package(self.settings, self.runner).map(|_| ()),
            Stage::Deploy => steps::deploy(self.settings, self.runner),
        }
    }
}
