//! Build sequencing.
//!
//! A `Sequencer` runs the compile stage, the link stage, or both in order against a
//! caller-owned `BuildState`. When both run, the task counter spans the two stages so
//! N sources and the link are numbered 1..=N+1.

pub mod compile;
pub mod link;
pub mod state;
pub mod types;

use tracing::{error, info};

use crate::config::ProjectConfig;
use crate::process::CommandRunner;

pub use compile::compiler_args;
pub use link::linker_args;
pub use state::BuildState;
pub use types::{BuildError, BuildEvent, Phase, Progress, Reporter, SilentReporter, Stage};

/// Drives the compile and link stages for one project.
pub struct Sequencer<'a, R, P: ?Sized> {
  config: &'a ProjectConfig,
  runner: &'a R,
  reporter: &'a P,
  phase: Phase,
}

impl<'a, R, P> Sequencer<'a, R, P>
where
  R: CommandRunner,
  P: Reporter + ?Sized,
{
  pub fn new(config: &'a ProjectConfig, runner: &'a R, reporter: &'a P) -> Self {
    Self {
      config,
      runner,
      reporter,
      phase: Phase::Idle,
    }
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  /// Compile every registered source.
  pub async fn compile(&mut self, state: &mut BuildState) -> Result<(), BuildError> {
    state.progress = Progress::new(state.sources().len());
    self.run_stage(Stage::Compile, state).await?;
    self.phase = Phase::Done;
    Ok(())
  }

  /// Link the objects of the registered sources.
  ///
  /// Run on its own, the object list is derived from the sources so a previous
  /// `compile` in another process can be linked.
  pub async fn link(&mut self, state: &mut BuildState) -> Result<(), BuildError> {
    state.progress = Progress::new(1);
    if state.objects.is_empty() {
      state.objects = state.derived_objects(self.config);
    }
    self.run_stage(Stage::Link, state).await?;
    self.phase = Phase::Done;
    Ok(())
  }

  /// Compile, then link. A failed compile stage skips the link.
  pub async fn build(&mut self, state: &mut BuildState) -> Result<(), BuildError> {
    state.progress = Progress::new(state.sources().len() + 1);
    self.run_stage(Stage::Compile, state).await?;
    self.run_stage(Stage::Link, state).await?;
    self.phase = Phase::Done;
    info!(target_name = %self.config.target, "build complete");
    Ok(())
  }

  async fn run_stage(&mut self, stage: Stage, state: &mut BuildState) -> Result<(), BuildError> {
    self.phase = match stage {
      Stage::Compile => Phase::Compiling,
      Stage::Link => Phase::Linking,
    };

    let result = match stage {
      Stage::Compile => compile::run(self.config, self.runner, self.reporter, state).await,
      Stage::Link => link::run(self.config, self.runner, self.reporter, state).await,
    };

    match result {
      Ok(()) => {
        self.reporter.report(&BuildEvent::StageDone(stage));
        Ok(())
      }
      Err(e) => {
        error!(stage = %stage, error = %e, "stage failed");
        self.phase = Phase::Failed;
        Err(e)
      }
    }
  }
}
