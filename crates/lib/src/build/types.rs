//! Types shared by the compile and link stages.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that end a build stage.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error("nothing to compile")]
  NothingToCompile,

  /// Every source was attempted; these ones exited non-zero or could not be started.
  #[error("at least one file failed to compile ({} of {total})", .failed.len())]
  CompileFailed { failed: Vec<PathBuf>, total: usize },

  #[error("failed to link (exit code {})", .code.map(|c| c.to_string()).unwrap_or_else(|| "none".to_string()))]
  LinkFailed { code: Option<i32> },

  #[error("failed to run {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to create directory {}: {source}", .path.display())]
  CreateDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to read source directory {}: {source}", .path.display())]
  ReadSourceDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// The two stages of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
  Compile,
  Link,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Stage::Compile => write!(f, "compile"),
      Stage::Link => write!(f, "link"),
    }
  }
}

/// Where a sequencer is in its run.
///
/// `Idle -> Compiling -> Linking -> Done`, with `Failed` reachable from either
/// working phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
  #[default]
  Idle,
  Compiling,
  Linking,
  Done,
  Failed,
}

/// Task counter shared by both stages of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
  pub current: usize,
  pub total: usize,
}

impl Progress {
  pub fn new(total: usize) -> Self {
    Self { current: 0, total }
  }

  /// One-based number of the task about to run.
  pub fn next_task(&self) -> usize {
    self.current + 1
  }

  pub fn advance(&mut self) {
    self.current += 1;
  }
}

/// Progress notifications emitted while building.
///
/// Paths are relative to the project root when they live below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
  Compile {
    task: usize,
    total: usize,
    source: PathBuf,
    object: PathBuf,
    skipped: bool,
  },
  Link {
    task: usize,
    total: usize,
    objects: Vec<PathBuf>,
    output: PathBuf,
    skipped: bool,
  },
  /// Full command line about to run; only emitted in verbose mode.
  Command { program: String, args: Vec<String> },
  StageDone(Stage),
}

/// Receives build events, typically to render them on a console.
pub trait Reporter {
  fn report(&self, event: &BuildEvent);
}

impl<F> Reporter for F
where
  F: Fn(&BuildEvent),
{
  fn report(&self, event: &BuildEvent) {
    self(event)
  }
}

/// Reporter that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
  fn report(&self, _event: &BuildEvent) {}
}
