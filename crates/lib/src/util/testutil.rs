//! Test utilities for mnm-lib.
//!
//! Recording doubles for the process runner and reporter, plus cross-platform shell
//! helpers for tests that spawn real processes.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::build::{BuildEvent, Reporter};
use crate::process::CommandRunner;

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
  pub program: String,
  pub args: Vec<String>,
}

/// Fake toolchain that records every invocation and writes the file named by the
/// output argument, the way a real compiler or linker would.
///
/// Compiles also get a dependency file listing the source, so a second run can be
/// skipped. Sources listed in `failing` exit with code 1 and produce nothing.
#[derive(Debug, Default)]
pub struct FakeToolchain {
  pub invocations: Mutex<Vec<Invocation>>,
  pub failing: HashSet<PathBuf>,
  pub fail_link: bool,
}

impl FakeToolchain {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn failing_on(mut self, source: impl Into<PathBuf>) -> Self {
    self.failing.insert(source.into());
    self
  }

  pub fn invocations(&self) -> Vec<Invocation> {
    self.invocations.lock().unwrap().clone()
  }

  pub fn count(&self, program: &str) -> usize {
    self.invocations().iter().filter(|i| i.program == program).count()
  }

  pub fn reset(&self) {
    self.invocations.lock().unwrap().clear();
  }

  fn output_of(args: &[String]) -> Option<PathBuf> {
    args
      .iter()
      .position(|a| a == "-o")
      .and_then(|i| args.get(i + 1))
      .map(PathBuf::from)
  }
}

impl CommandRunner for FakeToolchain {
  async fn run(&self, program: &str, args: &[String]) -> io::Result<Option<i32>> {
    self.invocations.lock().unwrap().push(Invocation {
      program: program.to_string(),
      args: args.to_vec(),
    });

    let Some(output) = Self::output_of(args) else {
      return Ok(Some(2));
    };

    if program == "fake-link" {
      if self.fail_link {
        return Ok(Some(1));
      }
      std::fs::write(&output, "module")?;
      return Ok(Some(0));
    }

    let source = args
      .iter()
      .map(Path::new)
      .find(|a| a.extension().is_some_and(|e| e == "cpp" || e == "c" || e == "cxx"));
    if let Some(source) = source {
      if self.failing.contains(source) {
        return Ok(Some(1));
      }
      std::fs::write(&output, "object")?;
      let depfile = output.with_extension("d");
      std::fs::write(depfile, format!("{}: \\\n {}\n", output.display(), source.display()))?;
    }
    Ok(Some(0))
  }
}

/// Reporter collecting every event in order.
#[derive(Debug, Default)]
pub struct RecordingReporter {
  pub events: Mutex<Vec<BuildEvent>>,
}

impl RecordingReporter {
  pub fn events(&self) -> Vec<BuildEvent> {
    self.events.lock().unwrap().clone()
  }
}

impl Reporter for RecordingReporter {
  fn report(&self, event: &BuildEvent) {
    self.events.lock().unwrap().push(event.clone());
  }
}
