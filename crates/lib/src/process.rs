//! External process execution.
//!
//! The compiler and linker run as child processes whose stdout and stderr are
//! inherited, so diagnostics reach the console as they are produced.

use std::future::Future;
use std::io;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

/// Runs an external program to completion.
pub trait CommandRunner {
  /// Run `program` with `args` and return its exit code.
  ///
  /// `Ok(None)` means the process ended without an exit code (killed by a signal).
  /// `Err` means it could not be started at all.
  fn run(&self, program: &str, args: &[String]) -> impl Future<Output = io::Result<Option<i32>>> + Send;
}

/// Spawns real child processes with inherited stdio.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
  async fn run(&self, program: &str, args: &[String]) -> io::Result<Option<i32>> {
    debug!(program = %program, args = ?args, "spawning process");

    let status = Command::new(program)
      .args(args)
      .stdin(Stdio::null())
      .stdout(Stdio::inherit())
      .stderr(Stdio::inherit())
      .status()
      .await?;

    debug!(program = %program, code = ?status.code(), "process exited");
    Ok(status.code())
  }
}
