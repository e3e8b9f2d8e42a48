//! Compile stage.
//!
//! Sources compile one at a time in registration order. A failing file does not stop
//! the batch: every file is attempted and the failures are reported together.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::build::state::BuildState;
use crate::build::types::{BuildError, BuildEvent, Reporter};
use crate::config::ProjectConfig;
use crate::consts::COMPILE_FLAGS;
use crate::flags::FlagRegistry;
use crate::paths::{depfile_path, display_relative, object_path};
use crate::process::CommandRunner;
use crate::staleness::compile_is_stale;

/// Compiler arguments: the compile flag group, the source, then the output switch.
pub fn compiler_args(config: &ProjectConfig, flags: &FlagRegistry, source: &Path, object: &Path) -> Vec<String> {
  let mut args: Vec<String> = flags.flags(COMPILE_FLAGS).to_vec();
  args.push(source.display().to_string());
  args.extend(config.toolchain.compile_output_args(object));
  args
}

pub(crate) async fn run<R, P>(
  config: &ProjectConfig,
  runner: &R,
  reporter: &P,
  state: &mut BuildState,
) -> Result<(), BuildError>
where
  R: CommandRunner,
  P: Reporter + ?Sized,
{
  create_dir(&config.output_dir).await?;

  // Injected late so they land after anything the caller configured.
  if config.show_warnings {
    state.flags.push(COMPILE_FLAGS, "-Wall");
  }
  for dir in &config.runtime.include_dirs {
    state.flags.append_include_dir(&config.toolchain, dir);
  }

  if state.sources().is_empty() {
    return Err(BuildError::NothingToCompile);
  }

  info!(count = state.sources().len(), "compiling sources");
  state.objects.clear();

  let sources = state.sources().to_vec();
  let mut failed = Vec::new();
  for source in &sources {
    if !compile_one(config, runner, reporter, state, source).await? {
      failed.push(source.clone());
    }
  }

  debug!(failed = failed.len(), "done compiling");
  if failed.is_empty() {
    Ok(())
  } else {
    Err(BuildError::CompileFailed {
      failed,
      total: sources.len(),
    })
  }
}

/// Compile one source. Returns whether it succeeded (or was skipped).
async fn compile_one<R, P>(
  config: &ProjectConfig,
  runner: &R,
  reporter: &P,
  state: &mut BuildState,
  source: &Path,
) -> Result<bool, BuildError>
where
  R: CommandRunner,
  P: Reporter + ?Sized,
{
  let object = object_path(
    &config.project_dir,
    &config.output_dir,
    source,
    config.toolchain.object_suffix(),
  );
  let depfile = depfile_path(&object);
  if let Some(parent) = object.parent() {
    create_dir(parent).await?;
  }

  state.objects.push(object.clone());

  let task = state.progress.next_task();
  let skipped = !compile_is_stale(&object, &depfile);
  reporter.report(&BuildEvent::Compile {
    task,
    total: state.progress.total,
    source: display_relative(&config.project_dir, source),
    object: display_relative(&config.project_dir, &object),
    skipped,
  });

  if skipped {
    debug!(source = %source.display(), "object up to date");
    state.progress.advance();
    return Ok(true);
  }

  let args = compiler_args(config, &state.flags, source, &object);
  if config.verbose {
    reporter.report(&BuildEvent::Command {
      program: config.compiler.clone(),
      args: args.clone(),
    });
  }

  let outcome = runner.run(&config.compiler, &args).await;
  state.progress.advance();

  match outcome {
    Ok(Some(0)) => Ok(true),
    Ok(code) => {
      warn!(source = %source.display(), code = ?code, "compile failed");
      Ok(false)
    }
    Err(e) => {
      error!(program = %config.compiler, error = %e, "failed to start compiler");
      Ok(false)
    }
  }
}

pub(crate) async fn create_dir(path: &Path) -> Result<(), BuildError> {
  tokio::fs::create_dir_all(path)
    .await
    .map_err(|source| BuildError::CreateDir {
      path: PathBuf::from(path),
      source,
    })
}
