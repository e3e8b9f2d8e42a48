//! Link stage.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::build::compile::create_dir;
use crate::build::state::BuildState;
use crate::build::types::{BuildError, BuildEvent, Reporter};
use crate::config::ProjectConfig;
use crate::consts::LINK_FLAGS;
use crate::flags::FlagRegistry;
use crate::paths::display_relative;
use crate::process::CommandRunner;
use crate::staleness::link_is_stale;

/// Linker arguments: every object, the output switch, then the link flag group.
pub fn linker_args(config: &ProjectConfig, flags: &FlagRegistry, objects: &[PathBuf], output: &Path) -> Vec<String> {
  let mut args: Vec<String> = objects.iter().map(|o| o.display().to_string()).collect();
  args.extend(config.toolchain.link_output_args(output));
  args.extend(flags.flags(LINK_FLAGS).iter().cloned());
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

  for dir in &config.runtime.lib_dirs {
    state.flags.append_linker_search_dir(&config.toolchain, dir);
  }

  let output = config.module_path();
  let task = state.progress.next_task();
  let skipped = !link_is_stale(&output, &state.objects);

  reporter.report(&BuildEvent::Link {
    task,
    total: state.progress.total,
    objects: state
      .objects
      .iter()
      .map(|o| display_relative(&config.project_dir, o))
      .collect(),
    output: display_relative(&config.project_dir, &output),
    skipped,
  });

  if skipped {
    debug!(output = %output.display(), "module up to date");
    state.progress.advance();
    return Ok(());
  }

  let args = linker_args(config, &state.flags, &state.objects, &output);
  if config.verbose {
    reporter.report(&BuildEvent::Command {
      program: config.linker.clone(),
      args: args.clone(),
    });
  }

  info!(objects = state.objects.len(), output = %output.display(), "linking");
  let code = runner
    .run(&config.linker, &args)
    .await
    .map_err(|source| BuildError::Spawn {
      program: config.linker.clone(),
      source,
    })?;
  state.progress.advance();

  if code != Some(0) {
    return Err(BuildError::LinkFailed { code });
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::platform::arch::Arch;
  use crate::toolchain::Toolchain;

  #[test]
  fn link_flags_follow_output_switch() {
    let config = ProjectConfig::for_project("/p", Toolchain::Gnu);
    let mut flags = FlagRegistry::new();
    flags.append(LINK_FLAGS, ["-shared", "-L/n/lib"]);
    let objects = vec![PathBuf::from("/p/o/a.o"), PathBuf::from("/p/o/b.o")];

    let args = linker_args(&config, &flags, &objects, Path::new("/p/o/m.node"));
    assert_eq!(args, ["/p/o/a.o", "/p/o/b.o", "-o", "/p/o/m.node", "-shared", "-L/n/lib"]);
  }

  #[test]
  fn msvc_link_output_switch() {
    let config = ProjectConfig::for_project("/p", Toolchain::Msvc { arch: Arch::X86_64 });
    let mut flags = FlagRegistry::new();
    flags.append(LINK_FLAGS, ["-dll", "node.lib"]);

    let args = linker_args(&config, &flags, &[PathBuf::from("a.obj")], Path::new("m.node"));
    assert_eq!(args, ["a.obj", "-out:m.node", "-dll", "node.lib"]);
  }
}
