//! Implementation of the `mnm build`, `mnm compile` and `mnm link` commands.
//!
//! All three resolve the project configuration, register sources, and hand the work
//! to the library's `Sequencer`, printing progress lines as tasks run.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use mnm_lib::{BuildState, ConfigOptions, ProcessRunner, ProjectConfig, Sequencer};

use crate::output::{ConsoleReporter, format_duration, print_success};

/// Which stages a command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  Build,
  Compile,
  Link,
}

#[derive(Debug, Args)]
pub struct BuildArgs {
  /// Source files to compile (relative paths are taken from the project directory)
  pub sources: Vec<PathBuf>,

  /// Directory whose .c/.cpp/.cxx files are added (default: src, when no sources are given)
  #[arg(long = "source-dir", value_name = "DIR")]
  pub source_dirs: Vec<PathBuf>,

  /// Name of the linked module, without suffix
  #[arg(long)]
  pub target: Option<String>,

  /// Project directory (default: current directory)
  #[arg(long, value_name = "DIR")]
  pub project: Option<PathBuf>,

  /// Runtime installation providing headers and libraries (overrides NODE_HOME)
  #[arg(long, value_name = "DIR")]
  pub node_home: Option<PathBuf>,

  /// Compiler program (overrides CXX)
  #[arg(long, value_name = "PROG")]
  pub cxx: Option<String>,

  /// Linker program (overrides CXXLD)
  #[arg(long, value_name = "PROG")]
  pub linker: Option<String>,
}

pub fn cmd_build(action: Action, args: BuildArgs, show_warnings: bool, verbose: bool) -> Result<()> {
  let started = Instant::now();

  let config = ProjectConfig::resolve(ConfigOptions {
    project_dir: args.project,
    target: args.target,
    runtime_home: args.node_home,
    compiler: args.cxx,
    linker: args.linker,
    show_warnings,
    verbose,
  })
  .context("Failed to configure project")?;
  debug!(project = %config.project_dir.display(), toolchain = %config.toolchain, "configured");

  let mut state = BuildState::new(&config);
  for source in &args.sources {
    state.append_source(source);
  }

  let mut source_dirs = args.source_dirs;
  if args.sources.is_empty() && source_dirs.is_empty() {
    let default_dir = config.project_dir.join("src");
    if default_dir.is_dir() {
      source_dirs.push(default_dir);
    }
  }
  for dir in &source_dirs {
    state
      .append_source_dir(dir)
      .with_context(|| format!("Failed to register sources from {}", dir.display()))?;
  }

  let runner = ProcessRunner;
  let reporter = ConsoleReporter::new(verbose);
  let mut sequencer = Sequencer::new(&config, &runner, &reporter);

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  rt.block_on(async {
    match action {
      Action::Build => sequencer.build(&mut state).await,
      Action::Compile => sequencer.compile(&mut state).await,
      Action::Link => sequencer.link(&mut state).await,
    }
  })?;

  let elapsed = format_duration(started.elapsed());
  print_success(&summary(
    action,
    &config.module_path().display().to_string(),
    state.sources().len(),
    reporter.link_skipped(),
    &elapsed,
  ));

  Ok(())
}

/// Closing line for a successful run.
fn summary(action: Action, module: &str, sources: usize, link_skipped: bool, elapsed: &str) -> String {
  match action {
    Action::Compile => format!("Compiled {} source(s) in {}", sources, elapsed),
    Action::Build | Action::Link if link_skipped => format!("{} is up to date ({})", module, elapsed),
    Action::Build => format!("Built {} in {}", module, elapsed),
    Action::Link => format!("Linked {} in {}", module, elapsed),
  }
}
