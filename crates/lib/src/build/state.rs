//! Mutable state of one build run.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::build::types::{BuildError, Progress};
use crate::config::ProjectConfig;
use crate::consts::SOURCE_EXTENSIONS;
use crate::flags::FlagRegistry;
use crate::paths::object_path;

/// Flags, sources, accumulated objects and the task counter for one run.
///
/// Passed by `&mut` into every sequencer operation.
#[derive(Debug, Clone)]
pub struct BuildState {
  pub flags: FlagRegistry,
  project_dir: PathBuf,
  sources: Vec<PathBuf>,
  pub(crate) objects: Vec<PathBuf>,
  pub(crate) progress: Progress,
}

impl BuildState {
  /// Fresh state seeded with the toolchain's default flags.
  pub fn new(config: &ProjectConfig) -> Self {
    Self {
      flags: FlagRegistry::for_toolchain(&config.toolchain),
      project_dir: config.project_dir.clone(),
      sources: Vec::new(),
      objects: Vec::new(),
      progress: Progress::default(),
    }
  }

  /// Register one source file. Relative paths are taken from the project root.
  pub fn append_source(&mut self, path: impl AsRef<Path>) {
    let path = path.as_ref();
    let absolute = if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.project_dir.join(path)
    };
    self.sources.push(normalize(&absolute));
  }

  /// Register every C/C++ source directly inside `dir`, in file-name order.
  ///
  /// Returns how many files were added.
  pub fn append_source_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize, BuildError> {
    let dir = dir.as_ref();
    let dir = if dir.is_absolute() {
      dir.to_path_buf()
    } else {
      self.project_dir.join(dir)
    };

    let entries = std::fs::read_dir(&dir).map_err(|source| BuildError::ReadSourceDir {
      path: dir.clone(),
      source,
    })?;

    let mut found: Vec<PathBuf> = entries
      .flatten()
      .map(|entry| entry.path())
      .filter(|path| path.is_file() && is_source(path))
      .collect();
    found.sort();

    debug!(dir = %dir.display(), count = found.len(), "registered source directory");
    let count = found.len();
    for path in found {
      self.append_source(path);
    }
    Ok(count)
  }

  pub fn sources(&self) -> &[PathBuf] {
    &self.sources
  }

  /// Objects recorded by the last compile stage, in source order.
  pub fn objects(&self) -> &[PathBuf] {
    &self.objects
  }

  pub fn progress(&self) -> Progress {
    self.progress
  }

  /// Object paths of every registered source, without compiling anything.
  pub(crate) fn derived_objects(&self, config: &ProjectConfig) -> Vec<PathBuf> {
    self
      .sources
      .iter()
      .map(|source| {
        object_path(
          &config.project_dir,
          &config.output_dir,
          source,
          config.toolchain.object_suffix(),
        )
      })
      .collect()
  }
}

fn is_source(path: &Path) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Drop `.` components and fold `..` where a parent is available.
fn normalize(path: &Path) -> PathBuf {
  let mut out = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => {
        if !out.pop() {
          out.push(component);
        }
      }
      other => out.push(other),
    }
  }
  out
}
