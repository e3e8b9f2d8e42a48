//! Make-style dependency file parsing.
//!
//! The compiler writes one rule per object:
//!
//! ```text
//! build/Release/src/a.o: \
//!  /proj/src/a.cpp \
//!  /proj/src/a.h
//! ```
//!
//! The first line names the target and is dropped; every later line contributes
//! space-separated paths.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DepFileError {
  #[error("failed to read dependency file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("dependency file {path} has no target line")]
  MissingTarget { path: PathBuf },
}

/// Read and parse the dependency file at `path`.
pub fn read_depfile(path: &Path) -> Result<Vec<PathBuf>, DepFileError> {
  let content = std::fs::read_to_string(path).map_err(|source| DepFileError::Read {
    path: path.to_path_buf(),
    source,
  })?;

  let first = content.lines().next().unwrap_or_default();
  if !first.contains(':') {
    return Err(DepFileError::MissingTarget { path: path.to_path_buf() });
  }

  Ok(parse_depfile(&content))
}

/// Dependency paths listed in `content`, in order of appearance.
pub fn parse_depfile(content: &str) -> Vec<PathBuf> {
  content
    .split('\n')
    .skip(1)
    .map(|line| {
      let line = line.strip_suffix('\r').unwrap_or(line);
      let line = line.strip_suffix(" \\").unwrap_or(line);
      line.strip_prefix(' ').unwrap_or(line)
    })
    .flat_map(|line| line.split(' '))
    .filter(|token| !token.is_empty())
    .map(PathBuf::from)
    .collect()
}
