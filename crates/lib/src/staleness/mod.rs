//! Staleness checks for compile and link steps.
//!
//! Both checks fail open: whenever a timestamp or dependency file cannot be read the
//! artifact is reported stale. Missing bookkeeping only ever costs a rebuild.

pub mod depfile;

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

pub use depfile::{DepFileError, parse_depfile, read_depfile};

/// Whether `object` must be recompiled given the dependency file the compiler wrote
/// for it on a previous run.
pub fn compile_is_stale(object: &Path, depfile: &Path) -> bool {
  let deps = match read_depfile(depfile) {
    Ok(deps) => deps,
    Err(e) => {
      debug!(object = %object.display(), error = %e, "dependency file unusable, treating as stale");
      return true;
    }
  };
  is_stale(object, &deps)
}

/// Whether `output` must be relinked from `objects`.
pub fn link_is_stale(output: &Path, objects: &[PathBuf]) -> bool {
  is_stale(output, objects)
}

/// `target` is stale when it cannot be stat'ed, when any input cannot be stat'ed, or
/// when it is strictly older than the newest input. Equal timestamps are up to date.
pub fn is_stale(target: &Path, inputs: &[PathBuf]) -> bool {
  match check(target, inputs) {
    Ok(stale) => stale,
    Err(e) => {
      debug!(target = %target.display(), error = %e, "timestamp check failed, treating as stale");
      true
    }
  }
}

fn check(target: &Path, inputs: &[PathBuf]) -> io::Result<bool> {
  let target_time = modified(target)?;
  let newest = newest_modified(inputs)?;
  Ok(newest.is_some_and(|input_time| target_time < input_time))
}

fn modified(path: &Path) -> io::Result<SystemTime> {
  std::fs::metadata(path)?.modified()
}

/// Newest modification time among `paths`, or `None` for an empty set.
pub fn newest_modified(paths: &[PathBuf]) -> io::Result<Option<SystemTime>> {
  let mut newest: Option<SystemTime> = None;
  for path in paths {
    let time = modified(path)?;
    if newest.is_none_or(|current| time > current) {
      newest = Some(time);
    }
  }
  Ok(newest)
}
