//! Derived artifact paths.
//!
//! Object, dependency and module paths are pure functions of the project layout so a
//! skipped compile still knows where its object lives.

use std::path::{Component, Path, PathBuf};

use crate::consts::{DEPFILE_SUFFIX, EXTERNAL_OBJECTS_DIR, MODULE_SUFFIX};

/// Object path for `source`: the path below `project_dir` re-rooted under `output_dir`
/// with the extension replaced by `object_suffix`.
///
/// Sources outside the project are mirrored in full under
/// `<output_dir>/_external`, so two of them never share an object.
pub fn object_path(project_dir: &Path, output_dir: &Path, source: &Path, object_suffix: &str) -> PathBuf {
  let relative = match source.strip_prefix(project_dir) {
    Ok(rel) => rel.to_path_buf(),
    Err(_) => Path::new(EXTERNAL_OBJECTS_DIR).join(mirrored(source)),
  };
  output_dir.join(relative).with_extension(object_suffix)
}

/// `path` as a relative path keeping every component. Drive prefixes become a plain
/// directory (`C:` -> `C`), parent components become `__`.
fn mirrored(path: &Path) -> PathBuf {
  let mut out = PathBuf::new();
  for component in path.components() {
    match component {
      Component::Prefix(prefix) => {
        let drive: String = prefix
          .as_os_str()
          .to_string_lossy()
          .chars()
          .filter(|c| c.is_alphanumeric())
          .collect();
        out.push(drive);
      }
      Component::RootDir | Component::CurDir => {}
      Component::ParentDir => out.push("__"),
      Component::Normal(part) => out.push(part),
    }
  }
  out
}

/// Dependency file written by the compiler next to `object`.
pub fn depfile_path(object: &Path) -> PathBuf {
  object.with_extension(DEPFILE_SUFFIX)
}

/// Final module path for `target`.
pub fn module_path(output_dir: &Path, target: &str) -> PathBuf {
  output_dir.join(format!("{}.{}", target, MODULE_SUFFIX))
}

/// `path` relative to `base` for display, or `path` unchanged when it is not below `base`.
pub fn display_relative(base: &Path, path: &Path) -> PathBuf {
  path.strip_prefix(base).map(Path::to_path_buf).unwrap_or_else(|_| path.to_path_buf())
}
