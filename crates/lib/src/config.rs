//! Project configuration.
//!
//! Resolves everything a build needs before any compiler runs: the project layout,
//! the toolchain profile and programs, and where the host runtime keeps its headers
//! and import libraries. Any problem here is fatal.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::consts::{COMPILER_ENV, DEFAULT_TARGET, LINKER_ENV, RUNTIME_HOME_ENV};
use crate::paths::module_path;
use crate::platform::Platform;
use crate::toolchain::Toolchain;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("unsupported platform: {os}/{arch}")]
  UnsupportedPlatform { os: String, arch: String },

  #[error("you appear to not be running in a Visual Studio prompt (VCINSTALLDIR is not set)")]
  NotInDeveloperPrompt,

  #[error("you must specify NODE_HOME")]
  RuntimeHomeUnset,

  #[error("runtime path \"{}\" not found, try setting NODE_HOME", .0.display())]
  RuntimeHomeNotFound(PathBuf),

  #[error("{role} \"{program}\" not found")]
  ToolNotFound { role: &'static str, program: String },

  #[error("project directory {}: {source}", .path.display())]
  ProjectDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Caller-provided settings; anything left `None` is taken from the environment or
/// from defaults.
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
  pub project_dir: Option<PathBuf>,
  pub target: Option<String>,
  pub runtime_home: Option<PathBuf>,
  pub compiler: Option<String>,
  pub linker: Option<String>,
  pub show_warnings: bool,
  pub verbose: bool,
}

/// Header and library directories of the host runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuntimeLayout {
  pub home: PathBuf,
  pub include_dirs: Vec<PathBuf>,
  pub lib_dirs: Vec<PathBuf>,
}

impl RuntimeLayout {
  pub fn for_home(home: &Path, toolchain: &Toolchain) -> Self {
    if toolchain.is_msvc() {
      Self {
        home: home.to_path_buf(),
        include_dirs: vec![
          home.join("src"),
          home.join("deps").join("v8").join("include"),
          home.join("deps").join("uv").join("include"),
        ],
        lib_dirs: vec![home.join("Release").join("lib"), home.join("Release")],
      }
    } else {
      Self {
        home: home.to_path_buf(),
        include_dirs: vec![home.join("include").join("node")],
        lib_dirs: vec![home.join("lib")],
      }
    }
  }
}

/// Immutable configuration for one build run.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectConfig {
  pub project_dir: PathBuf,
  pub build_dir: PathBuf,
  pub output_dir: PathBuf,
  pub target: String,
  pub platform: Option<Platform>,
  pub toolchain: Toolchain,
  pub compiler: String,
  pub linker: String,
  pub runtime: RuntimeLayout,
  pub show_warnings: bool,
  pub verbose: bool,
}

impl ProjectConfig {
  /// Configuration for `project_dir` with the standard `build/Release` layout, the
  /// toolchain's default programs and no runtime directories.
  pub fn for_project(project_dir: impl Into<PathBuf>, toolchain: Toolchain) -> Self {
    let project_dir = project_dir.into();
    let build_dir = project_dir.join("build");
    let output_dir = build_dir.join("Release");
    Self {
      project_dir,
      build_dir,
      output_dir,
      target: DEFAULT_TARGET.to_string(),
      platform: None,
      toolchain,
      compiler: toolchain.compiler().to_string(),
      linker: toolchain.linker().to_string(),
      runtime: RuntimeLayout::default(),
      show_warnings: false,
      verbose: false,
    }
  }

  /// Resolve the configuration for the current host.
  pub fn resolve(options: ConfigOptions) -> Result<Self, ConfigError> {
    let platform = Platform::current().ok_or_else(|| ConfigError::UnsupportedPlatform {
      os: std::env::consts::OS.to_string(),
      arch: std::env::consts::ARCH.to_string(),
    })?;
    let toolchain = Toolchain::for_platform(platform);

    if toolchain.is_msvc() && !in_developer_prompt() {
      return Err(ConfigError::NotInDeveloperPrompt);
    }

    let project_dir = match options.project_dir {
      Some(dir) => dir,
      None => std::env::current_dir().map_err(|source| ConfigError::ProjectDir {
        path: PathBuf::from("."),
        source,
      })?,
    };
    let project_dir = dunce::canonicalize(&project_dir).map_err(|source| ConfigError::ProjectDir {
      path: project_dir.clone(),
      source,
    })?;

    let home = runtime_home(options.runtime_home, &toolchain)?;
    debug!(home = %home.display(), "resolved runtime home");

    let compiler = options
      .compiler
      .or_else(|| env_program(COMPILER_ENV))
      .unwrap_or_else(|| toolchain.compiler().to_string());
    let linker = options
      .linker
      .or_else(|| env_program(LINKER_ENV))
      .unwrap_or_else(|| toolchain.linker().to_string());
    ensure_program("compiler", &compiler)?;
    ensure_program("linker", &linker)?;

    let mut config = Self::for_project(project_dir, toolchain);
    config.platform = Some(platform);
    config.compiler = compiler;
    config.linker = linker;
    config.runtime = RuntimeLayout::for_home(&home, &toolchain);
    config.show_warnings = options.show_warnings;
    config.verbose = options.verbose;
    if let Some(target) = options.target {
      config.target = target;
    }
    Ok(config)
  }

  /// Path of the final linked module.
  pub fn module_path(&self) -> PathBuf {
    module_path(&self.output_dir, &self.target)
  }
}

fn in_developer_prompt() -> bool {
  std::env::var_os("VCINSTALLDIR").is_some() || std::env::var_os("VS100COMNTOOLS").is_some()
}

fn env_program(name: &str) -> Option<String> {
  std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn ensure_program(role: &'static str, program: &str) -> Result<(), ConfigError> {
  which::which(program).map(|_| ()).map_err(|_| ConfigError::ToolNotFound {
    role,
    program: program.to_string(),
  })
}

/// Runtime home from the option, `NODE_HOME`, or (off Windows) two levels above the
/// `node` executable on `PATH`.
fn runtime_home(explicit: Option<PathBuf>, toolchain: &Toolchain) -> Result<PathBuf, ConfigError> {
  let home = explicit
    .or_else(|| std::env::var_os(RUNTIME_HOME_ENV).map(PathBuf::from))
    .or_else(|| {
      if toolchain.is_msvc() {
        None
      } else {
        which::which("node")
          .ok()
          .and_then(|node| node.parent()?.parent().map(Path::to_path_buf))
      }
    })
    .ok_or(ConfigError::RuntimeHomeUnset)?;

  let home = PathBuf::from(trim_quotes(&home.to_string_lossy()));
  if !home.is_dir() {
    return Err(ConfigError::RuntimeHomeNotFound(home));
  }
  Ok(home)
}

/// Strip one leading and one trailing double quote.
pub fn trim_quotes(value: &str) -> &str {
  let value = value.strip_prefix('"').unwrap_or(value);
  value.strip_suffix('"').unwrap_or(value)
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
  use super::*;
  use serial_test::serial;
  use tempfile::TempDir;

  fn options(project: &Path) -> ConfigOptions {
    ConfigOptions {
      project_dir: Some(project.to_path_buf()),
      compiler: Some("/bin/sh".to_string()),
      linker: Some("/bin/sh".to_string()),
      ..Default::default()
    }
  }

  #[test]
  fn trim_quotes_strips_surrounding_quotes() {
    assert_eq!(trim_quotes("\"/opt/node\""), "/opt/node");
    assert_eq!(trim_quotes("/opt/node"), "/opt/node");
    assert_eq!(trim_quotes("\"/opt/node"), "/opt/node");
  }

  #[test]
  fn posix_runtime_layout() {
    let layout = RuntimeLayout::for_home(Path::new("/opt/node"), &Toolchain::Gnu);
    assert_eq!(layout.include_dirs, vec![PathBuf::from("/opt/node/include/node")]);
    assert_eq!(layout.lib_dirs, vec![PathBuf::from("/opt/node/lib")]);
  }

  #[test]
  fn msvc_runtime_layout() {
    let msvc = Toolchain::Msvc {
      arch: crate::platform::arch::Arch::X86_64,
    };
    let layout = RuntimeLayout::for_home(Path::new("/n"), &msvc);
    assert_eq!(
      layout.include_dirs,
      vec![
        PathBuf::from("/n/src"),
        PathBuf::from("/n/deps/v8/include"),
        PathBuf::from("/n/deps/uv/include"),
      ]
    );
    assert_eq!(layout.lib_dirs, vec![PathBuf::from("/n/Release/lib"), PathBuf::from("/n/Release")]);
  }

  #[test]
  fn for_project_uses_standard_layout() {
    let config = ProjectConfig::for_project("/proj", Toolchain::Gnu);
    assert_eq!(config.output_dir, PathBuf::from("/proj/build/Release"));
    assert_eq!(config.module_path(), PathBuf::from("/proj/build/Release/native_bindings.node"));
    assert_eq!(config.compiler, "g++");
  }

  #[test]
  #[serial]
  fn resolve_reads_runtime_home_from_env() {
    let project = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();

    temp_env::with_var(RUNTIME_HOME_ENV, Some(format!("\"{}\"", home.path().display())), || {
      let config = ProjectConfig::resolve(options(project.path())).unwrap();
      let home = dunce::canonicalize(home.path()).unwrap();
      assert!(config.runtime.home.ends_with(home.file_name().unwrap()));
      assert_eq!(config.target, DEFAULT_TARGET);
    });
  }

  #[test]
  #[serial]
  fn resolve_fails_when_runtime_home_missing() {
    let project = TempDir::new().unwrap();

    temp_env::with_var(RUNTIME_HOME_ENV, Some("/definitely/not/a/node/home"), || {
      let err = ProjectConfig::resolve(options(project.path())).unwrap_err();
      assert!(matches!(err, ConfigError::RuntimeHomeNotFound(_)));
    });
  }

  #[test]
  #[serial]
  fn explicit_options_override_env() {
    let project = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();

    temp_env::with_vars(
      [
        (RUNTIME_HOME_ENV, Some("/definitely/not/a/node/home")),
        (COMPILER_ENV, Some("mnm-no-such-compiler")),
      ],
      || {
        let mut opts = options(project.path());
        opts.runtime_home = Some(home.path().to_path_buf());
        opts.target = Some("addon".to_string());
        opts.show_warnings = true;

        let config = ProjectConfig::resolve(opts).unwrap();
        assert_eq!(config.compiler, "/bin/sh");
        assert_eq!(config.target, "addon");
        assert!(config.show_warnings);
      },
    );
  }

  #[test]
  #[serial]
  fn compiler_from_env_must_exist() {
    let project = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();

    temp_env::with_vars(
      [
        (RUNTIME_HOME_ENV, Some(home.path().to_str().unwrap())),
        (COMPILER_ENV, Some("mnm-no-such-compiler")),
      ],
      || {
        let mut opts = options(project.path());
        opts.compiler = None;

        let err = ProjectConfig::resolve(opts).unwrap_err();
        assert!(matches!(err, ConfigError::ToolNotFound { role: "compiler", .. }));
      },
    );
  }

  #[test]
  #[serial]
  fn missing_project_dir_is_config_error() {
    let mut opts = options(Path::new("/definitely/not/a/project"));
    opts.runtime_home = Some(PathBuf::from("/"));
    let err = ProjectConfig::resolve(opts).unwrap_err();
    assert!(matches!(err, ConfigError::ProjectDir { .. }));
  }
}
