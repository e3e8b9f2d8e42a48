//! Toolchain profiles.
//!
//! Everything that differs between the POSIX compiler driver and the MSVC tools lives
//! here: program names, suffixes, default flags and the syntax of output, include and
//! library switches. A profile is picked once from the host platform.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::platform::Platform;
use crate::platform::arch::Arch;
use crate::platform::os::Os;

const POSIX_COMPILE_FLAGS: &[&str] = &[
  "-D_LARGEFILE_SOURCE",
  "-D_FILE_OFFSET_BITS=64",
  "-D_GNU_SOURCE",
  "-DPIC",
  "-g",
  "-fPIC",
  "-MD",
];

const MSVC_COMPILE_FLAGS: &[&str] = &[
  "-nologo",
  "-DWIN32",
  "-D_WINDOWS",
  "-D_WINDLL",
  "-EHsc",
  "-c",
  "-Oi-",
  "-Od",
  "-Gd",
  "-analyze-",
];

const MSVC_LINK_FLAGS: &[&str] = &[
  "-nologo",
  "-dll",
  "-MANIFEST:NO",
  "-SUBSYSTEM:WINDOWS",
  "-TLBID:1",
  "-DYNAMICBASE",
  "-NXCOMPAT",
];

/// Toolchain profile for the host platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Toolchain {
  /// GCC-compatible driver producing a shared object.
  Gnu,
  /// GCC-compatible driver producing a loadable bundle.
  Darwin,
  /// `cl.exe` and `link.exe` from a Visual Studio environment.
  Msvc { arch: Arch },
}

impl Toolchain {
  pub fn for_platform(platform: Platform) -> Self {
    match platform.os {
      Os::Linux => Self::Gnu,
      Os::MacOs => Self::Darwin,
      Os::Windows => Self::Msvc { arch: platform.arch },
    }
  }

  pub fn is_msvc(&self) -> bool {
    matches!(self, Self::Msvc { .. })
  }

  pub fn compiler(&self) -> &'static str {
    if self.is_msvc() { "cl.exe" } else { "g++" }
  }

  pub fn linker(&self) -> &'static str {
    if self.is_msvc() { "link.exe" } else { "g++" }
  }

  /// Object file extension, without the dot.
  pub fn object_suffix(&self) -> &'static str {
    if self.is_msvc() { "obj" } else { "o" }
  }

  /// Arguments naming the compiler's output file.
  pub fn compile_output_args(&self, output: &Path) -> Vec<String> {
    match self {
      Self::Msvc { .. } => vec![format!("-Fo{}", output.display())],
      _ => vec!["-o".to_string(), output.display().to_string()],
    }
  }

  /// Arguments naming the linker's output file.
  pub fn link_output_args(&self, output: &Path) -> Vec<String> {
    match self {
      Self::Msvc { .. } => vec![format!("-out:{}", output.display())],
      _ => vec!["-o".to_string(), output.display().to_string()],
    }
  }

  pub fn default_compile_flags(&self) -> Vec<String> {
    let flags = if self.is_msvc() { MSVC_COMPILE_FLAGS } else { POSIX_COMPILE_FLAGS };
    flags.iter().map(|f| f.to_string()).collect()
  }

  pub fn default_link_flags(&self) -> Vec<String> {
    match self {
      Self::Gnu => vec!["-shared".to_string()],
      Self::Darwin => vec!["-bundle".to_string(), "-undefined".to_string(), "dynamic_lookup".to_string()],
      Self::Msvc { arch } => {
        let mut flags: Vec<String> = MSVC_LINK_FLAGS.iter().map(|f| f.to_string()).collect();
        flags.push(format!("-MACHINE:{}", arch.msvc_machine()));
        flags
      }
    }
  }

  /// Runtime import libraries every module links against.
  pub fn default_libraries(&self) -> &'static [&'static str] {
    if self.is_msvc() { &["node", "uv"] } else { &[] }
  }

  pub fn include_flag(&self, dir: &Path) -> String {
    format!("-I{}", dir.display())
  }

  pub fn library_flag(&self, lib: &str) -> String {
    if self.is_msvc() {
      format!("{}.lib", lib.strip_suffix(".lib").unwrap_or(lib))
    } else {
      format!("-l{}", lib)
    }
  }

  pub fn search_dir_flag(&self, dir: &Path) -> String {
    if self.is_msvc() {
      format!("-LIBPATH:{}", dir.display())
    } else {
      format!("-L{}", dir.display())
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Gnu => "gnu",
      Self::Darwin => "darwin",
      Self::Msvc { .. } => "msvc",
    }
  }
}

impl fmt::Display for Toolchain {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
