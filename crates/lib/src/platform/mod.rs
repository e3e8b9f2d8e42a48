//! Host platform detection.
//!
//! The platform is detected once at startup and used to pick a toolchain profile.

pub mod arch;
pub mod os;

use std::fmt;

use serde::Serialize;

use arch::Arch;
use os::Os;

/// Host operating system and CPU architecture (e.g., "x86_64-linux")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Platform {
  pub arch: Arch,
  pub os: Os,
}

impl Platform {
  pub fn new(arch: Arch, os: Os) -> Self {
    Self { arch, os }
  }

  /// Detect the platform this process runs on.
  ///
  /// Returns `None` when either the OS or the architecture has no toolchain profile.
  pub fn current() -> Option<Self> {
    Some(Self {
      arch: Arch::current()?,
      os: Os::current()?,
    })
  }

  pub fn triple(&self) -> String {
    format!("{}-{}", self.arch, self.os)
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.triple())
  }
}
