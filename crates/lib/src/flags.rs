//! Named groups of toolchain flags.
//!
//! Flags arrive from several places (toolchain defaults, user switches, include and
//! library paths injected right before a stage runs). Each group keeps the order in
//! which a token was first seen and silently drops repeats.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::consts::{COMPILE_FLAGS, LINK_FLAGS};
use crate::toolchain::Toolchain;

/// Ordered, duplicate-free flag groups keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FlagRegistry {
  groups: BTreeMap<String, Vec<String>>,
}

impl FlagRegistry {
  /// Create an empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// Create a registry seeded with the toolchain's default compile and link flags.
  pub fn for_toolchain(toolchain: &Toolchain) -> Self {
    let mut registry = Self::new();
    registry.append(COMPILE_FLAGS, ["-c"]);
    registry.append(COMPILE_FLAGS, toolchain.default_compile_flags());
    registry.append(LINK_FLAGS, toolchain.default_link_flags());
    for lib in toolchain.default_libraries() {
      registry.append_linker_library(toolchain, lib);
    }
    registry
  }

  /// Append each token not already present in `group`, creating the group if needed.
  pub fn append<I, S>(&mut self, group: &str, tokens: I)
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let flags = self.groups.entry(group.to_string()).or_default();
    for token in tokens {
      let token = token.into();
      if !flags.contains(&token) {
        flags.push(token);
      }
    }
  }

  /// Append a single token to `group`.
  pub fn push(&mut self, group: &str, token: impl Into<String>) {
    self.append(group, [token.into()]);
  }

  /// Current tokens of `group`, creating an empty group if it does not exist yet.
  pub fn get(&mut self, group: &str) -> &[String] {
    self.groups.entry(group.to_string()).or_default()
  }

  /// Current tokens of `group` without creating it.
  pub fn flags(&self, group: &str) -> &[String] {
    self.groups.get(group).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Names of all groups referenced so far.
  pub fn group_names(&self) -> impl Iterator<Item = &str> {
    self.groups.keys().map(String::as_str)
  }

  pub fn append_include_dir(&mut self, toolchain: &Toolchain, dir: &Path) {
    self.push(COMPILE_FLAGS, toolchain.include_flag(dir));
  }

  pub fn append_linker_library(&mut self, toolchain: &Toolchain, lib: &str) {
    self.push(LINK_FLAGS, toolchain.library_flag(lib));
  }

  pub fn append_linker_search_dir(&mut self, toolchain: &Toolchain, dir: &Path) {
    self.push(LINK_FLAGS, toolchain.search_dir_flag(dir));
  }
}
