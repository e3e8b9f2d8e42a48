//! Info command implementation.
//!
//! Shows the detected platform, the toolchain profile it maps to and the flags a
//! fresh build starts from. Does not require a runtime installation.

use anyhow::{Result, bail};
use serde::Serialize;

use mnm_lib::consts::{COMPILE_FLAGS, COMPILER_ENV, LINK_FLAGS, LINKER_ENV, MODULE_SUFFIX};
use mnm_lib::platform::Platform;
use mnm_lib::{FlagRegistry, Toolchain};

use crate::output::{OutputFormat, print_info, print_json, print_stat};

#[derive(Debug, Serialize)]
struct InfoReport {
  version: &'static str,
  platform: String,
  toolchain: Toolchain,
  compiler: String,
  linker: String,
  object_suffix: &'static str,
  module_suffix: &'static str,
  flags: FlagRegistry,
}

pub fn cmd_info(output: OutputFormat) -> Result<()> {
  let Some(platform) = Platform::current() else {
    bail!(
      "unsupported platform: {}/{}",
      std::env::consts::OS,
      std::env::consts::ARCH
    );
  };
  let toolchain = Toolchain::for_platform(platform);

  let report = InfoReport {
    version: env!("CARGO_PKG_VERSION"),
    platform: platform.triple(),
    toolchain,
    compiler: program_from_env(COMPILER_ENV).unwrap_or_else(|| toolchain.compiler().to_string()),
    linker: program_from_env(LINKER_ENV).unwrap_or_else(|| toolchain.linker().to_string()),
    object_suffix: toolchain.object_suffix(),
    module_suffix: MODULE_SUFFIX,
    flags: FlagRegistry::for_toolchain(&toolchain),
  };

  if output.is_json() {
    return print_json(&report);
  }

  print_info(&format!("mnm v{}", report.version));
  print_stat("Platform", &report.platform);
  print_stat("Toolchain", toolchain.as_str());
  print_stat("Compiler", &report.compiler);
  print_stat("Linker", &report.linker);
  print_stat("Object suffix", report.object_suffix);
  print_stat("Module suffix", report.module_suffix);
  println!();
  for group in [COMPILE_FLAGS, LINK_FLAGS] {
    print_stat(group, &report.flags.flags(group).join(" "));
  }

  Ok(())
}

fn program_from_env(name: &str) -> Option<String> {
  std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
