//! mnm-lib: incremental build engine for native runtime modules
//!
//! This crate compiles a set of C/C++ sources into objects and links them into a
//! single loadable module:
//! - `FlagRegistry`: ordered, duplicate-free flag groups handed to the toolchain
//! - `staleness`: timestamp checks deciding whether a compile or link can be skipped
//! - `Sequencer`: runs the compile stage, the link stage, or both

pub mod build;
pub mod config;
pub mod consts;
pub mod flags;
pub mod paths;
pub mod platform;
pub mod process;
pub mod staleness;
pub mod toolchain;
pub mod util;

pub use build::{BuildError, BuildEvent, BuildState, Phase, Reporter, Sequencer, SilentReporter, Stage};
pub use config::{ConfigError, ConfigOptions, ProjectConfig, RuntimeLayout};
pub use flags::FlagRegistry;
pub use process::{CommandRunner, ProcessRunner};
pub use toolchain::Toolchain;
