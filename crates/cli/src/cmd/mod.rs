mod build;
mod info;

pub use build::{Action, BuildArgs, cmd_build};
pub use info::cmd_info;
