mod cmd;
mod output;

use std::ffi::OsString;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{Action, BuildArgs};
use output::{OutputFormat, print_error};

#[derive(Parser)]
#[command(name = mnm_lib::consts::APP_NAME)]
#[command(author, version, about = "Incremental builder for native runtime modules", long_about = None)]
struct Cli {
  /// Print every compiler and linker command line
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Pass -Wall to the compiler
  #[arg(long, global = true)]
  show_warnings: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Compile all sources, then link the module
  Build(BuildArgs),

  /// Compile sources to objects without linking
  Compile(BuildArgs),

  /// Link previously compiled objects into the module
  Link(BuildArgs),

  /// Display platform and toolchain information
  Info {
    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },
}

/// Rewrite legacy flag spellings into their current long form.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
  I: IntoIterator<Item = OsString>,
{
  args
    .into_iter()
    .map(|arg| match arg.to_str() {
      Some("-Wall") | Some("--showWarnings") => OsString::from("--show-warnings"),
      _ => arg,
    })
    .collect()
}

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let cli = Cli::parse_from(normalize_args(std::env::args_os()));

  let result = match cli.command {
    Commands::Build(args) => cmd::cmd_build(Action::Build, args, cli.show_warnings, cli.verbose),
    Commands::Compile(args) => cmd::cmd_build(Action::Compile, args, cli.show_warnings, cli.verbose),
    Commands::Link(args) => cmd::cmd_build(Action::Link, args, cli.show_warnings, cli.verbose),
    Commands::Info { output } => cmd::cmd_info(output),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}
