//! CLI output formatting utilities.
//!
//! Renders build events as the familiar `[k/N] cxx: src -> obj` progress lines and
//! provides colored status messages and duration formatting.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use mnm_lib::{BuildEvent, Reporter, Stage};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const INFO: &str = "•";
}

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    let mins = secs / 60;
    let remaining_secs = secs % 60;
    format!("{}m {}s", mins, remaining_secs)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    "ERROR:".if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

fn join_paths(paths: &[PathBuf]) -> String {
  paths
    .iter()
    .map(|p| p.display().to_string())
    .collect::<Vec<_>>()
    .join(" ")
}

fn arrow_line(task: usize, total: usize, action: &str, skipped: bool, from: &str, to: &Path) -> String {
  let skip = if skipped { "SKIPPING " } else { "" };
  format!("[{}/{}] {}{}: {} -> {}", task, total, skip, action, from, to.display())
}

/// Plain-text line for `event`, or `None` when the event is not shown.
pub fn format_event(event: &BuildEvent, verbose: bool) -> Option<String> {
  match event {
    BuildEvent::Compile {
      task,
      total,
      source,
      object,
      skipped,
    } => Some(arrow_line(*task, *total, "cxx", *skipped, &source.display().to_string(), object)),
    BuildEvent::Link {
      task,
      total,
      objects,
      output,
      skipped,
    } => Some(arrow_line(*task, *total, "cxx_link", *skipped, &join_paths(objects), output)),
    BuildEvent::Command { program, args } => Some(format!("{} {}", program, args.join(" "))),
    BuildEvent::StageDone(stage) if verbose => Some(match stage {
      Stage::Compile => "Done compiling.".to_string(),
      Stage::Link => "Done linking.".to_string(),
    }),
    BuildEvent::StageDone(_) => None,
  }
}

/// Prints build progress to stdout: compiles in green, the link in yellow.
///
/// Remembers whether the link was skipped so the final summary can say so.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
  verbose: bool,
  link_skipped: Cell<bool>,
}

impl ConsoleReporter {
  pub fn new(verbose: bool) -> Self {
    Self {
      verbose,
      link_skipped: Cell::new(false),
    }
  }

  /// Whether the last link task found the module up to date.
  pub fn link_skipped(&self) -> bool {
    self.link_skipped.get()
  }
}

impl Reporter for ConsoleReporter {
  fn report(&self, event: &BuildEvent) {
    if let BuildEvent::Link { skipped, .. } = event {
      self.link_skipped.set(*skipped);
    }
    let Some(line) = format_event(event, self.verbose) else {
      return;
    };
    match event {
      BuildEvent::Compile { .. } => println!("{}", line.if_supports_color(Stream::Stdout, |s| s.green())),
      BuildEvent::Link { .. } => println!("{}", line.if_supports_color(Stream::Stdout, |s| s.yellow())),
      _ => println!("{}", line),
    }
  }
}
