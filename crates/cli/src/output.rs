//! Terminal output shared by every command.
//!
//! Status lines go to stdout, except warnings, which go to stderr so that
//! `-o json` output stays parseable.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

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

/// Leading glyph of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
  Success,
  Warning,
  Info,
  Command,
}

impl Status {
  fn glyph(self) -> &'static str {
    match self {
      Status::Success => "✓",
      Status::Warning => "⚠",
      Status::Info => "•",
      Status::Command => "→",
    }
  }

  fn stream(self) -> Stream {
    match self {
      Status::Warning => Stream::Stderr,
      _ => Stream::Stdout,
    }
  }

  fn line(self, message: &str) -> String {
    let stream = self.stream();
    let glyph = self.glyph();
    let glyph = match self {
      Status::Success => glyph.if_supports_color(stream, |s| s.green()).to_string(),
      Status::Warning => glyph.if_supports_color(stream, |s| s.yellow()).to_string(),
      Status::Info => glyph.if_supports_color(stream, |s| s.blue()).to_string(),
      Status::Command => glyph.if_supports_color(stream, |s| s.cyan()).to_string(),
    };
    match self {
      Status::Command => format!("  {glyph} {message}"),
      Status::Warning => format!("{glyph} {}", message.if_supports_color(stream, |s| s.yellow())),
      _ => format!("{glyph} {message}"),
    }
  }

  fn print(self, message: &str) {
    match self.stream() {
      Stream::Stderr => eprintln!("{}", self.line(message)),
      _ => println!("{}", self.line(message)),
    }
  }
}

/// First 12 hex digits, enough to tell packages apart at a glance.
pub fn truncate_hash(hash: &str) -> &str {
  &hash[..hash.len().min(12)]
}

/// Human-readable elapsed time, rounded to the millisecond.
pub fn format_duration(duration: Duration) -> String {
  let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
  humantime::format_duration(Duration::from_millis(millis)).to_string()
}

pub fn print_success(message: &str) {
  Status::Success.print(message);
}

pub fn print_warning(message: &str) {
  Status::Warning.print(message);
}

pub fn print_info(message: &str) {
  Status::Info.print(message);
}

/// One external command, as it would be typed.
pub fn print_command(command_line: &str) {
  Status::Command.print(command_line);
}

pub fn print_stat(label: &str, value: &str) {
  println!("  {}: {}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()), value);
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{json}");
  Ok(())
}
