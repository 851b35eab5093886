// === Module Header START ===
// purpose: Utilities for the effective clock, report output and man page rendering
// role: utilities/helpers
// inputs: optional now override; serializable values; output target; clap CommandFactory
// outputs: DateTime<Utc>, files or stdout JSON, man page text
// side_effects: write_output creates parent directories and writes files or stdout
// invariants:
// - "-" always means stdout; any other target is a file path
// - written JSON is pretty-printed and newline-terminated
// errors: IO errors bubble with the target path as context
// === Module Header END ===

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::CommandFactory;
use serde::Serialize;

/// Returns the effective "now" given an optional override.
///
/// When `override_now` is `Some`, that instant is returned; otherwise
/// the current time is used. Keeps `Utc::now()` out of the pipeline.
pub fn effective_now(override_now: Option<DateTime<Utc>>) -> DateTime<Utc> {
  override_now.unwrap_or_else(Utc::now)
}

/// Serialize `value` as pretty JSON to stdout (`-`) or to the file at `out`.
pub fn write_output<T: Serialize>(out: &str, value: &T) -> Result<()> {
  let mut json = serde_json::to_string_pretty(value).context("serializing report")?;
  json.push('\n');

  if out == "-" {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    lock.write_all(json.as_bytes()).context("writing report to stdout")?;
    return Ok(());
  }

  let path = Path::new(out);
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
  }
  std::fs::write(path, json).with_context(|| format!("writing report {}", path.display()))?;
  tracing::info!(path = %path.display(), "wrote report");

  Ok(())
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
