use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

use crate::calendar::parse_now_override;
use crate::config::FlowPolicy;

#[derive(Parser, Debug)]
#[command(
  name = "kanban-flow-metrics",
  version,
  about = "Reconstruct kanban board history and report flow metrics as JSON",
  long_about = None
)]
pub struct Cli {
  /// Board export JSON (columns with status ids, issues with status changelogs)
  #[arg(long)]
  pub board: Option<PathBuf>,

  /// Flow policy JSON; omitted fields take their defaults
  #[arg(long)]
  pub config: Option<PathBuf>,

  /// Months of completions to analyse (overrides the policy file)
  #[arg(long)]
  pub months: Option<u32>,

  /// IANA timezone used for week bucketing, e.g. Europe/Lisbon (overrides the policy file)
  #[arg(long)]
  pub tz: Option<String>,

  /// Output file path (default stdout "-")
  #[arg(long, default_value = "-")]
  pub out: String,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Override the "now" instant that anchors the analysis window (hidden; tests only)
  #[arg(long = "now-override", hide = true)]
  pub now_override: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EffectiveConfig {
  pub board: PathBuf,
  pub policy: FlowPolicy,
  pub out: String,
  pub now: Option<DateTime<Utc>>,
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let Some(board) = cli.board else {
    bail!("Provide --board <export.json>")
  };

  let mut policy = match &cli.config {
    Some(path) => FlowPolicy::load(path)?,
    None => FlowPolicy::default(),
  };
  if let Some(months) = cli.months {
    policy.months_to_analyse = months;
  }
  if let Some(tz) = cli.tz {
    policy.timezone = tz;
  }
  policy.validate().context("invalid flow policy")?;

  let now = cli.now_override.as_deref().map(parse_now_override).transpose()?;

  Ok(EffectiveConfig { board, policy, out: cli.out, now })
}
