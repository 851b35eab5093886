use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use kanban_flow_metrics::cli::{normalize, Cli};
use kanban_flow_metrics::{report, source, util};

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  // stdout carries the report; logs go to stderr
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
  fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();

  // Phase 1: normalize CLI into board path + validated policy
  let cfg = normalize(cli)?;

  // Phase 2: read the board export
  let board = source::read_board(&cfg.board, &cfg.policy)?;

  // Phase 3: compute and write the report
  let now = util::effective_now(cfg.now);
  let report = report::build_report(&cfg.policy, &board.items, now)?;
  util::write_output(&cfg.out, &report)
}
