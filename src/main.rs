use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use jira_report::cli::{normalize, Cli};
use jira_report::html::HtmlAssembler;
use jira_report::pipeline::ReportSession;
use jira_report::{tracker, util};

fn init_tracing(verbose: bool) {
  let fallback = if verbose { "jira_report=debug,info" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .try_init();
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  init_tracing(cli.verbose);

  // Phase 1: normalize CLI
  let mut cfg = normalize(cli)?;
  tracing::debug!(config = %serde_json::to_string(&cfg)?, "effective config");

  // Phase 2: stamp the report
  let now = util::effective_now(util::parse_now(cfg.now_override.as_deref()));
  cfg.report.generated_at = Some(util::generated_at_stamp(now));

  // Phase 3: tracker backend and templates
  let api = tracker::build_api(&cfg.source).with_context(|| format!("opening {}", cfg.source_label))?;
  let assembler = match cfg.template_dir.as_deref() {
    Some(dir) => HtmlAssembler::with_template_dir(Path::new(dir)).with_context(|| format!("loading templates from {}", dir))?,
    None => HtmlAssembler::new()?,
  };
  let session = ReportSession::new(api, assembler);

  // Phase 4: fetch, shape, chart and compose
  let html = session
    .report(&cfg.dataset, &cfg.report)
    .with_context(|| format!("building report for {:?}", cfg.dataset.jql))?;

  util::write_output(&cfg.out, &html)
}
