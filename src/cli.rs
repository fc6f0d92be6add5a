use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use serde::Serialize;

use crate::chart::{ChartKind, ChartOptions, ColorScheme};
use crate::extract::ExtractOptions;
use crate::html::RESERVED_NAMES;
use crate::pipeline::{ChartRequest, DatasetRequest, ReportLayout};
use crate::table::GroupOptions;
use crate::tracker::api::Credentials;
use crate::tracker::Source;
use crate::util;

/// Environment variables consulted, in order, for the API secret.
const SECRET_ENV_VARS: [&str; 2] = ["JIRA_API_TOKEN", "JIRA_PASSWORD"];

#[derive(Parser, Debug)]
#[command(
    name = "jira-report",
    version,
    about = "Query Jira with JQL and render grouped charts and tables into an HTML report",
    long_about = None
)]
pub struct Cli {
  /// Jira base URL, e.g. https://example.atlassian.net
  #[arg(long, env = "JIRA_SERVER")]
  pub server: Option<String>,

  /// Account name; paired with the token for Basic auth
  #[arg(long, env = "JIRA_USER")]
  pub user: Option<String>,

  /// API token or password (falls back to $JIRA_API_TOKEN, then $JIRA_PASSWORD)
  #[arg(long)]
  pub token: Option<String>,

  /// Read a saved search response instead of querying a server
  #[arg(long)]
  pub issues_json: Option<PathBuf>,

  /// JQL query selecting the issues
  #[arg(long)]
  pub jql: String,

  /// Field ids to extract (repeatable or comma separated)
  #[arg(long = "field", short = 'f', value_delimiter = ',', required = true)]
  pub fields: Vec<String>,

  /// Maximum issues to fetch (0 = no limit)
  #[arg(long, default_value_t = 100)]
  pub limit: usize,

  /// Issues requested per page
  #[arg(long, default_value_t = crate::tracker::fetcher::DEFAULT_PAGE_SIZE)]
  pub page_size: usize,

  /// Per-request timeout in seconds
  #[arg(long, default_value_t = 30)]
  pub timeout_secs: u64,

  /// Text written for missing values
  #[arg(long, default_value = "")]
  pub empty_marker: String,

  /// Separator used when a field holds several values
  #[arg(long, default_value = ", ")]
  pub separator: String,

  /// Leave missing values out of grouped counts
  #[arg(long)]
  pub exclude_empty: bool,

  /// Header of the count column in grouped tables
  #[arg(long, default_value = "Count")]
  pub count_label: String,

  /// Column header override, FIELD=Label (repeatable)
  #[arg(long = "label")]
  pub labels: Vec<String>,

  /// Keep raw field ids as headers instead of asking the server for display names
  #[arg(long)]
  pub no_field_names: bool,

  /// Chart a field: FIELD[:KIND[:TITLE]] with KIND one of bar, pie, line, scatter, area (repeatable; default: a bar chart per field)
  #[arg(long = "chart")]
  pub charts: Vec<String>,

  /// Palette for charts: default, pastel, mono
  #[arg(long, default_value = "default")]
  pub color_scheme: String,

  /// Chart width in pixels
  #[arg(long, default_value_t = 640)]
  pub chart_width: u32,

  /// Chart height in pixels
  #[arg(long, default_value_t = 400)]
  pub chart_height: u32,

  /// X axis title for every chart (default: the field's header)
  #[arg(long)]
  pub x_label: Option<String>,

  /// Y axis title for every chart (default: the count label)
  #[arg(long)]
  pub y_label: Option<String>,

  /// Embed charts as SVG images instead of interactive plotly.js
  #[arg(long)]
  pub static_charts: bool,

  /// Omit the per-issue table
  #[arg(long)]
  pub no_table: bool,

  /// Add a count table for each charted field
  #[arg(long)]
  pub grouped_tables: bool,

  /// CSS class of the element wrapping each chart
  #[arg(long, default_value = crate::html::CHART_DIV_CLASS)]
  pub chart_class: String,

  /// CSS class of the element wrapping each table
  #[arg(long, default_value = crate::html::TABLE_DIV_CLASS)]
  pub table_class: String,

  /// Document title
  #[arg(long, default_value = "Jira Report")]
  pub title: String,

  /// Extra template value, NAME=HTML (repeatable; built-in report names are rejected)
  #[arg(long = "var")]
  pub vars: Vec<String>,

  /// Directory of `<name>.j2` files overriding the built-in templates
  #[arg(long)]
  pub template_dir: Option<PathBuf>,

  /// Output file (default stdout "-")
  #[arg(long, default_value = "-")]
  pub out: String,

  /// Debug logging on stderr (RUST_LOG wins when set)
  #[arg(long, short = 'v')]
  pub verbose: bool,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Override the "now" instant used for the report stamp (hidden; tests only)
  #[arg(long = "now-override", hide = true)]
  pub now_override: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EffectiveConfig {
  #[serde(skip)]
  pub source: Source,
  /// Server URL or absolute path of the saved search.
  pub source_label: String,
  pub dataset: DatasetRequest,
  pub report: ReportLayout,
  pub template_dir: Option<String>,
  pub out: String,
  pub verbose: bool,
  pub now_override: Option<String>,
}

/// First non-empty secret from the flag or the environment.
pub fn discover_secret(flag: Option<String>) -> Option<String> {
  flag
    .filter(|s| !s.is_empty())
    .or_else(|| SECRET_ENV_VARS.iter().find_map(|k| std::env::var(k).ok().filter(|v| !v.is_empty())))
}

/// `FIELD[:KIND[:TITLE]]`; the title may contain further ':'.
fn parse_chart(raw: &str, fields: &[String], base: &ChartOptions) -> Result<ChartRequest> {
  let mut parts = raw.splitn(3, ':');
  let field = parts.next().unwrap_or_default().trim().to_string();
  let kind = parts.next().map(str::trim).filter(|k| !k.is_empty()).unwrap_or("bar");
  let title = parts.next().map(str::trim).filter(|t| !t.is_empty());

  if !fields.contains(&field) {
    bail!("--chart {:?}: field {:?} is not among the requested fields {:?}", raw, field, fields);
  }
  if let Err(e) = ChartKind::from_str(kind) {
    bail!("--chart {:?}: {}", raw, e);
  }

  let mut options = base.clone();
  if let Some(t) = title {
    options.title = Some(t.to_string());
  }
  Ok(ChartRequest { field, kind: kind.to_ascii_lowercase(), options })
}

fn parse_pairs(raw: &[String], flag: &str) -> Result<BTreeMap<String, String>> {
  let mut out = BTreeMap::new();
  for item in raw {
    match util::parse_key_value(item) {
      Ok((k, v)) => {
        out.insert(k, v);
      }
      Err(e) => bail!("--{} {}", flag, e),
    }
  }
  Ok(out)
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  // Source: a saved search wins over any configured server
  let (source, source_label) = match (&cli.issues_json, &cli.server) {
    (Some(path), _) => (Source::SavedSearch(path.clone()), util::canonicalize_lossy(path)),
    (None, Some(server)) if !server.trim().is_empty() => {
      let credentials = Credentials::from_parts(cli.user.clone().filter(|u| !u.is_empty()), discover_secret(cli.token.clone()));
      let source = Source::Jira {
        server: server.trim().to_string(),
        credentials,
        timeout: Duration::from_secs(cli.timeout_secs.max(1)),
      };
      (source, server.trim().to_string())
    }
    _ => bail!("Provide --server (or JIRA_SERVER) or --issues-json"),
  };

  if cli.jql.trim().is_empty() {
    bail!("--jql must not be empty");
  }
  if cli.page_size == 0 {
    bail!("--page-size must be at least 1");
  }

  let mut fields: Vec<String> = Vec::new();
  for f in cli.fields.iter().map(|f| f.trim()).filter(|f| !f.is_empty()) {
    if !fields.iter().any(|x| x == f) {
      fields.push(f.to_string());
    }
  }
  if fields.is_empty() {
    bail!("Provide at least one --field");
  }

  let base_chart = ChartOptions {
    title: None,
    x_label: cli.x_label.clone(),
    y_label: cli.y_label.clone(),
    color_scheme: ColorScheme::parse_lossy(&cli.color_scheme),
    width: cli.chart_width,
    height: cli.chart_height,
  };
  let charts = if cli.charts.is_empty() {
    fields
      .iter()
      .map(|f| ChartRequest { field: f.clone(), kind: ChartKind::Bar.to_string(), options: base_chart.clone() })
      .collect()
  } else {
    cli.charts.iter().map(|c| parse_chart(c, &fields, &base_chart)).collect::<Result<Vec<_>>>()?
  };

  let dataset = DatasetRequest {
    jql: cli.jql.trim().to_string(),
    limit: (cli.limit > 0).then_some(cli.limit),
    page_size: cli.page_size,
    extract: ExtractOptions { empty_marker: cli.empty_marker.clone(), separator: cli.separator.clone() },
    group: GroupOptions {
      empty_marker: cli.empty_marker.clone(),
      exclude_empty: cli.exclude_empty,
      count_label: cli.count_label.clone(),
    },
    labels: parse_pairs(&cli.labels, "label")?,
    resolve_names: !cli.no_field_names,
    fields,
  };

  let extra = parse_pairs(&cli.vars, "var")?;
  if let Some(name) = extra.keys().find(|k| RESERVED_NAMES.contains(&k.as_str())) {
    bail!("--var {:?} would replace a built-in report value; reserved names are {:?}", name, RESERVED_NAMES);
  }
  for (flag, class) in [("chart-class", &cli.chart_class), ("table-class", &cli.table_class)] {
    if class.trim().is_empty() {
      bail!("--{} must not be empty", flag);
    }
  }

  let report = ReportLayout {
    title: cli.title.clone(),
    charts,
    static_charts: cli.static_charts,
    chart_class: cli.chart_class.trim().to_string(),
    table_class: cli.table_class.trim().to_string(),
    include_table: !cli.no_table,
    include_grouped_tables: cli.grouped_tables,
    generated_at: None,
    show_query: true,
    extra,
  };

  Ok(EffectiveConfig {
    source,
    source_label,
    dataset,
    report,
    template_dir: cli.template_dir.as_deref().map(util::canonicalize_lossy),
    out: cli.out,
    verbose: cli.verbose,
    now_override: cli.now_override,
  })
}
