// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Orchestrate fetch -> extract -> build -> group -> chart -> compose for one report
// role: pipeline/orchestration
// inputs: TrackerApi, DatasetRequest (query + fields + shaping options), ReportLayout (charts + document options)
// outputs: Dataset (primary table + grouped tables per field) and the final HTML document string
// side_effects: Network calls through the tracker API only; no file I/O
// invariants:
// - every grouped table is derived from the same primary table in one call
// - chart requests naming a field outside the dataset fail with UnknownField
// errors: All component errors propagate unchanged
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;

use serde::Serialize;

use crate::chart::{self, ChartOptions};
use crate::error::{ReportError, Result};
use crate::extract::{self, ExtractOptions};
use crate::html::{HtmlAssembler, Substitutions, CHART_DIV_CLASS, REPORT_TEMPLATE, TABLE_DIV_CLASS};
use crate::table::{self, Column, GroupOptions, GroupedTable, PrimaryTable};
use crate::tracker::api::TrackerApi;
use crate::tracker::fetcher::{IssueFetcher, DEFAULT_PAGE_SIZE};
use crate::tracker::fields::FieldCatalogue;

#[derive(Debug, Clone, Serialize)]
pub struct DatasetRequest {
  pub jql: String,
  pub fields: Vec<String>,
  /// `None` fetches until the tracker runs out.
  pub limit: Option<usize>,
  pub page_size: usize,
  pub extract: ExtractOptions,
  pub group: GroupOptions,
  /// Explicit column headers by field id.
  pub labels: BTreeMap<String, String>,
  /// Ask the tracker for display names of the requested fields.
  pub resolve_names: bool,
}

impl DatasetRequest {
  pub fn new(jql: impl Into<String>, fields: Vec<String>) -> Self {
    Self {
      jql: jql.into(),
      fields,
      limit: Some(100),
      page_size: DEFAULT_PAGE_SIZE,
      extract: ExtractOptions::default(),
      group: GroupOptions::default(),
      labels: BTreeMap::new(),
      resolve_names: false,
    }
  }

  /// Grouping must use the same marker extraction wrote.
  fn group_options(&self) -> GroupOptions {
    GroupOptions {
      empty_marker: self.extract.empty_marker.clone(),
      ..self.group.clone()
    }
  }
}

/// Primary table plus one grouped table per field.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
  pub table: PrimaryTable,
  pub groups: BTreeMap<String, GroupedTable>,
}

impl Dataset {
  pub fn group(&self, field: &str) -> Result<&GroupedTable> {
    self
      .groups
      .get(field)
      .ok_or_else(|| ReportError::unknown_field(field, &self.table.columns()))
  }
}

pub fn build_dataset(api: &dyn TrackerApi, req: &DatasetRequest) -> Result<Dataset> {
  let records = IssueFetcher::new(api)
    .with_page_size(req.page_size)
    .fetch(&req.jql, req.limit, &req.fields)?;

  // Display names are cosmetic; ids stand in when the catalogue is unavailable.
  let catalogue = if req.resolve_names {
    FieldCatalogue::load(api).unwrap_or_else(|e| {
      tracing::warn!(error = %e, "field names unavailable; using field ids");
      FieldCatalogue::default()
    })
  } else {
    FieldCatalogue::default()
  };
  let columns: Vec<Column> = catalogue.columns(&req.fields, &req.labels);

  let rows = extract::extract(&records, &req.fields, &req.extract);
  let table = PrimaryTable::build_labeled(columns, &rows);
  let groups = table::group_all(&table, &req.group_options())?;

  tracing::info!(rows = table.row_count(), columns = table.columns().len(), "built dataset");
  Ok(Dataset { table, groups })
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartRequest {
  pub field: String,
  pub kind: String,
  pub options: ChartOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportLayout {
  pub title: String,
  pub charts: Vec<ChartRequest>,
  pub static_charts: bool,
  /// Class of the `<div>` wrapping each chart fragment.
  pub chart_class: String,
  /// Class of the `<div>` wrapping each table fragment.
  pub table_class: String,
  /// Append the per-issue table.
  pub include_table: bool,
  /// Append a count table under each chart's field.
  pub include_grouped_tables: bool,
  pub generated_at: Option<String>,
  pub show_query: bool,
  pub extra: BTreeMap<String, String>,
}

impl Default for ReportLayout {
  fn default() -> Self {
    Self {
      title: String::new(),
      charts: Vec::new(),
      static_charts: false,
      chart_class: CHART_DIV_CLASS.to_string(),
      table_class: TABLE_DIV_CLASS.to_string(),
      include_table: false,
      include_grouped_tables: false,
      generated_at: None,
      show_query: false,
      extra: BTreeMap::new(),
    }
  }
}

/// Render `dataset` into the report template.
pub fn render_report(assembler: &HtmlAssembler, dataset: &Dataset, spec: &ReportLayout, jql: &str) -> Result<String> {
  let mut html_charts = Vec::with_capacity(spec.charts.len());
  let mut html_tables = Vec::new();

  for (position, req) in spec.charts.iter().enumerate() {
    let grouped = dataset.group(&req.field)?;
    let chart = chart::render(grouped, &req.kind, &req.options)?;
    html_charts.push(assembler.chart_fragment(&chart, spec.static_charts, position, &spec.chart_class)?);

    if spec.include_grouped_tables {
      html_tables.push(assembler.grouped_fragment(grouped, &spec.table_class)?);
    }
  }

  if spec.include_table {
    html_tables.push(assembler.table_fragment(&dataset.table, &spec.table_class)?);
  }

  let subs = Substitutions {
    title: spec.title.clone(),
    query: spec.show_query.then(|| jql.to_string()),
    generated_at: spec.generated_at.clone(),
    html_charts,
    html_tables,
    include_plotly: !spec.static_charts && !spec.charts.is_empty(),
    extra: spec.extra.clone(),
  };

  assembler.compose(REPORT_TEMPLATE, subs)
}

/// A reporting session: one tracker connection plus one template set.
pub struct ReportSession {
  api: Box<dyn TrackerApi>,
  assembler: HtmlAssembler,
}

impl ReportSession {
  pub fn new(api: Box<dyn TrackerApi>, assembler: HtmlAssembler) -> Self {
    Self { api, assembler }
  }

  pub fn dataset(&self, req: &DatasetRequest) -> Result<Dataset> {
    build_dataset(self.api.as_ref(), req)
  }

  pub fn report(&self, req: &DatasetRequest, spec: &ReportLayout) -> Result<String> {
    let dataset = self.dataset(req)?;
    render_report(&self.assembler, &dataset, spec, &req.jql)
  }
}
