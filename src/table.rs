// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Primary (per-issue) table assembly and per-field grouped count tables
// role: pipeline/tables
// inputs: Rows from extraction plus column definitions; GroupOptions for grouping
// outputs: PrimaryTable, GroupedTable, BTreeMap<field, GroupedTable>
// invariants:
// - column order == field list order; tables are immutable once built
// - grouped counts sum to the table's row count (minus empty-marker rows when excluded)
// - grouped rows sorted by count desc, then value asc
// errors: UnknownField when grouping by a column the table lacks
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::error::{ReportError, Result};
use crate::extract::Row;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
  /// Field id the column was extracted from.
  pub id: String,
  /// Header shown in rendered output.
  pub label: String,
}

impl Column {
  pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
    Self { id: id.into(), label: label.into() }
  }

  pub fn unlabeled(id: &str) -> Self {
    Self::new(id, id)
  }
}

/// One row per issue, one column per requested field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimaryTable {
  columns: Vec<Column>,
  keys: Vec<String>,
  rows: Vec<Vec<String>>,
}

impl PrimaryTable {
  /// Build with headers equal to the field ids.
  pub fn build(fields: &[String], rows: &[Row]) -> Self {
    let columns = fields.iter().map(|f| Column::unlabeled(f)).collect();
    Self::build_labeled(columns, rows)
  }

  pub fn build_labeled(columns: Vec<Column>, rows: &[Row]) -> Self {
    let keys = rows.iter().map(|r| r.key.clone()).collect();
    let rows = rows
      .iter()
      .map(|r| {
        columns
          .iter()
          .map(|c| r.get(&c.id).unwrap_or_default().to_string())
          .collect()
      })
      .collect();

    Self { columns, keys, rows }
  }

  /// Field ids, in field list order.
  pub fn columns(&self) -> Vec<String> {
    self.columns.iter().map(|c| c.id.clone()).collect()
  }

  pub fn column_defs(&self) -> &[Column] {
    &self.columns
  }

  pub fn keys(&self) -> &[String] {
    &self.keys
  }

  pub fn rows(&self) -> &[Vec<String>] {
    &self.rows
  }

  pub fn row_count(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  fn column_index(&self, field: &str) -> Option<usize> {
    self.columns.iter().position(|c| c.id == field)
  }

  /// Values of one column, top to bottom.
  pub fn column_values(&self, field: &str) -> Result<Vec<&str>> {
    let idx = self
      .column_index(field)
      .ok_or_else(|| ReportError::unknown_field(field, &self.columns()))?;
    Ok(self.rows.iter().map(|r| r[idx].as_str()).collect())
  }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GroupOptions {
  /// Marker the extraction used for missing values.
  pub empty_marker: String,
  /// Leave the empty-marker group out entirely.
  pub exclude_empty: bool,
  pub count_label: String,
}

impl Default for GroupOptions {
  fn default() -> Self {
    Self {
      empty_marker: String::new(),
      exclude_empty: false,
      count_label: "Count".to_string(),
    }
  }
}

/// (distinct value, count) for one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedTable {
  pub field: String,
  pub value_label: String,
  pub count_label: String,
  pub rows: Vec<(String, usize)>,
}

impl GroupedTable {
  pub fn total(&self) -> usize {
    self.rows.iter().map(|(_, n)| n).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }
}

pub fn group(table: &PrimaryTable, field: &str, opts: &GroupOptions) -> Result<GroupedTable> {
  let values = table.column_values(field)?;
  let mut counts: HashMap<&str, usize> = HashMap::new();

  for v in values {
    if opts.exclude_empty && v == opts.empty_marker {
      continue;
    }
    *counts.entry(v).or_insert(0) += 1;
  }

  let mut rows: Vec<(String, usize)> = counts.into_iter().map(|(v, n)| (v.to_string(), n)).collect();
  rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

  let value_label = table
    .column_defs()
    .iter()
    .find(|c| c.id == field)
    .map(|c| c.label.clone())
    .unwrap_or_else(|| field.to_string());

  Ok(GroupedTable {
    field: field.to_string(),
    value_label,
    count_label: opts.count_label.clone(),
    rows,
  })
}

/// Group every column of `table`.
pub fn group_all(table: &PrimaryTable, opts: &GroupOptions) -> Result<BTreeMap<String, GroupedTable>> {
  table
    .columns()
    .into_iter()
    .map(|f| group(table, &f, opts).map(|g| (f, g)))
    .collect()
}
