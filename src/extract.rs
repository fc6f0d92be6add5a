// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Project raw tracker records onto a requested field list, flattening compound values to text
// role: pipeline/extraction
// inputs: IssueRecord slice, ordered field ids, ExtractOptions (empty marker, list separator)
// outputs: One Row per record holding exactly the requested fields
// invariants:
// - output row count == input record count; each row holds every requested field, nothing else
// - never fails: unrecognized shapes become the empty marker
// - empty collections are grouped under the empty marker
// - inputs are borrowed read-only; repeated calls give identical rows
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::model::IssueRecord;

/// Object attributes tried, in order, to find a human-readable name.
///
/// `value` is what custom select options carry; `name` covers status/priority/components;
/// `displayName` covers users.
const DISPLAY_KEYS: [&str; 3] = ["value", "name", "displayName"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractOptions {
  pub empty_marker: String,
  pub separator: String,
}

impl Default for ExtractOptions {
  fn default() -> Self {
    Self {
      empty_marker: String::new(),
      separator: ", ".to_string(),
    }
  }
}

/// Recognized shapes of a raw field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldShape {
  /// Absent, null, blank string or empty collection.
  Empty,
  /// String, number or boolean.
  Scalar(String),
  /// Single object exposing a display attribute.
  Named(String),
  /// List whose recognizable members flattened to these names.
  NamedList(Vec<String>),
  Unrecognized,
}

impl FieldShape {
  pub fn classify(raw: Option<&Value>) -> Self {
    match raw {
      None | Some(Value::Null) => FieldShape::Empty,
      Some(Value::String(s)) if s.trim().is_empty() => FieldShape::Empty,
      Some(Value::String(s)) => FieldShape::Scalar(s.clone()),
      Some(Value::Number(n)) => FieldShape::Scalar(number_text(n)),
      Some(Value::Bool(b)) => FieldShape::Scalar(b.to_string()),
      Some(Value::Object(map)) => DISPLAY_KEYS
        .iter()
        .find_map(|k| map.get(*k).and_then(Value::as_str).filter(|s| !s.is_empty()))
        .map(|s| FieldShape::Named(s.to_string()))
        .unwrap_or(FieldShape::Unrecognized),
      Some(Value::Array(items)) => {
        let names: Vec<String> = items
          .iter()
          .filter_map(|item| match FieldShape::classify(Some(item)) {
            FieldShape::Scalar(s) | FieldShape::Named(s) => Some(s),
            _ => None,
          })
          .collect();

        if names.is_empty() {
          FieldShape::Empty
        } else {
          FieldShape::NamedList(names)
        }
      }
    }
  }

  pub fn flatten(self, opts: &ExtractOptions) -> String {
    match self {
      FieldShape::Scalar(s) | FieldShape::Named(s) => s,
      FieldShape::NamedList(names) => names.join(&opts.separator),
      FieldShape::Empty | FieldShape::Unrecognized => opts.empty_marker.clone(),
    }
  }
}

/// Integers stored as floats (story points, etc.) print without a trailing `.0`.
fn number_text(n: &Number) -> String {
  if let Some(f) = n.as_f64().filter(|_| n.is_f64()) {
    if f.fract() == 0.0 && f.abs() < 1e15 {
      return format!("{}", f as i64);
    }
  }
  n.to_string()
}

/// One projected issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
  pub key: String,
  pub cells: BTreeMap<String, String>,
}

impl Row {
  pub fn get(&self, field: &str) -> Option<&str> {
    self.cells.get(field).map(String::as_str)
  }
}

pub fn extract_value(raw: Option<&Value>, opts: &ExtractOptions) -> String {
  let shape = FieldShape::classify(raw);

  if shape == FieldShape::Unrecognized {
    tracing::trace!(value = ?raw, "unrecognized field shape; using empty marker");
  }

  shape.flatten(opts)
}

pub fn extract(records: &[IssueRecord], fields: &[String], opts: &ExtractOptions) -> Vec<Row> {
  records
    .iter()
    .map(|rec| Row {
      key: rec.key.clone(),
      cells: fields
        .iter()
        .map(|f| (f.clone(), extract_value(rec.get(f), opts)))
        .collect(),
    })
    .collect()
}
