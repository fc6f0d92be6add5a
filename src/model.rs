// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define raw tracker records and the search-page shape shared by fetching and extraction
// role: model/types
// outputs: IssueRecord (key + raw field map) and SearchPage (one paginated search response)
// invariants: Records are never mutated after fetch; unknown JSON shapes survive untouched in `fields`
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One issue as returned by the tracker: field id -> raw JSON value.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct IssueRecord {
  #[serde(default)]
  pub key: String,
  #[serde(default)]
  pub fields: Map<String, Value>,
}

impl IssueRecord {
  pub fn new(key: impl Into<String>, fields: Map<String, Value>) -> Self {
    Self { key: key.into(), fields }
  }

  /// Build a record from a bare JSON object of fields (used by tests and fixtures).
  pub fn from_fields(fields: Value) -> Self {
    match fields {
      Value::Object(map) => Self { key: String::new(), fields: map },
      _ => Self::default(),
    }
  }

  pub fn get(&self, field: &str) -> Option<&Value> {
    self.fields.get(field)
  }
}

/// A single page of `/rest/api/2/search` output.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
  /// Offset the server says this page begins at; older servers omit it.
  #[serde(default)]
  pub start_at: Option<usize>,
  #[serde(default)]
  pub max_results: usize,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub total: Option<usize>,
  #[serde(default)]
  pub issues: Vec<IssueRecord>,
}

impl SearchPage {
  /// True when the server has nothing beyond this page.
  pub fn is_last(&self) -> bool {
    if self.issues.is_empty() {
      return true;
    }

    match self.total {
      Some(total) => self.start_at.unwrap_or_default() + self.issues.len() >= total,
      None => self.issues.len() < self.max_results,
    }
  }
}

/// Field metadata from `/rest/api/2/field`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FieldInfo {
  pub id: String,
  #[serde(default)]
  pub name: String,
}
