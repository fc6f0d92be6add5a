use std::collections::BTreeMap;

use crate::error::Result;
use crate::model::FieldInfo;
use crate::table::Column;
use crate::tracker::api::TrackerApi;

/// Field id -> display name, as published by the tracker.
#[derive(Debug, Clone, Default)]
pub struct FieldCatalogue {
  names: BTreeMap<String, String>,
}

impl FieldCatalogue {
  pub fn load(api: &dyn TrackerApi) -> Result<Self> {
    let infos = api.fields()?;
    tracing::debug!(count = infos.len(), "loaded field catalogue");
    Ok(Self::from_infos(infos))
  }

  pub fn from_infos(infos: Vec<FieldInfo>) -> Self {
    let names = infos
      .into_iter()
      .filter(|f| !f.name.is_empty())
      .map(|f| (f.id, f.name))
      .collect();
    Self { names }
  }

  pub fn name_of(&self, id: &str) -> Option<&str> {
    self.names.get(id).map(String::as_str)
  }

  /// Column definitions for `fields`; explicit overrides win over catalogue names,
  /// and unknown ids label themselves.
  pub fn columns(&self, fields: &[String], overrides: &BTreeMap<String, String>) -> Vec<Column> {
    fields
      .iter()
      .map(|id| {
        let label = overrides
          .get(id)
          .cloned()
          .or_else(|| self.name_of(id).map(str::to_string))
          .unwrap_or_else(|| id.clone());
        Column::new(id.clone(), label)
      })
      .collect()
  }
}
