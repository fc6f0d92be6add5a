//! Error taxonomy for the reporting pipeline.

use thiserror::Error;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Failures surfaced to callers. None of these are retried internally.
#[derive(Error, Debug)]
pub enum ReportError {
  /// The tracker rejected the supplied credentials (HTTP 401/403).
  #[error("authentication failed against {server}: {message}")]
  Authentication { server: String, message: String },

  /// The tracker rejected the query or could not be reached.
  #[error("remote query failed: {message}")]
  RemoteQuery { message: String },

  /// Grouping asked for a column the table does not have.
  #[error("unknown field `{field}` (table columns: {available})")]
  UnknownField { field: String, available: String },

  #[error("unsupported chart kind `{0}` (expected one of: bar, pie, line, scatter, area)")]
  UnsupportedChartKind(String),

  #[error("template `{0}` not found")]
  MissingTemplate(String),

  /// Template engine failure while rendering a known template.
  #[error("template error: {0}")]
  Template(String),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

impl ReportError {
  pub fn remote(message: impl Into<String>) -> Self {
    Self::RemoteQuery { message: message.into() }
  }

  pub fn unknown_field(field: &str, available: &[String]) -> Self {
    Self::UnknownField {
      field: field.to_string(),
      available: available.join(", "),
    }
  }
}

impl From<minijinja::Error> for ReportError {
  fn from(err: minijinja::Error) -> Self {
    match err.kind() {
      minijinja::ErrorKind::TemplateNotFound => Self::MissingTemplate(err.detail().unwrap_or_default().to_string()),
      _ => Self::Template(err.to_string()),
    }
  }
}
