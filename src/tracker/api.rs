// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Tracker API seam (Jira REST v2 over HTTP, or saved search responses on disk)
// role: tracker/api
// inputs: server URL + credentials, or a JSON file holding a search response
// outputs: SearchPage per request; FieldInfo catalogue
// side_effects: Network calls to the tracker (HTTP backend); file read at construction (file backend)
// invariants:
// - One HTTP round-trip per call; no retries
// - 401/403 map to Authentication, every other failure to RemoteQuery
// - Credentials are attached to every request and never logged
// errors: Surfaced unmodified to the caller
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::Path;
use std::time::Duration;

use base64::Engine as _;
use serde_json::Value;

use crate::error::{ReportError, Result};
use crate::ext::serde_json::JsonFetch;
use crate::model::{FieldInfo, IssueRecord, SearchPage};

/// How requests authenticate against the tracker.
#[derive(Clone)]
pub enum Credentials {
  Anonymous,
  Basic { username: String, password: String },
  Bearer { token: String },
}

impl Credentials {
  /// Username + secret gives Basic auth; a secret alone is sent as a bearer token.
  pub fn from_parts(username: Option<String>, secret: Option<String>) -> Self {
    match (username, secret) {
      (Some(username), Some(password)) => Credentials::Basic { username, password },
      (None, Some(token)) => Credentials::Bearer { token },
      (Some(username), None) => Credentials::Basic { username, password: String::new() },
      (None, None) => Credentials::Anonymous,
    }
  }

  fn header_value(&self) -> Option<String> {
    match self {
      Credentials::Anonymous => None,
      Credentials::Basic { username, password } => {
        let raw = format!("{}:{}", username, password);
        Some(format!("Basic {}", base64::engine::general_purpose::STANDARD.encode(raw)))
      }
      Credentials::Bearer { token } => Some(format!("Bearer {}", token)),
    }
  }

  fn kind(&self) -> &'static str {
    match self {
      Credentials::Anonymous => "anonymous",
      Credentials::Basic { .. } => "basic",
      Credentials::Bearer { .. } => "bearer",
    }
  }
}

impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Credentials::Basic { username, .. } => write!(f, "Basic({}, ***)", username),
      other => write!(f, "{}", other.kind()),
    }
  }
}

// --- Trait seam for the tracker ---
pub trait TrackerApi {
  /// Run one page of a JQL search.
  fn search_page(&self, jql: &str, start_at: usize, max_results: usize, fields: &[String]) -> Result<SearchPage>;

  /// List every field the tracker knows about (standard and custom).
  fn fields(&self) -> Result<Vec<FieldInfo>>;
}

pub struct JiraHttpApi {
  server: String,
  credentials: Credentials,
  agent: ureq::Agent,
}

impl JiraHttpApi {
  pub fn new(server: &str, credentials: Credentials, timeout: Duration) -> Self {
    let agent: ureq::Agent = ureq::Agent::config_builder()
      .timeout_global(Some(timeout))
      .http_status_as_error(false)
      .build()
      .into();

    Self {
      server: server.trim_end_matches('/').to_string(),
      credentials,
      agent,
    }
  }

  fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
    let url = format!("{}{}", self.server, path);
    let mut req = self
      .agent
      .get(&url)
      .header("Accept", "application/json")
      .header("User-Agent", "jira-report");

    for (k, v) in query {
      req = req.query(*k, v);
    }

    if let Some(auth) = self.credentials.header_value() {
      req = req.header("Authorization", &auth);
    }

    tracing::debug!(url = %url, auth = self.credentials.kind(), "tracker request");

    let mut resp = req
      .call()
      .map_err(|e| ReportError::remote(format!("{} unreachable: {}", self.server, e)))?;
    let status = resp.status();
    let text = resp
      .body_mut()
      .read_to_string()
      .map_err(|e| ReportError::remote(format!("reading response from {}: {}", url, e)))?;

    if status.is_success() {
      return serde_json::from_str::<Value>(&text)
        .map_err(|e| ReportError::remote(format!("undecodable response from {}: {}", url, e)));
    }

    let message = error_message(status.as_u16(), &text);

    match status.as_u16() {
      401 | 403 => Err(ReportError::Authentication {
        server: self.server.clone(),
        message,
      }),
      _ => Err(ReportError::remote(message)),
    }
  }
}

/// Build a readable message out of a Jira error body, falling back to the status code.
fn error_message(status: u16, body: &str) -> String {
  let parsed = serde_json::from_str::<Value>(body).unwrap_or(Value::Null);
  let mut parts = parsed.fetch("errorMessages").strings();
  parts.extend(parsed.fetch("errors").strings());

  if parts.is_empty() {
    format!("HTTP {}", status)
  } else {
    format!("HTTP {}: {}", status, parts.join("; "))
  }
}

impl TrackerApi for JiraHttpApi {
  fn search_page(&self, jql: &str, start_at: usize, max_results: usize, fields: &[String]) -> Result<SearchPage> {
    let mut query = vec![
      ("jql", jql.to_string()),
      ("startAt", start_at.to_string()),
      ("maxResults", max_results.to_string()),
    ];

    if !fields.is_empty() {
      query.push(("fields", fields.join(",")));
    }

    let v = self.get_json("/rest/api/2/search", &query)?;
    serde_json::from_value::<SearchPage>(v).map_err(|e| ReportError::remote(format!("unexpected search response: {}", e)))
  }

  fn fields(&self) -> Result<Vec<FieldInfo>> {
    let v = self.get_json("/rest/api/2/field", &[])?;
    serde_json::from_value::<Vec<FieldInfo>>(v).map_err(|e| ReportError::remote(format!("unexpected field list: {}", e)))
  }
}

/// Replays a saved search response (`{"issues": [...], "names": {...}}` or a bare issue array).
pub struct FileTrackerApi {
  issues: Vec<IssueRecord>,
  names: Vec<FieldInfo>,
}

impl FileTrackerApi {
  pub fn from_value(v: Value) -> Result<Self> {
    let issues_v = match &v {
      Value::Array(_) => v.clone(),
      _ => v.fetch("issues").value().cloned().unwrap_or_else(|| Value::Array(Vec::new())),
    };
    let issues = serde_json::from_value::<Vec<IssueRecord>>(issues_v)?;

    // `expand=names` responses carry the field catalogue alongside the issues.
    let names = v
      .fetch("names")
      .value()
      .and_then(Value::as_object)
      .map(|m| {
        m.iter()
          .map(|(id, name)| FieldInfo {
            id: id.clone(),
            name: name.as_str().unwrap_or(id).to_string(),
          })
          .collect()
      })
      .unwrap_or_default();

    Ok(Self { issues, names })
  }

  pub fn from_path(path: &Path) -> Result<Self> {
    let text = std::fs::read_to_string(path)?;
    Self::from_value(serde_json::from_str::<Value>(&text)?)
  }
}

impl TrackerApi for FileTrackerApi {
  fn search_page(&self, jql: &str, start_at: usize, max_results: usize, _fields: &[String]) -> Result<SearchPage> {
    tracing::debug!(jql = %jql, start_at, max_results, "replaying saved search");
    let issues: Vec<IssueRecord> = self.issues.iter().skip(start_at).take(max_results).cloned().collect();

    Ok(SearchPage {
      start_at: Some(start_at),
      max_results,
      total: Some(self.issues.len()),
      issues,
    })
  }

  fn fields(&self) -> Result<Vec<FieldInfo>> {
    Ok(self.names.clone())
  }
}
