// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Namespace for everything that talks to the issue tracker (API seam, pagination, field catalogue)
// role: tracker/namespace
// outputs: Public submodules; `build_api` selects the backend from configuration
// invariants: Only this namespace performs network I/O
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod api;
pub mod fetcher;
pub mod fields;

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ReportError, Result};
use api::{Credentials, FileTrackerApi, JiraHttpApi, TrackerApi};

/// Where issues come from.
#[derive(Debug, Clone)]
pub enum Source {
  Jira {
    server: String,
    credentials: Credentials,
    timeout: Duration,
  },
  SavedSearch(PathBuf),
}

pub fn build_api(source: &Source) -> Result<Box<dyn TrackerApi>> {
  match source {
    Source::Jira { server, credentials, timeout } => {
      if server.trim().is_empty() {
        return Err(ReportError::remote("no tracker server configured"));
      }
      Ok(Box::new(JiraHttpApi::new(server, credentials.clone(), *timeout)))
    }
    Source::SavedSearch(path) => Ok(Box::new(FileTrackerApi::from_path(path)?)),
  }
}
