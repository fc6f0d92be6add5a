use crate::error::Result;
use crate::model::IssueRecord;
use crate::tracker::api::TrackerApi;

/// Jira caps `maxResults` per request; larger values are silently clamped server-side.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Executes a JQL query page by page.
pub struct IssueFetcher<'a> {
  api: &'a dyn TrackerApi,
  page_size: usize,
}

impl<'a> IssueFetcher<'a> {
  pub fn new(api: &'a dyn TrackerApi) -> Self {
    Self {
      api,
      page_size: DEFAULT_PAGE_SIZE,
    }
  }

  pub fn with_page_size(mut self, page_size: usize) -> Self {
    self.page_size = page_size.max(1);
    self
  }

  /// Fetch up to `limit` issues (`None` = until the tracker runs out).
  ///
  /// Any failed page aborts the whole fetch; there is no partial result.
  /// Paging also stops once `total` issues are in hand, or when the server
  /// answers with a different `startAt` than was asked for.
  pub fn fetch(&self, jql: &str, limit: Option<usize>, fields: &[String]) -> Result<Vec<IssueRecord>> {
    let mut out: Vec<IssueRecord> = Vec::new();

    loop {
      let remaining = match limit {
        Some(l) if out.len() >= l => break,
        Some(l) => l - out.len(),
        None => usize::MAX,
      };
      let want = remaining.min(self.page_size);

      let offset = out.len();
      let page = self.api.search_page(jql, offset, want, fields)?;
      if let Some(echoed) = page.start_at.filter(|s| *s != offset) {
        tracing::warn!(requested = offset, echoed, "tracker ignored startAt; keeping issues fetched so far");
        break;
      }

      let last = page.is_last();
      let got = page.issues.len();
      let total = page.total;
      tracing::debug!(start_at = offset, got, total = ?total, "fetched page");

      out.extend(page.issues.into_iter().take(remaining));

      let reached_total = total.is_some_and(|t| out.len() >= t);
      if last || got == 0 || reached_total {
        break;
      }
    }

    tracing::info!(count = out.len(), "fetched issues");
    Ok(out)
  }
}
