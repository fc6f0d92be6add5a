use predicates::prelude::*;
use serde_json::{json, Value};
use test_support::{query_param, MockJira};

/// Serves the saved fixture through `/rest/api/2/search` pages and `/rest/api/2/field`.
fn paging_jira() -> MockJira {
  let fixture: Value = test_support::read_fixture_json("search.json");
  MockJira::start(move |head| {
    if head.starts_with("GET /rest/api/2/field") {
      let fields: Vec<Value> = fixture["names"]
        .as_object()
        .unwrap()
        .iter()
        .map(|(id, name)| json!({"id": id, "name": name, "custom": id.starts_with("customfield_")}))
        .collect();
      return (200, Value::Array(fields).to_string());
    }

    let start: usize = query_param(head, "startAt").and_then(|s| s.parse().ok()).unwrap_or(0);
    let max: usize = query_param(head, "maxResults").and_then(|s| s.parse().ok()).unwrap_or(50);
    let issues = fixture["issues"].as_array().unwrap();
    let page: Vec<Value> = issues.iter().skip(start).take(max).cloned().collect();
    let body = json!({"startAt": start, "maxResults": max, "total": issues.len(), "issues": page});
    (200, body.to_string())
  })
}

fn search_requests(server: &MockJira) -> Vec<String> {
  server
    .requests()
    .into_iter()
    .filter(|h| h.starts_with("GET /rest/api/2/search"))
    .collect()
}

#[test]
fn pages_through_search_with_basic_auth() {
  let server = paging_jira();

  let out = test_support::cmd_bin("jira-report")
    .args([
      "--server",
      server.url(),
      "--user",
      "ana",
      "--token",
      "pw",
      "--jql",
      "project = OPS",
      "-f",
      "status",
      "--page-size",
      "2",
      "--limit",
      "0",
      "--static-charts",
      "--grouped-tables",
    ])
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

  let searches = search_requests(&server);
  let starts: Vec<String> = searches.iter().filter_map(|h| query_param(h, "startAt")).collect();
  assert_eq!(starts, vec!["0", "2", "4"]);
  assert!(searches.iter().all(|h| query_param(h, "fields").as_deref() == Some("status")));
  assert!(searches
    .iter()
    .all(|h| h.to_lowercase().contains(&"authorization: Basic YW5hOnB3".to_lowercase())));

  let html = String::from_utf8_lossy(&out.stdout);
  assert!(html.contains("<th>Status</th><th>Count</th>"));
  assert!(html.contains("<td>Open</td><td>3</td>"));
  assert!(html.contains("<td>OPS-105</td>"));
}

#[test]
fn limit_stops_fetching_early() {
  let server = paging_jira();

  let out = test_support::cmd_bin("jira-report")
    .args([
      "--server",
      server.url(),
      "--jql",
      "project = OPS",
      "-f",
      "status",
      "--page-size",
      "2",
      "--limit",
      "3",
      "--no-field-names",
      "--static-charts",
    ])
    .output()
    .unwrap();
  assert!(out.status.success());

  let searches = search_requests(&server);
  let max: Vec<String> = searches.iter().filter_map(|h| query_param(h, "maxResults")).collect();
  assert_eq!(max, vec!["2", "1"]);
  assert!(server.requests().iter().all(|h| !h.starts_with("GET /rest/api/2/field")));

  let html = String::from_utf8_lossy(&out.stdout);
  assert!(html.contains("<td>OPS-103</td>"));
  assert!(!html.contains("<td>OPS-104</td>"));
}

#[test]
fn token_from_environment_is_used() {
  let server = paging_jira();

  test_support::cmd_bin("jira-report")
    .env("JIRA_API_TOKEN", "envtok")
    .args(["--server", server.url(), "--jql", "project = OPS", "-f", "status", "--no-field-names"])
    .assert()
    .success();

  assert!(search_requests(&server)
    .iter()
    .all(|h| h.to_lowercase().contains("authorization: bearer envtok")));
}

#[test]
fn rejected_credentials_fail_the_run() {
  let server = MockJira::start(|_| (401, r#"{"errorMessages":["Basic auth with password is not allowed"]}"#.to_string()));

  test_support::cmd_bin("jira-report")
    .args(["--server", server.url(), "--user", "ana", "--token", "bad", "--jql", "project = OPS", "-f", "status"])
    .assert()
    .failure()
    .stdout(predicate::str::is_empty())
    .stderr(predicate::str::contains("authentication failed"))
    .stderr(predicate::str::contains("password is not allowed"));
}

#[test]
fn invalid_jql_surfaces_server_message() {
  let server = MockJira::start(|_| {
    (
      400,
      r#"{"errorMessages":["Error in the JQL Query: Expecting either 'OR' or 'AND'"],"errors":{}}"#.to_string(),
    )
  });

  test_support::cmd_bin("jira-report")
    .args(["--server", server.url(), "--jql", "project = OPS ORDER", "-f", "status"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("remote query failed"))
    .stderr(predicate::str::contains("Expecting either 'OR' or 'AND'"));
}
