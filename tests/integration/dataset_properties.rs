use std::collections::BTreeSet;

use jira_report::tracker::api::FileTrackerApi;
use jira_report::{build_dataset, DatasetRequest};
use proptest::prelude::*;
use serde_json::{json, Value};

fn status_value() -> impl Strategy<Value = Value> {
  prop_oneof![
    Just(Value::Null),
    Just(json!("")),
    Just(json!([])),
    prop::sample::select(vec!["Open", "Done", "In Review", "Blocked"]).prop_map(|s| json!({ "name": s })),
    prop::sample::select(vec!["Open", "Done"]).prop_map(|s| json!(s)),
  ]
}

fn issues(values: &[Value]) -> Value {
  let issues: Vec<Value> = values
    .iter()
    .enumerate()
    .map(|(i, v)| json!({"key": format!("P-{}", i + 1), "fields": {"status": v}}))
    .collect();
  json!({ "issues": issues })
}

proptest! {
  #[test]
  fn grouped_counts_cover_every_row(values in prop::collection::vec(status_value(), 0..40), page in 1usize..7) {
    let api = FileTrackerApi::from_value(issues(&values)).unwrap();
    let mut req = DatasetRequest::new("project = P", vec!["status".to_string(), "priority".to_string()]);
    req.limit = None;
    req.page_size = page;

    let ds = build_dataset(&api, &req).unwrap();
    prop_assert_eq!(ds.table.columns(), vec!["status".to_string(), "priority".to_string()]);
    prop_assert_eq!(ds.table.row_count(), values.len());

    let status = ds.group("status").unwrap();
    prop_assert_eq!(status.total(), values.len());

    let distinct: BTreeSet<&str> = ds.table.column_values("status").unwrap().into_iter().collect();
    prop_assert_eq!(status.rows.len(), distinct.len());

    // count descending, then value ascending
    for w in status.rows.windows(2) {
      prop_assert!(w[0].1 > w[1].1 || (w[0].1 == w[1].1 && w[0].0 < w[1].0));
    }

    // a field no issue carries collapses to one empty group
    let priority = ds.group("priority").unwrap();
    if values.is_empty() {
      prop_assert!(priority.is_empty());
    } else {
      prop_assert_eq!(priority.rows.clone(), vec![(String::new(), values.len())]);
    }
  }

  #[test]
  fn limit_caps_rows(n in 0usize..30, limit in 1usize..40, page in 1usize..9) {
    let values: Vec<Value> = (0..n).map(|_| json!({"name": "Open"})).collect();
    let api = FileTrackerApi::from_value(issues(&values)).unwrap();
    let mut req = DatasetRequest::new("project = P", vec!["status".to_string()]);
    req.limit = Some(limit);
    req.page_size = page;

    let ds = build_dataset(&api, &req).unwrap();
    prop_assert_eq!(ds.table.row_count(), n.min(limit));
  }
}

#[test]
fn open_closed_scenario() {
  let api = FileTrackerApi::from_value(json!([
    {"key": "A-1", "fields": {"status": {"name": "Open"}}},
    {"key": "A-2", "fields": {"status": {"name": "Closed"}}},
    {"key": "A-3", "fields": {"status": {"name": "Open"}}}
  ]))
  .unwrap();

  let ds = build_dataset(&api, &DatasetRequest::new("project = A", vec!["status".into()])).unwrap();
  assert_eq!(
    ds.group("status").unwrap().rows,
    vec![("Open".to_string(), 2), ("Closed".to_string(), 1)]
  );
}
