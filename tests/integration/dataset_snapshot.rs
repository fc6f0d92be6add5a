use std::collections::BTreeMap;

use jira_report::tracker::api::FileTrackerApi;
use jira_report::{build_dataset, DatasetRequest};

#[test]
fn fixture_group_counts_snapshot() {
  test_support::init_tracing();
  test_support::init_insta();

  let api = FileTrackerApi::from_path(&test_support::fixture_path("search.json")).unwrap();
  let mut req = DatasetRequest::new(
    "project = OPS",
    vec!["status".into(), "labels".into(), "customfield_10016".into()],
  );
  req.extract.empty_marker = "-".into();
  let ds = build_dataset(&api, &req).unwrap();

  let counts: BTreeMap<&str, BTreeMap<&str, usize>> = ds
    .groups
    .iter()
    .map(|(field, g)| (field.as_str(), g.rows.iter().map(|(v, n)| (v.as_str(), *n)).collect()))
    .collect();

  insta::assert_json_snapshot!(counts, @r###"
  {
    "customfield_10016": {
      "-": 2,
      "1.5": 1,
      "3": 1,
      "5": 1
    },
    "labels": {
      "-": 1,
      "docs": 1,
      "infra": 2,
      "security, infra": 1
    },
    "status": {
      "Done": 1,
      "In Progress": 1,
      "Open": 3
    }
  }
  "###);
}
