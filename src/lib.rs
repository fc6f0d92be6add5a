// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Library surface for JQL-driven reports: fetch issues, flatten fields, group, chart, and compose HTML
// role: crate root/aggregation
// outputs: Public modules used by the `jira-report` binary and integration tests
// invariants: Only `tracker` performs network I/O; only `util::write_output` writes report files
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod chart;
pub mod cli;
pub mod error;
pub mod ext;
pub mod extract;
pub mod html;
pub mod model;
pub mod pipeline;
pub mod table;
pub mod tracker;
pub mod util;

pub use error::{ReportError, Result};
pub use pipeline::{build_dataset, Dataset, DatasetRequest, ReportLayout, ReportSession};
