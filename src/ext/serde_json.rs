// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Dotted-path lookups on serde_json::Value for tracker payloads (error bodies, field catalogue)
// role: extension/serde_json
// outputs: JsonFetch trait and JsonFetched wrapper with borrowed accessors
// invariants: No panics; missing paths yield None; non-string array members are skipped by `strings`
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde_json::Value;

/// A possibly-missing location inside a JSON document.
pub struct JsonFetched<'a> {
  inner: Option<&'a Value>,
}

impl<'a> JsonFetched<'a> {
  pub fn value(&self) -> Option<&'a Value> {
    self.inner
  }

  /// Collect string members of an array, or the string values of an object.
  ///
  /// Jira reports problems both as `errorMessages: [..]` and `errors: {field: msg}`.
  pub fn strings(&self) -> Vec<String> {
    match self.inner {
      Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
      Some(Value::Object(map)) => map
        .iter()
        .filter_map(|(k, v)| v.as_str().map(|s| format!("{}: {}", k, s)))
        .collect(),
      Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
      _ => Vec::new(),
    }
  }
}

/// Fetch nested values via dotted paths like "fields.status.name".
pub trait JsonFetch {
  fn fetch(&self, path: &str) -> JsonFetched<'_>;
}

impl JsonFetch for Value {
  fn fetch(&self, path: &str) -> JsonFetched<'_> {
    if path.is_empty() {
      return JsonFetched { inner: Some(self) };
    }

    let mut cur = self;

    for key in path.split('.') {
      let next = match cur {
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => cur.get(key),
      };

      match next {
        Some(next) => cur = next,
        None => return JsonFetched { inner: None },
      }
    }

    JsonFetched { inner: Some(cur) }
  }
}
