// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for paths, key=value arguments, the report clock, output writing, and man page rendering
// role: utilities/helpers
// inputs: Various primitives; DateTime; paths; clap CommandFactory
// outputs: Canonicalized paths, parsed pairs, formatted timestamps, written report files, man page text
// side_effects: write_output creates parent directories and writes files (or stdout for "-")
// invariants:
// - parse_key_value splits on the first '=' only; keys are trimmed and never empty
// - effective_now honors the override so report stamps are reproducible in tests
// errors: IO errors bubble with context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use clap::CommandFactory;

pub fn canonicalize_lossy<P: AsRef<Path>>(p: P) -> String {
  let p = p.as_ref();
  let pb: PathBuf = match std::fs::canonicalize(p) {
    Ok(x) => x,
    Err(_) => match std::env::current_dir() {
      Ok(cwd) => cwd.join(p),
      Err(_) => PathBuf::from(p),
    },
  };
  pb.to_string_lossy().to_string()
}

/// Split `key=value`. The value may itself contain '=' and may be empty.
pub fn parse_key_value(raw: &str) -> Result<(String, String)> {
  let Some((k, v)) = raw.split_once('=') else {
    bail!("expected KEY=VALUE, got {:?}", raw);
  };
  let k = k.trim();
  if k.is_empty() {
    bail!("empty key in {:?}", raw);
  }
  Ok((k.to_string(), v.to_string()))
}

/// Parse the hidden `--now-override` value: RFC3339, or a naive local `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_now(raw: Option<&str>) -> Option<DateTime<Local>> {
  let raw = raw?.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.with_timezone(&Local));
  }
  let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").ok()?;
  Local.from_local_datetime(&naive).single()
}

/// Returns the effective "now" given an optional override.
///
/// When `override_now` is `Some`, that instant is returned; otherwise
/// the current local time is used.
pub fn effective_now(override_now: Option<DateTime<Local>>) -> DateTime<Local> {
  override_now.unwrap_or_else(Local::now)
}

/// Human-facing "generated at" stamp for report headers.
pub fn generated_at_stamp(now: DateTime<Local>) -> String {
  now.format("%Y-%m-%d %H:%M").to_string()
}

/// Write the report to `out`, or stdout when `out` is "-".
pub fn write_output(out: &str, content: &str) -> Result<()> {
  if out == "-" {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(content.as_bytes()).context("writing report to stdout")?;
    return stdout.flush().context("flushing stdout");
  }

  let path = Path::new(out);
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
  }
  std::fs::write(path, content).with_context(|| format!("writing report to {}", path.display()))?;
  tracing::info!(path = %path.display(), bytes = content.len(), "wrote report");
  Ok(())
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
