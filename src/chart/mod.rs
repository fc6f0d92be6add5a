// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Chart objects built from grouped tables, plus their static (SVG) and interactive (plotly) encodings
// role: pipeline/charts
// inputs: GroupedTable, chart kind name, ChartOptions
// outputs: Immutable Chart; SVG markup; plotly figure JSON
// invariants:
// - all display configuration is fixed at construction; Chart has no setters
// - category order follows the grouped table (count desc)
// errors: UnsupportedChartKind for unknown kind names
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod plotly;
pub mod svg;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::table::GroupedTable;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
  Bar,
  Pie,
  Line,
  Scatter,
  Area,
}

impl FromStr for ChartKind {
  type Err = ReportError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "bar" => Ok(ChartKind::Bar),
      "pie" => Ok(ChartKind::Pie),
      "line" => Ok(ChartKind::Line),
      "scatter" => Ok(ChartKind::Scatter),
      "area" => Ok(ChartKind::Area),
      _ => Err(ReportError::UnsupportedChartKind(s.to_string())),
    }
  }
}

impl fmt::Display for ChartKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      ChartKind::Bar => "bar",
      ChartKind::Pie => "pie",
      ChartKind::Line => "line",
      ChartKind::Scatter => "scatter",
      ChartKind::Area => "area",
    };
    f.write_str(s)
  }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
  #[default]
  Default,
  Pastel,
  Mono,
}

impl ColorScheme {
  /// Unknown names fall back to the default palette.
  pub fn parse_lossy(name: &str) -> Self {
    match name.trim().to_ascii_lowercase().as_str() {
      "default" | "" => ColorScheme::Default,
      "pastel" => ColorScheme::Pastel,
      "mono" | "monochrome" => ColorScheme::Mono,
      other => {
        tracing::warn!(scheme = other, "unknown color scheme; using default");
        ColorScheme::Default
      }
    }
  }

  pub fn palette(&self) -> &'static [&'static str] {
    match self {
      ColorScheme::Default => &[
        "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3", "#ff6692", "#b6e880", "#ff97ff", "#fecb52",
      ],
      ColorScheme::Pastel => &[
        "#66c5cc", "#f6cf71", "#f89c74", "#dcb0f2", "#87c55f", "#9eb9f3", "#fe88b1", "#c9db74", "#8be0a4", "#b497e7",
      ],
      ColorScheme::Mono => &["#08306b", "#08519c", "#2171b5", "#4292c6", "#6baed6", "#9ecae1", "#c6dbef"],
    }
  }

  pub fn color(&self, i: usize) -> &'static str {
    let p = self.palette();
    p[i % p.len()]
  }
}

/// Display configuration, supplied up front.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartOptions {
  pub title: Option<String>,
  pub x_label: Option<String>,
  pub y_label: Option<String>,
  pub color_scheme: ColorScheme,
  pub width: u32,
  pub height: u32,
}

impl Default for ChartOptions {
  fn default() -> Self {
    Self {
      title: None,
      x_label: None,
      y_label: None,
      color_scheme: ColorScheme::Default,
      width: 640,
      height: 400,
    }
  }
}

/// A grouped table bound to a chart kind and display options.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Chart {
  kind: ChartKind,
  field: String,
  title: String,
  x_label: String,
  y_label: String,
  color_scheme: ColorScheme,
  width: u32,
  height: u32,
  points: Vec<(String, usize)>,
}

/// Label shown for the empty-marker category when the marker itself is blank.
pub const BLANK_CATEGORY: &str = "(none)";

impl Chart {
  pub fn new(table: &GroupedTable, kind: ChartKind, opts: &ChartOptions) -> Self {
    Self {
      kind,
      field: table.field.clone(),
      title: opts.title.clone().unwrap_or_else(|| table.value_label.clone()),
      x_label: opts.x_label.clone().unwrap_or_else(|| table.value_label.clone()),
      y_label: opts.y_label.clone().unwrap_or_else(|| table.count_label.clone()),
      color_scheme: opts.color_scheme,
      width: opts.width.max(100),
      height: opts.height.max(100),
      points: table.rows.clone(),
    }
  }

  pub fn kind(&self) -> ChartKind {
    self.kind
  }

  pub fn field(&self) -> &str {
    &self.field
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn x_label(&self) -> &str {
    &self.x_label
  }

  pub fn y_label(&self) -> &str {
    &self.y_label
  }

  pub fn color_scheme(&self) -> ColorScheme {
    self.color_scheme
  }

  pub fn size(&self) -> (u32, u32) {
    (self.width, self.height)
  }

  pub fn points(&self) -> &[(String, usize)] {
    &self.points
  }

  /// Category labels with blanks made visible.
  pub fn categories(&self) -> Vec<String> {
    self
      .points
      .iter()
      .map(|(v, _)| if v.is_empty() { BLANK_CATEGORY.to_string() } else { v.clone() })
      .collect()
  }

  pub fn values(&self) -> Vec<usize> {
    self.points.iter().map(|(_, n)| *n).collect()
  }
}

/// Parse `kind` and wrap `table` into a chart.
pub fn render(table: &GroupedTable, kind: &str, opts: &ChartOptions) -> Result<Chart> {
  let kind = kind.parse::<ChartKind>()?;
  Ok(Chart::new(table, kind, opts))
}
