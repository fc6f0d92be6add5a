//! HTML fragments and report composition using minijinja templating.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashSet};
use std::hash::{Hash, Hasher};
use std::path::Path;

use base64::Engine as _;
use minijinja::{context, AutoEscape, Environment, UndefinedBehavior, Value};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::chart::{plotly, svg, Chart};
use crate::error::{ReportError, Result};
use crate::table::{GroupedTable, PrimaryTable};

pub const CHART_TEMPLATE: &str = "chart_template";
pub const TABLE_TEMPLATE: &str = "table_template";
pub const REPORT_TEMPLATE: &str = "report_template";

const BUILTIN_TEMPLATES: [(&str, &str); 3] = [
  (CHART_TEMPLATE, include_str!("templates/chart_template.j2")),
  (TABLE_TEMPLATE, include_str!("templates/table_template.j2")),
  (REPORT_TEMPLATE, include_str!("templates/report_template.j2")),
];

/// Wrapper class of chart fragments unless the caller picks another.
pub const CHART_DIV_CLASS: &str = "chart";
/// Wrapper class of table fragments unless the caller picks another.
pub const TABLE_DIV_CLASS: &str = "table";

/// Names the engine provides on its own; never treated as missing placeholders.
const ENGINE_NAMES: [&str; 9] = ["range", "dict", "namespace", "debug", "loop", "self", "super", "caller", "varargs"];

/// Names `Substitutions` always fills; caller extras may not reuse them.
pub const RESERVED_NAMES: [&str; 7] =
  ["title", "query", "generated_at", "html_charts", "html_tables", "include_plotly", "plotly_src"];

/// Declared values for the report template. `extra` carries caller-defined names.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Substitutions {
  pub title: String,
  pub query: Option<String>,
  pub generated_at: Option<String>,
  pub html_charts: Vec<String>,
  pub html_tables: Vec<String>,
  /// Load plotly.js in the document head.
  pub include_plotly: bool,
  pub extra: BTreeMap<String, String>,
}

impl Substitutions {
  /// Declared values win over an extra of the same name; the clash is logged and the extra dropped.
  fn into_context(self) -> BTreeMap<String, Value> {
    let mut ctx: BTreeMap<String, Value> = self
      .extra
      .into_iter()
      .filter(|(k, _)| {
        let reserved = RESERVED_NAMES.contains(&k.as_str());
        if reserved {
          tracing::warn!(name = %k, "extra substitution shadows a declared report value; ignoring it");
        }
        !reserved
      })
      .map(|(k, v)| (k, Value::from_safe_string(v)))
      .collect();

    ctx.insert("title".into(), Value::from(self.title));
    ctx.insert("query".into(), Value::from_serialize(&self.query));
    ctx.insert("generated_at".into(), Value::from_serialize(&self.generated_at));
    ctx.insert(
      "html_charts".into(),
      Value::from(self.html_charts.into_iter().map(Value::from_safe_string).collect::<Vec<_>>()),
    );
    ctx.insert(
      "html_tables".into(),
      Value::from(self.html_tables.into_iter().map(Value::from_safe_string).collect::<Vec<_>>()),
    );
    ctx.insert("include_plotly".into(), Value::from(self.include_plotly));
    ctx.insert("plotly_src".into(), Value::from_safe_string(plotly::PLOTLY_CDN.to_string()));
    ctx
  }
}

#[derive(Serialize)]
struct TableRow<'a> {
  key: &'a str,
  cells: Vec<String>,
}

/// Turns charts and tables into markup and composes documents.
pub struct HtmlAssembler {
  env: Environment<'static>,
}

impl HtmlAssembler {
  /// Assembler with the built-in chart, table and report templates.
  pub fn new() -> Result<Self> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    // Unsupplied names stay falsy and empty inside control flow.
    env.set_undefined_behavior(UndefinedBehavior::Chainable);

    for (name, source) in BUILTIN_TEMPLATES {
      env.add_template(name, source)?;
    }

    Ok(Self { env })
  }

  /// Built-in templates overridden (or extended) by every `<name>.j2` file in `dir`.
  pub fn with_template_dir(dir: &Path) -> Result<Self> {
    let mut me = Self::new()?;

    for entry in std::fs::read_dir(dir)? {
      let path = entry?.path();
      if path.extension().and_then(|e| e.to_str()) != Some("j2") {
        continue;
      }
      let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
        continue;
      };
      let source = std::fs::read_to_string(&path)?;
      tracing::debug!(template = %name, path = %path.display(), "loaded template");
      me.add_template(&name, source)?;
    }

    Ok(me)
  }

  pub fn add_template(&mut self, name: &str, source: String) -> Result<()> {
    self.env.add_template_owned(name.to_string(), source)?;
    Ok(())
  }

  pub fn has_template(&self, name: &str) -> bool {
    self.env.get_template(name).is_ok()
  }

  fn template(&self, name: &str) -> Result<minijinja::Template<'_, '_>> {
    self.env.get_template(name).map_err(|e| match e.kind() {
      minijinja::ErrorKind::TemplateNotFound => ReportError::MissingTemplate(name.to_string()),
      _ => e.into(),
    })
  }

  /// Static charts embed an SVG image; interactive charts a plotly script.
  ///
  /// `position` is the chart's place in the report; it keeps element ids unique
  /// when the same chart appears twice.
  pub fn chart_fragment(&self, chart: &Chart, static_chart: bool, position: usize, div_class: &str) -> Result<String> {
    let tmpl = self.template(CHART_TEMPLATE)?;
    let div_id = chart_div_id(chart, position);

    let rendered = if static_chart {
      let image = base64::engine::general_purpose::STANDARD.encode(svg::render_svg(chart));
      tmpl.render(context! {
        static_chart => true,
        div_class => div_class,
        div_id => div_id,
        title => chart.title(),
        image_base64 => image,
      })?
    } else {
      let figure = plotly::script_json(&plotly::figure(chart));
      tmpl.render(context! {
        static_chart => false,
        div_class => div_class,
        div_id => div_id,
        title => chart.title(),
        figure_json => Value::from_safe_string(figure),
      })?
    };

    Ok(rendered)
  }

  /// Per-issue table with the issue key as a leading column.
  pub fn table_fragment(&self, table: &PrimaryTable, div_class: &str) -> Result<String> {
    let headers: Vec<&str> = table.column_defs().iter().map(|c| c.label.as_str()).collect();
    let rows: Vec<TableRow> = table
      .keys()
      .iter()
      .zip(table.rows())
      .map(|(key, cells)| TableRow { key, cells: cells.clone() })
      .collect();
    let show_keys = table.keys().iter().any(|k| !k.is_empty());

    let tmpl = self.template(TABLE_TEMPLATE)?;
    Ok(tmpl.render(context! { div_class => div_class, headers => headers, rows => rows, show_keys => show_keys })?)
  }

  pub fn grouped_fragment(&self, table: &GroupedTable, div_class: &str) -> Result<String> {
    let headers = vec![table.value_label.as_str(), table.count_label.as_str()];
    let rows: Vec<TableRow> = table
      .rows
      .iter()
      .map(|(value, count)| TableRow { key: "", cells: vec![value.clone(), count.to_string()] })
      .collect();

    let tmpl = self.template(TABLE_TEMPLATE)?;
    Ok(tmpl.render(context! { div_class => div_class, headers => headers, rows => rows, show_keys => false })?)
  }

  pub fn compose(&self, template: &str, subs: Substitutions) -> Result<String> {
    self.render_with_passthrough(template, subs.into_context())
  }

  /// Compose from a plain name -> pre-rendered value mapping.
  pub fn compose_map(&self, template: &str, values: &BTreeMap<String, String>) -> Result<String> {
    let ctx = values
      .iter()
      .map(|(k, v)| (k.clone(), Value::from_safe_string(v.clone())))
      .collect();
    self.render_with_passthrough(template, ctx)
  }

  /// Print blocks rooted at a name the context lacks are emitted verbatim,
  /// e.g. `{{ footer|upper }}` stays `{{ footer|upper }}`.
  ///
  /// Only the print block's text is kept; the name itself stays undefined, so
  /// `{% if footer %}` is false and `{% for x in footer %}` runs zero times.
  fn render_with_passthrough(&self, template: &str, ctx: BTreeMap<String, Value>) -> Result<String> {
    let tmpl = self.template(template)?;
    let missing: HashSet<String> = tmpl
      .undeclared_variables(false)
      .into_iter()
      .filter(|name| !ENGINE_NAMES.contains(&name.as_str()) && !ctx.contains_key(name))
      .collect();

    if missing.is_empty() {
      return Ok(tmpl.render(ctx)?);
    }

    for name in &missing {
      tracing::debug!(template, placeholder = %name, "unresolved placeholder left verbatim");
    }
    let source = PRINT_BLOCK.replace_all(tmpl.source(), |caps: &regex::Captures| {
      if missing.contains(&caps[1]) {
        format!("{{% raw %}}{}{{% endraw %}}", &caps[0])
      } else {
        caps[0].to_string()
      }
    });

    Ok(self.env.render_named_str(template, &source, ctx)?)
  }
}

/// `{{ root... }}` print blocks; group 1 is the root variable name.
static PRINT_BLOCK: Lazy<regex::Regex> =
  Lazy::new(|| regex::Regex::new(r"(?s)\{\{-?\s*([A-Za-z_][A-Za-z0-9_]*)(.*?)\}\}").unwrap());

static NON_ALNUM: Lazy<regex::Regex> = Lazy::new(|| regex::Regex::new(r"[^a-z0-9]+").unwrap());

/// Stable element id for an interactive chart at `position` in a report.
fn chart_div_id(chart: &Chart, position: usize) -> String {
  let slug = NON_ALNUM.replace_all(&chart.field().to_ascii_lowercase(), "-").trim_matches('-').to_string();
  let mut h = DefaultHasher::new();
  position.hash(&mut h);
  chart.kind().to_string().hash(&mut h);
  chart.title().hash(&mut h);
  chart.points().hash(&mut h);
  format!("chart-{}-{:08x}", slug, h.finish() as u32)
}
