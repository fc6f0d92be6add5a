//! plotly.js figure (data + layout) for interactive charts.

use serde_json::{json, Value};

use super::{Chart, ChartKind};

/// Pinned plotly.js bundle loaded by reports holding interactive charts.
pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

pub fn figure(chart: &Chart) -> Value {
  let x = chart.categories();
  let y = chart.values();
  let colors: Vec<&str> = (0..x.len()).map(|i| chart.color_scheme().color(i)).collect();

  let trace = match chart.kind() {
    ChartKind::Bar => json!({
      "type": "bar",
      "x": x,
      "y": y,
      "marker": { "color": colors },
    }),
    ChartKind::Pie => json!({
      "type": "pie",
      "labels": x,
      "values": y,
      "marker": { "colors": colors },
    }),
    ChartKind::Line => json!({
      "type": "scatter",
      "mode": "lines+markers",
      "x": x,
      "y": y,
      "line": { "color": colors.first() },
    }),
    ChartKind::Scatter => json!({
      "type": "scatter",
      "mode": "markers",
      "x": x,
      "y": y,
      "marker": { "color": colors, "size": 10 },
    }),
    ChartKind::Area => json!({
      "type": "scatter",
      "mode": "lines",
      "fill": "tozeroy",
      "x": x,
      "y": y,
      "line": { "color": colors.first() },
    }),
  };

  let (width, height) = chart.size();
  let mut layout = json!({
    "title": { "text": chart.title() },
    "width": width,
    "height": height,
    "showlegend": chart.kind() == ChartKind::Pie,
  });

  if chart.kind() != ChartKind::Pie {
    layout["xaxis"] = json!({ "title": { "text": chart.x_label() }, "type": "category" });
    layout["yaxis"] = json!({ "title": { "text": chart.y_label() }, "rangemode": "tozero" });
  }

  json!({ "data": [trace], "layout": layout })
}

/// JSON safe to drop inside a `<script>` element.
pub fn script_json(v: &Value) -> String {
  v.to_string().replace("</", "<\\/")
}
