//! Minimal self-contained SVG output for static charts.

use std::fmt::Write as _;

use super::{Chart, ChartKind};

const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 70.0;
const Y_TICKS: usize = 4;

pub fn escape_xml(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for ch in s.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      c => out.push(c),
    }
  }
  out
}

/// Axis maximum rounded up to a whole number of tick steps.
fn axis_max(max: usize) -> (usize, usize) {
  let step = max.div_ceil(Y_TICKS).max(1);
  (step * Y_TICKS, step)
}

struct Frame {
  width: f64,
  height: f64,
  left: f64,
  top: f64,
  plot_w: f64,
  plot_h: f64,
}

impl Frame {
  fn new(chart: &Chart) -> Self {
    let (w, h) = chart.size();
    let (width, height) = (w as f64, h as f64);
    Self {
      width,
      height,
      left: MARGIN_LEFT,
      top: MARGIN_TOP,
      plot_w: (width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0),
      plot_h: (height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0),
    }
  }

  fn bottom(&self) -> f64 {
    self.top + self.plot_h
  }
}

pub fn render_svg(chart: &Chart) -> String {
  let frame = Frame::new(chart);
  let mut out = String::new();

  let _ = write!(
    out,
    r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="12">"#,
    w = frame.width,
    h = frame.height
  );
  let _ = write!(out, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##);
  let _ = write!(
    out,
    r#"<text x="{:.1}" y="24" text-anchor="middle" font-size="16">{}</text>"#,
    frame.width / 2.0,
    escape_xml(chart.title())
  );

  if chart.points().is_empty() {
    let _ = write!(
      out,
      r##"<text x="{:.1}" y="{:.1}" text-anchor="middle" fill="#888888">No data</text>"##,
      frame.width / 2.0,
      frame.height / 2.0
    );
  } else {
    match chart.kind() {
      ChartKind::Pie => pie(chart, &frame, &mut out),
      kind => cartesian(chart, kind, &frame, &mut out),
    }
  }

  out.push_str("</svg>");
  out
}

fn cartesian(chart: &Chart, kind: ChartKind, f: &Frame, out: &mut String) {
  let values = chart.values();
  let categories = chart.categories();
  let (max, step) = axis_max(values.iter().copied().max().unwrap_or(0));
  let band = f.plot_w / values.len() as f64;
  let y_of = |v: usize| f.bottom() - (v as f64 / max as f64) * f.plot_h;
  let x_of = |i: usize| f.left + band * (i as f64 + 0.5);

  // Grid and y ticks.
  for t in 0..=Y_TICKS {
    let v = step * t;
    let y = y_of(v);
    let _ = write!(
      out,
      r##"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#e5e5e5"/><text x="{:.1}" y="{:.1}" text-anchor="end">{v}</text>"##,
      f.left,
      f.left + f.plot_w,
      f.left - 6.0,
      y + 4.0,
    );
  }

  let _ = write!(
    out,
    r##"<line x1="{l:.1}" y1="{b:.1}" x2="{r:.1}" y2="{b:.1}" stroke="#444444"/><line x1="{l:.1}" y1="{t:.1}" x2="{l:.1}" y2="{b:.1}" stroke="#444444"/>"##,
    l = f.left,
    r = f.left + f.plot_w,
    t = f.top,
    b = f.bottom()
  );

  match kind {
    ChartKind::Bar => {
      let bar_w = band * 0.7;
      for (i, v) in values.iter().enumerate() {
        let y = y_of(*v);
        let _ = write!(
          out,
          r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"><title>{}: {}</title></rect>"#,
          x_of(i) - bar_w / 2.0,
          y,
          bar_w,
          f.bottom() - y,
          chart.color_scheme().color(i),
          escape_xml(&categories[i]),
          v
        );
      }
    }
    ChartKind::Line | ChartKind::Area => {
      let pts: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(i, v)| format!("{:.1},{:.1}", x_of(i), y_of(*v)))
        .collect();
      let color = chart.color_scheme().color(0);

      if kind == ChartKind::Area {
        let _ = write!(
          out,
          r#"<polygon points="{:.1},{:.1} {} {:.1},{:.1}" fill="{}" fill-opacity="0.35" stroke="none"/>"#,
          x_of(0),
          f.bottom(),
          pts.join(" "),
          x_of(values.len() - 1),
          f.bottom(),
          color
        );
      }
      let _ = write!(
        out,
        r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="2"/>"#,
        pts.join(" "),
        color
      );
    }
    _ => {
      for (i, v) in values.iter().enumerate() {
        let _ = write!(
          out,
          r#"<circle cx="{:.1}" cy="{:.1}" r="5" fill="{}"><title>{}: {}</title></circle>"#,
          x_of(i),
          y_of(*v),
          chart.color_scheme().color(i),
          escape_xml(&categories[i]),
          v
        );
      }
    }
  }

  for (i, label) in categories.iter().enumerate() {
    let x = x_of(i);
    let y = f.bottom() + 14.0;
    let _ = write!(
      out,
      r#"<text x="{x:.1}" y="{y:.1}" text-anchor="end" transform="rotate(-30 {x:.1} {y:.1})">{}</text>"#,
      escape_xml(label)
    );
  }

  let _ = write!(
    out,
    r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
    f.left + f.plot_w / 2.0,
    f.height - 8.0,
    escape_xml(chart.x_label())
  );
  let _ = write!(
    out,
    r#"<text x="14" y="{y:.1}" text-anchor="middle" transform="rotate(-90 14 {y:.1})">{}</text>"#,
    escape_xml(chart.y_label()),
    y = f.top + f.plot_h / 2.0
  );
}

fn pie(chart: &Chart, f: &Frame, out: &mut String) {
  let values = chart.values();
  let categories = chart.categories();
  let total: usize = values.iter().sum();
  let legend_w = 160.0;
  let r = ((f.plot_w - legend_w).min(f.plot_h) / 2.0).max(10.0);
  let cx = f.left + r;
  let cy = f.top + f.plot_h / 2.0;

  if values.len() == 1 || total == 0 {
    let _ = write!(
      out,
      r#"<circle cx="{cx:.1}" cy="{cy:.1}" r="{r:.1}" fill="{}"/>"#,
      chart.color_scheme().color(0)
    );
  } else {
    let mut angle = -std::f64::consts::FRAC_PI_2;
    for (i, v) in values.iter().enumerate() {
      let sweep = *v as f64 / total as f64 * std::f64::consts::TAU;
      let (x1, y1) = (cx + r * angle.cos(), cy + r * angle.sin());
      let end = angle + sweep;
      let (x2, y2) = (cx + r * end.cos(), cy + r * end.sin());
      let large = if sweep > std::f64::consts::PI { 1 } else { 0 };
      let _ = write!(
        out,
        r##"<path d="M{cx:.1},{cy:.1} L{x1:.1},{y1:.1} A{r:.1},{r:.1} 0 {large} 1 {x2:.1},{y2:.1} Z" fill="{}" stroke="#ffffff"><title>{}: {}</title></path>"##,
        chart.color_scheme().color(i),
        escape_xml(&categories[i]),
        v
      );
      angle = end;
    }
  }

  let lx = cx + r + 24.0;
  for (i, (label, v)) in categories.iter().zip(values.iter()).enumerate() {
    let y = f.top + 10.0 + i as f64 * 18.0;
    let pct = if total == 0 { 0.0 } else { *v as f64 * 100.0 / total as f64 };
    let _ = write!(
      out,
      r#"<rect x="{lx:.1}" y="{:.1}" width="12" height="12" fill="{}"/><text x="{:.1}" y="{y:.1}">{} ({:.1}%)</text>"#,
      y - 10.0,
      chart.color_scheme().color(i),
      lx + 18.0,
      escape_xml(label),
      pct
    );
  }
}
