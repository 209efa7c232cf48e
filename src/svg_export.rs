//! SVG export of a drill diagram.
//!
//! [`SvgSurface`] implements the render [`Surface`] so the exported file is
//! painted by exactly the same rules as the screen:
//! - one `<g>` element per shape, tagged with its id and kind
//! - the pitch background as plain primitives before the shapes
//! - no selection indicator

use std::f64::consts::PI;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::CanvasSize;
use crate::geometry::{Bounds, Point};
use crate::render::{render_canvas, CanvasView, Stroke, Surface, TextAlign};
use crate::shapes::{Shape, ShapeColor};

/// Surface that accumulates SVG elements
#[derive(Debug)]
pub struct SvgSurface {
    size: Option<CanvasSize>,
    body: String,
    opacity: f64,
    depth: usize,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self {
            size: None,
            body: String::new(),
            opacity: 1.0,
            depth: 0,
        }
    }

    /// Wrap the collected elements in an `<svg>` document
    pub fn finish(self) -> String {
        let size = self.size.unwrap_or_default();
        let mut output = String::new();

        // SVG header
        output.push_str(&format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg"
     width="{w}" height="{h}"
     viewBox="0 0 {w} {h}">"#,
            w = fmt_num(size.width),
            h = fmt_num(size.height),
        ));
        output.push('\n');
        output.push_str(&self.body);
        output.push_str("</svg>\n");
        output
    }

    fn indent(&self) -> String {
        "  ".repeat(self.depth + 1)
    }

    fn push_line(&mut self, line: &str) {
        self.body.push_str(line);
        self.body.push('\n');
    }

    fn element(&mut self, tag: &str, attrs: &str) {
        let indent = self.indent();
        let opacity = if self.opacity < 1.0 {
            format!(r#" opacity="{}""#, fmt_num(self.opacity))
        } else {
            String::new()
        };
        self.push_line(&format!("{indent}<{tag} {attrs}{opacity}/>"));
    }
}

impl Surface for SvgSurface {
    fn clear(&mut self, size: CanvasSize) {
        self.size = Some(size);
        self.body.clear();
        self.depth = 0;
    }

    fn fill_rect(&mut self, bounds: Bounds, color: ShapeColor) {
        self.element(
            "rect",
            &format!(
                r#"x="{}" y="{}" width="{}" height="{}" fill="{}""#,
                fmt_num(bounds.min_x),
                fmt_num(bounds.min_y),
                fmt_num(bounds.width()),
                fmt_num(bounds.height()),
                color.to_css()
            ),
        );
    }

    fn stroke_rect(&mut self, bounds: Bounds, stroke: &Stroke) {
        self.element(
            "rect",
            &format!(
                r#"x="{}" y="{}" width="{}" height="{}" fill="none" {}"#,
                fmt_num(bounds.min_x),
                fmt_num(bounds.min_y),
                fmt_num(bounds.width()),
                fmt_num(bounds.height()),
                stroke_attrs(stroke)
            ),
        );
    }

    fn line(&mut self, from: Point, to: Point, stroke: &Stroke) {
        self.element(
            "line",
            &format!(
                r#"x1="{}" y1="{}" x2="{}" y2="{}" {}"#,
                fmt_num(from.x),
                fmt_num(from.y),
                fmt_num(to.x),
                fmt_num(to.y),
                stroke_attrs(stroke)
            ),
        );
    }

    fn polyline(&mut self, points: &[Point], stroke: &Stroke) {
        if points.is_empty() {
            return;
        }
        self.element(
            "polyline",
            &format!(
                r#"points="{}" fill="none" stroke-linecap="round" stroke-linejoin="round" {}"#,
                points_attr(points),
                stroke_attrs(stroke)
            ),
        );
    }

    fn polygon(&mut self, points: &[Point], fill: Option<ShapeColor>, stroke: Option<&Stroke>) {
        if points.is_empty() {
            return;
        }
        self.element(
            "polygon",
            &format!(r#"points="{}" {}"#, points_attr(points), paint_attrs(fill, stroke)),
        );
    }

    fn circle(&mut self, center: Point, radius: f64, fill: Option<ShapeColor>, stroke: Option<&Stroke>) {
        self.element(
            "circle",
            &format!(
                r#"cx="{}" cy="{}" r="{}" {}"#,
                fmt_num(center.x),
                fmt_num(center.y),
                fmt_num(radius),
                paint_attrs(fill, stroke)
            ),
        );
    }

    fn arc(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64, stroke: &Stroke) {
        let start = Point::new(center.x + radius * start_angle.cos(), center.y + radius * start_angle.sin());
        let end = Point::new(center.x + radius * end_angle.cos(), center.y + radius * end_angle.sin());
        let large_arc = u8::from((end_angle - start_angle).abs() > PI);
        self.element(
            "path",
            &format!(
                r#"d="M {} {} A {r} {r} 0 {large_arc} 1 {} {}" fill="none" {}"#,
                fmt_num(start.x),
                fmt_num(start.y),
                fmt_num(end.x),
                fmt_num(end.y),
                stroke_attrs(stroke),
                r = fmt_num(radius),
            ),
        );
    }

    fn text(&mut self, anchor: Point, text: &str, font_size: f64, color: ShapeColor, align: TextAlign) {
        let placement = match align {
            TextAlign::TopLeft => r#"dominant-baseline="hanging""#,
            TextAlign::Center => r#"text-anchor="middle" dominant-baseline="central""#,
        };
        let indent = self.indent();
        self.push_line(&format!(
            r#"{indent}<text x="{}" y="{}" {placement} font-family="sans-serif" font-size="{}" fill="{}">{}</text>"#,
            fmt_num(anchor.x),
            fmt_num(anchor.y),
            fmt_num(font_size),
            color.to_css(),
            escape_xml(text)
        ));
    }

    fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity;
    }

    fn begin_shape(&mut self, shape: &Shape) {
        let indent = self.indent();
        self.push_line(&format!(
            r#"{indent}<g id="shape-{}" class="{}">"#,
            shape.id,
            shape.shape_type().name().to_lowercase()
        ));
        self.depth += 1;
    }

    fn end_shape(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        let indent = self.indent();
        self.push_line(&format!("{indent}</g>"));
    }
}

impl Default for SvgSurface {
    fn default() -> Self {
        Self::new()
    }
}

/// Export a frame to an SVG string, without the selection box
pub fn export_svg(view: &CanvasView<'_>) -> String {
    let view = CanvasView {
        selected: None,
        preview: None,
        ..*view
    };
    let mut surface = SvgSurface::new();
    render_canvas(&mut surface, &view);
    surface.finish()
}

/// Save SVG to a file
pub fn save_svg(view: &CanvasView<'_>, path: &Path) -> Result<()> {
    let svg = export_svg(view);
    std::fs::write(path, svg).with_context(|| format!("writing SVG to {}", path.display()))?;
    info!(path = %path.display(), shapes = view.diagram.len(), "exported SVG");
    Ok(())
}

fn stroke_attrs(stroke: &Stroke) -> String {
    let mut attrs = format!(
        r#"stroke="{}" stroke-width="{}""#,
        stroke.color.to_css(),
        fmt_num(stroke.width)
    );
    if let Some((on, off)) = stroke.dash.dash_pattern() {
        attrs.push_str(&format!(r#" stroke-dasharray="{},{}""#, fmt_num(on), fmt_num(off)));
    }
    attrs
}

fn paint_attrs(fill: Option<ShapeColor>, stroke: Option<&Stroke>) -> String {
    let fill = fill.map_or("none", ShapeColor::to_css);
    match stroke {
        Some(stroke) => format!(r#"fill="{fill}" {}"#, stroke_attrs(stroke)),
        None => format!(r#"fill="{fill}""#),
    }
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", fmt_num(p.x), fmt_num(p.y)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Two decimals at most, trailing zeros trimmed
fn fmt_num(value: f64) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// Escape special XML characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
