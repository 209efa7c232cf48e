//! Painting diagrams onto a drawing surface.
//!
//! The engine never talks to a concrete backend. Anything that can stroke
//! lines, circles, polygons and text implements [`Surface`]; the terminal
//! front end and the SVG exporter both do.

use std::f64::consts::FRAC_PI_6;

use crate::config::CanvasSize;
use crate::diagram::Diagram;
use crate::geometry::{arrowhead, smooth_path, Bounds, Point};
use crate::pitch::{self, PitchLayout};
use crate::shapes::{LineStyle, Shape, ShapeColor, ShapeId, ShapeKind};

/// Arrowhead length in pixels
pub const ARROW_HEAD_LENGTH: f64 = 10.0;

/// Half-angle between the shaft and each arrowhead wing
pub const ARROW_HEAD_HALF_ANGLE: f64 = FRAC_PI_6;

/// Gap between a shape and its selection box
pub const SELECTION_PADDING: f64 = 4.0;

/// Samples per control point when smoothing curves
const CURVE_SAMPLES: usize = 8;

/// Stroke parameters for outline primitives
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: ShapeColor,
    pub width: f64,
    pub dash: LineStyle,
}

impl Stroke {
    pub fn solid(color: ShapeColor, width: f64) -> Self {
        Self { color, width, dash: LineStyle::Solid }
    }

    pub fn dashed(color: ShapeColor, width: f64) -> Self {
        Self { color, width, dash: LineStyle::Dashed }
    }
}

/// Where a text anchor sits relative to the rendered string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    TopLeft,
    Center,
}

/// Drawing primitives a backend must provide
pub trait Surface {
    /// Reset the surface to an empty canvas of `size`
    fn clear(&mut self, size: CanvasSize);

    fn fill_rect(&mut self, bounds: Bounds, color: ShapeColor);

    fn stroke_rect(&mut self, bounds: Bounds, stroke: &Stroke);

    fn line(&mut self, from: Point, to: Point, stroke: &Stroke);

    fn polyline(&mut self, points: &[Point], stroke: &Stroke);

    /// Closed polygon, optionally filled
    fn polygon(&mut self, points: &[Point], fill: Option<ShapeColor>, stroke: Option<&Stroke>);

    fn circle(&mut self, center: Point, radius: f64, fill: Option<ShapeColor>, stroke: Option<&Stroke>);

    /// Arc from `start_angle` to `end_angle` (radians, clockwise on screen)
    fn arc(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64, stroke: &Stroke);

    fn text(&mut self, anchor: Point, text: &str, font_size: f64, color: ShapeColor, align: TextAlign);

    /// Opacity applied to subsequent primitives
    fn set_opacity(&mut self, _opacity: f64) {}

    /// Primitives until the matching `end_shape` belong to one shape
    fn begin_shape(&mut self, _shape: &Shape) {}

    fn end_shape(&mut self) {}
}

/// In-progress placement drawn on top of the committed shapes
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    /// Two-point shape between its first click and the pointer
    Segment { start: Point, end: Point, arrow: bool, stroke: Stroke },
    /// Freehand or curve points recorded so far
    Path { points: Vec<Point>, smooth: bool, stroke: Stroke },
}

/// Read-only snapshot of what a frame shows
#[derive(Debug, Clone, Copy)]
pub struct CanvasView<'a> {
    pub size: CanvasSize,
    pub pitch: PitchLayout,
    pub diagram: &'a Diagram,
    pub selected: Option<ShapeId>,
    pub preview: Option<&'a Preview>,
}

/// Paint a whole frame: background, shapes, preview, selection box
pub fn render_canvas(surface: &mut dyn Surface, view: &CanvasView<'_>) {
    surface.clear(view.size);
    pitch::paint_pitch(surface, view.pitch, view.size);

    for shape in view.diagram.iter().filter(|s| s.visible) {
        let opacity = shape.opacity.unwrap_or(1.0).clamp(0.0, 1.0);
        if opacity < 1.0 {
            surface.set_opacity(opacity);
        }
        surface.begin_shape(shape);
        paint_shape(surface, shape);
        surface.end_shape();
        if opacity < 1.0 {
            surface.set_opacity(1.0);
        }
    }

    if let Some(preview) = view.preview {
        paint_preview(surface, preview);
    }

    if let Some(shape) = view.selected.and_then(|id| view.diagram.get(id)) {
        let indicator = Stroke::dashed(ShapeColor::Yellow, 1.0);
        surface.stroke_rect(shape.bounds().padded(SELECTION_PADDING), &indicator);
    }
}

/// Per-kind paint rule
pub fn paint_shape(surface: &mut dyn Surface, shape: &Shape) {
    let o = shape.origin;
    let color = shape.color;
    let outline = Stroke::solid(color, shape.stroke_width);

    match &shape.kind {
        ShapeKind::Line { end, style } => {
            surface.line(o, *end, &Stroke { dash: *style, ..outline });
        }
        ShapeKind::Arrow { end, style } => {
            paint_arrow(surface, o, *end, &Stroke { dash: *style, ..outline });
        }
        ShapeKind::Rectangle { width, height, filled } => {
            let bounds = Bounds::from_origin_size(o, *width, *height);
            if *filled {
                surface.fill_rect(bounds, color);
            } else {
                surface.stroke_rect(bounds, &outline);
            }
        }
        ShapeKind::Circle { radius, filled } => {
            let fill = filled.then_some(color);
            surface.circle(o, *radius, fill, Some(&outline));
        }
        ShapeKind::Text { content, font_size } => {
            for (i, line) in content.lines().enumerate() {
                let anchor = o.offset(0.0, i as f64 * font_size);
                surface.text(anchor, line, *font_size, color, TextAlign::TopLeft);
            }
        }
        ShapeKind::Player { label, size } => {
            let ring = Stroke::solid(ShapeColor::White, 2.0);
            surface.circle(o, *size, Some(color), Some(&ring));
            if !label.is_empty() {
                surface.text(o, label, size * 0.9, ShapeColor::White, TextAlign::Center);
            }
        }
        ShapeKind::Ball { size } => {
            surface.circle(o, *size, Some(color), Some(&Stroke::solid(ShapeColor::Black, 1.0)));
        }
        ShapeKind::Cone { size } => {
            let points = [
                o.offset(0.0, -size),
                o.offset(size * 0.8, *size),
                o.offset(-size * 0.8, *size),
            ];
            surface.polygon(&points, Some(color), Some(&Stroke::solid(ShapeColor::Black, 1.0)));
        }
        ShapeKind::Flag { size } => {
            surface.line(o.offset(0.0, *size), o.offset(0.0, -size), &Stroke::solid(ShapeColor::White, 1.5));
            let pennant = [o.offset(0.0, -size), o.offset(*size, -size / 2.0), o];
            surface.polygon(&pennant, Some(color), None);
        }
        ShapeKind::Freehand { points } => {
            surface.polyline(points, &outline);
        }
        ShapeKind::Curve { points } => {
            surface.polyline(&smooth_path(points, CURVE_SAMPLES), &outline);
        }
        ShapeKind::Triangle { size } => {
            let points = [o.offset(0.0, -size), o.offset(*size, *size), o.offset(-size, *size)];
            surface.polygon(&points, None, Some(&outline));
        }
        ShapeKind::Diamond { size } => {
            let points = [o.offset(0.0, -size), o.offset(*size, 0.0), o.offset(0.0, *size), o.offset(-size, 0.0)];
            surface.polygon(&points, None, Some(&outline));
        }
        ShapeKind::Goal { width, height } => {
            let frame = Bounds::from_origin_size(o, *width, *height);
            let net = Stroke { dash: LineStyle::Dotted, width: 1.0, ..outline };
            for i in 1..4 {
                let y = frame.min_y + frame.height() * i as f64 / 4.0;
                surface.line(Point::new(frame.min_x, y), Point::new(frame.max_x, y), &net);
            }
            surface.stroke_rect(frame, &outline);
        }
    }
}

fn paint_arrow(surface: &mut dyn Surface, from: Point, to: Point, stroke: &Stroke) {
    surface.line(from, to, stroke);
    if from != to {
        let (left, right) = arrowhead(from, to, ARROW_HEAD_LENGTH, ARROW_HEAD_HALF_ANGLE);
        surface.polygon(&[to, left, right], Some(stroke.color), None);
    }
}

fn paint_preview(surface: &mut dyn Surface, preview: &Preview) {
    match preview {
        Preview::Segment { start, end, arrow, stroke } => {
            let dashed = Stroke { dash: LineStyle::Dashed, ..*stroke };
            if *arrow {
                paint_arrow(surface, *start, *end, &dashed);
            } else {
                surface.line(*start, *end, &dashed);
            }
        }
        Preview::Path { points, smooth, stroke } => {
            if *smooth {
                surface.polyline(&smooth_path(points, CURVE_SAMPLES), stroke);
            } else {
                surface.polyline(points, stroke);
            }
        }
    }
}
