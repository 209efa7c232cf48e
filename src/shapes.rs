//! Shape types for pitchboard diagrams.
//!
//! `ShapeKind` is the closed set of things that can be placed on the pitch.
//! Bounds and hit-testing are dispatched per kind so adding a variant fails to
//! compile until every rule handles it.

use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{distance_to_polyline, distance_to_segment, Bounds, Point};

/// Extra pick radius around round icons and circles (pixels)
pub const ICON_HIT_TOLERANCE: f64 = 4.0;

/// Pick distance from line-like shapes, on top of half the stroke width
pub const LINE_HIT_TOLERANCE: f64 = 6.0;

/// Approximate glyph width as a fraction of the font size
pub const TEXT_WIDTH_FACTOR: f64 = 0.6;

pub const DEFAULT_PLAYER_SIZE: f64 = 12.0;
pub const DEFAULT_BALL_SIZE: f64 = 6.0;
pub const DEFAULT_CONE_SIZE: f64 = 8.0;
pub const DEFAULT_FLAG_SIZE: f64 = 10.0;
pub const DEFAULT_MARKER_SIZE: f64 = 14.0;
pub const DEFAULT_FONT_SIZE: f64 = 14.0;
pub const DEFAULT_SEGMENT_LENGTH: f64 = 80.0;

/// Shape identifier - UUID so ids stay unique across saved drills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapeId(pub Uuid);

impl ShapeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ShapeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ShapeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Color palette for shapes and pitch markings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShapeColor {
    #[default]
    White,
    Black,
    Red,
    Blue,
    Yellow,
    Orange,
    Green,
    Purple,
    Gray,
    /// Pitch turf; not offered in the color cycle
    Grass,
}

impl ShapeColor {
    /// Convert to ratatui Color for terminal rendering
    pub fn to_ratatui(self) -> Color {
        match self {
            ShapeColor::White => Color::White,
            ShapeColor::Black => Color::Black,
            ShapeColor::Red => Color::LightRed,
            ShapeColor::Blue => Color::LightBlue,
            ShapeColor::Yellow => Color::Yellow,
            ShapeColor::Orange => Color::Rgb(0xef, 0x6c, 0x00),
            ShapeColor::Green => Color::LightGreen,
            ShapeColor::Purple => Color::Magenta,
            ShapeColor::Gray => Color::Gray,
            ShapeColor::Grass => Color::Rgb(0x2e, 0x7d, 0x32),
        }
    }

    /// Convert to CSS color string for SVG export
    pub fn to_css(self) -> &'static str {
        match self {
            ShapeColor::White => "#ffffff",
            ShapeColor::Black => "#000000",
            ShapeColor::Red => "#e53935",
            ShapeColor::Blue => "#1e88e5",
            ShapeColor::Yellow => "#ffeb3b",
            ShapeColor::Orange => "#ef6c00",
            ShapeColor::Green => "#43a047",
            ShapeColor::Purple => "#8e24aa",
            ShapeColor::Gray => "#9e9e9e",
            ShapeColor::Grass => "#2e7d32",
        }
    }

    /// Get display name for status bar
    pub fn name(self) -> &'static str {
        match self {
            ShapeColor::White => "White",
            ShapeColor::Black => "Black",
            ShapeColor::Red => "Red",
            ShapeColor::Blue => "Blue",
            ShapeColor::Yellow => "Yellow",
            ShapeColor::Orange => "Orange",
            ShapeColor::Green => "Green",
            ShapeColor::Purple => "Purple",
            ShapeColor::Gray => "Gray",
            ShapeColor::Grass => "Grass",
        }
    }

    /// Cycle to next color
    pub fn next(self) -> Self {
        match self {
            ShapeColor::White => ShapeColor::Red,
            ShapeColor::Red => ShapeColor::Blue,
            ShapeColor::Blue => ShapeColor::Yellow,
            ShapeColor::Yellow => ShapeColor::Orange,
            ShapeColor::Orange => ShapeColor::Green,
            ShapeColor::Green => ShapeColor::Purple,
            ShapeColor::Purple => ShapeColor::Gray,
            ShapeColor::Gray => ShapeColor::Black,
            ShapeColor::Black | ShapeColor::Grass => ShapeColor::White,
        }
    }
}

/// Stroke pattern for line-like shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    /// Player run without the ball
    Dashed,
    /// Pass or ball path
    Dotted,
}

impl LineStyle {
    /// Cycle to the next line style
    pub fn next(self) -> Self {
        match self {
            LineStyle::Solid => LineStyle::Dashed,
            LineStyle::Dashed => LineStyle::Dotted,
            LineStyle::Dotted => LineStyle::Solid,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LineStyle::Solid => "Solid",
            LineStyle::Dashed => "Dashed",
            LineStyle::Dotted => "Dotted",
        }
    }

    /// On/off lengths in pixels, `None` for a continuous stroke
    pub fn dash_pattern(&self) -> Option<(f64, f64)> {
        match self {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some((6.0, 6.0)),
            LineStyle::Dotted => Some((2.0, 4.0)),
        }
    }
}

/// How a shape type is created from pointer input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// One click places the shape
    Click,
    /// Click start, click end
    TwoPoint,
    /// Press, drag, release
    Drag,
}

/// Shape discriminant, used to pick tools and defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeType {
    Line,
    Arrow,
    Rectangle,
    Circle,
    Text,
    Player,
    Ball,
    Cone,
    Freehand,
    Curve,
    Triangle,
    Diamond,
    Flag,
    Goal,
}

impl ShapeType {
    pub const ALL: [ShapeType; 14] = [
        ShapeType::Player,
        ShapeType::Ball,
        ShapeType::Cone,
        ShapeType::Flag,
        ShapeType::Goal,
        ShapeType::Arrow,
        ShapeType::Line,
        ShapeType::Freehand,
        ShapeType::Curve,
        ShapeType::Rectangle,
        ShapeType::Circle,
        ShapeType::Triangle,
        ShapeType::Diamond,
        ShapeType::Text,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShapeType::Line => "Line",
            ShapeType::Arrow => "Arrow",
            ShapeType::Rectangle => "Rectangle",
            ShapeType::Circle => "Circle",
            ShapeType::Text => "Text",
            ShapeType::Player => "Player",
            ShapeType::Ball => "Ball",
            ShapeType::Cone => "Cone",
            ShapeType::Freehand => "Freehand",
            ShapeType::Curve => "Curve",
            ShapeType::Triangle => "Triangle",
            ShapeType::Diamond => "Diamond",
            ShapeType::Flag => "Flag",
            ShapeType::Goal => "Goal",
        }
    }

    pub fn placement(&self) -> Placement {
        match self {
            ShapeType::Line | ShapeType::Arrow => Placement::TwoPoint,
            ShapeType::Freehand | ShapeType::Curve => Placement::Drag,
            _ => Placement::Click,
        }
    }

    /// Whether shapes of this type are drawn from a list of points
    pub fn is_path(&self) -> bool {
        matches!(self, ShapeType::Freehand | ShapeType::Curve)
    }
}

/// Kind-specific shape data; the anchor lives on [`Shape`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ShapeKind {
    Line {
        end: Point,
        #[serde(default)]
        style: LineStyle,
    },
    Arrow {
        end: Point,
        #[serde(default)]
        style: LineStyle,
    },
    /// Anchor is the top-left corner
    Rectangle {
        width: f64,
        height: f64,
        #[serde(default)]
        filled: bool,
    },
    /// Anchor is the center
    Circle {
        radius: f64,
        #[serde(default)]
        filled: bool,
    },
    /// Anchor is the top-left of the first line of text
    Text { content: String, font_size: f64 },
    /// Round token with a jersey number
    Player { label: String, size: f64 },
    Ball { size: f64 },
    Cone { size: f64 },
    /// Raw stroke; the anchor equals the first point
    Freehand { points: Vec<Point> },
    /// Stroke rendered smoothed; the anchor equals the first point
    Curve { points: Vec<Point> },
    Triangle { size: f64 },
    Diamond { size: f64 },
    Flag { size: f64 },
    /// Anchor is the top-left corner of the goal frame
    Goal { width: f64, height: f64 },
}

impl ShapeKind {
    pub fn shape_type(&self) -> ShapeType {
        match self {
            ShapeKind::Line { .. } => ShapeType::Line,
            ShapeKind::Arrow { .. } => ShapeType::Arrow,
            ShapeKind::Rectangle { .. } => ShapeType::Rectangle,
            ShapeKind::Circle { .. } => ShapeType::Circle,
            ShapeKind::Text { .. } => ShapeType::Text,
            ShapeKind::Player { .. } => ShapeType::Player,
            ShapeKind::Ball { .. } => ShapeType::Ball,
            ShapeKind::Cone { .. } => ShapeType::Cone,
            ShapeKind::Freehand { .. } => ShapeType::Freehand,
            ShapeKind::Curve { .. } => ShapeType::Curve,
            ShapeKind::Triangle { .. } => ShapeType::Triangle,
            ShapeKind::Diamond { .. } => ShapeType::Diamond,
            ShapeKind::Flag { .. } => ShapeType::Flag,
            ShapeKind::Goal { .. } => ShapeType::Goal,
        }
    }

    /// Default data for a shape of `ty` anchored at `origin`
    ///
    /// `player_number` is only used for players. Line-like kinds get a
    /// horizontal segment of [`DEFAULT_SEGMENT_LENGTH`] and path kinds a
    /// two-point stroke, so every type can be placed with a single click.
    pub fn default_for(ty: ShapeType, origin: Point, player_number: u32, player_size: f64) -> Self {
        match ty {
            ShapeType::Line => ShapeKind::Line {
                end: origin.offset(DEFAULT_SEGMENT_LENGTH, 0.0),
                style: LineStyle::Solid,
            },
            ShapeType::Arrow => ShapeKind::Arrow {
                end: origin.offset(DEFAULT_SEGMENT_LENGTH, 0.0),
                style: LineStyle::Solid,
            },
            ShapeType::Rectangle => ShapeKind::Rectangle { width: 80.0, height: 50.0, filled: false },
            ShapeType::Circle => ShapeKind::Circle { radius: 30.0, filled: false },
            ShapeType::Text => ShapeKind::Text {
                content: "Text".to_string(),
                font_size: DEFAULT_FONT_SIZE,
            },
            ShapeType::Player => ShapeKind::Player {
                label: player_number.to_string(),
                size: player_size,
            },
            ShapeType::Ball => ShapeKind::Ball { size: DEFAULT_BALL_SIZE },
            ShapeType::Cone => ShapeKind::Cone { size: DEFAULT_CONE_SIZE },
            ShapeType::Freehand => ShapeKind::Freehand {
                points: vec![origin, origin.offset(DEFAULT_SEGMENT_LENGTH, 0.0)],
            },
            ShapeType::Curve => ShapeKind::Curve {
                points: vec![origin, origin.offset(DEFAULT_SEGMENT_LENGTH, 0.0)],
            },
            ShapeType::Triangle => ShapeKind::Triangle { size: DEFAULT_MARKER_SIZE },
            ShapeType::Diamond => ShapeKind::Diamond { size: DEFAULT_MARKER_SIZE },
            ShapeType::Flag => ShapeKind::Flag { size: DEFAULT_FLAG_SIZE },
            ShapeType::Goal => ShapeKind::Goal { width: 24.0, height: 60.0 },
        }
    }

    /// Default color for a freshly placed shape when the user has not chosen one
    pub fn default_color(ty: ShapeType) -> ShapeColor {
        match ty {
            ShapeType::Player => ShapeColor::Blue,
            ShapeType::Ball => ShapeColor::Yellow,
            ShapeType::Cone => ShapeColor::Orange,
            ShapeType::Flag => ShapeColor::Red,
            _ => ShapeColor::White,
        }
    }
}

/// One placed diagram element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    /// Anchor coordinates; meaning depends on the kind
    #[serde(flatten)]
    pub origin: Point,
    #[serde(flatten)]
    pub kind: ShapeKind,
    #[serde(default)]
    pub color: ShapeColor,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,
}

fn default_stroke_width() -> f64 {
    2.0
}

fn default_visible() -> bool {
    true
}

impl Shape {
    /// Create a shape with a fresh id
    pub fn new(origin: Point, kind: ShapeKind, color: ShapeColor, stroke_width: f64) -> Self {
        let origin = match &kind {
            ShapeKind::Freehand { points } | ShapeKind::Curve { points } => {
                points.first().copied().unwrap_or(origin)
            }
            _ => origin,
        };
        Self {
            id: ShapeId::new(),
            origin,
            kind,
            color,
            stroke_width,
            opacity: None,
            visible: true,
            selected: false,
        }
    }

    pub fn shape_type(&self) -> ShapeType {
        self.kind.shape_type()
    }

    /// Move the shape and every coordinate it owns by (dx, dy)
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.origin = self.origin.offset(dx, dy);
        match &mut self.kind {
            ShapeKind::Line { end, .. } | ShapeKind::Arrow { end, .. } => {
                *end = end.offset(dx, dy);
            }
            ShapeKind::Freehand { points } | ShapeKind::Curve { points } => {
                for p in points.iter_mut() {
                    *p = p.offset(dx, dy);
                }
            }
            ShapeKind::Rectangle { .. }
            | ShapeKind::Circle { .. }
            | ShapeKind::Text { .. }
            | ShapeKind::Player { .. }
            | ShapeKind::Ball { .. }
            | ShapeKind::Cone { .. }
            | ShapeKind::Triangle { .. }
            | ShapeKind::Diamond { .. }
            | ShapeKind::Flag { .. }
            | ShapeKind::Goal { .. } => {}
        }
    }

    /// Move the anchor to `anchor`, carrying the rest of the shape along
    pub fn move_anchor_to(&mut self, anchor: Point) {
        let (dx, dy) = self.origin.delta_to(anchor);
        self.translate(dx, dy);
    }

    /// Jersey number of a player token, if its label is numeric
    pub fn player_number(&self) -> Option<u32> {
        match &self.kind {
            ShapeKind::Player { label, .. } => label.trim().parse().ok(),
            _ => None,
        }
    }

    /// Editable text of players and text shapes
    pub fn label(&self) -> Option<&str> {
        match &self.kind {
            ShapeKind::Player { label, .. } => Some(label),
            ShapeKind::Text { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn supports_label(&self) -> bool {
        self.label().is_some()
    }

    /// Replace the label; returns false when the kind has none
    pub fn set_label(&mut self, text: impl Into<String>) -> bool {
        match &mut self.kind {
            ShapeKind::Player { label, .. } => {
                *label = text.into();
                true
            }
            ShapeKind::Text { content, .. } => {
                *content = text.into();
                true
            }
            _ => false,
        }
    }

    /// Kind-specific bounding box, used for hit-testing boxed kinds and the
    /// selection indicator
    pub fn bounds(&self) -> Bounds {
        let o = self.origin;
        match &self.kind {
            ShapeKind::Line { end, .. } | ShapeKind::Arrow { end, .. } => Bounds::from_corners(o, *end),
            ShapeKind::Rectangle { width, height, .. } | ShapeKind::Goal { width, height } => {
                Bounds::from_origin_size(o, *width, *height)
            }
            ShapeKind::Circle { radius, .. } => Bounds::around(o, *radius, *radius),
            ShapeKind::Text { content, font_size } => {
                let lines = content.lines().count().max(1) as f64;
                let widest = content.lines().map(|l| l.chars().count()).max().unwrap_or(0) as f64;
                Bounds::from_origin_size(o, widest * font_size * TEXT_WIDTH_FACTOR, lines * font_size)
            }
            ShapeKind::Player { size, .. }
            | ShapeKind::Ball { size }
            | ShapeKind::Cone { size }
            | ShapeKind::Triangle { size }
            | ShapeKind::Diamond { size }
            | ShapeKind::Flag { size } => Bounds::around(o, *size, *size),
            ShapeKind::Freehand { points } | ShapeKind::Curve { points } => {
                Bounds::from_points(points).unwrap_or_else(|| Bounds::from_corners(o, o))
            }
        }
    }

    /// Whether `p` picks this shape
    pub fn hit_test(&self, p: Point) -> bool {
        if !self.visible {
            return false;
        }
        let line_tolerance = LINE_HIT_TOLERANCE + self.stroke_width / 2.0;
        match &self.kind {
            ShapeKind::Player { size, .. }
            | ShapeKind::Ball { size }
            | ShapeKind::Cone { size }
            | ShapeKind::Flag { size } => self.origin.distance(p) <= size + ICON_HIT_TOLERANCE,
            ShapeKind::Circle { radius, .. } => self.origin.distance(p) <= radius + ICON_HIT_TOLERANCE,
            ShapeKind::Rectangle { .. }
            | ShapeKind::Goal { .. }
            | ShapeKind::Triangle { .. }
            | ShapeKind::Diamond { .. }
            | ShapeKind::Text { .. } => self.bounds().contains(p),
            ShapeKind::Line { end, .. } | ShapeKind::Arrow { end, .. } => {
                distance_to_segment(p, self.origin, *end) <= line_tolerance
            }
            ShapeKind::Freehand { points } | ShapeKind::Curve { points } => {
                distance_to_polyline(p, points).is_some_and(|d| d <= line_tolerance)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(ty: ShapeType, x: f64, y: f64) -> Shape {
        let origin = Point::new(x, y);
        Shape::new(
            origin,
            ShapeKind::default_for(ty, origin, 1, DEFAULT_PLAYER_SIZE),
            ShapeColor::White,
            2.0,
        )
    }

    #[test]
    fn round_icons_hit_within_tolerance() {
        let cone = shape(ShapeType::Cone, 50.0, 50.0);
        assert!(cone.hit_test(Point::new(50.0, 50.0)));
        assert!(cone.hit_test(Point::new(50.0 + DEFAULT_CONE_SIZE + ICON_HIT_TOLERANCE, 50.0)));
        assert!(!cone.hit_test(Point::new(50.0 + DEFAULT_CONE_SIZE + ICON_HIT_TOLERANCE + 0.5, 50.0)));
    }

    #[test]
    fn lines_hit_near_the_segment_only() {
        let line = shape(ShapeType::Line, 0.0, 0.0);
        assert!(line.hit_test(Point::new(40.0, 5.0)));
        assert!(!line.hit_test(Point::new(40.0, 12.0)));
        assert!(!line.hit_test(Point::new(100.0, 0.0)));
    }

    #[test]
    fn boxed_shapes_use_their_rectangle() {
        let rect = shape(ShapeType::Rectangle, 10.0, 10.0);
        assert!(rect.hit_test(Point::new(89.0, 59.0)));
        assert!(!rect.hit_test(Point::new(91.0, 59.0)));
    }

    #[test]
    fn text_uses_its_bounding_box() {
        let text = shape(ShapeType::Text, 0.0, 0.0);
        let b = text.bounds();
        assert_eq!(b.width(), 4.0 * DEFAULT_FONT_SIZE * TEXT_WIDTH_FACTOR);
        assert_eq!(b.height(), DEFAULT_FONT_SIZE);
        assert!(text.hit_test(Point::new(10.0, 10.0)));
        assert!(!text.hit_test(Point::new(10.0, 20.0)));
    }

    #[test]
    fn hidden_shapes_are_not_pickable() {
        let mut ball = shape(ShapeType::Ball, 0.0, 0.0);
        ball.visible = false;
        assert!(!ball.hit_test(Point::new(0.0, 0.0)));
    }

    #[test]
    fn translate_moves_every_point() {
        let mut stroke = Shape::new(
            Point::default(),
            ShapeKind::Freehand { points: vec![Point::new(1.0, 1.0), Point::new(5.0, 5.0)] },
            ShapeColor::White,
            2.0,
        );
        assert_eq!(stroke.origin, Point::new(1.0, 1.0));
        stroke.move_anchor_to(Point::new(11.0, 21.0));
        assert_eq!(
            stroke.kind,
            ShapeKind::Freehand { points: vec![Point::new(11.0, 21.0), Point::new(15.0, 25.0)] }
        );

        let mut arrow = shape(ShapeType::Arrow, 0.0, 0.0);
        arrow.translate(10.0, 10.0);
        assert_eq!(arrow.origin, Point::new(10.0, 10.0));
        assert_eq!(arrow.bounds().max_x, 10.0 + DEFAULT_SEGMENT_LENGTH);
    }

    #[test]
    fn player_numbers_parse_from_labels() {
        let mut player = shape(ShapeType::Player, 0.0, 0.0);
        assert_eq!(player.player_number(), Some(1));
        assert!(player.set_label("GK"));
        assert_eq!(player.player_number(), None);
        assert!(!shape(ShapeType::Cone, 0.0, 0.0).supports_label());
    }

    #[test]
    fn shape_records_serialize_flat() {
        let mut player = shape(ShapeType::Player, 30.0, 40.0);
        player.selected = true;
        let value = serde_json::to_value(&player).expect("serialize");
        assert_eq!(value["kind"], "player");
        assert_eq!(value["x"], 30.0);
        assert_eq!(value["label"], "1");
        assert_eq!(value["selected"], true);

        player.selected = false;
        let json = serde_json::to_string(&player).expect("serialize");
        assert!(!json.contains("selected"));
        let back: Shape = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, player);
    }
}
