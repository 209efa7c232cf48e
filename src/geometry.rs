//! Pixel-space geometry shared by the shape model and the renderers.
//!
//! All coordinates are canvas pixels with the origin in the top-left corner
//! and y growing downwards.

use serde::{Deserialize, Serialize};

/// A position on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Create a translated copy of this point
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Vector from this point to another, as (dx, dy)
    pub fn delta_to(self, other: Point) -> (f64, f64) {
        (other.x - self.x, other.y - self.y)
    }

    /// Midpoint between two points
    pub fn midpoint(self, other: Point) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Axis-aligned bounding box (min_x, min_y, max_x, max_y)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Box spanning two corners in any order
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    /// Box from a top-left anchor and a size; negative sizes extend left/up
    pub fn from_origin_size(origin: Point, width: f64, height: f64) -> Self {
        Self::from_corners(origin, origin.offset(width, height))
    }

    /// Box centered on a point
    pub fn around(center: Point, half_width: f64, half_height: f64) -> Self {
        Self {
            min_x: center.x - half_width,
            min_y: center.y - half_height,
            max_x: center.x + half_width,
            max_y: center.y + half_height,
        }
    }

    /// Smallest box containing every point; `None` for an empty slice
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Self::from_corners(*first, *first);
        for p in &points[1..] {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.max_y = bounds.max_y.max(p.y);
        }
        Some(bounds)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Grow the box by `pad` on every side
    pub fn padded(&self, pad: f64) -> Self {
        Self {
            min_x: self.min_x - pad,
            min_y: self.min_y - pad,
            max_x: self.max_x + pad,
            max_y: self.max_y + pad,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }

    /// The four corners, clockwise from top-left
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }
}

/// Shortest distance from `p` to the segment `a`-`b`
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = a.delta_to(b);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

/// Shortest distance from `p` to an open polyline
pub fn distance_to_polyline(p: Point, points: &[Point]) -> Option<f64> {
    match points {
        [] => None,
        [only] => Some(p.distance(*only)),
        _ => points
            .windows(2)
            .map(|w| distance_to_segment(p, w[0], w[1]))
            .reduce(f64::min),
    }
}

/// Wing points of an arrowhead whose tip sits at `to`
///
/// The head opens backwards along the `from`→`to` direction by `half_angle`
/// radians on each side.
pub fn arrowhead(from: Point, to: Point, head_length: f64, half_angle: f64) -> (Point, Point) {
    let angle = (to.y - from.y).atan2(to.x - from.x);
    let left = Point::new(
        to.x - head_length * (angle - half_angle).cos(),
        to.y - head_length * (angle - half_angle).sin(),
    );
    let right = Point::new(
        to.x - head_length * (angle + half_angle).cos(),
        to.y - head_length * (angle + half_angle).sin(),
    );
    (left, right)
}

/// Split a segment into the visible pieces of an on/off dash pattern
///
/// `None` yields the whole segment.
pub fn dash_segments(from: Point, to: Point, pattern: Option<(f64, f64)>) -> Vec<(Point, Point)> {
    let Some((on, off)) = pattern.filter(|(on, off)| *on > 0.0 && *off >= 0.0) else {
        return vec![(from, to)];
    };
    let length = from.distance(to);
    if length == 0.0 {
        return vec![(from, to)];
    }
    let (dx, dy) = from.delta_to(to);
    let (ux, uy) = (dx / length, dy / length);

    let mut segments = Vec::new();
    let mut travelled = 0.0;
    while travelled < length {
        let end = (travelled + on).min(length);
        segments.push((
            from.offset(ux * travelled, uy * travelled),
            from.offset(ux * end, uy * end),
        ));
        travelled = end + off;
    }
    segments
}

/// Sample points along a circular arc; angles are radians, clockwise on screen
pub fn arc_points(center: Point, radius: f64, start_angle: f64, end_angle: f64, steps: usize) -> Vec<Point> {
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| {
            let t = start_angle + (end_angle - start_angle) * (i as f64 / steps as f64);
            Point::new(center.x + radius * t.cos(), center.y + radius * t.sin())
        })
        .collect()
}

/// Smooth a polyline with quadratic curves through the segment midpoints
///
/// The first and last points are kept; each interior point becomes the
/// control point of a quadratic sampled `samples` times.
pub fn smooth_path(points: &[Point], samples: usize) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let samples = samples.max(1);
    let mut out = vec![points[0]];
    let mut start = points[0];
    for i in 1..points.len() - 1 {
        let control = points[i];
        let end = if i == points.len() - 2 {
            points[i + 1]
        } else {
            control.midpoint(points[i + 1])
        };
        for s in 1..=samples {
            let t = s as f64 / samples as f64;
            let mt = 1.0 - t;
            out.push(Point::new(
                mt * mt * start.x + 2.0 * mt * t * control.x + t * t * end.x,
                mt * mt * start.y + 2.0 * mt * t * control.y + t * t * end.y,
            ));
        }
        start = end;
    }
    out
}
