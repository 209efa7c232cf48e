//! Pitch background layouts.
//!
//! Markings are laid out in metres on a regulation 105 x 68 field and
//! mapped uniformly onto the canvas, centred like an SVG `meet` viewBox.

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

use crate::config::CanvasSize;
use crate::geometry::{Bounds, Point};
use crate::render::{Stroke, Surface};
use crate::shapes::ShapeColor;

pub const PITCH_LENGTH: f64 = 105.0;
pub const PITCH_WIDTH: f64 = 68.0;

/// Distance from the field edge to the touchline
const MARGIN: f64 = 1.0;
const CENTER_CIRCLE_RADIUS: f64 = 9.15;
const PENALTY_AREA_DEPTH: f64 = 16.5;
const PENALTY_AREA_WIDTH: f64 = 20.16;
const GOAL_AREA_DEPTH: f64 = 5.5;
const GOAL_AREA_WIDTH: f64 = 7.32;
const PENALTY_SPOT_DISTANCE: f64 = 11.0;
const SPOT_RADIUS: f64 = 0.35;
const CORNER_ARC_RADIUS: f64 = 1.0;

const OUTLINE_WIDTH: f64 = 0.6;
const MARKING_WIDTH: f64 = 0.4;
const CORNER_WIDTH: f64 = 0.3;

/// Background field-marking style drawn beneath the shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PitchLayout {
    #[default]
    Full,
    Half,
    Unmarked,
}

impl PitchLayout {
    pub fn name(&self) -> &'static str {
        match self {
            PitchLayout::Full => "Full pitch",
            PitchLayout::Half => "Half pitch",
            PitchLayout::Unmarked => "Unmarked",
        }
    }

    /// Cycle to the next layout
    pub fn next(self) -> Self {
        match self {
            PitchLayout::Full => PitchLayout::Half,
            PitchLayout::Half => PitchLayout::Unmarked,
            PitchLayout::Unmarked => PitchLayout::Full,
        }
    }

    /// Width in metres of the area the layout shows
    fn view_width(&self) -> f64 {
        match self {
            PitchLayout::Half => PITCH_LENGTH / 2.0 + MARGIN,
            PitchLayout::Full | PitchLayout::Unmarked => PITCH_LENGTH,
        }
    }
}

/// Metres to canvas pixels
#[derive(Debug, Clone, Copy)]
struct FieldMapping {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl FieldMapping {
    fn new(view_width: f64, size: CanvasSize) -> Self {
        let scale = (size.width / view_width).min(size.height / PITCH_WIDTH);
        Self {
            scale,
            offset_x: (size.width - view_width * scale) / 2.0,
            offset_y: (size.height - PITCH_WIDTH * scale) / 2.0,
        }
    }

    fn point(&self, x: f64, y: f64) -> Point {
        Point::new(self.offset_x + x * self.scale, self.offset_y + y * self.scale)
    }

    fn rect(&self, x: f64, y: f64, width: f64, height: f64) -> Bounds {
        Bounds::from_corners(self.point(x, y), self.point(x + width, y + height))
    }

    fn len(&self, metres: f64) -> f64 {
        metres * self.scale
    }

    fn stroke(&self, width: f64) -> Stroke {
        Stroke::solid(ShapeColor::White, self.len(width).max(1.0))
    }
}

/// Paint the grass and the markings of `layout` over the whole canvas
pub fn paint_pitch(surface: &mut dyn Surface, layout: PitchLayout, size: CanvasSize) {
    surface.fill_rect(
        Bounds::from_origin_size(Point::default(), size.width, size.height),
        ShapeColor::Grass,
    );
    if layout == PitchLayout::Unmarked {
        return;
    }

    let view_width = layout.view_width();
    let m = FieldMapping::new(view_width, size);
    let mid_y = PITCH_WIDTH / 2.0;
    let halfway = PITCH_LENGTH / 2.0;
    let marking = m.stroke(MARKING_WIDTH);

    match layout {
        PitchLayout::Full => {
            let outline = m.rect(MARGIN, MARGIN, PITCH_LENGTH - 2.0 * MARGIN, PITCH_WIDTH - 2.0 * MARGIN);
            surface.stroke_rect(outline, &m.stroke(OUTLINE_WIDTH));
            surface.circle(m.point(halfway, mid_y), m.len(CENTER_CIRCLE_RADIUS), None, Some(&marking));
        }
        PitchLayout::Half => {
            // Touchlines and goal line; the halfway line closes the box
            let outline = [
                m.point(halfway, MARGIN),
                m.point(MARGIN, MARGIN),
                m.point(MARGIN, PITCH_WIDTH - MARGIN),
                m.point(halfway, PITCH_WIDTH - MARGIN),
            ];
            surface.polyline(&outline, &m.stroke(OUTLINE_WIDTH));
            surface.arc(
                m.point(halfway, mid_y),
                m.len(CENTER_CIRCLE_RADIUS),
                FRAC_PI_2,
                3.0 * FRAC_PI_2,
                &marking,
            );
        }
        PitchLayout::Unmarked => {}
    }

    surface.line(m.point(halfway, MARGIN), m.point(halfway, PITCH_WIDTH - MARGIN), &marking);
    surface.circle(m.point(halfway, mid_y), m.len(SPOT_RADIUS), Some(ShapeColor::White), None);

    paint_penalty_end(surface, &m, End::Left);
    let corner = m.stroke(CORNER_WIDTH);
    let r = m.len(CORNER_ARC_RADIUS);
    surface.arc(m.point(MARGIN, MARGIN), r, 0.0, FRAC_PI_2, &corner);
    surface.arc(m.point(MARGIN, PITCH_WIDTH - MARGIN), r, 3.0 * FRAC_PI_2, 2.0 * PI, &corner);

    if layout == PitchLayout::Full {
        paint_penalty_end(surface, &m, End::Right);
        let far = PITCH_LENGTH - MARGIN;
        surface.arc(m.point(far, MARGIN), r, FRAC_PI_2, PI, &corner);
        surface.arc(m.point(far, PITCH_WIDTH - MARGIN), r, PI, 3.0 * FRAC_PI_2, &corner);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    Left,
    Right,
}

/// Penalty area, goal area, penalty spot and arc at one end
fn paint_penalty_end(surface: &mut dyn Surface, m: &FieldMapping, end: End) {
    let marking = m.stroke(MARKING_WIDTH);
    let mid_y = PITCH_WIDTH / 2.0;
    let goal_line = match end {
        End::Left => MARGIN,
        End::Right => PITCH_LENGTH - MARGIN,
    };
    // Depths grow into the field from the goal line
    let inward = |depth: f64| match end {
        End::Left => goal_line,
        End::Right => goal_line - depth,
    };

    surface.stroke_rect(
        m.rect(inward(PENALTY_AREA_DEPTH), mid_y - PENALTY_AREA_WIDTH / 2.0, PENALTY_AREA_DEPTH, PENALTY_AREA_WIDTH),
        &marking,
    );
    surface.stroke_rect(
        m.rect(inward(GOAL_AREA_DEPTH), mid_y - GOAL_AREA_WIDTH / 2.0, GOAL_AREA_DEPTH, GOAL_AREA_WIDTH),
        &marking,
    );

    let spot_x = match end {
        End::Left => goal_line + PENALTY_SPOT_DISTANCE,
        End::Right => goal_line - PENALTY_SPOT_DISTANCE,
    };
    let spot = m.point(spot_x, mid_y);
    surface.circle(spot, m.len(SPOT_RADIUS), Some(ShapeColor::White), None);

    // The arc is the part of the spot's circle outside the penalty area
    let half_sweep = ((PENALTY_AREA_DEPTH - PENALTY_SPOT_DISTANCE) / CENTER_CIRCLE_RADIUS).acos();
    let facing = match end {
        End::Left => 0.0,
        End::Right => PI,
    };
    surface.arc(
        spot,
        m.len(CENTER_CIRCLE_RADIUS),
        facing - half_sweep,
        facing + half_sweep,
        &marking,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tests::RecordingSurface;

    fn ops(layout: PitchLayout, size: CanvasSize) -> Vec<String> {
        let mut surface = RecordingSurface::default();
        paint_pitch(&mut surface, layout, size);
        surface.ops
    }

    #[test]
    fn unmarked_is_grass_only() {
        assert_eq!(ops(PitchLayout::Unmarked, CanvasSize::from_width(420.0)), vec!["fill_rect Grass"]);
    }

    #[test]
    fn full_pitch_has_both_ends() {
        let ops = ops(PitchLayout::Full, CanvasSize::from_width(1050.0));
        assert_eq!(ops[0], "fill_rect Grass");
        // outline + two penalty areas + two goal areas
        assert_eq!(ops.iter().filter(|op| op.starts_with("stroke_rect")).count(), 5);
        // two penalty arcs + four corners
        assert_eq!(ops.iter().filter(|op| *op == "arc").count(), 6);
    }

    #[test]
    fn half_pitch_has_one_end() {
        let ops = ops(PitchLayout::Half, CanvasSize::from_width(1050.0));
        assert_eq!(ops.iter().filter(|op| op.starts_with("stroke_rect")).count(), 2);
        // centre half-circle + penalty arc + two corners
        assert_eq!(ops.iter().filter(|op| *op == "arc").count(), 4);
    }

    #[test]
    fn mapping_is_uniform_and_centred() {
        let m = FieldMapping::new(PITCH_LENGTH, CanvasSize::from_width(1050.0));
        assert_eq!(m.scale, 10.0);
        assert_eq!(m.point(52.5, 34.0), Point::new(525.0, 340.0));

        let wide = FieldMapping::new(PITCH_LENGTH, CanvasSize::fixed(1200.0, 680.0));
        assert_eq!(wide.scale, 10.0);
        assert_eq!(wide.offset_x, 75.0);
    }

    #[test]
    fn layouts_cycle_and_parse() {
        assert_eq!(PitchLayout::Unmarked.next(), PitchLayout::Full);
        let parsed: PitchLayout = serde_json::from_str("\"half\"").expect("parse");
        assert_eq!(parsed, PitchLayout::Half);
    }
}
