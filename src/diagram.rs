//! The ordered shape list behind one drill drawing.
//!
//! Insertion order is paint order: later shapes draw on top and win
//! hit-tests.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::geometry::Point;
use crate::shapes::{Shape, ShapeId, ShapeType};

/// Ordered shapes; serializes as a plain JSON array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagram {
    shapes: Vec<Shape>,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from caller-supplied shapes, re-identifying duplicate ids
    pub fn from_shapes(shapes: Vec<Shape>) -> Self {
        let mut seen = HashSet::with_capacity(shapes.len());
        let shapes = shapes
            .into_iter()
            .map(|mut shape| {
                if !seen.insert(shape.id) {
                    let fresh = ShapeId::new();
                    warn!(duplicate = %shape.id, replacement = %fresh, "duplicate shape id in diagram");
                    shape.id = fresh;
                    seen.insert(fresh);
                }
                shape
            })
            .collect();
        Self { shapes }
    }

    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    /// Remove a shape, keeping the order of the rest
    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        let idx = self.position(id)?;
        Some(self.shapes.remove(idx))
    }

    pub fn position(&self, id: ShapeId) -> Option<usize> {
        self.shapes.iter().position(|s| s.id == id)
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id == id)
    }

    /// Iterate shapes in paint order
    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Find shape at position (returns topmost)
    pub fn shape_at(&self, pos: Point) -> Option<ShapeId> {
        self.shapes.iter().rev().find(|s| s.hit_test(pos)).map(|s| s.id)
    }

    /// Next jersey number: one past the highest numeric player label
    pub fn next_player_number(&self) -> u32 {
        self.shapes
            .iter()
            .filter(|s| s.shape_type() == ShapeType::Player)
            .filter_map(Shape::player_number)
            .max()
            .map_or(1, |n| n.saturating_add(1))
    }

    /// Set the selected flag on exactly `id` (or on nothing)
    pub fn mark_selected(&mut self, id: Option<ShapeId>) {
        for shape in &mut self.shapes {
            shape.selected = Some(shape.id) == id;
        }
    }

    /// Copy with every selected flag cleared
    pub fn without_selection(&self) -> Self {
        let mut copy = self.clone();
        copy.mark_selected(None);
        copy
    }
}

impl From<Vec<Shape>> for Diagram {
    fn from(shapes: Vec<Shape>) -> Self {
        Self::from_shapes(shapes)
    }
}

impl<'a> IntoIterator for &'a Diagram {
    type Item = &'a Shape;
    type IntoIter = std::slice::Iter<'a, Shape>;

    fn into_iter(self) -> Self::IntoIter {
        self.shapes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{ShapeColor, ShapeKind, DEFAULT_PLAYER_SIZE};

    fn place(diagram: &mut Diagram, ty: ShapeType, x: f64, y: f64) -> ShapeId {
        let origin = Point::new(x, y);
        let number = diagram.next_player_number();
        let shape = Shape::new(
            origin,
            ShapeKind::default_for(ty, origin, number, DEFAULT_PLAYER_SIZE),
            ShapeColor::White,
            2.0,
        );
        let id = shape.id;
        diagram.push(shape);
        id
    }

    #[test]
    fn topmost_shape_wins_hit_test() {
        let mut diagram = Diagram::new();
        let below = place(&mut diagram, ShapeType::Player, 100.0, 100.0);
        let above = place(&mut diagram, ShapeType::Cone, 104.0, 100.0);
        assert_eq!(diagram.shape_at(Point::new(102.0, 100.0)), Some(above));
        assert_eq!(diagram.shape_at(Point::new(90.0, 100.0)), Some(below));
        assert_eq!(diagram.shape_at(Point::new(300.0, 300.0)), None);
    }

    #[test]
    fn player_numbers_continue_from_the_maximum() {
        let mut diagram = Diagram::new();
        assert_eq!(diagram.next_player_number(), 1);
        let first = place(&mut diagram, ShapeType::Player, 10.0, 10.0);
        place(&mut diagram, ShapeType::Player, 50.0, 10.0);
        if let Some(shape) = diagram.get_mut(first) {
            shape.set_label("9");
        }
        assert_eq!(diagram.next_player_number(), 10);
    }

    #[test]
    fn duplicate_ids_are_replaced() {
        let mut diagram = Diagram::new();
        let id = place(&mut diagram, ShapeType::Ball, 0.0, 0.0);
        let mut shapes = diagram.shapes().to_vec();
        shapes.push(shapes[0].clone());

        let rebuilt = Diagram::from_shapes(shapes);
        assert_eq!(rebuilt.len(), 2);
        assert_eq!(rebuilt.shapes()[0].id, id);
        assert_ne!(rebuilt.shapes()[1].id, id);
    }

    #[test]
    fn selection_flags_are_exclusive() {
        let mut diagram = Diagram::new();
        let a = place(&mut diagram, ShapeType::Ball, 0.0, 0.0);
        let b = place(&mut diagram, ShapeType::Ball, 50.0, 0.0);
        diagram.mark_selected(Some(a));
        diagram.mark_selected(Some(b));
        let flags: Vec<bool> = diagram.iter().map(|s| s.selected).collect();
        assert_eq!(flags, vec![false, true]);
        assert!(diagram.without_selection().iter().all(|s| !s.selected));
    }

    #[test]
    fn serializes_as_plain_array() {
        let mut diagram = Diagram::new();
        place(&mut diagram, ShapeType::Cone, 5.0, 5.0);
        let value = serde_json::to_value(&diagram).expect("serialize");
        assert!(value.is_array());
        let back: Diagram = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, diagram);
    }
}
