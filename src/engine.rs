//! The drill-diagram canvas engine.
//!
//! [`DiagramCanvas`] owns the live [`Diagram`], its [`History`], the single
//! selection and the pointer state machine. Hosts feed it pointer events and
//! commands; every operation is total and unusable requests are no-ops.

use std::fmt;

use tracing::{debug, info};

use crate::config::{CanvasConfig, CanvasSize, ShapeStyle};
use crate::diagram::Diagram;
use crate::geometry::Point;
use crate::history::History;
use crate::pitch::PitchLayout;
use crate::render::{CanvasView, Preview, Stroke};
use crate::shapes::{LineStyle, Placement, Shape, ShapeColor, ShapeId, ShapeKind, ShapeType};

/// Offset applied to duplicated shapes (pixels)
pub const DUPLICATE_OFFSET: (f64, f64) = (20.0, 20.0);

/// Callback receiving the exported diagram on save
pub type SaveCallback = Box<dyn FnMut(&Diagram)>;

/// Tool that pointer input is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Select,
    Shape(ShapeType),
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Select => "Select",
            Tool::Shape(ty) => ty.name(),
        }
    }
}

/// Coarse pointer state, as reported to hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasState {
    Idle,
    TwoPointPending,
    FreehandDragging,
    ShapeDragging,
}

/// Pointer state machine with the data each state carries
#[derive(Debug, Clone, PartialEq)]
enum Interaction {
    Idle,
    /// First point of a line-like shape recorded
    TwoPointPending {
        kind: ShapeType,
        start: Point,
        current: Point,
    },
    /// Button held while recording a stroke
    FreehandDragging { kind: ShapeType, points: Vec<Point> },
    /// Selected shape follows the pointer
    ShapeDragging {
        id: ShapeId,
        /// Pointer position minus the shape anchor at grab time
        grab: (f64, f64),
        before: Diagram,
        moved: bool,
    },
}

/// Drawing canvas for one drill diagram
pub struct DiagramCanvas {
    diagram: Diagram,
    history: History,
    selected: Option<ShapeId>,
    interaction: Interaction,
    preview: Option<Preview>,
    tool: Tool,
    style: ShapeStyle,
    size: CanvasSize,
    pitch: PitchLayout,
    on_save: Option<SaveCallback>,
}

impl fmt::Debug for DiagramCanvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagramCanvas")
            .field("shapes", &self.diagram.len())
            .field("history", &self.history.len())
            .field("selected", &self.selected)
            .field("interaction", &self.state())
            .field("tool", &self.tool)
            .field("size", &self.size)
            .field("pitch", &self.pitch)
            .finish_non_exhaustive()
    }
}

impl Default for DiagramCanvas {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl DiagramCanvas {
    /// Open a canvas on the configured initial diagram with empty history
    pub fn new(config: CanvasConfig) -> Self {
        let size = config.size();
        let mut diagram = Diagram::from_shapes(config.initial.shapes().to_vec());
        diagram.mark_selected(None);
        debug!(shapes = diagram.len(), width = size.width, height = size.height, "opened canvas");
        Self {
            diagram,
            history: History::new(config.max_history),
            selected: None,
            interaction: Interaction::Idle,
            preview: None,
            tool: Tool::Select,
            style: config.style,
            size,
            pitch: config.pitch,
            on_save: None,
        }
    }

    /// Register the callback invoked by [`DiagramCanvas::save`]
    pub fn with_save_callback(mut self, callback: impl FnMut(&Diagram) + 'static) -> Self {
        self.on_save = Some(Box::new(callback));
        self
    }

    // --- Accessors ---

    /// Live diagram, including the selection flag
    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selected(&self) -> Option<ShapeId> {
        self.selected
    }

    pub fn selected_shape(&self) -> Option<&Shape> {
        self.selected.and_then(|id| self.diagram.get(id))
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn style(&self) -> &ShapeStyle {
        &self.style
    }

    pub fn size(&self) -> CanvasSize {
        self.size
    }

    pub fn pitch(&self) -> PitchLayout {
        self.pitch
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn state(&self) -> CanvasState {
        match self.interaction {
            Interaction::Idle => CanvasState::Idle,
            Interaction::TwoPointPending { .. } => CanvasState::TwoPointPending,
            Interaction::FreehandDragging { .. } => CanvasState::FreehandDragging,
            Interaction::ShapeDragging { .. } => CanvasState::ShapeDragging,
        }
    }

    /// Everything a renderer needs for the current frame
    pub fn view(&self) -> CanvasView<'_> {
        CanvasView {
            size: self.size,
            pitch: self.pitch,
            diagram: &self.diagram,
            selected: self.selected,
            preview: self.preview.as_ref(),
        }
    }

    // --- Style and configuration ---

    pub fn set_tool(&mut self, tool: Tool) {
        self.release_drag();
        if self.tool != tool {
            self.abandon_placement();
            debug!(tool = tool.name(), "tool changed");
        }
        self.tool = tool;
    }

    /// `None` restores per-kind default colors
    pub fn set_color(&mut self, color: Option<ShapeColor>) {
        self.style.color = color;
        self.refresh_preview();
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        self.style.stroke_width = width.max(0.5);
        self.refresh_preview();
    }

    pub fn set_line_style(&mut self, style: LineStyle) {
        self.style.line_style = style;
    }

    pub fn set_player_size(&mut self, size: f64) {
        self.style.player_size = size.max(1.0);
    }

    pub fn set_pitch(&mut self, pitch: PitchLayout) {
        self.pitch = pitch;
    }

    /// Recompute the pixel size from a new container width
    pub fn resize(&mut self, width: f64) -> CanvasSize {
        self.size = CanvasSize::from_width(width);
        debug!(width = self.size.width, height = self.size.height, "canvas resized");
        self.size
    }

    // --- Placement ---

    /// Place a shape of `ty` at `pos` with kind defaults; one commit
    pub fn place_shape(&mut self, ty: ShapeType, pos: Point) -> ShapeId {
        let number = self.diagram.next_player_number();
        let kind = match ShapeKind::default_for(ty, pos, number, self.style.player_size) {
            ShapeKind::Line { end, .. } => ShapeKind::Line { end, style: self.style.line_style },
            ShapeKind::Arrow { end, .. } => ShapeKind::Arrow { end, style: self.style.line_style },
            kind => kind,
        };
        self.add_shape(pos, kind)
    }

    /// Place a text shape with the given content; one commit
    pub fn place_text(&mut self, pos: Point, content: impl Into<String>) -> ShapeId {
        let kind = match ShapeKind::default_for(ShapeType::Text, pos, 0, self.style.player_size) {
            ShapeKind::Text { font_size, .. } => ShapeKind::Text { content: content.into(), font_size },
            kind => kind,
        };
        self.add_shape(pos, kind)
    }

    /// Arm the click-click placement of a line or arrow
    pub fn begin_two_point_shape(&mut self, kind: ShapeType) {
        if kind.placement() != Placement::TwoPoint {
            debug!(kind = kind.name(), "not a two-point shape");
            return;
        }
        self.set_tool(Tool::Shape(kind));
    }

    /// Arm the drag placement of a freehand stroke
    pub fn begin_freehand_shape(&mut self) {
        self.set_tool(Tool::Shape(ShapeType::Freehand));
    }

    fn add_shape(&mut self, origin: Point, kind: ShapeKind) -> ShapeId {
        self.release_drag();
        let ty = kind.shape_type();
        let color = self.style.color.unwrap_or_else(|| ShapeKind::default_color(ty));
        let shape = Shape::new(origin, kind, color, self.style.stroke_width);
        let id = shape.id;
        let before = self.snapshot();
        self.diagram.push(shape);
        self.commit(before, "add");
        id
    }

    // --- Pointer input ---

    /// Button pressed at `pos`
    ///
    /// A drag still active here lost its release; it is committed first.
    pub fn pointer_down(&mut self, pos: Point) {
        self.release_drag();
        match self.tool {
            Tool::Select => {
                if self.select_shape(pos).is_some() {
                    self.start_drag(pos);
                }
            }
            Tool::Shape(kind) => match kind.placement() {
                Placement::Click if kind == ShapeType::Text => {
                    self.place_text(pos, "Text");
                }
                Placement::Click => {
                    self.place_shape(kind, pos);
                }
                Placement::TwoPoint => self.two_point_click(kind, pos),
                Placement::Drag => self.start_freehand(kind, pos),
            },
        }
    }

    /// Pointer moved to `pos`, with or without the button held
    pub fn pointer_move(&mut self, pos: Point) {
        if matches!(self.interaction, Interaction::ShapeDragging { .. }) {
            self.move_selected_to(pos);
            return;
        }
        match &mut self.interaction {
            Interaction::TwoPointPending { current, .. } => *current = pos,
            Interaction::FreehandDragging { points, .. } => points.push(pos),
            Interaction::ShapeDragging { .. } | Interaction::Idle => return,
        }
        self.refresh_preview();
    }

    /// Button released at `pos`
    pub fn pointer_up(&mut self, pos: Point) {
        match self.interaction {
            Interaction::FreehandDragging { .. } => self.finish_freehand(),
            Interaction::ShapeDragging { .. } => {
                self.move_selected_to(pos);
                self.release_drag();
            }
            // Two-point shapes complete on the second press
            Interaction::TwoPointPending { .. } | Interaction::Idle => {}
        }
    }

    /// Abort the gesture in progress; a dragged shape snaps back
    pub fn cancel(&mut self) {
        if let Interaction::ShapeDragging { before, moved: true, .. } =
            std::mem::replace(&mut self.interaction, Interaction::Idle)
        {
            self.diagram = before;
            self.diagram.mark_selected(self.selected);
        }
        self.abandon_placement();
    }

    fn two_point_click(&mut self, kind: ShapeType, pos: Point) {
        let Interaction::TwoPointPending { start, .. } = self.interaction else {
            debug!(kind = kind.name(), "two-point shape pending");
            self.interaction = Interaction::TwoPointPending { kind, start: pos, current: pos };
            self.refresh_preview();
            return;
        };

        let style = self.style.line_style;
        let shape = match kind {
            ShapeType::Arrow => ShapeKind::Arrow { end: pos, style },
            _ => ShapeKind::Line { end: pos, style },
        };
        self.interaction = Interaction::Idle;
        self.preview = None;
        self.add_shape(start, shape);
        self.tool = Tool::Select;
    }

    fn start_freehand(&mut self, kind: ShapeType, pos: Point) {
        self.interaction = Interaction::FreehandDragging { kind, points: vec![pos] };
        self.refresh_preview();
    }

    fn finish_freehand(&mut self) {
        let Interaction::FreehandDragging { kind, points } =
            std::mem::replace(&mut self.interaction, Interaction::Idle)
        else {
            return;
        };
        self.preview = None;
        if points.len() < 2 {
            debug!(points = points.len(), "stroke too short, nothing committed");
            return;
        }
        let origin = points[0];
        let shape = match kind {
            ShapeType::Curve => ShapeKind::Curve { points },
            _ => ShapeKind::Freehand { points },
        };
        self.add_shape(origin, shape);
    }

    /// Drop any pending placement without committing
    fn abandon_placement(&mut self) {
        if matches!(
            self.interaction,
            Interaction::TwoPointPending { .. } | Interaction::FreehandDragging { .. }
        ) {
            self.interaction = Interaction::Idle;
        }
        self.preview = None;
    }

    // --- Selection and dragging ---

    /// Select the topmost shape at `pos`; a miss clears the selection
    pub fn select_shape(&mut self, pos: Point) -> Option<ShapeId> {
        let hit = self.diagram.shape_at(pos);
        self.set_selection(hit);
        hit
    }

    /// Select a shape by id; unknown ids clear the selection
    pub fn select_id(&mut self, id: Option<ShapeId>) {
        let id = id.filter(|id| self.diagram.get(*id).is_some());
        self.set_selection(id);
    }

    fn set_selection(&mut self, id: Option<ShapeId>) {
        self.selected = id;
        self.diagram.mark_selected(id);
    }

    fn start_drag(&mut self, pos: Point) {
        let Some(shape) = self.selected_shape() else {
            return;
        };
        let id = shape.id;
        let grab = shape.origin.delta_to(pos);
        let before = self.snapshot();
        self.interaction = Interaction::ShapeDragging { id, grab, before, moved: false };
    }

    /// Move the selected shape so the grab point follows `pos`
    ///
    /// Starts a drag with no grab offset when none is active. Nothing is
    /// committed until [`DiagramCanvas::release_drag`].
    pub fn move_selected_to(&mut self, pos: Point) {
        let Some(id) = self.selected else {
            return;
        };
        if !matches!(self.interaction, Interaction::ShapeDragging { id: dragging, .. } if dragging == id) {
            let before = self.snapshot();
            self.interaction = Interaction::ShapeDragging { id, grab: (0.0, 0.0), before, moved: false };
        }
        let Interaction::ShapeDragging { grab, moved, .. } = &mut self.interaction else {
            return;
        };
        let Some(shape) = self.diagram.get_mut(id) else {
            return;
        };
        let anchor = pos.offset(-grab.0, -grab.1);
        if shape.origin != anchor {
            shape.move_anchor_to(anchor);
            *moved = true;
        }
    }

    /// End the active drag; one commit if the shape moved
    pub fn release_drag(&mut self) {
        if let Interaction::ShapeDragging { before, moved: true, .. } =
            std::mem::replace(&mut self.interaction, Interaction::Idle)
        {
            self.commit(before, "move");
        }
    }

    // --- Editing ---

    /// Remove the selected shape; no-op without a selection
    pub fn delete_selected(&mut self) {
        self.release_drag();
        let Some(id) = self.selected else {
            return;
        };
        let before = self.snapshot();
        if self.diagram.remove(id).is_some() {
            self.selected = None;
            self.commit(before, "delete");
        }
    }

    /// Append an offset copy of the selected shape; selection stays put
    pub fn duplicate_selected(&mut self) -> Option<ShapeId> {
        self.release_drag();
        let mut copy = self.selected_shape()?.clone();
        copy.id = ShapeId::new();
        copy.selected = false;
        copy.translate(DUPLICATE_OFFSET.0, DUPLICATE_OFFSET.1);
        let id = copy.id;

        let before = self.snapshot();
        self.diagram.push(copy);
        self.commit(before, "duplicate");
        Some(id)
    }

    /// Replace the label of the selected player or text; false when not applicable
    pub fn relabel_selected(&mut self, text: &str) -> bool {
        self.release_drag();
        let Some(id) = self.selected else {
            return false;
        };
        let before = self.snapshot();
        let changed = match self.diagram.get_mut(id) {
            Some(shape) if shape.label() == Some(text) => false,
            Some(shape) => shape.set_label(text),
            None => false,
        };
        if changed {
            self.commit(before, "relabel");
        }
        changed
    }

    /// Remove every shape; always one commit
    pub fn clear(&mut self) {
        self.cancel();
        let before = self.snapshot();
        self.diagram = Diagram::new();
        self.selected = None;
        self.commit(before, "clear");
    }

    // --- History ---

    /// Step back one commit; false at the oldest entry
    pub fn undo(&mut self) -> bool {
        self.release_drag();
        self.abandon_placement();
        let current = self.snapshot();
        let Some(previous) = self.history.undo(&current) else {
            return false;
        };
        self.restore(previous);
        debug!(cursor = self.history.cursor(), "undo");
        true
    }

    /// Step forward one commit; false at the newest entry
    pub fn redo(&mut self) -> bool {
        self.release_drag();
        self.abandon_placement();
        let Some(next) = self.history.redo() else {
            return false;
        };
        self.restore(next);
        debug!(cursor = self.history.cursor(), "redo");
        true
    }

    fn restore(&mut self, diagram: Diagram) {
        self.diagram = diagram;
        self.selected = None;
    }

    // --- Export ---

    /// Current shapes with every selection flag cleared
    pub fn export_snapshot(&self) -> Diagram {
        self.snapshot()
    }

    /// Hand the exported snapshot to the save callback and return it
    pub fn save(&mut self) -> Diagram {
        let snapshot = self.export_snapshot();
        if let Some(callback) = self.on_save.as_mut() {
            callback(&snapshot);
        }
        info!(shapes = snapshot.len(), "diagram saved");
        snapshot
    }

    fn snapshot(&self) -> Diagram {
        self.diagram.without_selection()
    }

    fn commit(&mut self, before: Diagram, action: &'static str) {
        self.history.commit(before);
        self.diagram.mark_selected(self.selected);
        debug!(action, shapes = self.diagram.len(), history = self.history.len(), "committed");
    }

    fn preview_stroke(&self, kind: ShapeType) -> Stroke {
        let color = self.style.color.unwrap_or_else(|| ShapeKind::default_color(kind));
        Stroke::solid(color, self.style.stroke_width)
    }

    fn refresh_preview(&mut self) {
        self.preview = match &self.interaction {
            Interaction::TwoPointPending { kind, start, current } => Some(Preview::Segment {
                start: *start,
                end: *current,
                arrow: *kind == ShapeType::Arrow,
                stroke: self.preview_stroke(*kind),
            }),
            Interaction::FreehandDragging { kind, points } => Some(Preview::Path {
                points: points.clone(),
                smooth: *kind == ShapeType::Curve,
                stroke: self.preview_stroke(*kind),
            }),
            Interaction::Idle | Interaction::ShapeDragging { .. } => None,
        };
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use proptest::prelude::*;

    use super::*;

    fn canvas() -> DiagramCanvas {
        DiagramCanvas::default()
    }

    fn labels(canvas: &DiagramCanvas) -> Vec<String> {
        canvas
            .diagram()
            .iter()
            .filter_map(|s| s.label().map(str::to_string))
            .collect()
    }

    fn placeable() -> impl Strategy<Value = ShapeType> {
        prop::sample::select(ShapeType::ALL.to_vec())
    }

    fn position() -> impl Strategy<Value = Point> {
        (0.0..960.0f64, 0.0..620.0f64).prop_map(|(x, y)| Point::new(x, y))
    }

    #[test]
    fn cone_drag_is_one_undo_step() {
        let mut canvas = canvas();
        let id = canvas.place_shape(ShapeType::Cone, Point::new(50.0, 50.0));
        assert_eq!(canvas.select_shape(Point::new(50.0, 50.0)), Some(id));
        for step in 1..=4 {
            let d = step as f64 * 5.0;
            canvas.move_selected_to(Point::new(50.0 + d, 50.0 + d));
        }
        canvas.release_drag();

        assert_eq!(canvas.diagram().shapes()[0].origin, Point::new(70.0, 70.0));
        assert_eq!(canvas.history().len(), 2);

        assert!(canvas.undo());
        assert_eq!(canvas.diagram().shapes()[0].origin, Point::new(50.0, 50.0));
        assert!(canvas.undo());
        assert!(canvas.diagram().is_empty());
        assert!(!canvas.undo());
    }

    #[test]
    fn pointer_drag_keeps_grab_offset() {
        let mut canvas = canvas();
        canvas.place_shape(ShapeType::Player, Point::new(100.0, 100.0));
        canvas.pointer_down(Point::new(105.0, 100.0));
        assert_eq!(canvas.state(), CanvasState::ShapeDragging);
        canvas.pointer_move(Point::new(125.0, 110.0));
        canvas.pointer_up(Point::new(135.0, 120.0));

        assert_eq!(canvas.state(), CanvasState::Idle);
        assert_eq!(canvas.diagram().shapes()[0].origin, Point::new(130.0, 120.0));
        assert_eq!(canvas.history().len(), 2);
    }

    #[test]
    fn drag_without_movement_commits_nothing() {
        let mut canvas = canvas();
        canvas.place_shape(ShapeType::Ball, Point::new(10.0, 10.0));
        canvas.pointer_down(Point::new(10.0, 10.0));
        canvas.pointer_up(Point::new(10.0, 10.0));
        assert_eq!(canvas.history().len(), 1);
        assert!(canvas.selected().is_some());
    }

    #[test]
    fn cancel_snaps_a_drag_back() {
        let mut canvas = canvas();
        canvas.place_shape(ShapeType::Ball, Point::new(10.0, 10.0));
        canvas.pointer_down(Point::new(10.0, 10.0));
        canvas.pointer_move(Point::new(60.0, 60.0));
        canvas.cancel();
        assert_eq!(canvas.diagram().shapes()[0].origin, Point::new(10.0, 10.0));
        assert_eq!(canvas.history().len(), 1);
        assert!(canvas.diagram().shapes()[0].selected);
    }

    fn origins(canvas: &DiagramCanvas) -> Vec<Point> {
        canvas.diagram().iter().map(|s| s.origin).collect()
    }

    #[test]
    fn press_during_unreleased_drag_commits_the_move_first() {
        let mut canvas = canvas();
        canvas.place_shape(ShapeType::Cone, Point::new(100.0, 100.0));
        canvas.place_shape(ShapeType::Ball, Point::new(300.0, 300.0));

        // Release lost: the next press lands on the ball
        canvas.pointer_down(Point::new(100.0, 100.0));
        canvas.pointer_move(Point::new(150.0, 150.0));
        canvas.pointer_down(Point::new(300.0, 300.0));
        canvas.pointer_up(Point::new(300.0, 300.0));

        assert_eq!(origins(&canvas), vec![Point::new(150.0, 150.0), Point::new(300.0, 300.0)]);
        assert_eq!(canvas.history().len(), 3);

        assert!(canvas.undo());
        assert_eq!(origins(&canvas), vec![Point::new(100.0, 100.0), Point::new(300.0, 300.0)]);
        assert!(canvas.undo());
        assert_eq!(origins(&canvas), vec![Point::new(100.0, 100.0)]);
    }

    #[test]
    fn placing_during_unreleased_drag_leaves_dragged_shape_alone() {
        let mut canvas = canvas();
        canvas.place_shape(ShapeType::Cone, Point::new(100.0, 100.0));
        canvas.place_shape(ShapeType::Ball, Point::new(300.0, 300.0));

        canvas.pointer_down(Point::new(100.0, 100.0));
        canvas.pointer_move(Point::new(150.0, 150.0));
        canvas.set_tool(Tool::Shape(ShapeType::Player));
        assert_eq!(canvas.state(), CanvasState::Idle);
        canvas.pointer_down(Point::new(400.0, 400.0));
        canvas.pointer_up(Point::new(400.0, 400.0));

        assert_eq!(
            origins(&canvas),
            vec![Point::new(150.0, 150.0), Point::new(300.0, 300.0), Point::new(400.0, 400.0)]
        );
        assert_eq!(canvas.history().len(), 4);

        assert!(canvas.undo());
        assert_eq!(origins(&canvas), vec![Point::new(150.0, 150.0), Point::new(300.0, 300.0)]);
        assert!(canvas.undo());
        assert_eq!(origins(&canvas), vec![Point::new(100.0, 100.0), Point::new(300.0, 300.0)]);
    }

    #[test]
    fn two_point_shape_commits_once_on_second_click() {
        let mut canvas = canvas();
        canvas.begin_two_point_shape(ShapeType::Arrow);
        canvas.pointer_down(Point::new(10.0, 10.0));
        canvas.pointer_up(Point::new(10.0, 10.0));
        assert_eq!(canvas.state(), CanvasState::TwoPointPending);

        canvas.pointer_move(Point::new(40.0, 20.0));
        assert!(matches!(
            canvas.view().preview,
            Some(Preview::Segment { end, arrow: true, .. }) if *end == Point::new(40.0, 20.0)
        ));
        assert!(canvas.diagram().is_empty());

        canvas.pointer_down(Point::new(90.0, 30.0));
        assert_eq!(canvas.diagram().len(), 1);
        assert_eq!(canvas.history().len(), 1);
        assert_eq!(canvas.tool(), Tool::Select);
        assert!(canvas.view().preview.is_none());

        let arrow = &canvas.diagram().shapes()[0];
        assert_eq!(arrow.origin, Point::new(10.0, 10.0));
        assert_eq!(arrow.kind, ShapeKind::Arrow { end: Point::new(90.0, 30.0), style: LineStyle::Solid });
    }

    #[test]
    fn begin_two_point_ignores_other_kinds() {
        let mut canvas = canvas();
        canvas.begin_two_point_shape(ShapeType::Cone);
        assert_eq!(canvas.tool(), Tool::Select);
    }

    #[test]
    fn freehand_needs_two_points() {
        let mut canvas = canvas();
        canvas.begin_freehand_shape();
        canvas.pointer_down(Point::new(5.0, 5.0));
        canvas.pointer_up(Point::new(5.0, 5.0));
        assert!(canvas.diagram().is_empty());
        assert!(canvas.history().is_empty());

        let stroke = [Point::new(5.0, 5.0), Point::new(8.0, 9.0), Point::new(12.0, 9.0)];
        canvas.pointer_down(stroke[0]);
        canvas.pointer_move(stroke[1]);
        assert!(matches!(canvas.view().preview, Some(Preview::Path { points, .. }) if points.len() == 2));
        canvas.pointer_move(stroke[2]);
        canvas.pointer_up(stroke[2]);

        assert_eq!(canvas.diagram().len(), 1);
        assert_eq!(canvas.diagram().shapes()[0].kind, ShapeKind::Freehand { points: stroke.to_vec() });
        assert_eq!(canvas.tool(), Tool::Shape(ShapeType::Freehand));
    }

    #[test]
    fn curve_tool_stores_a_curve() {
        let mut canvas = canvas();
        canvas.set_tool(Tool::Shape(ShapeType::Curve));
        canvas.pointer_down(Point::new(0.0, 0.0));
        canvas.pointer_move(Point::new(10.0, 10.0));
        canvas.pointer_up(Point::new(20.0, 0.0));
        assert_eq!(canvas.diagram().shapes()[0].shape_type(), ShapeType::Curve);
    }

    #[test]
    fn player_labels_are_not_renumbered() {
        let mut canvas = canvas();
        let first = canvas.place_shape(ShapeType::Player, Point::new(400.0, 100.0));
        canvas.place_shape(ShapeType::Player, Point::new(100.0, 100.0));
        assert_eq!(labels(&canvas), vec!["1", "2"]);

        canvas.select_id(Some(first));
        canvas.delete_selected();
        assert_eq!(labels(&canvas), vec!["2"]);
        assert_eq!(canvas.selected(), None);

        canvas.place_shape(ShapeType::Player, Point::new(200.0, 200.0));
        assert_eq!(labels(&canvas), vec!["2", "3"]);
    }

    #[test]
    fn duplicate_leaves_selection_on_original() {
        let mut canvas = canvas();
        let original = canvas.place_shape(ShapeType::Player, Point::new(100.0, 100.0));
        canvas.select_id(Some(original));
        let copy = canvas.duplicate_selected().expect("duplicate");

        assert_ne!(copy, original);
        assert_eq!(canvas.selected(), Some(original));
        let shape = canvas.diagram().get(copy).expect("copy");
        assert_eq!(shape.origin, Point::new(120.0, 120.0));
        assert!(!shape.selected);
        assert_eq!(shape.label(), Some("1"));
        assert_eq!(canvas.history().len(), 2);
    }

    #[test]
    fn edits_without_selection_are_no_ops() {
        let mut canvas = canvas();
        canvas.place_shape(ShapeType::Cone, Point::new(10.0, 10.0));
        canvas.delete_selected();
        assert_eq!(canvas.duplicate_selected(), None);
        assert!(!canvas.relabel_selected("7"));
        canvas.move_selected_to(Point::new(90.0, 90.0));
        assert_eq!(canvas.diagram().len(), 1);
        assert_eq!(canvas.history().len(), 1);
        assert!(!canvas.redo());
    }

    #[test]
    fn relabel_commits_once() {
        let mut canvas = canvas();
        let id = canvas.place_shape(ShapeType::Player, Point::new(10.0, 10.0));
        canvas.select_id(Some(id));
        assert!(canvas.relabel_selected("GK"));
        assert!(!canvas.relabel_selected("GK"));
        assert_eq!(labels(&canvas), vec!["GK"]);
        assert_eq!(canvas.history().len(), 2);

        let cone = canvas.place_shape(ShapeType::Cone, Point::new(300.0, 300.0));
        canvas.select_id(Some(cone));
        assert!(!canvas.relabel_selected("x"));
    }

    #[test]
    fn clear_is_undoable() {
        let mut canvas = canvas();
        canvas.place_shape(ShapeType::Ball, Point::new(10.0, 10.0));
        canvas.place_text(Point::new(50.0, 50.0), "Press high");
        canvas.clear();
        assert!(canvas.diagram().is_empty());
        assert!(canvas.undo());
        assert_eq!(labels(&canvas), vec!["Press high"]);
    }

    #[test]
    fn snapshots_never_carry_selection() {
        let mut canvas = canvas();
        let id = canvas.place_shape(ShapeType::Ball, Point::new(10.0, 10.0));
        canvas.select_id(Some(id));
        assert!(canvas.diagram().shapes()[0].selected);
        assert!(canvas.export_snapshot().iter().all(|s| !s.selected));

        canvas.duplicate_selected();
        canvas.undo();
        assert!(canvas.diagram().iter().all(|s| !s.selected));
        assert_eq!(canvas.selected(), None);
    }

    #[test]
    fn save_invokes_callback_with_snapshot() {
        let saved = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&saved);
        let mut canvas = DiagramCanvas::default().with_save_callback(move |d| {
            *sink.borrow_mut() = Some(d.clone());
        });
        let id = canvas.place_shape(ShapeType::Flag, Point::new(10.0, 10.0));
        canvas.select_id(Some(id));

        let returned = canvas.save();
        assert_eq!(saved.borrow().as_ref(), Some(&returned));
        assert!(returned.iter().all(|s| !s.selected));
    }

    #[test]
    fn initial_shapes_start_with_empty_history() {
        let mut seed = canvas();
        seed.place_shape(ShapeType::Player, Point::new(10.0, 10.0));
        let config = CanvasConfig::default().with_initial(seed.export_snapshot());
        let mut canvas = DiagramCanvas::new(config);
        assert_eq!(canvas.diagram().len(), 1);
        assert!(!canvas.can_undo());
        canvas.place_shape(ShapeType::Player, Point::new(50.0, 10.0));
        assert_eq!(labels(&canvas), vec!["1", "2"]);
    }

    #[test]
    fn style_applies_to_new_shapes() {
        let mut canvas = canvas();
        canvas.set_color(Some(ShapeColor::Red));
        canvas.set_line_style(LineStyle::Dashed);
        canvas.set_stroke_width(4.0);
        let id = canvas.place_shape(ShapeType::Line, Point::new(0.0, 0.0));
        let line = canvas.diagram().get(id).expect("line");
        assert_eq!(line.color, ShapeColor::Red);
        assert_eq!(line.stroke_width, 4.0);
        assert!(matches!(line.kind, ShapeKind::Line { style: LineStyle::Dashed, .. }));

        canvas.set_color(None);
        let cone = canvas.place_shape(ShapeType::Cone, Point::new(0.0, 0.0));
        assert_eq!(canvas.diagram().get(cone).map(|s| s.color), Some(ShapeColor::Orange));
    }

    #[test]
    fn resize_keeps_pitch_aspect() {
        let mut canvas = canvas();
        assert_eq!(canvas.resize(525.0), CanvasSize::fixed(525.0, 340.0));
    }

    proptest! {
        #[test]
        fn placements_grow_diagram_with_unique_ids(
            placements in prop::collection::vec((placeable(), position()), 0..40)
        ) {
            let mut canvas = canvas();
            for (ty, pos) in &placements {
                canvas.place_shape(*ty, *pos);
            }
            prop_assert_eq!(canvas.diagram().len(), placements.len());
            let ids: std::collections::HashSet<_> = canvas.diagram().iter().map(|s| s.id).collect();
            prop_assert_eq!(ids.len(), placements.len());
        }

        #[test]
        fn undo_restores_and_redo_reapplies(
            setup in prop::collection::vec((placeable(), position()), 0..10),
            ty in placeable(),
            pos in position(),
        ) {
            let mut canvas = canvas();
            for (t, p) in &setup {
                canvas.place_shape(*t, *p);
            }
            let before = canvas.export_snapshot();
            canvas.place_shape(ty, pos);
            let after = canvas.export_snapshot();

            prop_assert!(canvas.undo());
            prop_assert_eq!(canvas.export_snapshot(), before);
            prop_assert!(canvas.redo());
            prop_assert_eq!(canvas.export_snapshot(), after);
        }

        #[test]
        fn commit_after_undo_discards_redo(
            setup in prop::collection::vec((placeable(), position()), 1..10),
            undos in 1usize..5,
            pos in position(),
        ) {
            let mut canvas = canvas();
            for (t, p) in &setup {
                canvas.place_shape(*t, *p);
            }
            for _ in 0..undos {
                canvas.undo();
            }
            canvas.place_shape(ShapeType::Ball, pos);
            let current = canvas.export_snapshot();
            prop_assert!(!canvas.redo());
            prop_assert_eq!(canvas.export_snapshot(), current);
        }

        #[test]
        fn player_numbers_follow_the_maximum(positions in prop::collection::vec(position(), 1..12)) {
            let mut canvas = canvas();
            for (i, pos) in positions.iter().enumerate() {
                let id = canvas.place_shape(ShapeType::Player, *pos);
                let label = canvas.diagram().get(id).and_then(Shape::label).map(str::to_string);
                prop_assert_eq!(label, Some((i + 1).to_string()));
            }
        }

        #[test]
        fn later_shape_wins_overlap(pos in position(), first in placeable()) {
            let mut canvas = canvas();
            canvas.place_shape(first, pos);
            let top = canvas.place_shape(ShapeType::Player, pos);
            prop_assert_eq!(canvas.select_shape(pos), Some(top));
        }
    }
}
