//! End-to-end drill sessions against the public API.

use std::cell::RefCell;
use std::rc::Rc;

use pitchboard::file_io::{load_drill, save_drill};
use pitchboard::svg_export::export_svg;
use pitchboard::{
    CanvasConfig, CanvasState, Diagram, DiagramCanvas, Drill, DrillCategory, PitchLayout, Point,
    ShapeKind, ShapeType, Tool,
};

fn rondo_canvas() -> DiagramCanvas {
    let mut canvas = DiagramCanvas::new(CanvasConfig::default().with_pitch(PitchLayout::Half));
    for (x, y) in [(200.0, 200.0), (400.0, 200.0), (400.0, 400.0), (200.0, 400.0)] {
        canvas.place_shape(ShapeType::Cone, Point::new(x, y));
    }
    canvas.set_tool(Tool::Shape(ShapeType::Player));
    canvas.pointer_down(Point::new(300.0, 220.0));
    canvas.pointer_down(Point::new(300.0, 380.0));
    canvas.set_tool(Tool::Shape(ShapeType::Arrow));
    canvas.pointer_down(Point::new(300.0, 230.0));
    canvas.pointer_move(Point::new(300.0, 300.0));
    canvas.pointer_down(Point::new(300.0, 370.0));
    canvas
}

#[test]
fn building_a_rondo_then_undoing_it_all() {
    let mut canvas = rondo_canvas();
    assert_eq!(canvas.diagram().len(), 7);
    assert_eq!(canvas.history().len(), 7);
    assert_eq!(canvas.state(), CanvasState::Idle);

    let labels: Vec<_> = canvas.diagram().iter().filter_map(|s| s.label()).collect();
    assert_eq!(labels, vec!["1", "2"]);

    while canvas.undo() {}
    assert!(canvas.diagram().is_empty());
    assert!(canvas.can_redo());

    for _ in 0..7 {
        assert!(canvas.redo());
    }
    assert_eq!(canvas.diagram().len(), 7);
    assert!(!canvas.redo());
}

#[test]
fn dragging_a_cone_then_undo_puts_it_back() {
    let mut canvas = rondo_canvas();
    canvas.pointer_down(Point::new(200.0, 200.0));
    canvas.pointer_move(Point::new(210.0, 210.0));
    canvas.pointer_move(Point::new(240.0, 180.0));
    canvas.pointer_up(Point::new(250.0, 180.0));

    let moved = canvas.diagram().shapes()[0].origin;
    assert_eq!(moved, Point::new(250.0, 180.0));
    assert_eq!(canvas.history().len(), 8);

    assert!(canvas.undo());
    assert_eq!(canvas.diagram().shapes()[0].origin, Point::new(200.0, 200.0));
    assert_eq!(canvas.selected(), None);
}

#[test]
fn deleting_the_first_player_keeps_the_second_label() {
    let mut canvas = DiagramCanvas::default();
    let first = canvas.place_shape(ShapeType::Player, Point::new(100.0, 100.0));
    canvas.place_shape(ShapeType::Player, Point::new(300.0, 100.0));

    canvas.select_id(Some(first));
    canvas.delete_selected();

    let labels: Vec<_> = canvas.diagram().iter().filter_map(|s| s.label()).collect();
    assert_eq!(labels, vec!["2"]);

    // Numbering continues after the highest remaining number
    canvas.place_shape(ShapeType::Player, Point::new(500.0, 100.0));
    assert_eq!(canvas.diagram().shapes()[1].label(), Some("3"));
}

#[test]
fn saved_drill_reopens_with_fresh_history() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("rondo.json");

    let saves = Rc::new(RefCell::new(Vec::<Diagram>::new()));
    let sink = Rc::clone(&saves);
    let mut canvas = rondo_canvas().with_save_callback(move |d| sink.borrow_mut().push(d.clone()));
    canvas.select_id(canvas.diagram().shapes().first().map(|s| s.id));

    let drill = Drill {
        name: "Rondo 4v2".to_string(),
        description: "Keep the ball, two touches".to_string(),
        category: DrillCategory::Warmup,
        pitch: canvas.pitch(),
        diagram: canvas.save(),
    };
    save_drill(&drill, &path).expect("save");
    assert_eq!(saves.borrow().len(), 1);

    let loaded = load_drill(&path).expect("load");
    assert_eq!(loaded, drill);
    assert!(loaded.diagram.iter().all(|s| !s.selected));

    let reopened = DiagramCanvas::new(
        CanvasConfig::default()
            .with_initial(loaded.diagram.clone())
            .with_pitch(loaded.pitch),
    );
    assert_eq!(reopened.diagram(), &loaded.diagram);
    assert_eq!(reopened.pitch(), PitchLayout::Half);
    assert!(!reopened.can_undo());

    let arrow = loaded
        .diagram
        .iter()
        .find(|s| s.shape_type() == ShapeType::Arrow)
        .expect("arrow saved");
    assert!(matches!(arrow.kind, ShapeKind::Arrow { end, .. } if end == Point::new(300.0, 370.0)));
}

#[test]
fn svg_export_has_one_group_per_visible_shape() {
    let mut canvas = rondo_canvas();
    canvas.select_id(canvas.diagram().shapes().first().map(|s| s.id));
    canvas.set_tool(Tool::Shape(ShapeType::Line));
    canvas.pointer_down(Point::new(10.0, 10.0));
    canvas.pointer_move(Point::new(50.0, 50.0));

    let svg = export_svg(&canvas.view());
    assert!(svg.starts_with("<?xml"));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert_eq!(svg.matches("<g id=\"shape-").count(), 7);
    assert_eq!(svg.matches("class=\"cone\"").count(), 4);
    assert_eq!(svg.matches("class=\"player\"").count(), 2);
    // Neither the selection box nor the pending line is exported
    assert!(!svg.contains("#ffeb3b") && !svg.contains("yellow"));
}
