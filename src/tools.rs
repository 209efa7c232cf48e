use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use pitchboard::{ShapeType, Tool};

use crate::app::App;

/// Route a mouse event to the drawing engine
///
/// Presses below the canvas (status and help rows) are ignored. Drags and
/// releases there are pinned to the bottom canvas row so a gesture always
/// ends.
pub fn handle_mouse_event(app: &mut App, event: MouseEvent) {
    let last_row = app.viewport.height.saturating_sub(1);
    if event.row > last_row && matches!(event.kind, MouseEventKind::Down(_)) {
        return;
    }
    let pos = app.canvas_point(event.column, event.row.min(last_row));
    app.pointer = Some(pos);

    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            // Text is typed before it is placed
            if app.canvas.tool() == Tool::Shape(ShapeType::Text) {
                app.start_text_input(pos);
            } else {
                app.canvas.pointer_down(pos);
                if app.canvas.selected().is_some() && app.canvas.tool() == Tool::Select {
                    app.set_status("Selected shape - drag to move, [Del] to delete, [Enter] to relabel");
                }
            }
        }
        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
            app.canvas.pointer_move(pos);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.canvas.pointer_up(pos);
        }
        MouseEventKind::Down(MouseButton::Right) => {
            // Cancel shape on right click
            app.canvas.cancel();
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;
    use pitchboard::file_io::Drill;
    use pitchboard::{CanvasState, Settings};

    use super::*;

    fn app() -> App {
        App::new(100, 40, Settings::default(), Drill::default())
    }

    fn mouse(app: &mut App, kind: MouseEventKind, column: u16, row: u16) {
        handle_mouse_event(app, MouseEvent { kind, column, row, modifiers: KeyModifiers::NONE });
    }

    #[test]
    fn release_below_canvas_ends_the_drag() {
        let mut app = app();
        let start = app.canvas_point(10, 10);
        app.canvas.place_shape(ShapeType::Cone, start);

        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 10, 10);
        mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 20, 39);
        // Help bar row
        mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 20, 41);

        assert_eq!(app.canvas.state(), CanvasState::Idle);
        assert_eq!(app.canvas.diagram().shapes()[0].origin, app.canvas_point(20, 39));
        assert_eq!(app.canvas.history().len(), 2);

        // Hovering afterwards moves nothing
        mouse(&mut app, MouseEventKind::Moved, 50, 5);
        assert_eq!(app.canvas.diagram().shapes()[0].origin, app.canvas_point(20, 39));
    }

    #[test]
    fn freehand_released_on_status_bar_is_committed() {
        let mut app = app();
        app.set_tool(Tool::Shape(ShapeType::Freehand));
        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 5, 30);
        mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 8, 38);
        mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 9, 40);

        assert_eq!(app.canvas.state(), CanvasState::Idle);
        assert_eq!(app.canvas.diagram().len(), 1);
    }

    #[test]
    fn press_on_status_bar_places_nothing() {
        let mut app = app();
        app.set_tool(Tool::Shape(ShapeType::Cone));
        mouse(&mut app, MouseEventKind::Down(MouseButton::Left), 10, 40);
        assert!(app.canvas.diagram().is_empty());
        assert_eq!(app.pointer, None);
    }
}
