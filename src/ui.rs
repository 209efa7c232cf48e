use pitchboard::config::CanvasSize;
use pitchboard::geometry::{arc_points, dash_segments, Bounds, Point};
use pitchboard::render::{self, Stroke, Surface, TextAlign};
use pitchboard::{ShapeColor, ShapeType, Tool};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine},
        Block, Borders, Clear, Paragraph,
    },
    Frame,
};

use crate::app::{color_name, App, Mode};

/// Segments used to approximate one full turn of an arc
const ARC_STEPS_PER_TURN: f64 = 48.0;

/// Render the entire UI
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Canvas area
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Help bar
        ])
        .split(frame.area());

    let canvas_area = chunks[0];
    render_drawing(frame, app, canvas_area);
    render_status_bar(frame, app, chunks[1]);
    render_help_bar(frame, app, chunks[2]);

    // Render input overlay if in input mode
    match &app.mode {
        Mode::TextInput { pos, text } => render_text_cursor(frame, app, *pos, text, canvas_area),
        Mode::LabelInput { text, .. } => render_input_popup(frame, "Label:", text, canvas_area),
        Mode::FieldInput { field, text } => render_input_popup(frame, field.title(), text, canvas_area),
        Mode::FileSave { path } => render_input_popup(frame, "Save drill as:", path, canvas_area),
        Mode::FileOpen { path } => render_input_popup(frame, "Open drill:", path, canvas_area),
        Mode::SvgExport { path } => render_input_popup(frame, "Export SVG:", path, canvas_area),
        Mode::Normal => {}
    }
}

/// Paint the pitch and the diagram with braille dots
fn render_drawing(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.canvas.view();
    let size = view.size;
    let widget = Canvas::default()
        .marker(Marker::Braille)
        .background_color(ShapeColor::Grass.to_ratatui())
        .x_bounds([0.0, size.width])
        .y_bounds([0.0, size.height])
        .paint(|ctx| {
            let mut surface = TermSurface::new(ctx, size, area);
            render::render_canvas(&mut surface, &view);
        });
    frame.render_widget(widget, area);
}

/// [`Surface`] over a ratatui canvas context
///
/// The canvas y axis points up, so every y is flipped. A fill covering the
/// whole canvas is the widget background and is skipped.
struct TermSurface<'a, 'b> {
    ctx: &'a mut Context<'b>,
    size: CanvasSize,
    /// Canvas pixels per braille dot, horizontally and vertically
    dot: (f64, f64),
}

impl<'a, 'b> TermSurface<'a, 'b> {
    fn new(ctx: &'a mut Context<'b>, size: CanvasSize, area: Rect) -> Self {
        let dot = (
            size.width / f64::from(area.width.max(1) * 2),
            size.height / f64::from(area.height.max(1) * 4),
        );
        Self { ctx, size, dot }
    }

    fn flip(&self, y: f64) -> f64 {
        self.size.height - y
    }

    fn segment(&mut self, from: Point, to: Point, color: ShapeColor) {
        let line = CanvasLine::new(from.x, self.flip(from.y), to.x, self.flip(to.y), color.to_ratatui());
        self.ctx.draw(&line);
    }

    /// Even-odd scanline fill, one scanline per dot row
    fn fill_polygon(&mut self, points: &[Point], color: ShapeColor) {
        let Some(bounds) = Bounds::from_points(points) else {
            return;
        };
        let step = self.dot.1.max(f64::EPSILON);
        let mut y = bounds.min_y + step / 2.0;
        while y < bounds.max_y {
            let mut crossings: Vec<f64> = points
                .iter()
                .zip(points.iter().cycle().skip(1))
                .filter(|(a, b)| (a.y <= y) != (b.y <= y))
                .map(|(a, b)| a.x + (y - a.y) / (b.y - a.y) * (b.x - a.x))
                .collect();
            crossings.sort_by(f64::total_cmp);
            for pair in crossings.chunks_exact(2) {
                self.segment(Point::new(pair[0], y), Point::new(pair[1], y), color);
            }
            y += step;
        }
    }
}

impl Surface for TermSurface<'_, '_> {
    fn clear(&mut self, _size: CanvasSize) {}

    fn fill_rect(&mut self, bounds: Bounds, color: ShapeColor) {
        let covers = bounds.min_x <= 0.0
            && bounds.min_y <= 0.0
            && bounds.max_x >= self.size.width
            && bounds.max_y >= self.size.height;
        if !covers {
            self.fill_polygon(&bounds.corners(), color);
        }
    }

    fn stroke_rect(&mut self, bounds: Bounds, stroke: &Stroke) {
        let [a, b, c, d] = bounds.corners();
        self.polyline(&[a, b, c, d, a], stroke);
    }

    fn line(&mut self, from: Point, to: Point, stroke: &Stroke) {
        for (a, b) in dash_segments(from, to, stroke.dash.dash_pattern()) {
            self.segment(a, b, stroke.color);
        }
    }

    fn polyline(&mut self, points: &[Point], stroke: &Stroke) {
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], stroke);
        }
    }

    fn polygon(&mut self, points: &[Point], fill: Option<ShapeColor>, stroke: Option<&Stroke>) {
        if let Some(color) = fill {
            self.fill_polygon(points, color);
        }
        if let (Some(stroke), Some(first)) = (stroke, points.first()) {
            let mut closed = points.to_vec();
            closed.push(*first);
            self.polyline(&closed, stroke);
        }
    }

    fn circle(&mut self, center: Point, radius: f64, fill: Option<ShapeColor>, stroke: Option<&Stroke>) {
        let y = self.flip(center.y);
        if let Some(color) = fill {
            let step = self.dot.0.min(self.dot.1).max(f64::EPSILON);
            let mut r = radius;
            while r > 0.0 {
                self.ctx.draw(&Circle { x: center.x, y, radius: r, color: color.to_ratatui() });
                r -= step;
            }
        }
        if let Some(stroke) = stroke {
            self.ctx.draw(&Circle { x: center.x, y, radius, color: stroke.color.to_ratatui() });
        }
    }

    fn arc(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64, stroke: &Stroke) {
        let turns = (end_angle - start_angle).abs() / std::f64::consts::TAU;
        let steps = (turns * ARC_STEPS_PER_TURN).ceil().max(2.0) as usize;
        let points = arc_points(center, radius, start_angle, end_angle, steps);
        self.polyline(&points, stroke);
    }

    fn text(&mut self, anchor: Point, text: &str, _font_size: f64, color: ShapeColor, align: TextAlign) {
        // One terminal cell is 2 x 4 dots
        let cell_width = self.dot.0 * 2.0;
        let x = match align {
            TextAlign::TopLeft => anchor.x,
            TextAlign::Center => anchor.x - text.chars().count() as f64 * cell_width / 2.0,
        };
        let style = Style::default().fg(color.to_ratatui()).add_modifier(Modifier::BOLD);
        let y = self.flip(anchor.y);
        self.ctx.print(x, y, Span::styled(text.to_string(), style));
    }

    fn end_shape(&mut self) {
        // Keep each shape's colours on its own layer
        self.ctx.layer();
    }
}

/// Render the status bar (Helix-style with mode indicator)
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let tool = app.canvas.tool();
    let (mode_name, mode_bg) = match &app.mode {
        Mode::Normal => match tool {
            Tool::Select => ("SEL", Color::Blue),
            Tool::Shape(ShapeType::Text) => ("TXT", Color::Green),
            Tool::Shape(_) => ("DRAW", Color::Yellow),
        },
        Mode::TextInput { .. } | Mode::LabelInput { .. } | Mode::FieldInput { .. } => ("INS", Color::Green),
        Mode::FileSave { .. } | Mode::FileOpen { .. } | Mode::SvgExport { .. } => ("CMD", Color::Magenta),
    };

    let mode_style = Style::default()
        .fg(Color::Black)
        .bg(mode_bg)
        .add_modifier(Modifier::BOLD);

    let tool_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);

    let drill_name = if app.drill.name.is_empty() {
        "[untitled]".to_string()
    } else {
        app.drill.name.clone()
    };
    let dirty_marker = if app.is_dirty() { " *" } else { "" };

    let style = app.canvas.style();
    let style_info = match tool {
        Tool::Shape(ShapeType::Line | ShapeType::Arrow) => {
            format!(" {} {}", style.line_style.name(), color_name(style.color))
        }
        Tool::Shape(ShapeType::Player) => format!(" size:{} {}", style.player_size, color_name(style.color)),
        Tool::Shape(_) => format!(" {}", color_name(style.color)),
        Tool::Select => String::new(),
    };

    let pointer = app
        .pointer
        .map(|p| format!(" ({:.0},{:.0})", p.x, p.y))
        .unwrap_or_default();

    let status_text = app
        .status_message
        .as_ref()
        .map(|m| format!(" {}", m))
        .unwrap_or_default();

    // Tool info (only show if not in Select mode)
    let tool_info = if tool != Tool::Select {
        format!(" {}", tool.name().to_lowercase())
    } else {
        String::new()
    };

    let spans = vec![
        Span::styled(format!(" {} ", mode_name), mode_style),
        Span::styled(tool_info, tool_style),
        Span::raw(format!(
            " {}{} [{} | {}]{}{}{}",
            drill_name,
            dirty_marker,
            app.drill.category.name(),
            app.canvas.pitch().name(),
            style_info,
            pointer,
            status_text
        )),
    ];

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}

/// Render the help bar
fn render_help_bar(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = match &app.mode {
        Mode::Normal => match app.canvas.tool() {
            Tool::Select => {
                "[p]layer [b]all [c]one [a]rrow [d]raw | [Del] [y]dup [u]ndo U:redo | [n]ame ^S save E svg [q]uit"
            }
            Tool::Shape(ShapeType::Line | ShapeType::Arrow) => {
                "click start, click end | [v] style [C] color [+/-] width | [s] select [Esc] cancel"
            }
            Tool::Shape(ty) if ty.is_path() => {
                "drag to draw | [C] color [+/-] width | [s] select [Esc] cancel"
            }
            Tool::Shape(ShapeType::Player) => {
                "click to place | [C] color [ [ ] ] size | [s] select [Esc] cancel"
            }
            Tool::Shape(_) => "click to place | [C] color | [s] select [Esc] cancel",
        },
        Mode::TextInput { .. } | Mode::LabelInput { .. } | Mode::FieldInput { .. } => {
            "type text | [Enter] confirm [Esc] cancel [Backspace] delete"
        }
        Mode::FileSave { .. } | Mode::FileOpen { .. } | Mode::SvgExport { .. } => {
            "type path | [Enter] confirm [Esc] cancel"
        }
    };

    let paragraph = Paragraph::new(help_text).style(Style::default().fg(Color::DarkGray));

    frame.render_widget(paragraph, area);
}

/// Render text being typed at its canvas position
fn render_text_cursor(frame: &mut Frame, app: &App, pos: Point, text: &str, area: Rect) {
    let Some((screen_x, screen_y)) = app.viewport.canvas_to_screen(pos, app.canvas.size()) else {
        return;
    };
    if screen_y >= area.height {
        return;
    }
    let style = Style::default().fg(Color::Yellow);
    let y = area.y + screen_y;
    for (i, ch) in text.chars().chain(std::iter::once('▏')).enumerate() {
        let x = area.x + screen_x + i as u16;
        if x >= area.x + area.width {
            break;
        }
        let cell_style = if ch == '▏' { style.add_modifier(Modifier::SLOW_BLINK) } else { style };
        frame.buffer_mut()[(x, y)].set_char(ch).set_style(cell_style);
    }
}

/// Render a one-line input overlay
fn render_input_popup(frame: &mut Frame, label: &str, value: &str, area: Rect) {
    let width = 50.min(area.width.saturating_sub(4));
    let height = 3;
    let x = (area.width.saturating_sub(width)) / 2 + area.x;
    let y = (area.height.saturating_sub(height)) / 2 + area.y;

    let popup_area = Rect::new(x, y, width, height);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(label)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(format!("{}▏", value))
        .block(block)
        .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(paragraph, popup_area);
}
