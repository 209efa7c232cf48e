use std::path::PathBuf;

use pitchboard::config::CanvasSize;
use pitchboard::file_io::{self, Drill};
use pitchboard::svg_export;
use pitchboard::{DiagramCanvas, Diagram, Point, Settings, ShapeColor, ShapeId, ShapeType, Tool};
use tracing::{debug, warn};

/// Shape tools in palette order, with their keys
pub const TOOL_KEYS: [(char, ShapeType); 14] = [
    ('p', ShapeType::Player),
    ('b', ShapeType::Ball),
    ('c', ShapeType::Cone),
    ('f', ShapeType::Flag),
    ('g', ShapeType::Goal),
    ('a', ShapeType::Arrow),
    ('l', ShapeType::Line),
    ('d', ShapeType::Freehand),
    ('w', ShapeType::Curve),
    ('r', ShapeType::Rectangle),
    ('e', ShapeType::Circle),
    ('i', ShapeType::Triangle),
    ('m', ShapeType::Diamond),
    ('t', ShapeType::Text),
];

/// Drill fields edited from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrillField {
    Name,
    Description,
}

impl DrillField {
    pub fn title(&self) -> &'static str {
        match self {
            DrillField::Name => "Drill name:",
            DrillField::Description => "Description:",
        }
    }
}

/// Application mode
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Normal,
    TextInput { pos: Point, text: String },
    LabelInput { shape_id: ShapeId, text: String },
    FieldInput { field: DrillField, text: String },
    FileSave { path: String },
    FileOpen { path: String },
    SvgExport { path: String },
}

/// Maps terminal cells of the canvas area onto canvas pixels
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Centre of the cell at (column, row), in canvas pixels
    pub fn screen_to_canvas(&self, column: u16, row: u16, size: CanvasSize) -> Point {
        let w = f64::from(self.width.max(1));
        let h = f64::from(self.height.max(1));
        Point::new(
            (f64::from(column) + 0.5) * size.width / w,
            (f64::from(row) + 0.5) * size.height / h,
        )
    }

    /// Cell containing a canvas point, if it is on screen
    pub fn canvas_to_screen(&self, p: Point, size: CanvasSize) -> Option<(u16, u16)> {
        let col = (p.x / size.width * f64::from(self.width)).floor();
        let row = (p.y / size.height * f64::from(self.height)).floor();
        if col >= 0.0 && row >= 0.0 && col < f64::from(self.width) && row < f64::from(self.height) {
            Some((col as u16, row as u16))
        } else {
            None
        }
    }

    /// Resize the viewport
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }
}

/// Main application state
pub struct App {
    pub canvas: DiagramCanvas,
    /// Drill metadata; the diagram lives in the canvas until saved
    pub drill: Drill,
    pub viewport: Viewport,
    pub mode: Mode,
    pub running: bool,
    pub file_path: Option<PathBuf>,
    pub status_message: Option<String>,
    pub settings: Settings,
    /// Last pointer position over the canvas
    pub pointer: Option<Point>,
    saved: Diagram,
}

impl App {
    pub fn new(width: u16, height: u16, settings: Settings, drill: Drill) -> Self {
        let config = settings.canvas_config(drill.diagram.clone()).with_pitch(drill.pitch);
        let canvas = DiagramCanvas::new(config);
        let saved = canvas.export_snapshot();
        Self {
            canvas,
            drill,
            viewport: Viewport::new(width, height),
            mode: Mode::Normal,
            running: true,
            file_path: None,
            status_message: None,
            settings,
            pointer: None,
            saved,
        }
    }

    /// Check if the diagram changed since the last save or load
    pub fn is_dirty(&self) -> bool {
        self.canvas.export_snapshot() != self.saved
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Fit the viewport to a resized terminal
    ///
    /// Shapes are stored in canvas pixels, so the canvas keeps its pixel
    /// width and only its height is recomputed from the pitch aspect. The
    /// next frame stretches it over the new cell grid.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport.resize(width, height);
        let size = self.canvas.resize(self.canvas.size().width);
        debug!(columns = width, rows = height, width = size.width, height = size.height, "terminal resized");
    }

    pub fn canvas_point(&self, column: u16, row: u16) -> Point {
        self.viewport.screen_to_canvas(column, row, self.canvas.size())
    }

    pub fn set_tool(&mut self, tool: Tool) {
        match tool {
            Tool::Shape(ty) if ty.is_path() => self.set_status("Drag to draw"),
            Tool::Shape(ShapeType::Line | ShapeType::Arrow) => self.set_status("Click start, then click end"),
            Tool::Shape(ShapeType::Text) => self.set_status("Click to place text"),
            Tool::Shape(ty) => self.set_status(format!("Click to place {}", ty.name().to_lowercase())),
            Tool::Select => {}
        }
        self.canvas.set_tool(tool);
    }

    pub fn undo(&mut self) {
        if self.canvas.undo() {
            self.set_status("Undo");
        } else {
            self.set_status("Nothing to undo");
        }
    }

    pub fn redo(&mut self) {
        if self.canvas.redo() {
            self.set_status("Redo");
        } else {
            self.set_status("Nothing to redo");
        }
    }

    pub fn delete_selected(&mut self) {
        if self.canvas.selected().is_some() {
            self.canvas.delete_selected();
            self.set_status("Deleted shape");
        }
    }

    pub fn duplicate_selected(&mut self) {
        if self.canvas.duplicate_selected().is_some() {
            self.set_status("Duplicated shape");
        }
    }

    /// Cycle the colour for new shapes; "auto" uses per-kind colours
    pub fn cycle_color(&mut self) {
        let next = match self.canvas.style().color {
            None => Some(ShapeColor::White),
            Some(ShapeColor::Black) => None,
            Some(color) => Some(color.next()),
        };
        self.canvas.set_color(next);
        self.set_status(format!("Color: {}", color_name(next)));
    }

    pub fn cycle_line_style(&mut self) {
        let next = self.canvas.style().line_style.next();
        self.canvas.set_line_style(next);
        self.set_status(format!("Line style: {}", next.name()));
    }

    pub fn adjust_stroke_width(&mut self, delta: f64) {
        let width = (self.canvas.style().stroke_width + delta).clamp(1.0, 12.0);
        self.canvas.set_stroke_width(width);
        self.set_status(format!("Stroke width: {width}"));
    }

    pub fn adjust_player_size(&mut self, delta: f64) {
        let size = (self.canvas.style().player_size + delta).clamp(6.0, 30.0);
        self.canvas.set_player_size(size);
        self.set_status(format!("Player size: {size}"));
    }

    pub fn cycle_pitch(&mut self) {
        let next = self.canvas.pitch().next();
        self.canvas.set_pitch(next);
        self.drill.pitch = next;
        self.set_status(next.name());
    }

    pub fn cycle_category(&mut self) {
        self.drill.category = self.drill.category.next();
        self.set_status(format!("Category: {}", self.drill.category.name()));
    }

    pub fn new_diagram(&mut self) {
        self.canvas.clear();
        self.set_status("Cleared (u to undo)");
    }

    // --- Text and label input ---

    pub fn start_text_input(&mut self, pos: Point) {
        self.mode = Mode::TextInput { pos, text: String::new() };
    }

    /// Place typed text, if any
    pub fn commit_text(&mut self) {
        if let Mode::TextInput { pos, text } = &self.mode {
            if !text.is_empty() {
                let (pos, text) = (*pos, text.clone());
                self.canvas.place_text(pos, text);
            }
        }
        self.mode = Mode::Normal;
    }

    /// Start editing the label of the selected player or text
    pub fn start_label_input(&mut self) -> bool {
        let Some(shape) = self.canvas.selected_shape() else {
            return false;
        };
        let Some(label) = shape.label() else {
            return false;
        };
        self.mode = Mode::LabelInput { shape_id: shape.id, text: label.to_string() };
        true
    }

    pub fn commit_label(&mut self) {
        if let Mode::LabelInput { shape_id, text } = &self.mode {
            let text = text.clone();
            if self.canvas.selected() == Some(*shape_id) {
                self.canvas.relabel_selected(&text);
            }
        }
        self.mode = Mode::Normal;
    }

    pub fn start_field_input(&mut self, field: DrillField) {
        let text = match field {
            DrillField::Name => self.drill.name.clone(),
            DrillField::Description => self.drill.description.clone(),
        };
        self.mode = Mode::FieldInput { field, text };
    }

    pub fn commit_field(&mut self) {
        if let Mode::FieldInput { field, text } = &self.mode {
            match field {
                DrillField::Name => self.drill.name = text.trim().to_string(),
                DrillField::Description => self.drill.description = text.clone(),
            }
        }
        self.mode = Mode::Normal;
    }

    /// Append a typed character to whatever input is open
    pub fn add_input_char(&mut self, ch: char) {
        match &mut self.mode {
            Mode::TextInput { text, .. }
            | Mode::LabelInput { text, .. }
            | Mode::FieldInput { text, .. } => text.push(ch),
            Mode::FileSave { path } | Mode::FileOpen { path } | Mode::SvgExport { path } => path.push(ch),
            Mode::Normal => {}
        }
    }

    pub fn backspace_input(&mut self) {
        match &mut self.mode {
            Mode::TextInput { text, .. }
            | Mode::LabelInput { text, .. }
            | Mode::FieldInput { text, .. } => {
                text.pop();
            }
            Mode::FileSave { path } | Mode::FileOpen { path } | Mode::SvgExport { path } => {
                path.pop();
            }
            Mode::Normal => {}
        }
    }

    // --- Files ---

    pub fn start_save(&mut self) {
        let path = self
            .file_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| default_file_name(&self.drill.name, "json"));
        self.mode = Mode::FileSave { path };
    }

    pub fn start_open(&mut self) {
        self.mode = Mode::FileOpen { path: String::new() };
    }

    pub fn start_svg_export(&mut self) {
        let stem = self
            .file_path
            .as_ref()
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.drill.name.clone());
        self.mode = Mode::SvgExport { path: default_file_name(&stem, "svg") };
    }

    /// Save the drill to `path`, reporting the outcome in the status bar
    pub fn save_to(&mut self, path: PathBuf) {
        let mut drill = self.drill.clone();
        drill.pitch = self.canvas.pitch();
        drill.diagram = self.canvas.export_snapshot();
        match file_io::save_drill(&drill, &path) {
            Ok(()) => {
                self.saved = self.canvas.save();
                self.drill = drill;
                self.file_path = Some(path);
                self.set_status("Saved!");
            }
            Err(e) => {
                warn!(error = %e, "save failed");
                self.set_status(format!("Error: {}", e));
            }
        }
    }

    /// Replace the canvas with a drill loaded from `path`
    pub fn open(&mut self, path: PathBuf) {
        match file_io::load_drill(&path) {
            Ok(drill) => {
                self.load(drill);
                self.file_path = Some(path);
                self.set_status("Loaded!");
            }
            Err(e) => {
                warn!(error = %e, "open failed");
                self.set_status(format!("Error: {}", e));
            }
        }
    }

    /// Start editing `drill` with fresh history
    pub fn load(&mut self, drill: Drill) {
        let size = self.canvas.size();
        let config = self
            .settings
            .canvas_config(drill.diagram.clone())
            .with_pitch(drill.pitch);
        let mut canvas = DiagramCanvas::new(config);
        canvas.resize(size.width);
        self.saved = canvas.export_snapshot();
        self.canvas = canvas;
        self.drill = drill;
    }

    pub fn export_svg(&mut self, path: PathBuf) {
        match svg_export::save_svg(&self.canvas.view(), &path) {
            Ok(()) => self.set_status(format!("Exported to {}", path.display())),
            Err(e) => {
                warn!(error = %e, "SVG export failed");
                self.set_status(format!("Error: {}", e));
            }
        }
    }
}

pub fn color_name(color: Option<ShapeColor>) -> &'static str {
    color.map_or("Auto", ShapeColor::name)
}

/// File name from a drill name: lowercase, spaces to dashes
fn default_file_name(name: &str, extension: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let stem = stem.trim_matches('-');
    if stem.is_empty() {
        format!("drill.{extension}")
    } else {
        format!("{stem}.{extension}")
    }
}
