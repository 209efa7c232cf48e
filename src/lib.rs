//! pitchboard - soccer drill diagrams on a pitch canvas.
//!
//! The library is the drawing engine: shapes, the diagram they form, linear
//! undo/redo, rendering through a [`render::Surface`], SVG export and drill
//! files. The `pitchboard` binary is a terminal front end over it.

pub mod config;
pub mod diagram;
pub mod engine;
pub mod file_io;
pub mod geometry;
pub mod history;
pub mod pitch;
pub mod render;
pub mod shapes;
pub mod svg_export;

pub use config::{CanvasConfig, CanvasSize, Settings, ShapeStyle};
pub use diagram::Diagram;
pub use engine::{CanvasState, DiagramCanvas, Tool};
pub use file_io::{Drill, DrillCategory};
pub use geometry::Point;
pub use history::History;
pub use pitch::PitchLayout;
pub use shapes::{LineStyle, Shape, ShapeColor, ShapeId, ShapeKind, ShapeType};
