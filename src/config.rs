//! Canvas construction options and the persisted user settings.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::diagram::Diagram;
use crate::history::DEFAULT_MAX_HISTORY;
use crate::pitch::PitchLayout;
use crate::shapes::{LineStyle, ShapeColor, DEFAULT_PLAYER_SIZE};

/// Height over width of a regulation 105 x 68 pitch
pub const PITCH_ASPECT: f64 = 68.0 / 105.0;

/// Width used when nothing else is configured
pub const DEFAULT_CANVAS_WIDTH: f64 = 960.0;

/// Pixel dimensions of the drawing surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    /// Responsive size: height follows width at the pitch aspect ratio
    pub fn from_width(width: f64) -> Self {
        let width = width.max(1.0);
        Self {
            width,
            height: (width * PITCH_ASPECT).round().max(1.0),
        }
    }

    pub fn fixed(width: f64, height: f64) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::from_width(DEFAULT_CANVAS_WIDTH)
    }
}

/// Style applied to newly created shapes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeStyle {
    /// `None` picks a per-kind color (blue players, orange cones, ...)
    pub color: Option<ShapeColor>,
    pub stroke_width: f64,
    pub line_style: LineStyle,
    pub player_size: f64,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            color: None,
            stroke_width: 2.0,
            line_style: LineStyle::Solid,
            player_size: DEFAULT_PLAYER_SIZE,
        }
    }
}

/// Everything a caller supplies when opening a canvas
#[derive(Debug, Clone)]
pub struct CanvasConfig {
    pub width: f64,
    /// Fixed height; `None` keeps the pitch aspect ratio
    pub height: Option<f64>,
    pub pitch: PitchLayout,
    pub initial: Diagram,
    pub max_history: usize,
    pub style: ShapeStyle,
}

impl CanvasConfig {
    pub fn size(&self) -> CanvasSize {
        match self.height {
            Some(height) => CanvasSize::fixed(self.width, height),
            None => CanvasSize::from_width(self.width),
        }
    }

    pub fn with_initial(mut self, initial: Diagram) -> Self {
        self.initial = initial;
        self
    }

    pub fn with_pitch(mut self, pitch: PitchLayout) -> Self {
        self.pitch = pitch;
        self
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: None,
            pitch: PitchLayout::Full,
            initial: Diagram::new(),
            max_history: DEFAULT_MAX_HISTORY,
            style: ShapeStyle::default(),
        }
    }
}

/// User settings persisted as JSON in the config directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub pitch: PitchLayout,
    pub canvas_width: f64,
    pub max_history: usize,
    pub style: ShapeStyle,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pitch: PitchLayout::Full,
            canvas_width: DEFAULT_CANVAS_WIDTH,
            max_history: DEFAULT_MAX_HISTORY,
            style: ShapeStyle::default(),
        }
    }
}

impl Settings {
    /// Load settings from the config directory, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`; a missing or unreadable file yields defaults
    pub fn load_from(path: &std::path::Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|content| serde_json::from_str(&content).map_err(anyhow::Error::from))
        {
            Ok(settings) => {
                debug!(path = %path.display(), "loaded settings");
                settings
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring invalid settings file");
                Self::default()
            }
        }
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".config")
            });
        config_dir.join("pitchboard").join("settings.json")
    }

    /// Save settings to `path`
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config directory {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("writing settings to {}", path.display()))?;
        Ok(())
    }

    /// Canvas options for a diagram opened with these settings
    pub fn canvas_config(&self, initial: Diagram) -> CanvasConfig {
        CanvasConfig {
            width: self.canvas_width,
            height: None,
            pitch: self.pitch,
            initial,
            max_history: self.max_history,
            style: self.style,
        }
    }
}
