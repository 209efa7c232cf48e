//! Drill files: a named drill record with its diagram, stored as JSON.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::diagram::Diagram;
use crate::pitch::PitchLayout;

/// Where in a session a drill is used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrillCategory {
    Warmup,
    #[default]
    Technical,
    Tactical,
    Physical,
    Cooldown,
}

impl DrillCategory {
    pub fn name(&self) -> &'static str {
        match self {
            DrillCategory::Warmup => "Warm-up",
            DrillCategory::Technical => "Technical",
            DrillCategory::Tactical => "Tactical",
            DrillCategory::Physical => "Physical",
            DrillCategory::Cooldown => "Cool-down",
        }
    }

    /// Cycle to the next category
    pub fn next(self) -> Self {
        match self {
            DrillCategory::Warmup => DrillCategory::Technical,
            DrillCategory::Technical => DrillCategory::Tactical,
            DrillCategory::Tactical => DrillCategory::Physical,
            DrillCategory::Physical => DrillCategory::Cooldown,
            DrillCategory::Cooldown => DrillCategory::Warmup,
        }
    }
}

/// A saved drill
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Drill {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: DrillCategory,
    #[serde(default)]
    pub pitch: PitchLayout,
    #[serde(default)]
    pub diagram: Diagram,
}

impl Drill {
    /// Drill record from a file name, used for bare diagrams
    pub fn untitled(path: &Path, diagram: Diagram) -> Self {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            diagram,
            ..Self::default()
        }
    }

    /// Check the record is fit to save
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("Please enter a drill name");
        }
        Ok(())
    }
}

/// Either a full drill record or a bare shape array
#[derive(Deserialize)]
#[serde(untagged)]
enum DrillFile {
    Drill(Drill),
    Diagram(Diagram),
}

/// Save a drill as pretty-printed JSON
pub fn save_drill(drill: &Drill, path: &Path) -> Result<()> {
    drill.validate()?;
    let content = serde_json::to_string_pretty(drill).context("serializing drill")?;
    fs::write(path, content).with_context(|| format!("Failed to save to {:?}", path))?;
    info!(path = %path.display(), name = %drill.name, shapes = drill.diagram.len(), "saved drill");
    Ok(())
}

/// Load a drill; a file holding only a shape array becomes an untitled drill
pub fn load_drill(path: &Path) -> Result<Drill> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read from {:?}", path))?;
    let parsed: DrillFile =
        serde_json::from_str(&content).with_context(|| format!("{:?} is not a drill file", path))?;

    let drill = match parsed {
        DrillFile::Drill(mut drill) => {
            // Re-check ids, the file may have been edited by hand
            drill.diagram = Diagram::from_shapes(drill.diagram.shapes().to_vec());
            drill
        }
        DrillFile::Diagram(diagram) => Drill::untitled(path, Diagram::from_shapes(diagram.shapes().to_vec())),
    };
    info!(path = %path.display(), name = %drill.name, shapes = drill.diagram.len(), "loaded drill");
    Ok(drill)
}
