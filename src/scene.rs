//! Scene files
//!
//! A scene is a TOML document describing a surface, text printed on it and
//! effects bound to its cells:
//!
//! ```toml
//! [surface]
//! width = 20
//! height = 3
//!
//! [runner]
//! frames = 30
//!
//! [[print]]
//! x = 0
//! y = 0
//! text = "[c:r f:red]Hello[c:u] world"
//!
//! [[effect]]
//! kind = "blink"
//! area = { x = 0, y = 0, width = 5, height = 1 }
//! state = { speed = 0.25 }
//! ```
//!
//! Print text goes through the format parser against the surface, effects
//! are decoded through an `EffectRegistry`.

use std::fs;
use std::path::Path;

use glyphgrid_core::{
    CellSurface, EffectRegistry, Point, Rect, SerializedEffect, Sharing, Snapshot,
};
use glyphgrid_format::Parser;
use serde::{Deserialize, Serialize};

use crate::config::{OutputFormat, RunnerConfig, SurfaceConfig};
use crate::error::{Error, Result};

/// Text printed through the format parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintEntry {
    pub x: usize,
    pub y: usize,
    pub text: String,
}

/// An effect and the cells it is bound to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectEntry {
    pub kind: String,
    #[serde(default)]
    pub sharing: Sharing,
    #[serde(default)]
    pub state: serde_json::Value,
    #[serde(default)]
    pub positions: Vec<Point>,
    #[serde(default)]
    pub area: Option<Rect>,
}

impl EffectEntry {
    pub fn serialized(&self) -> SerializedEffect {
        SerializedEffect {
            kind: self.kind.clone(),
            sharing: self.sharing,
            state: self.state.clone(),
        }
    }

    /// Flat indices of every listed position and area cell
    fn indices(&self, surface: &CellSurface) -> Result<Vec<usize>> {
        let mut indices = Vec::with_capacity(self.positions.len());
        for point in &self.positions {
            indices.push(surface.index_of(point.x, point.y)?);
        }
        if let Some(area) = self.area {
            if !surface.area().contains_rect(&area) {
                return Err(glyphgrid_core::Error::InvalidRegion {
                    x: area.x,
                    y: area.y,
                    width: area.width,
                    height: area.height,
                }
                .into());
            }
            indices.extend(area.points().map(|p| p.to_index(surface.width())));
        }
        Ok(indices)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub surface: SurfaceConfig,
    pub runner: RunnerConfig,
    pub print: Vec<PrintEntry>,
    pub effect: Vec<EffectEntry>,
}

impl Scene {
    pub fn from_toml(text: &str) -> Result<Self> {
        let scene: Scene = toml::from_str(text)?;
        scene.surface.validate()?;
        scene.runner.validate()?;
        Ok(scene)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Build the surface: prints first, in order, then effect bindings
    pub fn build(&self, registry: &EffectRegistry, parser: &Parser) -> Result<CellSurface> {
        let mut surface = self.surface.build()?;

        for entry in &self.print {
            let index = surface.index_of(entry.x, entry.y)?;
            let text = parser.parse_for_surface(&entry.text, &surface, index);
            surface.print_colored(entry.x, entry.y, &text)?;
        }

        for entry in &self.effect {
            let handle = registry.decode_handle(&entry.serialized())?;
            let indices = entry.indices(&surface)?;
            if indices.is_empty() {
                log::warn!("{} effect has no positions or area", entry.kind);
                continue;
            }
            surface.set_effect_cells(&indices, Some(&handle))?;
        }

        log::debug!(
            "built scene {}x{} with {} effects",
            surface.width(),
            surface.height(),
            surface.effect_count()
        );
        Ok(surface)
    }
}

/// Advance effects `frames` times by `frame_time`. Returns how many frames
/// changed at least one cell.
pub fn run_frames(surface: &mut CellSurface, runner: &RunnerConfig) -> usize {
    let mut changed = 0;
    for frame in 0..runner.frames {
        if surface.update_effects(runner.frame_time) {
            changed += 1;
        }
        log::trace!("frame {frame}: {} effects live", surface.effect_count());
    }
    changed
}

/// Render the surface's current snapshot
pub fn render(surface: &CellSurface, format: OutputFormat) -> Result<String> {
    let snapshot = Snapshot::from_surface(surface);
    match format {
        OutputFormat::Text => Ok(snapshot.screen_text()),
        OutputFormat::Json => Ok(snapshot.to_json()?),
    }
}
