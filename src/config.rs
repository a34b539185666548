//! Surface and runner configuration
//!
//! Both structs deserialize with every field optional, so a scene file only
//! lists what differs from the defaults. Colors are strings: a name, `#hex`
//! or `r,g,b[,a]`.

use glyphgrid_core::{CellSurface, Color};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Size and defaults of the surface a scene draws on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub width: usize,
    pub height: usize,
    pub foreground: String,
    pub background: String,
    /// Glyph of blank cells
    pub glyph: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 25,
            foreground: "white".to_string(),
            background: "black".to_string(),
            glyph: 0,
        }
    }
}

impl SurfaceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::config(
                "surface",
                format!(
                    "size {}x{} must be at least 1x1",
                    self.width, self.height
                ),
            ));
        }
        parse_color(&self.foreground, "surface.foreground")?;
        parse_color(&self.background, "surface.background")?;
        Ok(())
    }

    /// Blank surface with the configured size and defaults
    pub fn build(&self) -> Result<CellSurface> {
        self.validate()?;
        let mut surface = CellSurface::with_defaults(
            self.width,
            self.height,
            parse_color(&self.foreground, "surface.foreground")?,
            parse_color(&self.background, "surface.background")?,
        )?;
        if self.glyph != 0 {
            surface.set_default_glyph(self.glyph);
            surface.clear();
        }
        Ok(surface)
    }
}

/// How the headless runner prints the final surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Screen text, one line per row
    #[default]
    Text,
    /// The full render snapshot
    Json,
}

/// Frame loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Number of effect updates to run
    pub frames: usize,
    /// Seconds passed to each update
    pub frame_time: f64,
    pub output: OutputFormat,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            frames: 0,
            frame_time: 1.0 / 60.0,
            output: OutputFormat::Text,
        }
    }
}

impl RunnerConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.frame_time.is_finite() || self.frame_time < 0.0 {
            return Err(Error::config(
                "runner.frame_time",
                format!("{} is not a non-negative number of seconds", self.frame_time),
            ));
        }
        Ok(())
    }
}

/// Parse a configured color, naming `field` on failure
pub fn parse_color(text: &str, field: &str) -> Result<Color> {
    text.parse::<Color>()
        .map_err(|e| Error::config(field, e.to_string()))
}
