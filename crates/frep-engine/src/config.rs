use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::composite::TEXTURE_SIZE;
use crate::input::DEFAULT_PIXELS_PER_LINE;
use crate::render::RenderMode;
use crate::view::{ViewState, ViewTuning};

/// Viewer settings. Every field has a default, so a config file only needs
/// the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Side length of the render surface; the UI offers 256, 512, 1024 and 2048.
    pub render_size: u32,
    pub mode: RenderMode,
    /// Camera at startup.
    pub view: ViewState,
    pub tuning: ViewTuning,
    /// Touchpad pixels per scroll line.
    pub pixels_per_line: f32,
    /// Where "save shape" writes its archive.
    pub export_path: PathBuf,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            render_size: 256,
            mode: RenderMode::default(),
            view: ViewState::default(),
            tuning: ViewTuning::default(),
            pixels_per_line: DEFAULT_PIXELS_PER_LINE,
            export_path: PathBuf::from("shape.frep"),
        }
    }
}

impl ViewerConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s).context("parsing viewer config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading viewer config {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            (1..=TEXTURE_SIZE).contains(&self.render_size),
            "render_size {} outside 1..={TEXTURE_SIZE}",
            self.render_size
        );
        ensure!(
            self.view.scale.is_finite() && self.view.scale > 0.0,
            "view.scale must be positive, got {}",
            self.view.scale
        );
        ensure!(
            self.tuning.zoom_base > 1.0,
            "tuning.zoom_base must exceed 1, got {}",
            self.tuning.zoom_base
        );
        ensure!(
            self.tuning.rotate_divisor > 0.0,
            "tuning.rotate_divisor must be positive, got {}",
            self.tuning.rotate_divisor
        );
        ensure!(
            self.pixels_per_line > 0.0,
            "pixels_per_line must be positive, got {}",
            self.pixels_per_line
        );
        Ok(())
    }
}
