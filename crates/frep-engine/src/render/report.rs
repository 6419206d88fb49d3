use std::fmt;
use std::time::Duration;

use thiserror::Error;

use frep_tree::ShapeId;

use crate::composite::CompositeError;

use super::RenderError;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Stage {
    Render,
    Ssao,
    SsaoShading,
    TextureLoad,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Render => "Render time",
            Stage::Ssao => "SSAO time",
            Stage::SsaoShading => "SSAO + shading time",
            Stage::TextureLoad => "Texture load time",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StageTiming {
    pub stage: Stage,
    pub elapsed: Duration,
}

impl fmt::Display for StageTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:.6} s", self.stage.label(), self.elapsed.as_secs_f64())
    }
}

/// Host-side timings for one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeTiming {
    pub id: ShapeId,
    pub stages: Vec<StageTiming>,
}

impl ShapeTiming {
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.stages.iter().map(|s| s.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ShapeFailure {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Composite(#[from] CompositeError),
}

/// What happened during one frame.
#[derive(Debug, Default)]
pub struct FrameReport {
    pub timings: Vec<ShapeTiming>,
    pub failures: Vec<(ShapeId, ShapeFailure)>,
    /// Shapes that reached the display texture.
    pub published: usize,
    /// The display texture was cleared because nothing was published.
    pub cleared: bool,
    /// The render surface was reallocated this frame.
    pub reallocated: bool,
    /// Set when the surface could not be allocated; nothing was drawn.
    pub surface_error: Option<RenderError>,
}

impl FrameReport {
    /// Per-shape instrumentation lines, grouped by shape.
    pub fn instrumentation(&self) -> Vec<String> {
        let mut out = Vec::new();
        for t in &self.timings {
            out.push(t.id.to_string());
            out.extend(t.lines());
        }
        for (id, err) in &self.failures {
            out.push(format!("{id}: {err}"));
        }
        out
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.surface_error.is_none()
    }
}
