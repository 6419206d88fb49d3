use glam::{Mat3, Mat4};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render surface of {size_px}px could not be allocated: {reason}")]
    Allocation { size_px: u32, reason: String },

    #[error("no render surface is allocated")]
    NoSurface,

    #[error("evaluation kernel failed: {0}")]
    Kernel(String),

    #[error("post effect failed: {0}")]
    Effect(String),
}

/// Device-side evaluation of compiled tapes.
///
/// `Surface` holds the working buffers for one resolution. Buffers are never
/// resized; a new resolution means a new surface.
pub trait ShapeRenderer {
    type Tape;
    type Surface;

    /// Allocates square working buffers `size_px` on a side.
    fn allocate(&mut self, size_px: u32) -> Result<Self::Surface, RenderError>;

    /// Renders the z = 0 slice with a 3×3 projective transform.
    fn render_2d(
        &mut self,
        surface: &mut Self::Surface,
        tape: &Self::Tape,
        transform: &Mat3,
    ) -> Result<(), RenderError>;

    /// Renders depth and normals with the full 4×4 transform.
    fn render_3d(
        &mut self,
        surface: &mut Self::Surface,
        tape: &Self::Tape,
        transform: &Mat4,
    ) -> Result<(), RenderError>;
}

/// Screen-space post effects over the depth and normal images.
///
/// Both passes write their image into the surface alongside depth and normals.
pub trait Effects<S> {
    fn draw_ssao(&mut self, surface: &mut S) -> Result<(), RenderError>;

    /// Shading pass; expects `draw_ssao` to have run on the same surface.
    fn draw_shaded(&mut self, surface: &mut S) -> Result<(), RenderError>;
}
