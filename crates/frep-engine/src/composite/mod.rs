//! Publishing rendered shapes into the fixed-size display texture.
//!
//! The first shape of a frame replaces the texture contents; later shapes are
//! merged by depth. Both paths use the same nearest-texel mapping from the
//! render resolution to [`TEXTURE_SIZE`].

mod gpu;
mod host;

pub use gpu::{GpuCompositor, GpuSource};
pub use host::{HostCanvas, HostCompositor, HostImage, HostSource};

use glam::Vec2;
use thiserror::Error;

use crate::render::RenderMode;

/// Side length of the display texture in pixels.
pub const TEXTURE_SIZE: u32 = 2048;

/// Color written where no shape is present.
pub const CLEAR_COLOR: [u8; 4] = [0, 0, 0, 0];

#[derive(Debug, Error)]
pub enum CompositeError {
    #[error("source image is empty")]
    EmptySource,

    #[error("source image of {size_px}px exceeds the {max}px display texture")]
    TooLarge { size_px: u32, max: u32 },

    #[error("readback failed: {0}")]
    Readback(String),
}

/// Receives one rendered shape at a time.
pub trait Compositor<S> {
    /// Copies `source` into the display texture.
    ///
    /// With `append == false` the texture is cleared first and every valid
    /// source texel is written. With `append == true` a texel is written only
    /// where the source is valid and nearer than what is already there.
    fn publish(&mut self, source: &S, append: bool, mode: RenderMode) -> Result<(), CompositeError>;

    /// Resets the texture to [`CLEAR_COLOR`] with no depth.
    fn clear(&mut self);
}

/// Source texel sampled by destination texel `dst` (nearest, no filtering).
#[inline]
pub fn source_texel(dst: u32, src_size: u32, dst_size: u32) -> u32 {
    let src = (u64::from(dst) * u64::from(src_size) / u64::from(dst_size.max(1))) as u32;
    src.min(src_size.saturating_sub(1))
}

pub(crate) fn check_source_size(size_px: u32, max: u32) -> Result<(), CompositeError> {
    if size_px == 0 {
        return Err(CompositeError::EmptySource);
    }
    if size_px > max {
        return Err(CompositeError::TooLarge { size_px, max });
    }
    Ok(())
}

/// Screen-space corners (top-left, bottom-right) where the display texture is
/// drawn: a square as wide as the longer display side, centered and flipped
/// vertically so texture row 0 lands at the bottom.
pub fn display_quad(display: Vec2) -> (Vec2, Vec2) {
    let half = display.max_element() / 2.0;
    let c = display / 2.0;
    (
        Vec2::new(c.x - half, c.y + half),
        Vec2::new(c.x + half, c.y - half),
    )
}
