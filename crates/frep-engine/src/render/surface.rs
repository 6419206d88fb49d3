use super::{RenderError, ShapeRenderer};

/// Working buffers sized to the last requested resolution.
///
/// A size change drops the old buffers before allocating the new ones, so
/// both never exist at once and no stale contents survive.
#[derive(Debug)]
pub struct RenderSurface<S> {
    size_px: u32,
    generation: u64,
    buffers: Option<S>,
}

impl<S> Default for RenderSurface<S> {
    fn default() -> Self {
        Self {
            size_px: 0,
            generation: 0,
            buffers: None,
        }
    }
}

impl<S> RenderSurface<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sure buffers exist at `size_px`. Returns true if it reallocated.
    pub fn ensure_size<R>(&mut self, renderer: &mut R, size_px: u32) -> Result<bool, RenderError>
    where
        R: ShapeRenderer<Surface = S>,
    {
        if self.buffers.is_some() && self.size_px == size_px {
            return Ok(false);
        }

        self.buffers = None;
        self.size_px = 0;

        let buffers = renderer.allocate(size_px)?;
        self.buffers = Some(buffers);
        self.size_px = size_px;
        self.generation += 1;
        log::debug!("render surface reallocated at {size_px}px (generation {})", self.generation);
        Ok(true)
    }

    /// Current side length, 0 when nothing is allocated.
    pub fn size_px(&self) -> u32 {
        self.size_px
    }

    /// Bumped on every reallocation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn buffers(&self) -> Option<&S> {
        self.buffers.as_ref()
    }

    pub fn buffers_mut(&mut self) -> Option<&mut S> {
        self.buffers.as_mut()
    }
}
