use crate::render::RenderMode;

use super::{check_source_size, source_texel, CompositeError, Compositor, CLEAR_COLOR, TEXTURE_SIZE};

/// Render output readable from the host.
///
/// Depth is 0 where the shape is absent and grows toward the viewer.
pub trait HostSource {
    fn size_px(&self) -> u32;

    fn depth(&self, x: u32, y: u32) -> f32;

    fn color(&self, mode: RenderMode, x: u32, y: u32) -> [u8; 4];
}

/// Square working buffers held in host memory.
#[derive(Debug, Clone, PartialEq)]
pub struct HostImage {
    size_px: u32,
    depth: Vec<f32>,
    normals: Vec<[u8; 4]>,
    effect: Vec<[u8; 4]>,
}

impl HostImage {
    pub fn new(size_px: u32) -> Self {
        let n = (size_px as usize) * (size_px as usize);
        Self {
            size_px,
            depth: vec![0.0; n],
            normals: vec![[0; 4]; n],
            effect: vec![[0; 4]; n],
        }
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.size_px as usize) + x as usize
    }

    pub fn set(&mut self, x: u32, y: u32, depth: f32, normal: [u8; 4]) {
        let i = self.index(x, y);
        self.depth[i] = depth;
        self.normals[i] = normal;
    }

    /// Writes the SSAO or shading result for one texel.
    pub fn set_effect(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = self.index(x, y);
        self.effect[i] = rgba;
    }

    /// Sets every texel to the same sample.
    pub fn fill(&mut self, depth: f32, normal: [u8; 4]) {
        self.depth.fill(depth);
        self.normals.fill(normal);
    }
}

impl HostSource for HostImage {
    fn size_px(&self) -> u32 {
        self.size_px
    }

    fn depth(&self, x: u32, y: u32) -> f32 {
        self.depth[self.index(x, y)]
    }

    fn color(&self, mode: RenderMode, x: u32, y: u32) -> [u8; 4] {
        let i = self.index(x, y);
        match mode {
            RenderMode::Plane => [255; 4],
            RenderMode::Depth => {
                let v = (self.depth[i].clamp(0.0, 1.0) * 255.0) as u8;
                [v, v, v, 255]
            }
            RenderMode::Normals => self.normals[i],
            RenderMode::Ssao | RenderMode::Shaded => self.effect[i],
        }
    }
}

/// Display texture in host memory.
#[derive(Debug, Clone, PartialEq)]
pub struct HostCanvas {
    size_px: u32,
    color: Vec<[u8; 4]>,
    depth: Vec<f32>,
}

impl HostCanvas {
    pub fn new(size_px: u32) -> Self {
        let n = (size_px as usize) * (size_px as usize);
        Self {
            size_px,
            color: vec![CLEAR_COLOR; n],
            depth: vec![0.0; n],
        }
    }

    pub fn size_px(&self) -> u32 {
        self.size_px
    }

    pub fn clear(&mut self) {
        self.color.fill(CLEAR_COLOR);
        self.depth.fill(0.0);
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.color[(y as usize) * (self.size_px as usize) + x as usize]
    }

    pub fn depth(&self, x: u32, y: u32) -> f32 {
        self.depth[(y as usize) * (self.size_px as usize) + x as usize]
    }

    /// Tightly packed RGBA8 rows, top row first.
    pub fn as_rgba8(&self) -> &[u8] {
        bytemuck::cast_slice(&self.color)
    }

    /// True when no texel holds a shape.
    pub fn is_blank(&self) -> bool {
        self.depth.iter().all(|&d| d <= 0.0)
    }
}

/// CPU compositor with the same semantics as [`GpuCompositor`](super::GpuCompositor).
#[derive(Debug, Clone)]
pub struct HostCompositor {
    canvas: HostCanvas,
}

impl Default for HostCompositor {
    fn default() -> Self {
        Self::new(TEXTURE_SIZE)
    }
}

impl HostCompositor {
    pub fn new(size_px: u32) -> Self {
        Self {
            canvas: HostCanvas::new(size_px),
        }
    }

    pub fn canvas(&self) -> &HostCanvas {
        &self.canvas
    }
}

impl<S: HostSource> Compositor<S> for HostCompositor {
    fn publish(&mut self, source: &S, append: bool, mode: RenderMode) -> Result<(), CompositeError> {
        let src_size = source.size_px();
        let dst_size = self.canvas.size_px;
        check_source_size(src_size, dst_size)?;

        if !append {
            self.canvas.clear();
        }

        let row = dst_size as usize;
        for y in 0..dst_size {
            let sy = source_texel(y, src_size, dst_size);
            for x in 0..dst_size {
                let sx = source_texel(x, src_size, dst_size);
                let d = source.depth(sx, sy);
                let i = (y as usize) * row + x as usize;
                if d > 0.0 && d > self.canvas.depth[i] {
                    self.canvas.depth[i] = d;
                    self.canvas.color[i] = source.color(mode, sx, sy);
                }
            }
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.canvas.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn half_filled(size: u32, depth: f32, normal: [u8; 4], left: bool) -> HostImage {
        let mut img = HostImage::new(size);
        for y in 0..size {
            for x in 0..size {
                if (x < size / 2) == left {
                    img.set(x, y, depth, normal);
                }
            }
        }
        img
    }

    #[test]
    fn overwrite_replaces_everything() {
        let mut c = HostCompositor::new(8);
        let mut a = HostImage::new(8);
        a.fill(0.9, RED);
        c.publish(&a, false, RenderMode::Normals).unwrap();

        let b = half_filled(8, 0.1, BLUE, true);
        c.publish(&b, false, RenderMode::Normals).unwrap();

        // Right half was cleared even though `b` is far behind `a`.
        assert_eq!(c.canvas().pixel(0, 0), BLUE);
        assert_eq!(c.canvas().pixel(7, 0), CLEAR_COLOR);
        assert_eq!(c.canvas().depth(7, 0), 0.0);
    }

    #[test]
    fn append_keeps_nearer_pixels() {
        let mut c = HostCompositor::new(8);
        let mut near = HostImage::new(8);
        near.fill(0.8, RED);
        c.publish(&near, false, RenderMode::Normals).unwrap();

        let mut far = HostImage::new(8);
        far.fill(0.3, BLUE);
        c.publish(&far, true, RenderMode::Normals).unwrap();

        assert_eq!(c.canvas().pixel(3, 3), RED);
    }

    #[test]
    fn append_never_erases_with_empty_texels() {
        let mut c = HostCompositor::new(8);
        let left = half_filled(8, 0.5, RED, true);
        c.publish(&left, false, RenderMode::Normals).unwrap();

        let right = half_filled(8, 0.2, BLUE, false);
        c.publish(&right, true, RenderMode::Normals).unwrap();

        assert_eq!(c.canvas().pixel(1, 4), RED);
        assert_eq!(c.canvas().pixel(6, 4), BLUE);
    }

    #[test]
    fn equal_depth_keeps_first() {
        let mut c = HostCompositor::new(4);
        let mut a = HostImage::new(4);
        a.fill(0.5, RED);
        let mut b = HostImage::new(4);
        b.fill(0.5, BLUE);

        c.publish(&a, false, RenderMode::Normals).unwrap();
        c.publish(&b, true, RenderMode::Normals).unwrap();
        assert_eq!(c.canvas().pixel(2, 2), RED);
    }

    #[test]
    fn low_resolution_source_is_upscaled() {
        let mut c = HostCompositor::new(8);
        let mut src = HostImage::new(2);
        src.set(1, 0, 0.5, BLUE);
        c.publish(&src, false, RenderMode::Normals).unwrap();

        assert_eq!(c.canvas().pixel(4, 0), BLUE);
        assert_eq!(c.canvas().pixel(7, 3), BLUE);
        assert_eq!(c.canvas().pixel(3, 0), CLEAR_COLOR);
        assert_eq!(c.canvas().pixel(4, 4), CLEAR_COLOR);
    }

    #[test]
    fn mode_selects_image() {
        let mut c = HostCompositor::new(2);
        let mut src = HostImage::new(2);
        src.fill(1.0, RED);
        src.set_effect(0, 0, BLUE);

        c.publish(&src, false, RenderMode::Shaded).unwrap();
        assert_eq!(c.canvas().pixel(0, 0), BLUE);

        c.publish(&src, false, RenderMode::Depth).unwrap();
        assert_eq!(c.canvas().pixel(0, 0), [255, 255, 255, 255]);

        c.publish(&src, false, RenderMode::Plane).unwrap();
        assert_eq!(c.canvas().pixel(1, 1), [255; 4]);
    }

    #[test]
    fn oversized_source_is_rejected() {
        let mut c = HostCompositor::new(4);
        let src = HostImage::new(8);
        let err = c.publish(&src, false, RenderMode::Normals).unwrap_err();
        assert!(matches!(err, CompositeError::TooLarge { size_px: 8, max: 4 }));
    }

    #[test]
    fn rgba_bytes_are_packed() {
        let mut c = HostCompositor::new(2);
        let mut src = HostImage::new(2);
        src.fill(0.5, RED);
        c.publish(&src, false, RenderMode::Normals).unwrap();

        let bytes = c.canvas().as_rgba8();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[..4], &RED);
        assert!(!c.canvas().is_blank());

        <HostCompositor as Compositor<HostImage>>::clear(&mut c);
        assert!(c.canvas().is_blank());
    }
}
