use std::time::Instant;

use crate::composite::Compositor;
use crate::scene::SceneSynchronizer;
use crate::view::ViewState;

use super::{
    plan_frame, Effects, FrameReport, PostEffect, RenderMode, RenderPlan, RenderSurface,
    ShapeDraw, ShapeFailure, ShapeRenderer, ShapeTiming, ShapeTransform, Stage, StageTiming,
};

/// Tracks whether a frame has published anything yet.
///
/// The first shape to reach the display texture replaces it; every later one
/// is merged by depth.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameCompositeState {
    published: bool,
}

impl FrameCompositeState {
    /// Append flag for the next publish.
    #[inline]
    pub fn append(&self) -> bool {
        self.published
    }

    #[inline]
    pub fn mark_published(&mut self) {
        self.published = true;
    }

    #[inline]
    pub fn any_published(&self) -> bool {
        self.published
    }
}

/// Parameters of one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameRequest {
    pub mode: RenderMode,
    pub view: ViewState,
    /// Side length of the render surface.
    pub size_px: u32,
}

/// Runs the per-shape render → effects → publish sequence.
///
/// Owns the render surface so its size always matches the last frame's request.
#[derive(Debug)]
pub struct RenderOrchestrator<S> {
    surface: RenderSurface<S>,
}

impl<S> Default for RenderOrchestrator<S> {
    fn default() -> Self {
        Self {
            surface: RenderSurface::new(),
        }
    }
}

impl<S> RenderOrchestrator<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn surface(&self) -> &RenderSurface<S> {
        &self.surface
    }

    /// Plans and draws every compiled shape.
    pub fn render_frame<R, E, C>(
        &mut self,
        request: &FrameRequest,
        scene: &SceneSynchronizer<R::Tape>,
        renderer: &mut R,
        effects: &mut E,
        compositor: &mut C,
    ) -> FrameReport
    where
        R: ShapeRenderer<Surface = S>,
        E: Effects<S>,
        C: Compositor<S>,
    {
        let plan = plan_frame(
            scene.shapes().map(|s| s.id()),
            request.mode,
            &request.view,
            request.size_px,
        );
        self.execute(&plan, scene, renderer, effects, compositor)
    }

    /// Executes a plan. Shapes that fail are reported and skipped.
    pub fn execute<R, E, C>(
        &mut self,
        plan: &RenderPlan,
        scene: &SceneSynchronizer<R::Tape>,
        renderer: &mut R,
        effects: &mut E,
        compositor: &mut C,
    ) -> FrameReport
    where
        R: ShapeRenderer<Surface = S>,
        E: Effects<S>,
        C: Compositor<S>,
    {
        let mut report = FrameReport::default();

        match self.surface.ensure_size(renderer, plan.size_px) {
            Ok(reallocated) => report.reallocated = reallocated,
            Err(err) => {
                log::warn!("{err}");
                report.surface_error = Some(err);
            }
        }

        let mut composite = FrameCompositeState::default();

        if let Some(buffers) = self.surface.buffers_mut() {
            for draw in &plan.draws {
                let Some(shape) = scene.get(draw.id) else {
                    log::debug!("{} planned but not compiled; skipped", draw.id);
                    continue;
                };

                let mut timing = ShapeTiming {
                    id: draw.id,
                    stages: Vec::with_capacity(3),
                };

                let result = draw_shape(
                    renderer,
                    effects,
                    compositor,
                    buffers,
                    shape.tape(),
                    draw,
                    plan.mode,
                    composite.append(),
                    &mut timing,
                );

                match result {
                    Ok(()) => {
                        composite.mark_published();
                        report.published += 1;
                    }
                    Err(err) => {
                        log::warn!("{} skipped: {err}", draw.id);
                        report.failures.push((draw.id, err));
                    }
                }
                report.timings.push(timing);
            }
        }

        if !composite.any_published() {
            // Nothing reached the texture; do not leave the last frame's shapes up.
            compositor.clear();
            report.cleared = true;
        }

        report
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_shape<R, E, C>(
    renderer: &mut R,
    effects: &mut E,
    compositor: &mut C,
    buffers: &mut R::Surface,
    tape: &R::Tape,
    draw: &ShapeDraw,
    mode: RenderMode,
    append: bool,
    timing: &mut ShapeTiming,
) -> Result<(), ShapeFailure>
where
    R: ShapeRenderer,
    E: Effects<R::Surface>,
    C: Compositor<R::Surface>,
{
    let start = Instant::now();
    match &draw.transform {
        ShapeTransform::Planar(m) => renderer.render_2d(buffers, tape, m)?,
        ShapeTransform::Spatial(m) => renderer.render_3d(buffers, tape, m)?,
    }
    timing.stages.push(StageTiming {
        stage: Stage::Render,
        elapsed: start.elapsed(),
    });

    match draw.effect {
        PostEffect::None => {}
        PostEffect::Ssao => {
            let start = Instant::now();
            effects.draw_ssao(buffers)?;
            timing.stages.push(StageTiming {
                stage: Stage::Ssao,
                elapsed: start.elapsed(),
            });
        }
        PostEffect::SsaoShading => {
            let start = Instant::now();
            effects.draw_ssao(buffers)?;
            effects.draw_shaded(buffers)?;
            timing.stages.push(StageTiming {
                stage: Stage::SsaoShading,
                elapsed: start.elapsed(),
            });
        }
    }

    let start = Instant::now();
    compositor.publish(buffers, append, mode)?;
    timing.stages.push(StageTiming {
        stage: Stage::TextureLoad,
        elapsed: start.elapsed(),
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use glam::{Mat3, Mat4};

    use frep_tree::{Expression, ShapeId, Tree};

    use super::*;
    use crate::composite::{HostCompositor, HostImage, HostSource, CLEAR_COLOR};
    use crate::render::RenderError;
    use crate::scene::{CompileError, TapeCompiler};

    /// Fills the left or right half of the image at a fixed depth.
    #[derive(Debug, Clone, Copy)]
    struct Slab {
        depth: f32,
        color: [u8; 4],
        left: bool,
        fail: bool,
    }

    #[derive(Default)]
    struct SlabCompiler {
        slabs: BTreeMap<ShapeId, Slab>,
    }

    impl TapeCompiler for SlabCompiler {
        type Tape = Slab;

        fn compile(&mut self, expr: &Expression) -> Result<Slab, CompileError> {
            Ok(self.slabs[&expr.id()])
        }

        fn release(&mut self, _: Slab) {}
    }

    #[derive(Default)]
    struct SlabRenderer {
        calls: Vec<&'static str>,
        allocations: Vec<u32>,
    }

    impl SlabRenderer {
        fn fill(img: &mut HostImage, slab: &Slab) {
            let n = img.size_px();
            *img = HostImage::new(n);
            for y in 0..n {
                for x in 0..n {
                    if (x < n / 2) == slab.left {
                        img.set(x, y, slab.depth, slab.color);
                    }
                }
            }
        }
    }

    impl ShapeRenderer for SlabRenderer {
        type Tape = Slab;
        type Surface = HostImage;

        fn allocate(&mut self, size_px: u32) -> Result<HostImage, RenderError> {
            self.allocations.push(size_px);
            Ok(HostImage::new(size_px))
        }

        fn render_2d(&mut self, s: &mut HostImage, tape: &Slab, _: &Mat3) -> Result<(), RenderError> {
            self.calls.push("2d");
            if tape.fail {
                return Err(RenderError::Kernel("bad tape".into()));
            }
            Self::fill(s, tape);
            Ok(())
        }

        fn render_3d(&mut self, s: &mut HostImage, tape: &Slab, _: &Mat4) -> Result<(), RenderError> {
            self.calls.push("3d");
            if tape.fail {
                return Err(RenderError::Kernel("bad tape".into()));
            }
            Self::fill(s, tape);
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingEffects {
        calls: Vec<&'static str>,
    }

    impl Effects<HostImage> for CountingEffects {
        fn draw_ssao(&mut self, _: &mut HostImage) -> Result<(), RenderError> {
            self.calls.push("ssao");
            Ok(())
        }

        fn draw_shaded(&mut self, _: &mut HostImage) -> Result<(), RenderError> {
            self.calls.push("shaded");
            Ok(())
        }
    }

    struct Fixture {
        compiler: SlabCompiler,
        scene: SceneSynchronizer<Slab>,
        live: BTreeMap<ShapeId, Expression>,
        renderer: SlabRenderer,
        effects: CountingEffects,
        compositor: HostCompositor,
        orchestrator: RenderOrchestrator<HostImage>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                compiler: SlabCompiler::default(),
                scene: SceneSynchronizer::new(),
                live: BTreeMap::new(),
                renderer: SlabRenderer::default(),
                effects: CountingEffects::default(),
                compositor: HostCompositor::new(16),
                orchestrator: RenderOrchestrator::new(),
            }
        }

        fn add(&mut self, slab: Slab) -> ShapeId {
            let expr = Expression::new(Tree::x());
            let id = expr.id();
            self.compiler.slabs.insert(id, slab);
            self.live.insert(id, expr);
            self.scene.synchronize(&mut self.compiler, &self.live);
            id
        }

        fn remove(&mut self, id: ShapeId) {
            self.live.remove(&id);
            self.scene.synchronize(&mut self.compiler, &self.live);
        }

        fn frame(&mut self, mode: RenderMode, size_px: u32) -> FrameReport {
            let request = FrameRequest {
                mode,
                view: ViewState::default(),
                size_px,
            };
            self.orchestrator.render_frame(
                &request,
                &self.scene,
                &mut self.renderer,
                &mut self.effects,
                &mut self.compositor,
            )
        }
    }

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn slab(depth: f32, color: [u8; 4], left: bool) -> Slab {
        Slab {
            depth,
            color,
            left,
            fail: false,
        }
    }

    #[test]
    fn composite_flags_follow_publish_order() {
        let mut state = FrameCompositeState::default();
        assert!(!state.append());
        state.mark_published();
        assert!(state.append());
    }

    #[test]
    fn later_shapes_never_erase_earlier_ones() {
        let mut f = Fixture::new();
        f.add(slab(0.5, RED, true));
        f.add(slab(0.2, BLUE, false));

        let report = f.frame(RenderMode::Normals, 8);

        assert!(report.is_clean());
        assert_eq!(report.published, 2);
        assert_eq!(f.compositor.canvas().pixel(0, 0), RED);
        assert_eq!(f.compositor.canvas().pixel(15, 0), BLUE);
    }

    #[test]
    fn first_shape_replaces_previous_frame() {
        let mut f = Fixture::new();
        let a = f.add(slab(0.5, RED, true));
        f.frame(RenderMode::Normals, 8);

        f.remove(a);
        f.add(slab(0.1, BLUE, false));
        f.frame(RenderMode::Normals, 8);

        assert_eq!(f.compositor.canvas().pixel(0, 0), CLEAR_COLOR);
        assert_eq!(f.compositor.canvas().pixel(15, 0), BLUE);
    }

    #[test]
    fn failed_first_shape_does_not_take_the_overwrite() {
        let mut f = Fixture::new();
        f.add(Slab {
            fail: true,
            ..slab(0.9, RED, true)
        });
        f.add(slab(0.3, BLUE, false));

        // Stale content from an earlier frame.
        f.compositor = HostCompositor::new(16);
        let mut stale = HostImage::new(16);
        stale.fill(1.0, RED);
        f.compositor.publish(&stale, false, RenderMode::Normals).unwrap();

        let report = f.frame(RenderMode::Normals, 8);

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.published, 1);
        // The surviving shape cleared the stale frame.
        assert_eq!(f.compositor.canvas().pixel(0, 0), CLEAR_COLOR);
        assert_eq!(f.compositor.canvas().pixel(15, 0), BLUE);
    }

    #[test]
    fn empty_scene_clears_the_display() {
        let mut f = Fixture::new();
        let a = f.add(slab(0.5, RED, true));
        f.frame(RenderMode::Normals, 8);
        assert!(!f.compositor.canvas().is_blank());

        f.remove(a);
        let report = f.frame(RenderMode::Normals, 8);

        assert!(report.cleared);
        assert!(f.compositor.canvas().is_blank());
    }

    #[test]
    fn plane_mode_uses_2d_kernel_without_effects() {
        let mut f = Fixture::new();
        f.add(slab(0.5, RED, true));
        f.frame(RenderMode::Plane, 8);

        assert_eq!(f.renderer.calls, vec!["2d"]);
        assert!(f.effects.calls.is_empty());
    }

    #[test]
    fn shaded_runs_ssao_first() {
        let mut f = Fixture::new();
        f.add(slab(0.5, RED, true));
        let report = f.frame(RenderMode::Shaded, 8);

        assert_eq!(f.renderer.calls, vec!["3d"]);
        assert_eq!(f.effects.calls, vec!["ssao", "shaded"]);
        let stages: Vec<_> = report.timings[0].stages.iter().map(|s| s.stage).collect();
        assert_eq!(stages, vec![Stage::Render, Stage::SsaoShading, Stage::TextureLoad]);
    }

    #[test]
    fn ssao_mode_runs_only_ssao() {
        let mut f = Fixture::new();
        f.add(slab(0.5, RED, true));
        f.frame(RenderMode::Ssao, 8);
        assert_eq!(f.effects.calls, vec!["ssao"]);
    }

    #[test]
    fn resize_reallocates_before_rendering() {
        let mut f = Fixture::new();
        f.add(slab(0.5, RED, true));

        assert!(f.frame(RenderMode::Normals, 4).reallocated);
        assert!(!f.frame(RenderMode::Normals, 4).reallocated);
        assert!(f.frame(RenderMode::Normals, 8).reallocated);

        assert_eq!(f.renderer.allocations, vec![4, 8]);
        assert_eq!(f.orchestrator.surface().size_px(), 8);
        assert_eq!(f.orchestrator.surface().buffers().map(|b| b.size_px()), Some(8));
    }
}
