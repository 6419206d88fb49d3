use glam::{Mat3, Mat4};

use frep_tree::ShapeId;

use crate::view::{planar_matrix, ViewState};

use super::RenderMode;

/// Transform handed to the evaluation kernel.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ShapeTransform {
    Planar(Mat3),
    Spatial(Mat4),
}

/// Post effects run after the kernel.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PostEffect {
    None,
    Ssao,
    /// SSAO followed by shading.
    SsaoShading,
}

impl PostEffect {
    pub fn for_mode(mode: RenderMode) -> Self {
        match mode {
            RenderMode::Ssao => PostEffect::Ssao,
            RenderMode::Shaded => PostEffect::SsaoShading,
            RenderMode::Plane | RenderMode::Depth | RenderMode::Normals => PostEffect::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDraw {
    pub id: ShapeId,
    pub transform: ShapeTransform,
    pub effect: PostEffect,
}

/// Everything one frame will draw, in draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub mode: RenderMode,
    pub size_px: u32,
    pub draws: Vec<ShapeDraw>,
}

impl RenderPlan {
    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }
}

/// Builds the frame's draw list from the compiled shapes and the camera.
pub fn plan_frame(
    shapes: impl IntoIterator<Item = ShapeId>,
    mode: RenderMode,
    view: &ViewState,
    size_px: u32,
) -> RenderPlan {
    let model = view.model_matrix();
    let transform = if mode.is_planar() {
        ShapeTransform::Planar(planar_matrix(&model))
    } else {
        ShapeTransform::Spatial(model)
    };
    let effect = PostEffect::for_mode(mode);

    RenderPlan {
        mode,
        size_px,
        draws: shapes
            .into_iter()
            .map(|id| ShapeDraw {
                id,
                transform,
                effect,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frep_tree::{Expression, Tree};

    fn ids(n: usize) -> Vec<ShapeId> {
        (0..n).map(|_| Expression::new(Tree::x()).id()).collect()
    }

    #[test]
    fn plane_mode_uses_planar_transform() {
        let view = ViewState::default();
        let plan = plan_frame(ids(2), RenderMode::Plane, &view, 256);

        assert_eq!(plan.draws.len(), 2);
        let expected = planar_matrix(&view.model_matrix());
        for d in &plan.draws {
            assert_eq!(d.transform, ShapeTransform::Planar(expected));
            assert_eq!(d.effect, PostEffect::None);
        }
    }

    #[test]
    fn spatial_modes_use_full_model() {
        let view = ViewState {
            pitch: 0.3,
            ..ViewState::default()
        };
        for mode in [RenderMode::Depth, RenderMode::Normals, RenderMode::Ssao, RenderMode::Shaded] {
            let plan = plan_frame(ids(1), mode, &view, 512);
            assert_eq!(plan.draws[0].transform, ShapeTransform::Spatial(view.model_matrix()));
        }
    }

    #[test]
    fn effects_follow_mode() {
        assert_eq!(PostEffect::for_mode(RenderMode::Ssao), PostEffect::Ssao);
        assert_eq!(PostEffect::for_mode(RenderMode::Shaded), PostEffect::SsaoShading);
        assert_eq!(PostEffect::for_mode(RenderMode::Depth), PostEffect::None);
    }

    #[test]
    fn draw_order_follows_input() {
        let ids = ids(3);
        let plan = plan_frame(ids.clone(), RenderMode::Normals, &ViewState::default(), 256);
        let order: Vec<_> = plan.draws.iter().map(|d| d.id).collect();
        assert_eq!(order, ids);
    }
}
