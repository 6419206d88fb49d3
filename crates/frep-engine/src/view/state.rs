use glam::{Mat3, Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Persistent camera state for one session.
///
/// `center` is a 3-vector: panning or zooming a pitched view moves it off the
/// z = 0 plane. The planar render path ignores its z component.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    pub center: Vec3,
    /// Always > 0.
    pub scale: f32,
    /// Radians, within `[-π/2, π/2]`.
    pub pitch: f32,
    /// Radians, within `[0, 2π)`.
    pub yaw: f32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            scale: 2.0,
            pitch: 0.0,
            yaw: 0.0,
        }
    }
}

impl ViewState {
    /// Model matrix: translate(center) · scale · rotate_z(yaw) · rotate_x(pitch).
    ///
    /// The order fixes pitch to the view's horizontal axis after yaw has been
    /// applied; reordering changes which axes the angles rotate around.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.center)
            * Mat4::from_scale(Vec3::splat(self.scale))
            * Mat4::from_rotation_z(self.yaw)
            * Mat4::from_rotation_x(self.pitch)
    }

    /// Maps screen pixels straight to world space (`model · view`).
    pub fn screen_to_world(&self, display: Vec2) -> Mat4 {
        self.model_matrix() * view_matrix(display)
    }

    /// World-space point under the screen pixel `p`.
    pub fn world_of(&self, p: Vec2, display: Vec2) -> Vec3 {
        self.screen_to_world(display).transform_point3(p.extend(0.0))
    }

    /// Screen position of a world-space point; `z` carries the depth axis.
    pub fn screen_of(&self, world: Vec3, display: Vec2) -> Vec3 {
        self.screen_to_world(display)
            .inverse()
            .transform_point3(world)
    }
}

/// Pixel → normalized view space.
///
/// The display is shifted so its center sits at the origin, then scaled by
/// `2 / max(width, height)` with the vertical axis flipped. The shared scalar
/// keeps the aspect ratio: the longer side spans `[-1, 1]`.
pub fn view_matrix(display: Vec2) -> Mat4 {
    let s = 2.0 / display.x.max(display.y).max(1.0);
    Mat4::from_scale(Vec3::new(s, -s, 1.0))
        * Mat4::from_translation(Vec3::new(-display.x / 2.0, -display.y / 2.0, 0.0))
}

/// Projective 3×3 transform for planar (z = 0) shapes.
///
/// Takes rows/columns {x, y, w} of the 4×4 model matrix: the top-left 2×2
/// block, the x/y translation from the last column, the first two entries of
/// the last row, and the bottom-right corner.
pub fn planar_matrix(model: &Mat4) -> Mat3 {
    let (c0, c1, c3) = (model.x_axis, model.y_axis, model.w_axis);
    Mat3::from_cols(
        Vec3::new(c0.x, c0.y, c0.w),
        Vec3::new(c1.x, c1.y, c1.w),
        Vec3::new(c3.x, c3.y, c3.w),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;
    use std::f32::consts::FRAC_PI_2;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn view_matrix_centers_and_flips() {
        let display = Vec2::new(800.0, 600.0);
        let v = view_matrix(display);

        assert!(close(v.transform_point3(Vec3::new(400.0, 300.0, 0.0)), Vec3::ZERO));
        // Longer side spans [-1, 1].
        assert!(close(v.transform_point3(Vec3::new(800.0, 300.0, 0.0)), Vec3::X));
        // Top edge maps to +y; the shorter side keeps the same scale.
        assert!(close(
            v.transform_point3(Vec3::new(400.0, 0.0, 0.0)),
            Vec3::new(0.0, 0.75, 0.0)
        ));
    }

    #[test]
    fn model_applies_pitch_before_yaw() {
        let view = ViewState {
            center: Vec3::new(1.0, 2.0, 0.0),
            scale: 3.0,
            pitch: FRAC_PI_2,
            yaw: FRAC_PI_2,
        };
        let m = view.model_matrix();

        // Pitch takes +Y to +Z, yaw leaves Z alone.
        assert!(close(m.transform_point3(Vec3::Y), Vec3::new(1.0, 2.0, 3.0)));
        // Pitch leaves +X alone, yaw takes it to +Y.
        assert!(close(m.transform_point3(Vec3::X), Vec3::new(1.0, 5.0, 0.0)));
    }

    #[test]
    fn planar_matrix_picks_xyw_block() {
        let m = Mat4::from_cols(
            Vec4::new(1.0, 2.0, 3.0, 4.0),
            Vec4::new(5.0, 6.0, 7.0, 8.0),
            Vec4::new(9.0, 10.0, 11.0, 12.0),
            Vec4::new(13.0, 14.0, 15.0, 16.0),
        );
        let p = planar_matrix(&m);

        assert_eq!(p.x_axis, Vec3::new(1.0, 2.0, 4.0));
        assert_eq!(p.y_axis, Vec3::new(5.0, 6.0, 8.0));
        assert_eq!(p.z_axis, Vec3::new(13.0, 14.0, 16.0));
    }

    #[test]
    fn planar_matrix_matches_model_on_plane() {
        let view = ViewState {
            center: Vec3::new(0.3, -0.2, 0.0),
            scale: 1.5,
            pitch: 0.0,
            yaw: 0.7,
        };
        let model = view.model_matrix();
        let planar = planar_matrix(&model);

        let p = Vec2::new(0.25, -0.5);
        let full = model.transform_point3(p.extend(0.0));
        let flat = planar * p.extend(1.0);
        assert!(close(Vec3::new(full.x, full.y, 1.0), flat));
    }

    #[test]
    fn screen_and_world_are_inverse() {
        let view = ViewState {
            center: Vec3::new(0.1, 0.2, 0.0),
            scale: 0.8,
            pitch: 0.4,
            yaw: 1.2,
        };
        let display = Vec2::new(1280.0, 720.0);
        let p = Vec2::new(100.0, 650.0);

        let back = view.screen_of(view.world_of(p, display), display);
        assert!((back.truncate() - p).length() < 1e-2);
    }

    #[test]
    fn zero_display_does_not_produce_nan() {
        let v = view_matrix(Vec2::ZERO);
        assert!(v.is_finite());
    }
}
