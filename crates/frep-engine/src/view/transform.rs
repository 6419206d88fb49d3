use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::ViewState;

/// Input sensitivities.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewTuning {
    /// Scale multiplier per scroll line.
    pub zoom_base: f32,
    /// Drag pixels per radian of rotation.
    pub rotate_divisor: f32,
}

impl Default for ViewTuning {
    fn default() -> Self {
        Self {
            zoom_base: 1.01,
            rotate_divisor: 100.0,
        }
    }
}

/// Turns pointer deltas into new [`ViewState`]s.
///
/// Every operation is a pure function of the current state and one event.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ViewTransform {
    pub tuning: ViewTuning,
}

impl ViewTransform {
    pub fn new(tuning: ViewTuning) -> Self {
        Self { tuning }
    }

    /// Drags the view so the world point under `from` ends up under `to`.
    pub fn pan(&self, view: &ViewState, from: Vec2, to: Vec2, display: Vec2) -> ViewState {
        let shift = view.world_of(from, display) - view.world_of(to, display);
        ViewState {
            center: view.center + shift,
            ..*view
        }
    }

    /// Orbits by a drag delta in pixels. Pitch is clamped to `[-π/2, π/2]`,
    /// yaw wrapped into `[0, 2π)`.
    pub fn rotate(&self, view: &ViewState, dx: f32, dy: f32) -> ViewState {
        let div = self.tuning.rotate_divisor;
        let pitch = (view.pitch - dy / div).clamp(-FRAC_PI_2, FRAC_PI_2);
        ViewState {
            pitch,
            yaw: wrap_angle(view.yaw - dx / div),
            ..*view
        }
    }

    /// Scales by `zoom_base^scroll`, keeping the world point under `cursor`
    /// fixed on screen.
    pub fn zoom(&self, view: &ViewState, scroll: f32, cursor: Vec2, display: Vec2) -> ViewState {
        let scale = view.scale * self.tuning.zoom_base.powf(scroll);
        if !scale.is_finite() || scale <= 0.0 {
            log::debug!("zoom by {scroll} rejected: scale would become {scale}");
            return *view;
        }

        let start = view.world_of(cursor, display);
        let scaled = ViewState { scale, ..*view };
        let end = scaled.world_of(cursor, display);

        ViewState {
            center: view.center - (end - start),
            ..scaled
        }
    }

    /// Screen positions of the world origin and the unit X, Y and Z axes.
    ///
    /// Used to draw the orientation overlay.
    pub fn axes_on_screen(&self, view: &ViewState, display: Vec2) -> [Vec2; 4] {
        [Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z].map(|p| view.screen_of(p, display).truncate())
    }
}

fn wrap_angle(a: f32) -> f32 {
    let w = a.rem_euclid(TAU);
    // rem_euclid of a tiny negative angle rounds up to exactly TAU in f32.
    if w >= TAU { 0.0 } else { w }
}
