use glam::Vec2;

/// Everything the frame stages need from one iteration of input.
///
/// Produced by [`InputState::poll`](super::InputState::poll). Drag and scroll
/// values are deltas accumulated since the previous poll.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct InputSnapshot {
    /// Pointer position in logical pixels, `None` when outside the window.
    pub pointer: Option<Vec2>,
    /// Display size in logical pixels.
    pub display: Vec2,
    /// Pointer travel while the left button was held.
    pub left_drag: Vec2,
    /// Pointer travel while the right button was held.
    pub right_drag: Vec2,
    /// Scroll in lines; positive zooms in.
    pub scroll: f32,
    pub pointer_captured: bool,
    /// Meta/Ctrl+S was pressed since the last poll.
    pub save_requested: bool,
    /// Digit key 1-5 pressed since the last poll.
    pub digit_pressed: Option<u8>,
}

impl InputSnapshot {
    /// A frame with no input at the given display size.
    pub fn idle(display: Vec2) -> Self {
        Self {
            pointer: None,
            display,
            left_drag: Vec2::ZERO,
            right_drag: Vec2::ZERO,
            scroll: 0.0,
            pointer_captured: false,
            save_requested: false,
            digit_pressed: None,
        }
    }
}
