use glam::Vec2;

use crate::input::InputSnapshot;

use super::{ViewState, ViewTransform};

/// Applies one frame of input to the view: pan (left drag), rotate (right
/// drag), then zoom (scroll) around the pointer.
///
/// Nothing happens while the pointer is captured by an overlay.
pub fn apply_input(transform: &ViewTransform, view: &ViewState, input: &InputSnapshot) -> ViewState {
    if input.pointer_captured {
        return *view;
    }

    let mut next = *view;
    let display = input.display;

    if let Some(pointer) = input.pointer {
        if input.left_drag != Vec2::ZERO {
            next = transform.pan(&next, pointer - input.left_drag, pointer, display);
        }
    }

    if input.right_drag != Vec2::ZERO {
        next = transform.rotate(&next, input.right_drag.x, input.right_drag.y);
    }

    if let Some(pointer) = input.pointer {
        if input.scroll != 0.0 {
            next = transform.zoom(&next, input.scroll, pointer, display);
        }
    }

    next
}
