//! Input subsystem.
//!
//! Public API is platform-agnostic; `platform` holds the winit translation.
//! Frame code only ever sees an [`InputSnapshot`].

pub mod platform;
mod snapshot;
mod state;
mod types;

pub use snapshot::InputSnapshot;
pub use state::{InputState, DEFAULT_PIXELS_PER_LINE};
pub use types::{
    InputEvent,
    Key,
    KeyState,
    Modifiers,
    MouseButton,
    MouseButtonState,
    MouseWheelDelta,
    PointerButtonEvent,
    PointerMoveEvent,
};
