use std::collections::HashSet;

use glam::Vec2;

use super::snapshot::InputSnapshot;
use crate::config::ViewerConfig;
use super::types::{
    InputEvent, Key, KeyState, Modifiers, MouseButton, MouseButtonState, MouseWheelDelta,
    PointerButtonEvent, PointerMoveEvent,
};

/// Touchpad pixels per scroll line, used when no config overrides it.
pub const DEFAULT_PIXELS_PER_LINE: f32 = 20.0;

/// Input state for the viewer window.
///
/// Events are applied as they arrive; [`InputState::poll`] is called once per
/// frame and hands out the accumulated drag/scroll deltas, resetting them.
#[derive(Debug)]
pub struct InputState {
    pub modifiers: Modifiers,
    pub focused: bool,

    /// Pointer position in logical pixels.
    pub pointer_pos: Option<Vec2>,

    /// Display size in logical pixels.
    pub display: Vec2,

    /// Set while an overlay UI owns the pointer; view navigation is suspended.
    pub pointer_captured: bool,

    pub keys_down: HashSet<Key>,
    pub buttons_down: HashSet<MouseButton>,

    pub pixels_per_line: f32,

    // Per-frame accumulators, cleared by `poll`.
    left_drag: Vec2,
    right_drag: Vec2,
    scroll: f32,
    save_requested: bool,
    digit_pressed: Option<u8>,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            modifiers: Modifiers::default(),
            focused: false,
            pointer_pos: None,
            display: Vec2::new(1280.0, 720.0),
            pointer_captured: false,
            keys_down: HashSet::new(),
            buttons_down: HashSet::new(),
            pixels_per_line: DEFAULT_PIXELS_PER_LINE,
            left_drag: Vec2::ZERO,
            right_drag: Vec2::ZERO,
            scroll: 0.0,
            save_requested: false,
            digit_pressed: None,
        }
    }
}

impl InputState {
    pub fn new(display: Vec2, pixels_per_line: f32) -> Self {
        Self {
            display,
            pixels_per_line,
            ..Self::default()
        }
    }

    /// Fresh state using the configured scroll conversion.
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            pixels_per_line: config.pixels_per_line,
            ..Self::default()
        }
    }

    pub fn apply_event(&mut self, ev: &InputEvent) {
        match ev {
            InputEvent::ModifiersChanged(m) => {
                self.modifiers = *m;
            }

            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Focus loss mid-press never delivers the release.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }

            InputEvent::PointerMoved(PointerMoveEvent { x, y }) => {
                let pos = Vec2::new(*x, *y);
                if let Some(prev) = self.pointer_pos {
                    let delta = pos - prev;
                    if self.button_down(MouseButton::Left) {
                        self.left_drag += delta;
                    }
                    if self.button_down(MouseButton::Right) {
                        self.right_drag += delta;
                    }
                }
                self.pointer_pos = Some(pos);
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::Key {
                key,
                state,
                modifiers,
                repeat,
            } => {
                self.modifiers = *modifiers;
                match state {
                    KeyState::Pressed => {
                        let inserted = self.keys_down.insert(*key);
                        if inserted && !*repeat {
                            self.on_key_pressed(*key);
                        }
                    }
                    KeyState::Released => {
                        self.keys_down.remove(key);
                    }
                }
            }

            InputEvent::PointerButton(PointerButtonEvent {
                button,
                state,
                modifiers,
            }) => {
                self.modifiers = *modifiers;
                match state {
                    MouseButtonState::Pressed => {
                        self.buttons_down.insert(*button);
                    }
                    MouseButtonState::Released => {
                        self.buttons_down.remove(button);
                    }
                }
            }

            InputEvent::MouseWheel { delta, modifiers } => {
                self.modifiers = *modifiers;
                self.scroll += match *delta {
                    MouseWheelDelta::Line { y, .. } => y,
                    MouseWheelDelta::Pixel { y, .. } => y / self.pixels_per_line.max(1.0),
                };
            }

            InputEvent::Resized { width, height } => {
                self.display = Vec2::new(*width, *height);
            }

            InputEvent::PointerCaptured(c) => {
                self.pointer_captured = *c;
            }
        }
    }

    fn on_key_pressed(&mut self, key: Key) {
        match key {
            Key::S if self.modifiers.command() => self.save_requested = true,
            Key::Digit1 => self.digit_pressed = Some(1),
            Key::Digit2 => self.digit_pressed = Some(2),
            Key::Digit3 => self.digit_pressed = Some(3),
            Key::Digit4 => self.digit_pressed = Some(4),
            Key::Digit5 => self.digit_pressed = Some(5),
            _ => {}
        }
    }

    /// Takes this frame's snapshot and resets the per-frame deltas.
    pub fn poll(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot {
            pointer: self.pointer_pos,
            display: self.display,
            left_drag: self.left_drag,
            right_drag: self.right_drag,
            scroll: self.scroll,
            pointer_captured: self.pointer_captured,
            save_requested: self.save_requested,
            digit_pressed: self.digit_pressed,
        };

        self.left_drag = Vec2::ZERO;
        self.right_drag = Vec2::ZERO;
        self.scroll = 0.0;
        self.save_requested = false;
        self.digit_pressed = None;

        snapshot
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }
}
