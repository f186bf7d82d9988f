use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Pixels of trackpad scroll treated as one wheel line
const PIXELS_PER_LINE: f64 = 40.0;

/// Mouse state accumulated between frames
#[derive(Debug, Default)]
pub struct InputState {
    dragging: bool,
    last_cursor: Option<(f64, f64)>,
    drag_delta: (f32, f32),
    scroll_lines: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Left {
            return;
        }
        self.dragging = state == ElementState::Pressed;
    }

    /// Absolute cursor position in window pixels
    pub fn process_cursor_moved(&mut self, position: (f64, f64)) {
        if let Some(last) = self.last_cursor {
            if self.dragging {
                self.drag_delta.0 += (position.0 - last.0) as f32;
                self.drag_delta.1 += (position.1 - last.1) as f32;
            }
        }
        self.last_cursor = Some(position);
    }

    pub fn process_scroll(&mut self, delta: MouseScrollDelta) {
        self.scroll_lines += match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(position) => (position.y / PIXELS_PER_LINE) as f32,
        };
    }

    pub fn reset_mouse_tracking(&mut self) {
        self.dragging = false;
        self.last_cursor = None;
        self.drag_delta = (0.0, 0.0);
        self.scroll_lines = 0.0;
    }

    /// Drag and scroll accumulated since the last call
    pub fn take_motion(&mut self) -> ((f32, f32), f32) {
        let motion = (self.drag_delta, self.scroll_lines);
        self.drag_delta = (0.0, 0.0);
        self.scroll_lines = 0.0;
        motion
    }
}
