// src/engine_lib/controller.rs

use winit::{
    event::{ElementState, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::engine_lib::camera::{Camera, CameraMovement};

const LINE_SCROLL_PIXELS: f32 = 20.0;

/// What an input event asked the lesson to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputResponse {
    Ignored,
    Consumed,
    Exit,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeldKeys {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

/// Turns window events into camera motion: W/A/S/D while held, cursor
/// movement for looking around, wheel for zoom. Escape requests exit.
#[derive(Debug, Default)]
pub struct CameraController {
    pub held: HeldKeys,
    last_cursor: Option<(f32, f32)>,
    pending_offset: (f32, f32),
    pending_scroll: f32,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) -> InputResponse {
        match event {
            WindowEvent::KeyboardInput { event: key_event, .. } => {
                self.handle_key(key_event.physical_key, key_event.state == ElementState::Pressed)
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.handle_cursor(position.x as f32, position.y as f32);
                InputResponse::Consumed
            }
            WindowEvent::CursorLeft { .. } => {
                self.last_cursor = None;
                InputResponse::Ignored
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.pending_scroll += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / LINE_SCROLL_PIXELS,
                };
                InputResponse::Consumed
            }
            WindowEvent::Focused(false) => {
                self.held = HeldKeys::default();
                InputResponse::Ignored
            }
            _ => InputResponse::Ignored,
        }
    }

    pub fn handle_key(&mut self, key: PhysicalKey, pressed: bool) -> InputResponse {
        let PhysicalKey::Code(code) = key else { return InputResponse::Ignored };
        match code {
            KeyCode::Escape if pressed => return InputResponse::Exit,
            KeyCode::KeyW => self.held.forward = pressed,
            KeyCode::KeyS => self.held.backward = pressed,
            KeyCode::KeyA => self.held.left = pressed,
            KeyCode::KeyD => self.held.right = pressed,
            _ => return InputResponse::Ignored,
        }
        InputResponse::Consumed
    }

    /// Absolute cursor position. The first sample only seeds the reference
    /// point; y offsets are reversed since window y grows downwards.
    pub fn handle_cursor(&mut self, xpos: f32, ypos: f32) {
        if let Some((last_x, last_y)) = self.last_cursor {
            self.pending_offset.0 += xpos - last_x;
            self.pending_offset.1 += last_y - ypos;
        }
        self.last_cursor = Some((xpos, ypos));
    }

    pub fn apply(&mut self, camera: &mut Camera, delta_time: f32) {
        let held = [
            (self.held.forward, CameraMovement::Forward),
            (self.held.backward, CameraMovement::Backward),
            (self.held.left, CameraMovement::Left),
            (self.held.right, CameraMovement::Right),
        ];
        for (_, movement) in held.iter().filter(|(down, _)| *down) {
            camera.process_keyboard(*movement, delta_time);
        }

        let (xoffset, yoffset) = std::mem::take(&mut self.pending_offset);
        if xoffset != 0.0 || yoffset != 0.0 {
            camera.process_mouse_movement(xoffset, yoffset, true);
        }

        let scroll = std::mem::take(&mut self.pending_scroll);
        if scroll != 0.0 {
            camera.process_mouse_scroll(scroll);
        }
    }
}

/// Escape-to-exit for lessons without a camera.
pub fn exit_requested(event: &WindowEvent) -> bool {
    matches!(
        event,
        WindowEvent::KeyboardInput { event: key_event, .. }
            if key_event.state == ElementState::Pressed
                && key_event.physical_key == PhysicalKey::Code(KeyCode::Escape)
    )
}
