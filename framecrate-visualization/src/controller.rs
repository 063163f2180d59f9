//! Mouse-driven camera control
//!
//! The primary button orbits and the secondary button pans while held. Both
//! can be held at once, in which case every pointer move applies both.

use crate::camera::{OrbitCamera, OrbitSettings};

/// Mouse buttons the controller reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Orbit while held
    Primary,
    /// Pan while held
    Secondary,
}

/// Turns pointer and scroll input into orbit camera motion
#[derive(Debug, Clone)]
pub struct CameraController {
    camera: OrbitCamera,
    orbiting: bool,
    panning: bool,
    /// Last pointer position, `None` until the pointer is seen in the window
    cursor: Option<(f64, f64)>,
}

impl CameraController {
    pub fn new(camera: OrbitCamera) -> Self {
        Self {
            camera,
            orbiting: false,
            panning: false,
            cursor: None,
        }
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn is_orbiting(&self) -> bool {
        self.orbiting
    }

    pub fn is_panning(&self) -> bool {
        self.panning
    }

    /// Last known pointer position in window pixels
    pub fn cursor(&self) -> Option<(f64, f64)> {
        self.cursor
    }

    /// Press or release a button at the current pointer position
    pub fn on_button(&mut self, button: PointerButton, pressed: bool) {
        match button {
            PointerButton::Primary => self.orbiting = pressed,
            PointerButton::Secondary => self.panning = pressed,
        }
    }

    /// Pointer moved to `(x, y)` window pixels.
    ///
    /// The position is always remembered so the next drag starts from where
    /// the button went down. The first position after the pointer enters the
    /// window only seeds the drag origin.
    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        let Some((last_x, last_y)) = self.cursor.replace((x, y)) else {
            return;
        };
        let dx = (x - last_x) as f32;
        let dy = (y - last_y) as f32;

        if self.orbiting {
            self.camera.orbit(dx, dy);
        }
        if self.panning {
            self.camera.pan(dx, dy);
        }
    }

    /// Pointer left the window; its position is unknown until it moves again
    pub fn on_cursor_left(&mut self) {
        self.cursor = None;
    }

    /// Scroll by `amount` steps, positive toward the target
    pub fn on_scroll(&mut self, amount: f32) {
        self.camera.zoom(amount);
    }

    /// Reset the camera and drop any drag in progress
    pub fn reset(&mut self) {
        self.camera.reset();
        self.orbiting = false;
        self.panning = false;
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(OrbitCamera::new(OrbitSettings::default()))
    }
}
