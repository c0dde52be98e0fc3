//! Turns raw window input into the events [`FlyCamera`](crate::camera::FlyCamera)
//! consumes.

use rustc_hash::FxHashSet;
use winit::{
    event::ElementState,
    keyboard::{KeyCode, PhysicalKey},
};

use crate::camera::Movement;

impl Movement {
    /// WASD for the horizontal plane, space and left shift for up and down.
    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::KeyW => Some(Movement::Forward),
            KeyCode::KeyS => Some(Movement::Backward),
            KeyCode::KeyA => Some(Movement::Left),
            KeyCode::KeyD => Some(Movement::Right),
            KeyCode::Space => Some(Movement::Up),
            KeyCode::ShiftLeft => Some(Movement::Down),
            _ => None,
        }
    }
}

/// Converts absolute cursor positions into look offsets.
///
/// The first position after creation or [`reset`](Self::reset) only becomes the
/// reference point, otherwise the distance from wherever the cursor entered the window
/// would arrive as one big jump.
#[derive(Clone, Debug)]
pub struct CursorTracker {
    last: Option<(f64, f64)>,
    sensitivity: f32,
}

impl CursorTracker {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            last: None,
            sensitivity,
        }
    }

    /// Returns `(x_offset, y_offset)` scaled by the sensitivity, or `None` for the
    /// seeding event. y is reversed since window coordinates grow downward.
    pub fn offsets(&mut self, x: f64, y: f64) -> Option<(f32, f32)> {
        let (last_x, last_y) = self.last.replace((x, y))?;
        let x_offset = (x - last_x) as f32 * self.sensitivity;
        let y_offset = (last_y - y) as f32 * self.sensitivity;
        Some((x_offset, y_offset))
    }

    /// Scales relative motion, e.g. raw mouse deltas while the cursor is locked. These
    /// need no seeding. y is reversed as in [`offsets`](Self::offsets).
    pub fn scale_motion(&self, dx: f64, dy: f64) -> (f32, f32) {
        (dx as f32 * self.sensitivity, -dy as f32 * self.sensitivity)
    }

    /// Forget the reference point, e.g. when the cursor leaves or focus is lost.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Keys currently held down, polled once per frame.
#[derive(Default, Debug)]
pub struct HeldKeys(FxHashSet<KeyCode>);

impl HeldKeys {
    pub fn update(&mut self, key: PhysicalKey, state: ElementState) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        match state {
            ElementState::Pressed => self.0.insert(code),
            ElementState::Released => self.0.remove(&code),
        };
    }

    pub fn is_held(&self, key: KeyCode) -> bool {
        self.0.contains(&key)
    }

    /// Movements for every held movement key.
    pub fn movements(&self) -> impl Iterator<Item = Movement> + '_ {
        self.0.iter().copied().filter_map(Movement::from_key)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}
