use glam::{Mat4, Vec3};
use serde::Deserialize;

/// Movement directions, relative to where the camera is looking.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Starting pose and tuning of a [`FlyCamera`]. Angles are in degrees.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    /// World units per second.
    pub speed: f32,
    /// Degrees of rotation per pixel of cursor travel.
    pub sensitivity: f32,
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub pitch_limit: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            yaw: -90.0,
            pitch: 0.0,
            speed: 2.5,
            sensitivity: 0.1,
            zoom: 45.0,
            min_zoom: 1.0,
            max_zoom: 45.0,
            pitch_limit: 89.0,
        }
    }
}

/// First-person camera driven by yaw/pitch angles.
///
/// `front` is always rebuilt from the angles, never rotated in place, so rounding error
/// can't accumulate across frames.
#[derive(Clone, Debug)]
pub struct FlyCamera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,

    yaw: f32,
    pitch: f32,
    zoom: f32,

    speed: f32,
    min_zoom: f32,
    max_zoom: f32,
    pitch_limit: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::new(&CameraSettings::default())
    }
}

impl FlyCamera {
    /// # Panics
    /// If `min_zoom > max_zoom`, `pitch_limit` is negative, or any of those bounds is
    /// NaN. [`Settings::validate`] rejects all of these.
    ///
    /// [`Settings::validate`]: crate::config::Settings::validate
    pub fn new(settings: &CameraSettings) -> Self {
        let mut camera = Self {
            position: settings.position,
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            world_up: Vec3::Y,
            yaw: settings.yaw,
            pitch: settings.pitch.clamp(-settings.pitch_limit, settings.pitch_limit),
            zoom: settings.zoom.clamp(settings.min_zoom, settings.max_zoom),
            speed: settings.speed,
            min_zoom: settings.min_zoom,
            max_zoom: settings.max_zoom,
            pitch_limit: settings.pitch_limit,
        };
        camera.update_vectors();
        camera
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Moves along one basis vector. `delta_time` is the frame time in seconds.
    pub fn process_movement(&mut self, direction: Movement, delta_time: f32) {
        let basis = match direction {
            Movement::Forward => self.front,
            Movement::Backward => -self.front,
            Movement::Left => -self.right,
            Movement::Right => self.right,
            Movement::Up => self.up,
            Movement::Down => -self.up,
        };
        self.position += basis * self.speed * delta_time;
    }

    /// Turns by offsets in degrees that were already scaled by the mouse sensitivity.
    /// Yaw is kept within [0, 360).
    pub fn process_look(&mut self, x_offset: f32, y_offset: f32) {
        self.yaw = (self.yaw + x_offset).rem_euclid(360.0);
        self.pitch = (self.pitch + y_offset).clamp(-self.pitch_limit, self.pitch_limit);
        self.update_vectors();
    }

    pub fn process_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom - y_offset).clamp(self.min_zoom, self.max_zoom);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// OpenGL-style perspective (depth in -1..1) using the current zoom as the fov.
    pub fn projection_matrix(&self, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.zoom.to_radians(), aspect, near, far)
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}
