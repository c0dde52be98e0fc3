use std::{rc::Rc, time::Instant};

use glam::{Mat4, Vec3};
use glow::HasContext;
use winit::{dpi::PhysicalSize, event::ElementState, keyboard::PhysicalKey};

use glflycam::{
    CameraSettings, CurrentGl, CursorTracker, FlyCamera, GlContext, HeldKeys, ShaderProgram,
};

use crate::{buffer::Mesh, texture::Texture};

type Gl = CurrentGl;

const CUBE_POSITIONS: [Vec3; 10] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(2.0, 5.0, -15.0),
    Vec3::new(-1.5, -2.2, -2.5),
    Vec3::new(-3.8, -2.0, -12.3),
    Vec3::new(2.4, -0.4, -3.5),
    Vec3::new(-1.7, 3.0, -7.5),
    Vec3::new(1.3, -2.0, -2.5),
    Vec3::new(1.5, 2.0, -2.5),
    Vec3::new(1.5, 0.2, -1.5),
    Vec3::new(-1.3, 1.0, -1.5),
];

/// Scene, camera and input state for the render loop.
pub struct Application {
    ctx: Rc<GlContext<Gl>>,
    program: ShaderProgram<Gl>,
    mesh: Mesh,
    texture: Texture,
    camera: FlyCamera,
    cursor: CursorTracker,
    keys: HeldKeys,
    light: Vec3,
    last_frame: Instant,
}

impl Application {
    pub fn new(
        ctx: Rc<GlContext<Gl>>,
        program: ShaderProgram<Gl>,
        mesh: Mesh,
        texture: Texture,
        camera: &CameraSettings,
    ) -> Self {
        unsafe { ctx.api().enable(glow::DEPTH_TEST) };

        // these never change, so they are uploaded once
        program.bind();
        program.set_int("diffuse_tex", 0);
        program.set_vec3("light_color", Vec3::ONE);
        program.set_float("ambient_strength", 0.1);

        Self {
            ctx,
            program,
            mesh,
            texture,
            camera: FlyCamera::new(camera),
            cursor: CursorTracker::new(camera.sensitivity),
            keys: HeldKeys::default(),
            light: Vec3::new(1.2, 1.0, 2.0),
            last_frame: Instant::now(),
        }
    }

    pub fn key(&mut self, key: PhysicalKey, state: ElementState) {
        self.keys.update(key, state);
    }

    pub fn cursor_moved(&mut self, x: f64, y: f64) {
        if let Some((x_offset, y_offset)) = self.cursor.offsets(x, y) {
            self.camera.process_look(x_offset, y_offset);
        }
    }

    /// Raw pointer motion, used while the cursor is locked and has no position.
    pub fn mouse_motion(&mut self, dx: f64, dy: f64) {
        let (x_offset, y_offset) = self.cursor.scale_motion(dx, dy);
        self.camera.process_look(x_offset, y_offset);
    }

    /// The cursor left the window or focus moved elsewhere: drop held keys and the
    /// cursor reference so nothing jumps when input comes back.
    pub fn suspend_input(&mut self) {
        self.cursor.reset();
        self.keys.clear();
    }

    pub fn scroll(&mut self, y_offset: f32) {
        self.camera.process_scroll(y_offset);
    }

    pub fn resize(&self, size: PhysicalSize<u32>) {
        let width = i32::try_from(size.width).unwrap_or(i32::MAX);
        let height = i32::try_from(size.height).unwrap_or(i32::MAX);
        unsafe { self.ctx.api().viewport(0, 0, width, height) };
    }

    pub fn draw_frame(&mut self, size: PhysicalSize<u32>) {
        let now = Instant::now();
        let delta_time = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        for movement in self.keys.movements() {
            self.camera.process_movement(movement, delta_time);
        }

        let gl = self.ctx.api();
        unsafe {
            gl.clear_color(0.1, 0.1, 0.12, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        let aspect = size.width.max(1) as f32 / size.height.max(1) as f32;
        self.program.bind();
        self.program
            .set_mat4("projection", self.camera.projection_matrix(aspect, 0.1, 100.0));
        self.program.set_mat4("view", self.camera.view_matrix());
        self.program.set_vec3("view_pos", self.camera.position());
        self.program.set_vec3("light_pos", self.light);
        self.texture.bind(gl, 0);

        let axis = Vec3::new(1.0, 0.3, 0.5).normalize();
        for (i, position) in CUBE_POSITIONS.iter().enumerate() {
            let model = Mat4::from_translation(*position)
                * Mat4::from_axis_angle(axis, (20.0 * i as f32).to_radians());
            self.program.set_mat4("model", model);
            debug_assert_eq!(self.ctx.bound(), Some(self.program.handle()));
            self.mesh.draw(gl);
        }
    }

    /// Deletes GPU objects while the context is still current.
    pub fn release(self) {
        let gl = self.ctx.api();
        self.mesh.delete(gl);
        self.texture.delete(gl);
        drop(self.program);
    }
}
