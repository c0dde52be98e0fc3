//! The slice of OpenGL that shader programs need, plus the context object that
//! tracks which program is currently bound.
//!
//! `glUseProgram` changes state shared by every program and every draw call issued
//! afterwards. [`GlContext`] records that state so setters can check that their
//! program is the bound one instead of silently writing into someone else's.

use std::{cell::Cell, fmt, ops::Deref};

use glam::{Mat4, Vec3};
use glow::HasContext;

/// One half of a shader pipeline, compiled on its own before linking.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    fn gl_enum(self) -> u32 {
        match self {
            Stage::Vertex => glow::VERTEX_SHADER,
            Stage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Vertex => f.write_str("vertex"),
            Stage::Fragment => f.write_str("fragment"),
        }
    }
}

/// A value that can be uploaded to a uniform.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3(Vec3),
    Mat4(Mat4),
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        Self::Vec3(v)
    }
}

impl From<Mat4> for UniformValue {
    fn from(v: Mat4) -> Self {
        Self::Mat4(v)
    }
}

/// Shader and program calls, object-for-object with the GL entry points.
///
/// Implementations talk to a context that must be current on the calling thread.
pub trait ShaderApi {
    type Shader: Copy;
    type Program: Copy + PartialEq + fmt::Debug;
    type UniformLocation: Clone;

    fn create_shader(&self, stage: Stage) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);

    fn use_program(&self, program: Option<Self::Program>);
    fn uniform_location(&self, program: Self::Program, name: &str)
        -> Option<Self::UniformLocation>;
    /// Writes to the uniform at `location` of the currently used program.
    fn set_uniform(&self, location: &Self::UniformLocation, value: UniformValue);
}

/// A `glow::Context` that is current on the thread using it.
///
/// Only this wrapper implements [`ShaderApi`], so the safe trait methods can't reach a
/// bare context that nobody vouched for.
pub struct CurrentGl(glow::Context);

impl CurrentGl {
    /// # Safety
    /// `gl` must be current on the calling thread, and stay current for as long as this
    /// value or any object created through it is used.
    pub unsafe fn new(gl: glow::Context) -> Self {
        Self(gl)
    }
}

impl Deref for CurrentGl {
    type Target = glow::Context;

    fn deref(&self) -> &glow::Context {
        &self.0
    }
}

// SAFETY (all calls below): upheld by the contract of `CurrentGl::new`.
impl ShaderApi for CurrentGl {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type UniformLocation = glow::UniformLocation;

    fn create_shader(&self, stage: Stage) -> Result<Self::Shader, String> {
        unsafe { self.0.create_shader(stage.gl_enum()) }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { self.0.shader_source(shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { self.0.compile_shader(shader) }
    }

    fn compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.0.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.0.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { self.0.delete_shader(shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { self.0.create_program() }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.0.attach_shader(program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.0.detach_shader(program, shader) }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { self.0.link_program(program) }
    }

    fn link_status(&self, program: Self::Program) -> bool {
        unsafe { self.0.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.0.get_program_info_log(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { self.0.delete_program(program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { self.0.use_program(program) }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.0.get_uniform_location(program, name) }
    }

    fn set_uniform(&self, location: &Self::UniformLocation, value: UniformValue) {
        let location = Some(location);
        unsafe {
            match value {
                UniformValue::Int(v) => self.0.uniform_1_i32(location, v),
                UniformValue::Float(v) => self.0.uniform_1_f32(location, v),
                UniformValue::Vec3(v) => self.0.uniform_3_f32(location, v.x, v.y, v.z),
                UniformValue::Mat4(m) => {
                    self.0.uniform_matrix_4_f32_slice(location, false, &m.to_cols_array());
                }
            }
        }
    }
}

/// A graphics API together with the process-wide "current program" it carries.
///
/// Shared between programs through an `Rc`, which also keeps it on one thread.
pub struct GlContext<G: ShaderApi> {
    api: G,
    bound: Cell<Option<G::Program>>,
}

impl<G: ShaderApi> GlContext<G> {
    pub fn new(api: G) -> Self {
        Self {
            api,
            bound: Cell::new(None),
        }
    }

    pub fn api(&self) -> &G {
        &self.api
    }

    /// The program subsequent draw calls and uniform writes go to.
    pub fn bound(&self) -> Option<G::Program> {
        self.bound.get()
    }

    pub fn bind(&self, program: G::Program) {
        if self.bound.get() != Some(program) {
            self.api.use_program(Some(program));
            self.bound.set(Some(program));
        }
    }

    pub fn unbind(&self) {
        if self.bound.get().is_some() {
            self.api.use_program(None);
            self.bound.set(None);
        }
    }

    /// Drops the binding record for a program that is about to be deleted.
    pub(crate) fn forget(&self, program: G::Program) {
        if self.bound.get() == Some(program) {
            self.bound.set(None);
        }
    }
}
