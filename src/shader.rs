use std::{
    cell::RefCell,
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use glam::{Mat4, Vec3};
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::{
    error::ShaderError,
    gl::{GlContext, ShaderApi, Stage, UniformValue},
};

/// Flat red, for when the real shaders don't build and something still has to be drawn.
pub const FALLBACK_VERTEX: &str = "
    #version 330 core

    layout (location = 0) in vec3 position;

    uniform mat4 model;
    uniform mat4 view;
    uniform mat4 projection;

    void main() {
        gl_Position = projection * view * model * vec4(position, 1.0);
    }
";

pub const FALLBACK_FRAGMENT: &str = "
    #version 330 core

    out vec4 f_color;

    void main() {
        f_color = vec4(1.0, 0.0, 0.0, 1.0);
    }
";

/// A linked vertex + fragment program.
///
/// Owns the GPU program object and deletes it on drop. Uniform locations are looked up
/// once per name and cached, including the misses.
pub struct ShaderProgram<G: ShaderApi> {
    ctx: Rc<GlContext<G>>,
    handle: G::Program,
    locations: RefCell<FxHashMap<String, Option<G::UniformLocation>>>,
}

/// A compiled stage object, deleted when it goes out of scope.
struct CompiledStage<'a, G: ShaderApi> {
    api: &'a G,
    shader: G::Shader,
}

impl<G: ShaderApi> Drop for CompiledStage<'_, G> {
    fn drop(&mut self) {
        self.api.delete_shader(self.shader);
    }
}

fn compile_stage<'a, G: ShaderApi>(
    api: &'a G,
    stage: Stage,
    source: &str,
) -> Result<CompiledStage<'a, G>, ShaderError> {
    let shader = api
        .create_shader(stage)
        .map_err(|reason| ShaderError::ObjectCreation {
            kind: "shader",
            reason,
        })?;
    let compiled = CompiledStage { api, shader };

    api.shader_source(shader, source);
    api.compile_shader(shader);
    if !api.compile_status(shader) {
        return Err(ShaderError::Compile {
            stage,
            log: api.shader_info_log(shader),
        });
    }
    Ok(compiled)
}

fn link<G: ShaderApi>(
    api: &G,
    vertex: &CompiledStage<'_, G>,
    fragment: &CompiledStage<'_, G>,
) -> Result<G::Program, ShaderError> {
    let program = api
        .create_program()
        .map_err(|reason| ShaderError::ObjectCreation {
            kind: "program",
            reason,
        })?;

    api.attach_shader(program, vertex.shader);
    api.attach_shader(program, fragment.shader);
    api.link_program(program);
    let linked = api.link_status(program);
    api.detach_shader(program, vertex.shader);
    api.detach_shader(program, fragment.shader);

    if !linked {
        let log = api.program_info_log(program);
        api.delete_program(program);
        return Err(ShaderError::Link { log });
    }
    Ok(program)
}

fn read_source(path: &Path) -> Result<String, ShaderError> {
    fs::read_to_string(path).map_err(|source| ShaderError::SourceRead {
        path: PathBuf::from(path),
        source,
    })
}

impl<G: ShaderApi> ShaderProgram<G> {
    /// Compiles both stages and links them.
    ///
    /// The vertex stage is compiled first, so when both sources are broken the error
    /// names the vertex stage. Stage objects are deleted before this returns, whatever
    /// the outcome.
    pub fn from_sources(
        ctx: &Rc<GlContext<G>>,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<Self, ShaderError> {
        let api = ctx.api();
        let vertex = compile_stage(api, Stage::Vertex, vertex_src)?;
        let fragment = compile_stage(api, Stage::Fragment, fragment_src)?;
        let handle = link(api, &vertex, &fragment)?;
        debug!(program = ?handle, "linked shader program");

        Ok(Self {
            ctx: Rc::clone(ctx),
            handle,
            locations: RefCell::default(),
        })
    }

    /// Reads both files, then builds the program as [`Self::from_sources`] does.
    /// Nothing is created on the GPU when either file can't be read.
    pub fn from_files(
        ctx: &Rc<GlContext<G>>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, ShaderError> {
        let vertex_path = vertex_path.as_ref();
        let fragment_path = fragment_path.as_ref();
        let vertex_src = read_source(vertex_path)?;
        let fragment_src = read_source(fragment_path)?;
        debug!(
            vertex = %vertex_path.display(),
            fragment = %fragment_path.display(),
            "loaded shader sources"
        );
        Self::from_sources(ctx, &vertex_src, &fragment_src)
    }

    pub fn fallback(ctx: &Rc<GlContext<G>>) -> Result<Self, ShaderError> {
        Self::from_sources(ctx, FALLBACK_VERTEX, FALLBACK_FRAGMENT)
    }

    pub fn handle(&self) -> G::Program {
        self.handle
    }

    /// Makes this the current program for draw calls and uniform writes.
    pub fn bind(&self) {
        self.ctx.bind(self.handle);
    }

    pub fn is_bound(&self) -> bool {
        self.ctx.bound() == Some(self.handle)
    }

    /// Whether `name` is an active uniform. Declared but unused uniforms are usually
    /// optimized out by the driver and report `false`.
    pub fn has_uniform(&self, name: &str) -> bool {
        self.location(name).is_some()
    }

    /// Uploads `value` to the uniform `name`.
    ///
    /// Names that don't resolve to an active uniform are ignored. The program must be
    /// bound; GL writes uniforms into whichever program is current.
    pub fn set_uniform(&self, name: &str, value: impl Into<UniformValue>) {
        if !self.is_bound() {
            warn!(
                uniform = name,
                program = ?self.handle,
                bound = ?self.ctx.bound(),
                "setting uniform on a program that is not bound"
            );
        }
        debug_assert!(
            self.is_bound(),
            "uniform `{name}` set on program {:?} while it is not bound",
            self.handle
        );

        match self.location(name) {
            Some(location) => self.ctx.api().set_uniform(&location, value.into()),
            None => trace!(uniform = name, "no active uniform with this name, ignoring"),
        }
    }

    pub fn set_int(&self, name: &str, value: i32) {
        self.set_uniform(name, value);
    }

    pub fn set_float(&self, name: &str, value: f32) {
        self.set_uniform(name, value);
    }

    pub fn set_vec3(&self, name: &str, value: Vec3) {
        self.set_uniform(name, value);
    }

    pub fn set_mat4(&self, name: &str, value: Mat4) {
        self.set_uniform(name, value);
    }

    fn location(&self, name: &str) -> Option<G::UniformLocation> {
        if let Some(cached) = self.locations.borrow().get(name) {
            return cached.clone();
        }
        let location = self.ctx.api().uniform_location(self.handle, name);
        self.locations
            .borrow_mut()
            .insert(name.to_owned(), location.clone());
        location
    }
}

impl<G: ShaderApi> Drop for ShaderProgram<G> {
    fn drop(&mut self) {
        self.ctx.forget(self.handle);
        self.ctx.api().delete_program(self.handle);
    }
}
