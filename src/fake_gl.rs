//! An in-memory [`ShaderApi`] for tests.
//!
//! It "compiles" GLSL with a few structural checks, links by matching fragment inputs
//! against vertex outputs, and treats a uniform as active only when the shader body
//! actually reads it, the way real drivers optimize unused uniforms out.

use std::cell::RefCell;

use rustc_hash::FxHashMap;

use crate::gl::{ShaderApi, Stage, UniformValue};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FakeLocation(usize);

struct FakeShader {
    stage: Stage,
    source: String,
    compiled: Option<Result<(), String>>,
}

#[derive(Default)]
struct FakeProgram {
    attached: Vec<u32>,
    linked: bool,
    log: String,
    uniforms: Vec<String>,
    values: FxHashMap<usize, UniformValue>,
}

#[derive(Default)]
struct State {
    next_id: u32,
    shaders: FxHashMap<u32, FakeShader>,
    programs: FxHashMap<u32, FakeProgram>,
    current: Option<u32>,
    use_calls: usize,
    location_queries: usize,
    refuse_objects: bool,
}

impl State {
    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct FakeGl {
    state: RefCell<State>,
}

impl FakeGl {
    /// Makes every later `create_*` call fail, like a driver out of memory.
    pub fn refuse_objects(&self) {
        self.state.borrow_mut().refuse_objects = true;
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn current_program(&self) -> Option<u32> {
        self.state.borrow().current
    }

    pub fn use_calls(&self) -> usize {
        self.state.borrow().use_calls
    }

    pub fn location_queries(&self) -> usize {
        self.state.borrow().location_queries
    }

    /// Reads back the value last uploaded to `name` in `program`.
    pub fn uniform(&self, program: u32, name: &str) -> Option<UniformValue> {
        let state = self.state.borrow();
        let program = state.programs.get(&program)?;
        let index = program.uniforms.iter().position(|u| u == name)?;
        program.values.get(&index).copied()
    }
}

impl ShaderApi for FakeGl {
    type Shader = u32;
    type Program = u32;
    type UniformLocation = FakeLocation;

    fn create_shader(&self, stage: Stage) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        if state.refuse_objects {
            return Err("GL_OUT_OF_MEMORY".into());
        }
        let id = state.next_id();
        state.shaders.insert(
            id,
            FakeShader {
                stage,
                source: String::new(),
                compiled: None,
            },
        );
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        let mut state = self.state.borrow_mut();
        state.shaders.get_mut(&shader).expect("unknown shader").source = source.to_owned();
    }

    fn compile_shader(&self, shader: u32) {
        let mut state = self.state.borrow_mut();
        let shader = state.shaders.get_mut(&shader).expect("unknown shader");
        shader.compiled = Some(check_glsl(&shader.source));
    }

    fn compile_status(&self, shader: u32) -> bool {
        matches!(self.state.borrow().shaders[&shader].compiled, Some(Ok(())))
    }

    fn shader_info_log(&self, shader: u32) -> String {
        match &self.state.borrow().shaders[&shader].compiled {
            Some(Err(log)) => log.clone(),
            _ => String::new(),
        }
    }

    fn delete_shader(&self, shader: u32) {
        self.state.borrow_mut().shaders.remove(&shader);
    }

    fn create_program(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        if state.refuse_objects {
            return Err("GL_OUT_OF_MEMORY".into());
        }
        let id = state.next_id();
        state.programs.insert(id, FakeProgram::default());
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        let mut state = self.state.borrow_mut();
        let program = state.programs.get_mut(&program).expect("unknown program");
        program.attached.push(shader);
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        let mut state = self.state.borrow_mut();
        let program = state.programs.get_mut(&program).expect("unknown program");
        program.attached.retain(|&s| s != shader);
    }

    fn link_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        let stages: Vec<(Stage, String, bool)> = state.programs[&program]
            .attached
            .iter()
            .map(|id| {
                let s = &state.shaders[id];
                (s.stage, s.source.clone(), matches!(s.compiled, Some(Ok(()))))
            })
            .collect();
        let result = link_sources(&stages);

        let program = state.programs.get_mut(&program).expect("unknown program");
        program.values.clear();
        match result {
            Ok(uniforms) => {
                program.linked = true;
                program.log.clear();
                program.uniforms = uniforms;
            }
            Err(log) => {
                program.linked = false;
                program.log = log;
                program.uniforms.clear();
            }
        }
    }

    fn link_status(&self, program: u32) -> bool {
        self.state.borrow().programs[&program].linked
    }

    fn program_info_log(&self, program: u32) -> String {
        self.state.borrow().programs[&program].log.clone()
    }

    fn delete_program(&self, program: u32) {
        self.state.borrow_mut().programs.remove(&program);
    }

    fn use_program(&self, program: Option<u32>) {
        let mut state = self.state.borrow_mut();
        state.current = program;
        state.use_calls += 1;
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<FakeLocation> {
        let mut state = self.state.borrow_mut();
        state.location_queries += 1;
        let program = state.programs.get(&program)?;
        program
            .uniforms
            .iter()
            .position(|u| u == name)
            .map(FakeLocation)
    }

    fn set_uniform(&self, location: &FakeLocation, value: UniformValue) {
        let mut state = self.state.borrow_mut();
        let Some(current) = state.current else {
            return;
        };
        if let Some(program) = state.programs.get_mut(&current) {
            program.values.insert(location.0, value);
        }
    }
}

/// What a single source line declares, if anything.
enum Decl<'a> {
    Uniform(&'a str),
    In(&'a str),
    Out(&'a str),
}

fn declaration(line: &str) -> Option<Decl<'_>> {
    let mut tokens = line
        .trim()
        .trim_end_matches(';')
        .split_whitespace()
        .peekable();
    if tokens.peek().is_some_and(|t| t.starts_with("layout")) {
        for token in tokens.by_ref() {
            if token.ends_with(')') {
                break;
            }
        }
    }
    let qualifier = tokens.next()?;
    let _ty = tokens.next()?;
    let name = tokens.next()?;
    match qualifier {
        "uniform" => Some(Decl::Uniform(name)),
        "in" => Some(Decl::In(name)),
        "out" => Some(Decl::Out(name)),
        _ => None,
    }
}

fn check_glsl(source: &str) -> Result<(), String> {
    let first = source.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    if !first.trim_start().starts_with("#version") {
        return Err("0:1(1): error: missing #version directive".into());
    }
    let mut depth = 0i32;
    for (number, line) in source.lines().enumerate() {
        for c in line.chars() {
            match c {
                '{' | '(' => depth += 1,
                '}' | ')' => depth -= 1,
                _ => (),
            }
            if depth < 0 {
                let line = number + 1;
                return Err(format!("0:{line}(1): error: syntax error, unexpected '{c}'"));
            }
        }
    }
    if depth != 0 {
        return Err(format!(
            "0:{}(1): error: syntax error, unexpected end of file",
            source.lines().count()
        ));
    }
    if !source.contains("void main") {
        return Err("0:1(1): error: no function with name 'main'".into());
    }
    Ok(())
}

/// Links the attached stages and returns the active uniform names.
fn link_sources(stages: &[(Stage, String, bool)]) -> Result<Vec<String>, String> {
    if stages.iter().any(|(_, _, compiled)| !compiled) {
        return Err("error: linking with uncompiled/unspecialized shader".into());
    }
    let source_of = |stage: Stage| {
        stages
            .iter()
            .find(|(s, _, _)| *s == stage)
            .map(|(_, src, _)| src.as_str())
            .ok_or_else(|| format!("error: program lacks a {stage} shader"))
    };
    let vertex = source_of(Stage::Vertex)?;
    let fragment = source_of(Stage::Fragment)?;

    let vertex_outs: Vec<&str> = vertex
        .lines()
        .filter_map(|l| match declaration(l) {
            Some(Decl::Out(name)) => Some(name),
            _ => None,
        })
        .collect();
    for line in fragment.lines() {
        if let Some(Decl::In(name)) = declaration(line) {
            if !vertex_outs.contains(&name) {
                return Err(format!(
                    "error: fragment shader input `{name}` has no matching vertex shader output"
                ));
            }
        }
    }

    let mut uniforms = Vec::new();
    for source in [vertex, fragment] {
        let body: Vec<&str> = source
            .lines()
            .filter(|l| declaration(l).is_none() && !l.trim_start().starts_with('#'))
            .flat_map(|l| l.split(|c: char| !(c.is_alphanumeric() || c == '_')))
            .filter(|t| !t.is_empty())
            .collect();
        for line in source.lines() {
            if let Some(Decl::Uniform(name)) = declaration(line) {
                if body.contains(&name) && !uniforms.iter().any(|u| u == name) {
                    uniforms.push(name.to_owned());
                }
            }
        }
    }
    Ok(uniforms)
}
