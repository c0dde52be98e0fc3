//! Shader programs and a fly camera for small OpenGL exercises.
//!
//! [`ShaderProgram`] turns a vertex/fragment source pair into a linked program and sets
//! its uniforms by name. [`FlyCamera`] integrates keyboard, cursor and scroll input into
//! a view matrix. The two are independent of each other.

pub mod camera;
pub mod config;
pub mod error;
pub mod gl;
pub mod input;
pub mod shader;

#[cfg(test)]
mod fake_gl;

pub use camera::{CameraSettings, FlyCamera, Movement};
pub use config::Settings;
pub use error::{ConfigError, ShaderError};
pub use gl::{CurrentGl, GlContext, ShaderApi, Stage, UniformValue};
pub use input::{CursorTracker, HeldKeys};
pub use shader::ShaderProgram;
