use std::{io, path::PathBuf};

use crate::gl::Stage;

/// Reasons a [`ShaderProgram`](crate::shader::ShaderProgram) could not be built.
///
/// Every variant is final for that construction attempt: the sources are static input,
/// so trying again with the same text cannot succeed.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("could not read shader source {}: {source}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: Stage, log: String },
    #[error("shader program failed to link:\n{log}")]
    Link { log: String },
    #[error("driver refused to create a {kind} object: {reason}")]
    ObjectCreation { kind: &'static str, reason: String },
}

impl ShaderError {
    /// The driver rejected the GLSL itself. Missing files and refused objects are not
    /// build failures, a different shader would not get past them either.
    pub fn is_build_failure(&self) -> bool {
        matches!(self, ShaderError::Compile { .. } | ShaderError::Link { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}
