// GLSL Live
// Copyright (c) 2025 Harlen Batagelo
// SPDX-License-Identifier: GPL-3.0-or-later

use gl::types::*;
use std::{fmt, rc::Rc};

use super::gl_api::GlApi;
use crate::source_buffer::SourceBuffer;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ShaderError {
    #[error("{0} shader is not compiled")]
    InvalidUnit(ShaderStage),
    #[error("Shader link error: {0}")]
    LinkError(String),
    #[error("Driver refused to create a program object")]
    CreateFailed,
}

/// Pipeline stage a [`ShaderUnit`] is compiled for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
}

impl ShaderStage {
    pub fn gl_enum(self) -> GLenum {
        match self {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
            ShaderStage::Geometry => gl::GEOMETRY_SHADER,
        }
    }

    /// Lowercase name, as used in shader file names.
    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Geometry => "geometry",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "Vertex",
            ShaderStage::Fragment => "Fragment",
            ShaderStage::Geometry => "Geometry",
        })
    }
}

/// One shader object together with the text it is compiled from.
///
/// A unit owns at most one GL shader handle at a time. Recompiling
/// releases the previous handle before creating the next one, and
/// dropping the unit releases whatever handle is left.
pub struct ShaderUnit {
    gl: Rc<dyn GlApi>,
    stage: ShaderStage,
    source: SourceBuffer,
    id: GLuint,
    compilation_error: String,
    is_good: bool,
}

impl ShaderUnit {
    pub fn new(gl: Rc<dyn GlApi>, stage: ShaderStage) -> Self {
        Self {
            gl,
            stage,
            source: SourceBuffer::new(),
            id: 0,
            compilation_error: String::new(),
            is_good: false,
        }
    }

    /// Replaces the source text. Nothing reaches the GPU until the next compile.
    pub fn set_source(&mut self, source: &str) {
        self.source.replace(source);
    }

    pub fn source(&self) -> &str {
        self.source.as_str()
    }

    pub fn source_buffer(&self) -> &SourceBuffer {
        &self.source
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// GL handle of the last compile attempt, `0` if none is held.
    ///
    /// After a failed compile the handle is still reported but must not
    /// be linked.
    pub fn id(&self) -> GLuint {
        self.id
    }

    pub fn is_good(&self) -> bool {
        self.is_good
    }

    /// Driver log of the last failed compile. Empty after a successful one.
    pub fn compilation_error(&self) -> &str {
        &self.compilation_error
    }

    /// Compiles the current source text as `stage`.
    ///
    /// Safe to call every frame: the previous handle is always released
    /// first, so a unit never holds more than one shader object.
    pub fn compile(&mut self, stage: ShaderStage) -> bool {
        self.delete();
        self.stage = stage;

        self.id = self.gl.create_shader(stage);
        if self.id == 0 {
            self.is_good = false;
            self.compilation_error = format!("Failed to create {stage} shader object");
            log::error!("{}", self.compilation_error);
            return false;
        }

        self.gl.shader_source(self.id, self.source.as_str());
        self.gl.compile_shader(self.id);

        self.is_good = self.gl.shader_compile_status(self.id);
        if self.is_good {
            self.compilation_error.clear();
        } else {
            let mut error = self.gl.shader_info_log(self.id);
            if error.is_empty() {
                error = format!("{stage} shader failed to compile");
            }
            // Live editing recompiles every frame; report each distinct error once.
            if error != self.compilation_error {
                log::warn!("{stage} shader compilation error: {error}");
                self.compilation_error = error;
            }
        }

        self.is_good
    }

    pub fn compile_from_text(&mut self, text: &str, stage: ShaderStage) -> bool {
        self.set_source(text);
        self.compile(stage)
    }

    /// Releases the GL shader object, if any.
    pub fn delete(&mut self) {
        if self.id != 0 {
            self.gl.delete_shader(self.id);
            self.id = 0;
        }
        self.is_good = false;
    }
}

impl Drop for ShaderUnit {
    fn drop(&mut self) {
        self.delete();
    }
}

impl fmt::Debug for ShaderUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderUnit")
            .field("stage", &self.stage)
            .field("id", &self.id)
            .field("is_good", &self.is_good)
            .field("source", &self.source)
            .finish()
    }
}
