// GLSL Live
// Copyright (c) 2025 Harlen Batagelo
// SPDX-License-Identifier: GPL-3.0-or-later

use gl::types::*;
use std::{fmt, rc::Rc};

use super::{gl_api::GlApi, shader::*, uniform::Uniform};

/// A linked GL program built from a vertex and a fragment [`ShaderUnit`].
///
/// A program is either fully usable (`id != 0`) or the empty sentinel;
/// it is never partially valid. Programs are replaced, never relinked in
/// place, and own their handle exclusively: they move but do not clone.
/// The shader units are borrowed only for the duration of the link.
pub struct ShaderProgram {
    gl: Rc<dyn GlApi>,
    id: GLuint,
    attached_shaders: Vec<GLuint>,
}

impl ShaderProgram {
    /// The invalid program, holding no GL object.
    pub fn empty(gl: Rc<dyn GlApi>) -> Self {
        Self {
            gl,
            id: 0,
            attached_shaders: Vec::new(),
        }
    }

    /// Links `vertex` and `fragment` into a new program.
    ///
    /// Both units must have compiled successfully. On any failure the
    /// partially built program object is released before returning.
    pub fn try_new(
        gl: Rc<dyn GlApi>,
        vertex: &ShaderUnit,
        fragment: &ShaderUnit,
    ) -> Result<Self, ShaderError> {
        for unit in [vertex, fragment] {
            if !unit.is_good() || unit.id() == 0 {
                return Err(ShaderError::InvalidUnit(unit.stage()));
            }
        }

        let id = gl.create_program();
        if id == 0 {
            return Err(ShaderError::CreateFailed);
        }

        let mut program = Self {
            gl,
            id,
            attached_shaders: Vec::with_capacity(2),
        };
        program.attach_shader(vertex);
        program.attach_shader(fragment);
        program.link()?;

        log::trace!("Linked shader program {}", program.id);
        Ok(program)
    }

    fn attach_shader(&mut self, shader: &ShaderUnit) {
        self.gl.attach_shader(self.id, shader.id());
        self.attached_shaders.push(shader.id());
    }

    fn link(&mut self) -> Result<(), ShaderError> {
        self.gl.link_program(self.id);

        if self.gl.program_link_status(self.id) {
            Ok(())
        } else {
            let mut log = self.gl.program_info_log(self.id);
            if log.is_empty() {
                log = format!("program {} failed to link", self.id);
            }
            // Dropping `self` on the error path detaches and deletes.
            Err(ShaderError::LinkError(log))
        }
    }

    pub fn id(&self) -> GLuint {
        self.id
    }

    pub fn is_good(&self) -> bool {
        self.id != 0
    }

    /// Makes this program current for subsequent draw calls.
    ///
    /// Callers check [`ShaderProgram::is_good`] first; binding the empty
    /// sentinel unbinds any program.
    pub fn use_program(&self) {
        self.gl.use_program(self.id);
    }

    pub fn uniform_location(&self, name: &str) -> GLint {
        if self.id == 0 {
            return -1;
        }
        self.gl.uniform_location(self.id, name)
    }

    /// Binds this program and uploads `value` to the uniform `name`.
    ///
    /// Unknown names and invalid programs are ignored.
    pub fn set_uniform<T: Uniform + ?Sized>(&self, name: &str, value: &T) {
        let location = self.uniform_location(name);
        if location < 0 {
            log::trace!("Uniform '{name}' not active in program {}", self.id);
            return;
        }
        self.use_program();
        value.upload(self.gl.as_ref(), location);
    }

    /// Reads the uniform `name` into `storage`, leaving it untouched if
    /// the program does not expose that name.
    pub fn get_uniform<T: Uniform + ?Sized>(&self, name: &str, storage: &mut T) {
        let location = self.uniform_location(name);
        if location < 0 {
            return;
        }
        storage.download(self.gl.as_ref(), self.id, location);
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        if self.id == 0 {
            return;
        }
        for shader in self.attached_shaders.drain(..) {
            self.gl.detach_shader(self.id, shader);
        }
        self.gl.delete_program(self.id);
        self.id = 0;
    }
}

impl fmt::Debug for ShaderProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("id", &self.id)
            .field("attached_shaders", &self.attached_shaders)
            .finish()
    }
}
