// GLSL Live
// Copyright (c) 2025 Harlen Batagelo
// SPDX-License-Identifier: GPL-3.0-or-later

use gl::types::*;
use std::os::raw::c_void;

/// Owned Vertex Array Object, deleted on drop.
pub struct VertexArray {
    id: GLuint,
}

impl VertexArray {
    pub fn new() -> Option<Self> {
        let mut id = 0;
        unsafe { gl::GenVertexArrays(1, &mut id) };
        (id != 0).then_some(Self { id })
    }

    pub fn bind(&self) {
        unsafe { gl::BindVertexArray(self.id) };
    }

    pub fn unbind() {
        unsafe { gl::BindVertexArray(0) };
    }

    /// Describes a tightly packed `f32` attribute read from the bound
    /// `GL_ARRAY_BUFFER`.
    ///
    /// `components` is 1 to 4; `stride` and `offset` are in bytes.
    pub fn float_attribute(&self, location: GLuint, components: GLint, stride: usize, offset: usize) {
        self.bind();
        unsafe {
            gl::EnableVertexAttribArray(location);
            gl::VertexAttribPointer(
                location,
                components,
                gl::FLOAT,
                gl::FALSE,
                stride as GLsizei,
                offset as *const c_void,
            );
        }
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        unsafe { gl::DeleteVertexArrays(1, &self.id) };
    }
}
