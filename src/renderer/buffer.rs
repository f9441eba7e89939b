// GLSL Live
// Copyright (c) 2025 Harlen Batagelo
// SPDX-License-Identifier: GPL-3.0-or-later

use gl::types::*;
use std::os::raw::c_void;

/// What a [`Buffer`] feeds into the pipeline.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BufferKind {
    /// Per-vertex attribute data.
    Vertex,
    /// Indices for indexed draws.
    Element,
}

impl BufferKind {
    fn target(self) -> GLenum {
        match self {
            BufferKind::Vertex => gl::ARRAY_BUFFER,
            BufferKind::Element => gl::ELEMENT_ARRAY_BUFFER,
        }
    }
}

/// Owned GL buffer object, deleted on drop.
pub struct Buffer {
    id: GLuint,
    kind: BufferKind,
}

impl Buffer {
    /// Returns `None` if the driver hands back no buffer name.
    pub fn new(kind: BufferKind) -> Option<Self> {
        let mut id = 0;
        unsafe { gl::GenBuffers(1, &mut id) };
        (id != 0).then_some(Self { id, kind })
    }

    /// Uploads `data` once; the quad never changes after creation.
    pub fn upload<T>(&self, data: &[T]) {
        self.bind();
        unsafe {
            gl::BufferData(
                self.kind.target(),
                std::mem::size_of_val(data) as GLsizeiptr,
                data.as_ptr() as *const c_void,
                gl::STATIC_DRAW,
            );
        }
    }

    pub fn bind(&self) {
        unsafe { gl::BindBuffer(self.kind.target(), self.id) };
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        unsafe { gl::DeleteBuffers(1, &self.id) };
    }
}
